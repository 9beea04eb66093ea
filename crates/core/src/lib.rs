//! hostlog 코어: 공통 타입, 저장소 trait, 에러, 설정, 메트릭 상수
//!
//! 다른 hostlog 크레이트는 모두 이 크레이트에 의존하며,
//! 크레이트끼리는 여기 정의된 타입과 trait으로만 통신합니다.
//!
//! - [`types`]: 로그 엔트리, 필드 매핑, 빈도, 점수 타입
//! - [`store`]: `LogStore` / `MappingStore` / `FrequencyStore` trait
//! - [`config`]: `hostlog.toml` 설정
//! - [`error`]: 도메인별 에러
//! - [`metrics`]: Prometheus 메트릭 이름

pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, HostlogError, PipelineError, ScoringError, StorageError};

// 설정
pub use config::{
    GeneralConfig, HostlogConfig, IngestConfig, MetricsConfig, ScoringConfig, StorageConfig,
};

// 저장소 trait
pub use store::{FrequencyStore, LogStore, MappingStore};

// 도메인 타입
pub use types::{
    FieldFrequency, FieldMapping, HostScore, LogEntry, LogPage, NewLogEntry, PAGE_SIZE,
    SeverityBucket, SeverityLevel,
};
