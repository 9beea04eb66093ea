//! hostlog-pipeline: 수집 파이프라인
//!
//! syslog 리스너가 넘긴 필드 맵을 정규화된 로그 엔트리로 바꿔 저장합니다.
//!
//! # 모듈 구성
//!
//! - [`field`]: 필드 맵, 값 타입, 타입별 추출 (기본값 대체)
//! - [`host`]: 발신 주소에서 호스트 식별자 추출
//! - [`mapping`]: 호스트별 필드 매핑 해석과 정규화
//! - [`frequency`]: 필드 빈도 비동기 추적 (손실 허용)
//! - [`pipeline`]: 수집/조회 오케스트레이션
//! - [`reader`]: JSON lines 입력 수집
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! JSON lines -> decode -> IngestPipeline -> LogStore
//!                              |      \-> MappingStore (필드명 조회)
//!                              \-> FrequencyTracker -> mpsc -> FrequencyStore
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod frequency;
pub mod host;
pub mod mapping;
pub mod pipeline;
pub mod reader;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{IngestPipeline, IngestPipelineBuilder, IngestStats};

// 설정
pub use config::PipelineConfig;

// 에러
pub use error::IngestError;

// 필드
pub use field::{FieldBag, FieldType, FieldValue, decode_bag, extract};

// 호스트 식별
pub use host::resolve_host_identity;

// 매핑
pub use mapping::FieldNames;

// 빈도
pub use frequency::FrequencyTracker;

// 입력
pub use reader::{ReadSummary, ingest_lines};
