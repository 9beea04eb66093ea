//! hostlog-visibility: 호스트 가시성 점수 엔진
//!
//! 저장된 로그만으로 "지금 이 호스트를 얼마나 주목해야 하는가"를 점수로 매깁니다.
//!
//! # 모듈 구성
//!
//! - [`components`]: 시간 감쇠, 볼륨, 심각도 성분 (순수 함수)
//! - [`weights`]: 가중치와 집계 윈도우
//! - [`engine`]: 저장소 기반 점수 계산과 순위
//!
//! 점수 계산은 읽기 전용이며 [`LogStore`](hostlog_core::store::LogStore)에만 의존합니다.

pub mod components;
pub mod engine;
pub mod weights;

pub use components::SeverityCounts;
pub use engine::{ScoreBreakdown, VisibilityScorer, rank, top_hosts};
pub use weights::{SEVERITY_WEIGHTS, ScoreWeights};

pub use hostlog_core::error::ScoringError;
