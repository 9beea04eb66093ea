//! 수집 파이프라인 에러 타입
//!
//! [`IngestError`]는 수집 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<IngestError> for HostlogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use hostlog_core::error::{HostlogError, PipelineError, StorageError};

/// 수집 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 입력 라인을 필드 맵으로 디코딩하지 못함
    #[error("decode error at line {line}: {reason}")]
    Decode {
        /// 1부터 시작하는 입력 라인 번호
        line: usize,
        /// 실패 사유
        reason: String,
    },

    /// 저장소 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 블로킹 작업 실패 (spawn_blocking join 에러)
    #[error("blocking task failed: {0}")]
    Task(String),

    /// 입력 읽기 실패
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for IngestError {
    fn from(err: tokio::task::JoinError) -> Self {
        IngestError::Task(err.to_string())
    }
}

impl From<IngestError> for HostlogError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Storage(e) => HostlogError::Storage(e),
            IngestError::Io(e) => HostlogError::Io(e),
            IngestError::Task(reason) => HostlogError::Pipeline(PipelineError::TaskFailed(reason)),
            other => HostlogError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}
