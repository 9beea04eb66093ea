//! 에러 타입: 도메인별 에러 정의

/// hostlog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HostlogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 저장소 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 수집 파이프라인 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 점수 계산 에러
    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 연결 실패 (풀에서 커넥션 획득 실패 포함)
    #[error("connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),

    /// 대상 레코드 없음
    #[error("not found: {0}")]
    NotFound(String),
}

impl StorageError {
    /// 레코드 부재로 인한 에러인지 확인합니다.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// 수집 파이프라인 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 백그라운드 작업 실패 (spawn_blocking join 에러 등)
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

/// 점수 계산 에러
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// 호스트에 로그가 없음
    #[error("no log entries for host '{host}'")]
    NoEntries { host: String },

    /// 점수 계산 중 저장소 조회 실패
    #[error("storage read failed for host '{host}': {source}")]
    Storage {
        host: String,
        #[source]
        source: StorageError,
    },

    /// 호스트 목록 조회 실패
    #[error("failed to list hosts: {0}")]
    HostListing(#[source] StorageError),

    /// 블로킹 계산 작업 실패
    #[error("scoring task failed: {0}")]
    TaskFailed(String),
}
