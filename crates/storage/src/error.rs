//! SQLite 저장소 에러 타입
//!
//! [`SqliteStoreError`]는 커넥션 풀과 SQL 실행 에러를 표현합니다.
//! `From<SqliteStoreError> for StorageError` 변환이 구현되어 있어
//! 저장소 trait 경계에서 `?` 연산자로 전파할 수 있습니다.

use hostlog_core::error::{HostlogError, StorageError};

/// SQLite 저장소 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum SqliteStoreError {
    /// 풀에서 커넥션을 얻지 못함
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// SQL 실행 실패
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// 데이터베이스 디렉터리 생성 실패 등
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 스키마 마이그레이션 실패
    #[error("migration failed at version {version}: {reason}")]
    Migration {
        /// 실패한 스키마 버전
        version: i64,
        /// 실패 사유
        reason: String,
    },

    /// 조회 대상 없음
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<SqliteStoreError> for StorageError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Pool(e) => StorageError::Connection(e.to_string()),
            SqliteStoreError::Io(e) => StorageError::Connection(e.to_string()),
            SqliteStoreError::NotFound(what) => StorageError::NotFound(what),
            other => StorageError::Query(other.to_string()),
        }
    }
}

impl From<SqliteStoreError> for HostlogError {
    fn from(err: SqliteStoreError) -> Self {
        HostlogError::Storage(err.into())
    }
}
