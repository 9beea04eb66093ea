//! hostlog-storage: SQLite 저장소
//!
//! [`SqliteStore`] 하나가 `hostlog-core`의 세 저장소 trait을 모두 구현합니다.
//!
//! # 사용 예시
//! ```no_run
//! use std::sync::Arc;
//! use hostlog_core::config::StorageConfig;
//! use hostlog_core::store::LogStore;
//! use hostlog_storage::SqliteStore;
//!
//! let store = Arc::new(SqliteStore::open(&StorageConfig::default())?);
//! let hosts = store.distinct_host_identities()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod schema;
pub mod sqlite;

pub use error::SqliteStoreError;
pub use sqlite::{DbPool, SqliteStore};
