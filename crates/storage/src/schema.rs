//! 스키마 마이그레이션
//!
//! `PRAGMA user_version`으로 적용된 버전을 추적하며,
//! 아직 적용되지 않은 단계만 순서대로 실행합니다.
//! 시각 컬럼은 모두 Unix epoch 밀리초(INTEGER)입니다.

use rusqlite::Connection;
use tracing::info;

use crate::error::SqliteStoreError;

/// 버전별 마이그레이션 SQL (인덱스 + 1 = 버전)
const MIGRATIONS: &[&str] = &[
    // v1: 로그
    "CREATE TABLE IF NOT EXISTS logs (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        host_identity TEXT    NOT NULL,
        hostname      TEXT    NOT NULL,
        content       TEXT    NOT NULL,
        priority      INTEGER NOT NULL,
        timestamp_ms  INTEGER NOT NULL,
        created_at_ms INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_logs_host_created ON logs (host_identity, created_at_ms);
    CREATE INDEX IF NOT EXISTS idx_logs_host_timestamp ON logs (host_identity, timestamp_ms);
    CREATE INDEX IF NOT EXISTS idx_logs_created ON logs (created_at_ms);",
    // v2: 필드 매핑
    "CREATE TABLE IF NOT EXISTS field_mappings (
        host_identity   TEXT PRIMARY KEY,
        hostname_field  TEXT NOT NULL,
        content_field   TEXT NOT NULL,
        priority_field  TEXT NOT NULL,
        timestamp_field TEXT NOT NULL
    );",
    // v3: 필드 빈도
    "CREATE TABLE IF NOT EXISTS field_frequencies (
        host_identity TEXT    NOT NULL,
        field_name    TEXT    NOT NULL,
        count         INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (host_identity, field_name)
    );",
];

/// 현재 코드가 기대하는 스키마 버전
pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

/// 밀린 마이그레이션을 적용하고 최종 버전을 반환합니다.
pub fn migrate(conn: &mut Connection) -> Result<i64, SqliteStoreError> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current > SCHEMA_VERSION {
        return Err(SqliteStoreError::Migration {
            version: current,
            reason: format!("database is newer than supported version {SCHEMA_VERSION}"),
        });
    }

    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current.max(0) as usize) {
        let version = idx as i64 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .map_err(|e| SqliteStoreError::Migration {
                version,
                reason: e.to_string(),
            })?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!(version, "applied schema migration");
    }

    Ok(SCHEMA_VERSION)
}
