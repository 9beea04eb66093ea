//! SQLite 저장소 구현
//!
//! [`SqliteStore`]는 r2d2 커넥션 풀 위에서 [`LogStore`], [`MappingStore`],
//! [`FrequencyStore`]를 모두 구현합니다. WAL 모드와 busy timeout으로
//! 여러 커넥션의 동시 쓰기를 직렬화합니다.
//!
//! 모든 메서드는 블로킹입니다. async 코드에서는 `spawn_blocking` 안에서 호출하세요.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hostlog_core::config::StorageConfig;
use hostlog_core::error::StorageError;
use hostlog_core::store::{FrequencyStore, LogStore, MappingStore};
use hostlog_core::types::{
    FieldFrequency, FieldMapping, LogEntry, LogPage, NewLogEntry, PAGE_SIZE,
};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ToSql;
use rusqlite::{OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::error::SqliteStoreError;
use crate::schema;

/// 커넥션 풀 타입
pub type DbPool = Pool<SqliteConnectionManager>;

const ENTRY_COLUMNS: &str =
    "id, host_identity, hostname, content, priority, timestamp_ms, created_at_ms";

/// SQLite 기반 저장소
///
/// `Clone`은 같은 풀을 공유합니다.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("SqliteStore")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl SqliteStore {
    /// 설정에 따라 데이터베이스를 열고 스키마를 최신으로 맞춥니다.
    pub fn open(config: &StorageConfig) -> Result<Self, SqliteStoreError> {
        let path = Path::new(&config.db_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA temp_store = MEMORY;",
            )
        });

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .build(manager)?;

        let store = Self { pool };
        let version = {
            let mut conn = store.conn()?;
            schema::migrate(&mut conn)?
        };

        info!(
            db_path = %config.db_path,
            pool_size = config.pool_size,
            schema_version = version,
            "sqlite store opened"
        );
        Ok(store)
    }

    /// 전체 로그 엔트리 수를 반환합니다.
    pub fn total_entries(&self) -> Result<u64, SqliteStoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, SqliteStoreError> {
        Ok(self.pool.get()?)
    }

    fn append_entry(&self, entry: NewLogEntry) -> Result<LogEntry, SqliteStoreError> {
        let created_at = Utc::now();
        let conn = self.conn()?;
        conn.prepare_cached(
            "INSERT INTO logs (host_identity, hostname, content, priority, timestamp_ms, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?
        .execute(params![
            entry.host_identity,
            entry.hostname,
            entry.content,
            entry.priority,
            entry.timestamp.timestamp_millis(),
            created_at.timestamp_millis(),
        ])?;
        let id = conn.last_insert_rowid();

        // 저장 정밀도(밀리초)에 맞춰 반환값도 잘라냅니다.
        Ok(LogEntry {
            id,
            host_identity: entry.host_identity,
            hostname: entry.hostname,
            content: entry.content,
            priority: entry.priority,
            timestamp: truncate_millis(entry.timestamp),
            created_at: truncate_millis(created_at),
        })
    }

    fn filtered_page(&self, hosts: &[String], page: i64) -> Result<LogPage, SqliteStoreError> {
        let page = page.max(0);
        let page_size = PAGE_SIZE as i64;
        let offset = page.saturating_mul(page_size);

        let where_clause = if hosts.is_empty() {
            String::new()
        } else {
            let placeholders = vec!["?"; hosts.len()].join(", ");
            format!("WHERE host_identity IN ({placeholders})")
        };
        let host_params: Vec<&dyn ToSql> = hosts.iter().map(|h| h as &dyn ToSql).collect();

        let conn = self.conn()?;
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM logs {where_clause}"),
            host_params.as_slice(),
            |row| row.get(0),
        )?;
        let total = total.max(0) as u64;

        let mut page_params = host_params;
        page_params.push(&page_size);
        page_params.push(&offset);

        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM logs {where_clause}
             ORDER BY created_at_ms DESC, id DESC
             LIMIT ? OFFSET ?"
        ))?;
        let entries = stmt
            .query_map(page_params.as_slice(), row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            hosts = hosts.len(),
            page,
            total,
            returned = entries.len(),
            "filtered log page"
        );

        Ok(LogPage {
            entries,
            last_page: LogPage::last_page_for(total),
            total,
        })
    }

    fn recent(&self, limit: usize) -> Result<Vec<LogEntry>, SqliteStoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {ENTRY_COLUMNS} FROM logs ORDER BY created_at_ms DESC, id DESC LIMIT ?1"
        ))?;
        let entries = stmt
            .query_map(params![limit], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn hosts(&self) -> Result<Vec<String>, SqliteStoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare_cached("SELECT DISTINCT host_identity FROM logs ORDER BY host_identity")?;
        let hosts = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(hosts)
    }

    fn latest_for(&self, host: &str) -> Result<LogEntry, SqliteStoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {ENTRY_COLUMNS} FROM logs WHERE host_identity = ?1
             ORDER BY created_at_ms DESC, id DESC LIMIT 1"
        ))?;
        stmt.query_row(params![host], row_to_entry)
            .optional()?
            .ok_or_else(|| SqliteStoreError::NotFound(format!("log entry for host '{host}'")))
    }

    fn count_after(&self, host: &str, since: DateTime<Utc>) -> Result<u64, SqliteStoreError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .prepare_cached(
                "SELECT COUNT(*) FROM logs WHERE host_identity = ?1 AND timestamp_ms > ?2",
            )?
            .query_row(params![host, since.timestamp_millis()], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn entries_after(
        &self,
        host: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, SqliteStoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {ENTRY_COLUMNS} FROM logs WHERE host_identity = ?1 AND timestamp_ms > ?2
             ORDER BY timestamp_ms DESC, id DESC"
        ))?;
        let entries = stmt
            .query_map(params![host, since.timestamp_millis()], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn mapping_for(&self, host: &str) -> Result<Option<FieldMapping>, SqliteStoreError> {
        let conn = self.conn()?;
        let mapping = conn
            .prepare_cached(
                "SELECT host_identity, hostname_field, content_field, priority_field, timestamp_field
                 FROM field_mappings WHERE host_identity = ?1",
            )?
            .query_row(params![host], row_to_mapping)
            .optional()?;
        Ok(mapping)
    }

    fn put_mapping(&self, mapping: &FieldMapping) -> Result<(), SqliteStoreError> {
        let conn = self.conn()?;
        conn.prepare_cached(
            "INSERT INTO field_mappings
                 (host_identity, hostname_field, content_field, priority_field, timestamp_field)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(host_identity) DO UPDATE SET
                 hostname_field = excluded.hostname_field,
                 content_field = excluded.content_field,
                 priority_field = excluded.priority_field,
                 timestamp_field = excluded.timestamp_field",
        )?
        .execute(params![
            mapping.host_identity,
            mapping.hostname_field,
            mapping.content_field,
            mapping.priority_field,
            mapping.timestamp_field,
        ])?;
        info!(host = %mapping.host_identity, "field mapping saved");
        Ok(())
    }

    fn remove_mapping(&self, host: &str) -> Result<bool, SqliteStoreError> {
        let conn = self.conn()?;
        let removed = conn
            .prepare_cached("DELETE FROM field_mappings WHERE host_identity = ?1")?
            .execute(params![host])?;
        if removed > 0 {
            info!(host, "field mapping deleted");
        }
        Ok(removed > 0)
    }

    fn all_mappings(&self) -> Result<Vec<FieldMapping>, SqliteStoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT host_identity, hostname_field, content_field, priority_field, timestamp_field
             FROM field_mappings ORDER BY host_identity",
        )?;
        let mappings = stmt
            .query_map([], row_to_mapping)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mappings)
    }

    fn increment_fields(&self, host: &str, field_names: &[String]) -> Result<(), SqliteStoreError> {
        if field_names.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO field_frequencies (host_identity, field_name, count)
                 VALUES (?1, ?2, 1)
                 ON CONFLICT(host_identity, field_name) DO UPDATE SET count = count + 1",
            )?;
            for name in field_names {
                stmt.execute(params![host, name])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn frequencies_for(&self, host: &str) -> Result<Vec<FieldFrequency>, SqliteStoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT host_identity, field_name, count FROM field_frequencies
             WHERE host_identity = ?1
             ORDER BY count DESC, field_name ASC",
        )?;
        let rows = stmt
            .query_map(params![host], |row| {
                let count: i64 = row.get(2)?;
                Ok(FieldFrequency {
                    host_identity: row.get(0)?,
                    field_name: row.get(1)?,
                    count: count.max(0) as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl LogStore for SqliteStore {
    fn append(&self, entry: NewLogEntry) -> Result<LogEntry, StorageError> {
        Ok(self.append_entry(entry)?)
    }

    fn query_filtered(&self, hosts: &[String], page: i64) -> Result<LogPage, StorageError> {
        Ok(self.filtered_page(hosts, page)?)
    }

    fn query_recent(&self, limit: usize) -> Result<Vec<LogEntry>, StorageError> {
        Ok(self.recent(limit)?)
    }

    fn distinct_host_identities(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.hosts()?)
    }

    fn most_recent_entry(&self, host: &str) -> Result<LogEntry, StorageError> {
        Ok(self.latest_for(host)?)
    }

    fn count_since(&self, host: &str, since: DateTime<Utc>) -> Result<u64, StorageError> {
        Ok(self.count_after(host, since)?)
    }

    fn entries_since(
        &self,
        host: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, StorageError> {
        Ok(self.entries_after(host, since)?)
    }
}

impl MappingStore for SqliteStore {
    fn resolve_mapping(&self, host: &str) -> Result<Option<FieldMapping>, StorageError> {
        Ok(self.mapping_for(host)?)
    }

    fn upsert_mapping(&self, mapping: &FieldMapping) -> Result<(), StorageError> {
        Ok(self.put_mapping(mapping)?)
    }

    fn delete_mapping(&self, host: &str) -> Result<bool, StorageError> {
        Ok(self.remove_mapping(host)?)
    }

    fn list_mappings(&self) -> Result<Vec<FieldMapping>, StorageError> {
        Ok(self.all_mappings()?)
    }
}

impl FrequencyStore for SqliteStore {
    fn record_fields(&self, host: &str, field_names: &[String]) -> Result<(), StorageError> {
        Ok(self.increment_fields(host, field_names)?)
    }

    fn list_frequencies(&self, host: &str) -> Result<Vec<FieldFrequency>, StorageError> {
        Ok(self.frequencies_for(host)?)
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        host_identity: row.get(1)?,
        hostname: row.get(2)?,
        content: row.get(3)?,
        priority: row.get(4)?,
        timestamp: millis_to_datetime(row.get(5)?, 5)?,
        created_at: millis_to_datetime(row.get(6)?, 6)?,
    })
}

fn row_to_mapping(row: &Row<'_>) -> rusqlite::Result<FieldMapping> {
    Ok(FieldMapping {
        host_identity: row.get(0)?,
        hostname_field: row.get(1)?,
        content_field: row.get(2)?,
        priority_field: row.get(3)?,
        timestamp_field: row.get(4)?,
    })
}

fn millis_to_datetime(ms: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, ms))
}

fn truncate_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}
