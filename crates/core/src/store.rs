//! 저장소 trait: 영속 계층 확장 포인트 정의
//!
//! 파이프라인과 점수 엔진은 구체 저장소 대신 이 trait들에 의존합니다.
//! 구현체는 생성자로 명시적으로 만들어 각 컴포넌트에 주입되며,
//! 프로세스 전역 핸들은 두지 않습니다.
//!
//! 모든 메서드는 블로킹 I/O를 수행할 수 있습니다. async 컨텍스트에서는
//! `tokio::task::spawn_blocking` 안에서 호출하세요.

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::types::{FieldFrequency, FieldMapping, LogEntry, LogPage, NewLogEntry};

/// 로그 저장소
///
/// 추가 전용(write-once, read-many)입니다. 코어는 엔트리를 수정하거나
/// 삭제하지 않습니다. 동시 `append` 호출에서 엔트리가 유실되거나
/// 중복되지 않아야 합니다.
pub trait LogStore: Send + Sync {
    /// 엔트리 하나를 저장하고 ID와 생성 시각이 채워진 결과를 반환합니다.
    fn append(&self, entry: NewLogEntry) -> Result<LogEntry, StorageError>;

    /// 호스트 집합으로 필터링한 페이지를 조회합니다.
    ///
    /// `hosts`가 비어 있으면 전체 호스트가 대상입니다. 음수 페이지는 0으로 취급합니다.
    fn query_filtered(&self, hosts: &[String], page: i64) -> Result<LogPage, StorageError>;

    /// 전체 호스트에서 가장 최근 `limit`개 엔트리를 조회합니다.
    fn query_recent(&self, limit: usize) -> Result<Vec<LogEntry>, StorageError>;

    /// 저장된 모든 호스트 식별자를 중복 없이 반환합니다 (순서 무관).
    fn distinct_host_identities(&self) -> Result<Vec<String>, StorageError>;

    /// 호스트의 가장 최근(생성 시각 기준) 엔트리를 반환합니다.
    ///
    /// 엔트리가 없으면 [`StorageError::NotFound`]를 반환합니다.
    fn most_recent_entry(&self, host: &str) -> Result<LogEntry, StorageError>;

    /// 타임스탬프가 `since`보다 엄격히 이후인 엔트리 수를 셉니다.
    fn count_since(&self, host: &str, since: DateTime<Utc>) -> Result<u64, StorageError>;

    /// 타임스탬프가 `since`보다 엄격히 이후인 엔트리를 반환합니다.
    fn entries_since(&self, host: &str, since: DateTime<Utc>)
    -> Result<Vec<LogEntry>, StorageError>;
}

/// 필드 매핑 레지스트리
pub trait MappingStore: Send + Sync {
    /// 호스트의 매핑을 조회합니다. 없으면 `None`입니다.
    fn resolve_mapping(&self, host: &str) -> Result<Option<FieldMapping>, StorageError>;

    /// 매핑을 저장합니다. 같은 호스트의 기존 매핑은 통째로 교체됩니다.
    fn upsert_mapping(&self, mapping: &FieldMapping) -> Result<(), StorageError>;

    /// 매핑을 삭제합니다. 삭제된 항목이 있으면 `true`입니다.
    fn delete_mapping(&self, host: &str) -> Result<bool, StorageError>;

    /// 등록된 모든 매핑을 호스트 순으로 반환합니다.
    fn list_mappings(&self) -> Result<Vec<FieldMapping>, StorageError>;
}

/// 필드 빈도 저장소
pub trait FrequencyStore: Send + Sync {
    /// 각 필드명의 카운터를 1씩 증가시킵니다 (없으면 1로 생성).
    ///
    /// 같은 (호스트, 필드명) 카운터에 대한 동시 증가는 직렬화되어야 합니다.
    fn record_fields(&self, host: &str, field_names: &[String]) -> Result<(), StorageError>;

    /// 호스트의 모든 카운터를 횟수 내림차순으로 반환합니다.
    fn list_frequencies(&self, host: &str) -> Result<Vec<FieldFrequency>, StorageError>;
}
