//! 필드 매핑 해석
//!
//! 호스트별 [`FieldMapping`]이 있으면 그 필드명을, 없으면 기본 필드명
//! (`hostname`, `content`, `priority`, `timestamp`)을 사용해
//! 필드 맵을 [`NewLogEntry`]로 정규화합니다.

use chrono::{DateTime, Utc};
use hostlog_core::metrics as m;
use hostlog_core::store::MappingStore;
use hostlog_core::types::{
    DEFAULT_CONTENT_FIELD, DEFAULT_HOSTNAME_FIELD, DEFAULT_PRIORITY_FIELD,
    DEFAULT_TIMESTAMP_FIELD, FieldMapping, NewLogEntry,
};
use tracing::warn;

use crate::field::{FieldBag, extract};

/// 정규 속성별로 읽을 필드명
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    /// 호스트명 라벨 필드
    pub hostname: String,
    /// 본문 필드
    pub content: String,
    /// priority 필드
    pub priority: String,
    /// 타임스탬프 필드
    pub timestamp: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME_FIELD.to_owned(),
            content: DEFAULT_CONTENT_FIELD.to_owned(),
            priority: DEFAULT_PRIORITY_FIELD.to_owned(),
            timestamp: DEFAULT_TIMESTAMP_FIELD.to_owned(),
        }
    }
}

impl From<&FieldMapping> for FieldNames {
    fn from(mapping: &FieldMapping) -> Self {
        Self {
            hostname: mapping.hostname_field.clone(),
            content: mapping.content_field.clone(),
            priority: mapping.priority_field.clone(),
            timestamp: mapping.timestamp_field.clone(),
        }
    }
}

impl FieldNames {
    /// 매핑이 있으면 그 필드명을, 없으면 기본 필드명을 사용합니다.
    pub fn resolve(mapping: Option<&FieldMapping>) -> Self {
        mapping.map(Self::from).unwrap_or_default()
    }

    /// 저장소에서 호스트 매핑을 조회해 필드명을 결정합니다.
    ///
    /// 조회 실패는 `warn`으로 기록하고 매핑이 없는 것으로 취급합니다.
    pub fn lookup(store: &dyn MappingStore, host: &str) -> Self {
        match store.resolve_mapping(host) {
            Ok(mapping) => Self::resolve(mapping.as_ref()),
            Err(e) => {
                warn!(host, error = %e, "mapping lookup failed, using default field names");
                metrics::counter!(m::INGEST_MAPPING_FALLBACKS_TOTAL).increment(1);
                Self::default()
            }
        }
    }

    /// 필드 맵을 정규화된 엔트리로 변환합니다.
    pub fn normalize(&self, host_identity: &str, bag: &FieldBag) -> NewLogEntry {
        NewLogEntry {
            host_identity: host_identity.to_owned(),
            hostname: extract::<String>(bag, &self.hostname),
            content: extract::<String>(bag, &self.content),
            priority: extract::<i64>(bag, &self.priority),
            timestamp: extract::<DateTime<Utc>>(bag, &self.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostlog_core::error::StorageError;

    struct FailingMappings;

    impl MappingStore for FailingMappings {
        fn resolve_mapping(&self, _host: &str) -> Result<Option<FieldMapping>, StorageError> {
            Err(StorageError::Connection("pool exhausted".to_owned()))
        }
        fn upsert_mapping(&self, _mapping: &FieldMapping) -> Result<(), StorageError> {
            unreachable!()
        }
        fn delete_mapping(&self, _host: &str) -> Result<bool, StorageError> {
            unreachable!()
        }
        fn list_mappings(&self) -> Result<Vec<FieldMapping>, StorageError> {
            unreachable!()
        }
    }

    fn custom_mapping() -> FieldMapping {
        FieldMapping {
            host_identity: "10.0.0.7".to_owned(),
            hostname_field: "host".to_owned(),
            content_field: "msg".to_owned(),
            priority_field: "pri".to_owned(),
            timestamp_field: "ts".to_owned(),
        }
    }

    #[test]
    fn resolve_without_mapping_uses_defaults() {
        let names = FieldNames::resolve(None);
        assert_eq!(names.hostname, "hostname");
        assert_eq!(names.content, "content");
        assert_eq!(names.priority, "priority");
        assert_eq!(names.timestamp, "timestamp");
    }

    #[test]
    fn resolve_with_mapping_uses_its_names() {
        let mapping = custom_mapping();
        let names = FieldNames::resolve(Some(&mapping));
        assert_eq!(names.content, "msg");
        assert_eq!(names.timestamp, "ts");
    }

    #[test]
    fn lookup_failure_falls_back_to_defaults() {
        let names = FieldNames::lookup(&FailingMappings, "10.0.0.7");
        assert_eq!(names, FieldNames::default());
    }

    #[test]
    fn normalize_reads_mapped_fields() {
        let mut bag = FieldBag::new();
        bag.insert("msg".to_owned(), "disk full".into());
        bag.insert("pri".to_owned(), 11_i64.into());
        bag.insert("content".to_owned(), "ignored".into());

        let names = FieldNames::resolve(Some(&custom_mapping()));
        let entry = names.normalize("10.0.0.7", &bag);
        assert_eq!(entry.host_identity, "10.0.0.7");
        assert_eq!(entry.content, "disk full");
        assert_eq!(entry.priority, 11);
        assert_eq!(entry.hostname, "");
        assert_eq!(entry.timestamp, DateTime::<Utc>::UNIX_EPOCH);
    }
}
