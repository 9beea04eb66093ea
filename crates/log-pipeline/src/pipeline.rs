//! 수집 파이프라인 -- 필드 맵 하나를 정규화하고 저장하는 전체 흐름을 관리합니다.
//!
//! [`IngestPipeline`]은 저장소 trait 객체를 주입받아 동작하며,
//! 데몬과 CLI가 같은 인스턴스로 수집과 조회를 모두 수행합니다.
//!
//! # 처리 흐름
//! ```text
//! FieldBag -> client 필드 -> 호스트 식별자 -> 매핑 조회 -> 정규화 -> LogStore.append
//!                                  \-> FrequencyTracker.observe (비동기, 손실 허용)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use hostlog_core::metrics as m;
use hostlog_core::store::{FrequencyStore, LogStore, MappingStore};
use hostlog_core::types::{FieldFrequency, FieldMapping, LogEntry, LogPage};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::IngestError;
use crate::field::{FieldBag, extract};
use crate::frequency::FrequencyTracker;
use crate::host::resolve_host_identity;
use crate::mapping::FieldNames;

/// 수집 통계 스냅샷
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// 받은 필드 맵 수
    pub received: u64,
    /// 저장에 성공한 엔트리 수
    pub stored: u64,
    /// 저장에 실패한 필드 맵 수
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    stored: AtomicU64,
    failed: AtomicU64,
}

/// 수집 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use std::sync::Arc;
/// use hostlog_pipeline::IngestPipelineBuilder;
///
/// let store = Arc::new(SqliteStore::open(&config.storage)?);
/// let pipeline = IngestPipelineBuilder::new()
///     .config(PipelineConfig::from_core(&config.ingest))
///     .stores(store)
///     .build()?;
///
/// let entry = pipeline.ingest(bag).await?;
/// ```
pub struct IngestPipeline {
    config: PipelineConfig,
    logs: Arc<dyn LogStore>,
    mappings: Arc<dyn MappingStore>,
    frequency: FrequencyTracker,
    counters: Counters,
}

impl IngestPipeline {
    /// 파이프라인 설정을 반환합니다.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 필드 맵 하나를 정규화하여 저장합니다.
    ///
    /// 매핑 조회 실패는 기본 필드명으로 대체되고, 필드 빈도 업데이트는
    /// 기다리지 않습니다. 저장 실패만 에러로 반환되며 재시도하지 않습니다.
    pub async fn ingest(&self, bag: FieldBag) -> Result<LogEntry, IngestError> {
        let started = Instant::now();
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(m::INGEST_MESSAGES_RECEIVED_TOTAL).increment(1);

        let origin = extract::<String>(&bag, &self.config.client_field);
        let host = resolve_host_identity(&origin);

        self.frequency.observe(&host, &bag);

        let mappings = Arc::clone(&self.mappings);
        let logs = Arc::clone(&self.logs);
        let result = tokio::task::spawn_blocking(move || {
            let names = FieldNames::lookup(mappings.as_ref(), &host);
            logs.append(names.normalize(&host, &bag))
        })
        .await;

        let entry = match result {
            Ok(Ok(entry)) => entry,
            Ok(Err(e)) => {
                self.record_failure();
                warn!(origin = %origin, error = %e, "failed to store log entry");
                return Err(e.into());
            }
            Err(e) => {
                self.record_failure();
                warn!(origin = %origin, error = %e, "store task failed");
                return Err(e.into());
            }
        };

        self.counters.stored.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(
            m::INGEST_ENTRIES_STORED_TOTAL,
            m::LABEL_SEVERITY => severity_label(&entry)
        )
        .increment(1);
        metrics::histogram!(m::INGEST_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        debug!(
            id = entry.id,
            host = %entry.host_identity,
            priority = entry.priority,
            "log entry stored"
        );
        Ok(entry)
    }

    /// 호스트 집합으로 필터링한 페이지를 조회합니다 (빈 집합이면 전체).
    pub async fn query_filtered(
        &self,
        hosts: Vec<String>,
        page: i64,
    ) -> Result<LogPage, IngestError> {
        let logs = Arc::clone(&self.logs);
        let page = tokio::task::spawn_blocking(move || logs.query_filtered(&hosts, page)).await??;
        Ok(page)
    }

    /// 전체 호스트에서 최근 `limit`개 엔트리를 조회합니다.
    pub async fn query_recent(&self, limit: usize) -> Result<Vec<LogEntry>, IngestError> {
        let logs = Arc::clone(&self.logs);
        let entries = tokio::task::spawn_blocking(move || logs.query_recent(limit)).await??;
        Ok(entries)
    }

    /// 로그를 보낸 적 있는 호스트 식별자 목록을 반환합니다.
    pub async fn hosts(&self) -> Result<Vec<String>, IngestError> {
        let logs = Arc::clone(&self.logs);
        let hosts = tokio::task::spawn_blocking(move || logs.distinct_host_identities()).await??;
        Ok(hosts)
    }

    /// 호스트의 필드 빈도를 조회합니다.
    pub async fn list_frequencies(&self, host: &str) -> Result<Vec<FieldFrequency>, IngestError> {
        self.frequency.list_frequencies(host).await
    }

    /// 호스트 매핑을 조회합니다.
    pub async fn resolve_mapping(&self, host: &str) -> Result<Option<FieldMapping>, IngestError> {
        let mappings = Arc::clone(&self.mappings);
        let host = host.to_owned();
        let mapping =
            tokio::task::spawn_blocking(move || mappings.resolve_mapping(&host)).await??;
        Ok(mapping)
    }

    /// 호스트 매핑을 저장합니다 (기존 매핑은 교체).
    pub async fn upsert_mapping(&self, mapping: FieldMapping) -> Result<(), IngestError> {
        let mappings = Arc::clone(&self.mappings);
        tokio::task::spawn_blocking(move || mappings.upsert_mapping(&mapping)).await??;
        Ok(())
    }

    /// 호스트 매핑을 삭제합니다. 삭제된 항목이 있으면 `true`입니다.
    pub async fn delete_mapping(&self, host: &str) -> Result<bool, IngestError> {
        let mappings = Arc::clone(&self.mappings);
        let host = host.to_owned();
        let removed = tokio::task::spawn_blocking(move || mappings.delete_mapping(&host)).await??;
        Ok(removed)
    }

    /// 등록된 모든 매핑을 조회합니다.
    pub async fn list_mappings(&self) -> Result<Vec<FieldMapping>, IngestError> {
        let mappings = Arc::clone(&self.mappings);
        let list = tokio::task::spawn_blocking(move || mappings.list_mappings()).await??;
        Ok(list)
    }

    /// 수집 통계를 반환합니다.
    pub fn stats(&self) -> IngestStats {
        IngestStats {
            received: self.counters.received.load(Ordering::Relaxed),
            stored: self.counters.stored.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// 필드 빈도 큐를 비우고 백그라운드 태스크를 종료합니다.
    pub async fn shutdown(&self) {
        self.frequency.shutdown().await;
    }

    fn record_failure(&self) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(m::INGEST_STORE_ERRORS_TOTAL).increment(1);
    }
}

fn severity_label(entry: &LogEntry) -> &'static str {
    use hostlog_core::types::SeverityBucket;
    match entry.severity_bucket() {
        SeverityBucket::Error => "error",
        SeverityBucket::Warning => "warning",
        SeverityBucket::Info => "info",
    }
}

/// 수집 파이프라인 빌더
///
/// 세 저장소를 각각 지정하거나, 하나의 구현체가 모두 제공하면
/// [`stores`](Self::stores)로 한 번에 지정합니다.
pub struct IngestPipelineBuilder {
    config: PipelineConfig,
    logs: Option<Arc<dyn LogStore>>,
    mappings: Option<Arc<dyn MappingStore>>,
    frequencies: Option<Arc<dyn FrequencyStore>>,
}

impl IngestPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            logs: None,
            mappings: None,
            frequencies: None,
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 세 저장소를 같은 구현체로 지정합니다.
    pub fn stores<S>(mut self, store: Arc<S>) -> Self
    where
        S: LogStore + MappingStore + FrequencyStore + 'static,
    {
        let logs: Arc<dyn LogStore> = store.clone();
        let mappings: Arc<dyn MappingStore> = store.clone();
        let frequencies: Arc<dyn FrequencyStore> = store;
        self.logs = Some(logs);
        self.mappings = Some(mappings);
        self.frequencies = Some(frequencies);
        self
    }

    /// 로그 저장소를 지정합니다.
    pub fn log_store(mut self, store: Arc<dyn LogStore>) -> Self {
        self.logs = Some(store);
        self
    }

    /// 매핑 저장소를 지정합니다.
    pub fn mapping_store(mut self, store: Arc<dyn MappingStore>) -> Self {
        self.mappings = Some(store);
        self
    }

    /// 빈도 저장소를 지정합니다.
    pub fn frequency_store(mut self, store: Arc<dyn FrequencyStore>) -> Self {
        self.frequencies = Some(store);
        self
    }

    /// 파이프라인을 빌드합니다.
    ///
    /// 필드 빈도 백그라운드 태스크를 띄우므로 tokio 런타임 안에서 호출해야 합니다.
    pub fn build(self) -> Result<IngestPipeline, IngestError> {
        self.config.validate()?;

        let logs = self.logs.ok_or_else(|| missing("log_store"))?;
        let mappings = self.mappings.ok_or_else(|| missing("mapping_store"))?;
        let frequencies = self.frequencies.ok_or_else(|| missing("frequency_store"))?;

        let frequency =
            FrequencyTracker::spawn(frequencies, self.config.frequency_channel_capacity);

        Ok(IngestPipeline {
            config: self.config,
            logs,
            mappings,
            frequency,
            counters: Counters::default(),
        })
    }
}

impl Default for IngestPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(field: &str) -> IngestError {
    IngestError::Config {
        field: field.to_owned(),
        reason: "not set".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use hostlog_core::error::StorageError;
    use hostlog_core::types::NewLogEntry;
    use std::sync::Mutex;

    /// append가 항상 실패하는 저장소
    struct RejectingStore;

    impl LogStore for RejectingStore {
        fn append(&self, _entry: NewLogEntry) -> Result<LogEntry, StorageError> {
            Err(StorageError::Query("database is locked".to_owned()))
        }
        fn query_filtered(&self, _hosts: &[String], _page: i64) -> Result<LogPage, StorageError> {
            Ok(LogPage {
                entries: Vec::new(),
                last_page: 0,
                total: 0,
            })
        }
        fn query_recent(&self, _limit: usize) -> Result<Vec<LogEntry>, StorageError> {
            Ok(Vec::new())
        }
        fn distinct_host_identities(&self) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
        fn most_recent_entry(&self, host: &str) -> Result<LogEntry, StorageError> {
            Err(StorageError::NotFound(host.to_owned()))
        }
        fn count_since(&self, _host: &str, _since: DateTime<Utc>) -> Result<u64, StorageError> {
            Ok(0)
        }
        fn entries_since(
            &self,
            _host: &str,
            _since: DateTime<Utc>,
        ) -> Result<Vec<LogEntry>, StorageError> {
            Ok(Vec::new())
        }
    }

    impl MappingStore for RejectingStore {
        fn resolve_mapping(&self, _host: &str) -> Result<Option<FieldMapping>, StorageError> {
            Ok(None)
        }
        fn upsert_mapping(&self, _mapping: &FieldMapping) -> Result<(), StorageError> {
            Ok(())
        }
        fn delete_mapping(&self, _host: &str) -> Result<bool, StorageError> {
            Ok(false)
        }
        fn list_mappings(&self) -> Result<Vec<FieldMapping>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingFrequencies {
        hosts: Mutex<Vec<String>>,
    }

    impl FrequencyStore for RecordingFrequencies {
        fn record_fields(&self, host: &str, _names: &[String]) -> Result<(), StorageError> {
            self.hosts.lock().unwrap().push(host.to_owned());
            Ok(())
        }
        fn list_frequencies(&self, _host: &str) -> Result<Vec<FieldFrequency>, StorageError> {
            Ok(Vec::new())
        }
    }

    fn bag() -> FieldBag {
        let mut bag = FieldBag::new();
        bag.insert("client".to_owned(), "10.0.0.5:514".into());
        bag.insert("content".to_owned(), "hello".into());
        bag
    }

    #[tokio::test]
    async fn builder_requires_stores() {
        let result = IngestPipelineBuilder::new().build();
        assert!(matches!(result, Err(IngestError::Config { .. })));
    }

    #[tokio::test]
    async fn builder_rejects_invalid_config() {
        let config = PipelineConfig {
            frequency_channel_capacity: 0,
            ..PipelineConfig::default()
        };
        let result = IngestPipelineBuilder::new()
            .config(config)
            .log_store(Arc::new(RejectingStore))
            .mapping_store(Arc::new(RejectingStore))
            .frequency_store(Arc::new(RecordingFrequencies::default()))
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn append_failure_is_returned_and_counted() {
        let frequencies = Arc::new(RecordingFrequencies::default());
        let store = Arc::new(RejectingStore);
        let pipeline = IngestPipelineBuilder::new()
            .log_store(store.clone())
            .mapping_store(store)
            .frequency_store(frequencies.clone())
            .build()
            .unwrap();

        let err = pipeline.ingest(bag()).await.unwrap_err();
        assert!(matches!(err, IngestError::Storage(StorageError::Query(_))));
        assert_eq!(
            pipeline.stats(),
            IngestStats {
                received: 1,
                stored: 0,
                failed: 1
            }
        );

        // 필드 빈도는 저장 결과와 무관하게 기록됨
        pipeline.shutdown().await;
        assert_eq!(*frequencies.hosts.lock().unwrap(), vec!["10.0.0.5"]);
    }

    #[test]
    fn severity_labels() {
        let mut entry = LogEntry {
            id: 1,
            host_identity: "h".to_owned(),
            hostname: String::new(),
            content: String::new(),
            priority: 2,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        assert_eq!(severity_label(&entry), "error");
        entry.priority = 4;
        assert_eq!(severity_label(&entry), "warning");
        entry.priority = 7;
        assert_eq!(severity_label(&entry), "info");
    }
}
