//! 필드 빈도 추적기
//!
//! 수집된 메시지마다 필드명별 관측 횟수를 호스트 단위로 누적합니다.
//! 업데이트는 bounded mpsc 채널로 백그라운드 태스크에 넘겨지며,
//! 수집 경로는 결과를 기다리지 않습니다.
//!
//! # 손실 허용
//! 채널이 가득 찼거나 닫혔으면 관측은 버려지고 메트릭과 로그에만 남습니다.
//! 저장 실패도 로그로만 기록됩니다. 카운터는 근사치입니다.

use std::sync::Arc;

use hostlog_core::metrics as m;
use hostlog_core::store::FrequencyStore;
use hostlog_core::types::FieldFrequency;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::field::{FieldBag, field_names};

/// 관측 한 건 (호스트 + 필드명 목록)
#[derive(Debug)]
struct Observation {
    host: String,
    field_names: Vec<String>,
}

/// 필드 빈도 추적기
///
/// tokio 런타임 안에서 [`FrequencyTracker::spawn`]으로 생성해야 합니다.
pub struct FrequencyTracker {
    store: Arc<dyn FrequencyStore>,
    tx: mpsc::Sender<Observation>,
    shutdown_tx: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FrequencyTracker {
    /// 백그라운드 기록 태스크를 띄우고 추적기를 반환합니다.
    pub fn spawn(store: Arc<dyn FrequencyStore>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = tokio::spawn(run_worker(Arc::clone(&store), rx, shutdown_rx));
        debug!(capacity, "frequency tracker started");

        Self {
            store,
            tx,
            shutdown_tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// 필드 맵의 모든 필드명을 관측으로 넘깁니다.
    ///
    /// 블로킹하지 않습니다. 큐에 들어가면 `true`, 버려지면 `false`입니다.
    pub fn observe(&self, host: &str, bag: &FieldBag) -> bool {
        if bag.is_empty() {
            return true;
        }
        let observation = Observation {
            host: host.to_owned(),
            field_names: field_names(bag),
        };

        match self.tx.try_send(observation) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                metrics::counter!(m::FREQUENCY_UPDATES_DROPPED_TOTAL).increment(1);
                warn!(
                    host = %dropped.host,
                    fields = dropped.field_names.len(),
                    "frequency channel full, dropping observation"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                metrics::counter!(m::FREQUENCY_UPDATES_DROPPED_TOTAL).increment(1);
                debug!(host = %dropped.host, "frequency tracker stopped, dropping observation");
                false
            }
        }
    }

    /// 호스트의 필드 빈도를 횟수 내림차순으로 조회합니다.
    pub async fn list_frequencies(&self, host: &str) -> Result<Vec<FieldFrequency>, IngestError> {
        let store = Arc::clone(&self.store);
        let host = host.to_owned();
        let rows = tokio::task::spawn_blocking(move || store.list_frequencies(&host)).await??;
        Ok(rows)
    }

    /// 새 관측을 막고 큐에 남은 관측을 모두 기록한 뒤 종료합니다.
    ///
    /// 두 번째 호출부터는 아무 일도 하지 않습니다.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "frequency worker terminated abnormally");
            }
        }
    }
}

async fn run_worker(
    store: Arc<dyn FrequencyStore>,
    mut rx: mpsc::Receiver<Observation>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            next = rx.recv() => match next {
                Some(observation) => record(&store, observation).await,
                None => break,
            },
            _ = shutdown_rx.changed() => {
                rx.close();
                let mut drained = 0_usize;
                while let Some(observation) = rx.recv().await {
                    record(&store, observation).await;
                    drained += 1;
                }
                info!(drained, "frequency tracker drained");
                break;
            }
        }
    }
    debug!("frequency worker stopped");
}

async fn record(store: &Arc<dyn FrequencyStore>, observation: Observation) {
    let store = Arc::clone(store);
    let count = observation.field_names.len() as u64;
    let result = tokio::task::spawn_blocking(move || {
        store
            .record_fields(&observation.host, &observation.field_names)
            .map_err(|e| (observation.host, e))
    })
    .await;

    match result {
        Ok(Ok(())) => {
            metrics::counter!(m::FREQUENCY_FIELDS_RECORDED_TOTAL).increment(count);
        }
        Ok(Err((host, e))) => {
            metrics::counter!(m::FREQUENCY_STORE_ERRORS_TOTAL).increment(1);
            warn!(host = %host, error = %e, "failed to record field frequencies");
        }
        Err(e) => {
            metrics::counter!(m::FREQUENCY_STORE_ERRORS_TOTAL).increment(1);
            warn!(error = %e, "frequency record task failed");
        }
    }
}
