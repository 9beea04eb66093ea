//! 가시성 점수 엔진
//!
//! [`VisibilityScorer`]는 [`LogStore`]를 읽어 호스트별 점수를 계산합니다.
//! 읽기 전용이며, 계산 중 새 로그가 들어와도 일관된 스냅샷을 요구하지 않습니다.
//!
//! 시각을 인자로 받는 `*_at` 메서드는 결정적 테스트용이고,
//! `score`/`score_all`은 현재 시각을 사용합니다.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use hostlog_core::error::{ScoringError, StorageError};
use hostlog_core::metrics as m;
use hostlog_core::store::LogStore;
use hostlog_core::types::HostScore;
use serde::Serialize;
use tracing::{debug, warn};

use crate::components::{self, SeverityCounts};
use crate::weights::ScoreWeights;

/// 호스트 점수와 구성 요소
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// 호스트 식별자
    pub host_identity: String,
    /// 시간 감쇠 성분
    pub time_decay: f64,
    /// 볼륨 성분
    pub volume: f64,
    /// 심각도 성분
    pub severity: f64,
    /// 최종 점수 (최소 점수 적용)
    pub score: f64,
    /// 가장 최근 엔트리 이후 경과 시간 (시간)
    pub hours_since_last: f64,
    /// 볼륨 윈도우 내 엔트리 수
    pub recent_count: u64,
    /// 심각도 윈도우 내 버킷별 개수
    pub severity_counts: SeverityCounts,
}

/// 가시성 점수 계산기
#[derive(Clone)]
pub struct VisibilityScorer {
    store: Arc<dyn LogStore>,
    weights: ScoreWeights,
}

impl VisibilityScorer {
    /// 새 점수 계산기를 생성합니다.
    pub fn new(store: Arc<dyn LogStore>, weights: ScoreWeights) -> Self {
        Self { store, weights }
    }

    /// 사용 중인 가중치
    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// `now` 기준으로 호스트의 점수와 구성 요소를 계산합니다.
    ///
    /// 엔트리가 없으면 [`ScoringError::NoEntries`]입니다.
    pub fn breakdown_at(
        &self,
        host: &str,
        now: DateTime<Utc>,
    ) -> Result<ScoreBreakdown, ScoringError> {
        let w = &self.weights;

        let latest = self
            .store
            .most_recent_entry(host)
            .map_err(|e| storage_error(host, e))?;
        let hours_since_last = components::hours_between(latest.timestamp, now);
        let time_decay = components::time_decay(w.alpha, w.lambda, hours_since_last);

        let recent_count = self
            .store
            .count_since(host, w.volume_since(now))
            .map_err(|e| storage_error(host, e))?;
        let volume = components::volume(w.beta, recent_count, w.volume_cap);

        let window = self
            .store
            .entries_since(host, w.severity_since(now))
            .map_err(|e| storage_error(host, e))?;
        let severity_counts = SeverityCounts::from_entries(&window);
        let severity = components::severity(w.gamma, &severity_counts);

        let score = (time_decay + volume + severity).max(w.min_score);

        Ok(ScoreBreakdown {
            host_identity: host.to_owned(),
            time_decay,
            volume,
            severity,
            score,
            hours_since_last,
            recent_count,
            severity_counts,
        })
    }

    /// `now` 기준으로 호스트 점수를 계산합니다.
    pub fn score_at(&self, host: &str, now: DateTime<Utc>) -> Result<f64, ScoringError> {
        Ok(self.breakdown_at(host, now)?.score)
    }

    /// 현재 시각 기준으로 호스트 점수를 계산합니다.
    pub fn score(&self, host: &str) -> Result<f64, ScoringError> {
        self.score_at(host, Utc::now())
    }

    /// `now` 기준으로 모든 호스트의 점수와 구성 요소를 계산합니다.
    ///
    /// 빈 식별자는 건너뛰고, 호스트별 실패는 `warn`으로 기록한 뒤 제외합니다.
    /// 호스트 목록 조회 실패만 에러로 반환합니다.
    pub fn breakdown_all_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoreBreakdown>, ScoringError> {
        let started = Instant::now();
        let hosts = self
            .store
            .distinct_host_identities()
            .map_err(ScoringError::HostListing)?;

        let mut breakdowns = Vec::with_capacity(hosts.len());
        for host in hosts.iter().filter(|h| !h.is_empty()) {
            match self.breakdown_at(host, now) {
                Ok(breakdown) => breakdowns.push(breakdown),
                Err(e) => {
                    metrics::counter!(m::SCORING_HOST_ERRORS_TOTAL).increment(1);
                    warn!(host = %host, error = %e, "skipping host in scoring pass");
                }
            }
        }

        metrics::gauge!(m::SCORING_HOSTS_SCORED).set(breakdowns.len() as f64);
        metrics::histogram!(m::SCORING_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        debug!(
            hosts = hosts.len(),
            scored = breakdowns.len(),
            "scoring pass complete"
        );
        Ok(breakdowns)
    }

    /// `now` 기준으로 모든 호스트의 점수를 계산합니다 (호스트 → 점수).
    pub fn score_all_at(&self, now: DateTime<Utc>) -> Result<HashMap<String, f64>, ScoringError> {
        Ok(self
            .breakdown_all_at(now)?
            .into_iter()
            .map(|b| (b.host_identity, b.score))
            .collect())
    }

    /// 블로킹 풀에서 현재 시각 기준으로 모든 호스트의 점수를 계산합니다.
    pub async fn score_all(&self) -> Result<HashMap<String, f64>, ScoringError> {
        let scorer = self.clone();
        tokio::task::spawn_blocking(move || scorer.score_all_at(Utc::now()))
            .await
            .map_err(|e| ScoringError::TaskFailed(e.to_string()))?
    }

    /// 블로킹 풀에서 한 호스트의 구성 요소를 계산합니다.
    pub async fn breakdown(&self, host: &str) -> Result<ScoreBreakdown, ScoringError> {
        let scorer = self.clone();
        let host = host.to_owned();
        tokio::task::spawn_blocking(move || scorer.breakdown_at(&host, Utc::now()))
            .await
            .map_err(|e| ScoringError::TaskFailed(e.to_string()))?
    }
}

fn storage_error(host: &str, source: StorageError) -> ScoringError {
    if source.is_not_found() {
        ScoringError::NoEntries {
            host: host.to_owned(),
        }
    } else {
        ScoringError::Storage {
            host: host.to_owned(),
            source,
        }
    }
}

/// 점수 맵을 점수 내림차순(동점은 호스트 오름차순) 목록으로 바꿉니다.
pub fn rank(scores: &HashMap<String, f64>) -> Vec<HostScore> {
    let mut ranked: Vec<HostScore> = scores
        .iter()
        .map(|(host, score)| HostScore {
            host_identity: host.clone(),
            score: *score,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.host_identity.cmp(&b.host_identity))
    });
    ranked
}

/// 상위 `n`개 호스트를 반환합니다.
pub fn top_hosts(scores: &HashMap<String, f64>, n: usize) -> Vec<HostScore> {
    let mut ranked = rank(scores);
    ranked.truncate(n);
    ranked
}
