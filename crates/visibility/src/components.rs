//! 점수 구성 요소 계산
//!
//! 저장소와 무관한 순수 함수들입니다.
//!
//! ```text
//! score = max(min_score, α·e^(−λ·T) + β·min(V, cap) + γ·S)
//! ```
//! - T: 가장 최근 엔트리 이후 경과 시간 (시간 단위). 미래 타임스탬프면 음수가 되어
//!   감쇠 성분이 α보다 커집니다.
//! - V: 볼륨 윈도우 내 엔트리 수
//! - S: 심각도 윈도우 내 엔트리의 가중 평균 심각도

use chrono::{DateTime, Utc};
use hostlog_core::types::{LogEntry, SeverityBucket};
use serde::Serialize;

use crate::weights::SEVERITY_WEIGHTS;

/// 시간 감쇠 성분 `α·e^(−λ·T)`
pub fn time_decay(alpha: f64, lambda: f64, hours_since: f64) -> f64 {
    alpha * (-lambda * hours_since).exp()
}

/// 볼륨 성분 `β·min(V, cap)`
pub fn volume(beta: f64, count: u64, cap: u64) -> f64 {
    beta * count.min(cap) as f64
}

/// 심각도 성분 `γ·S`
///
/// 엔트리가 없으면 0입니다.
pub fn severity(gamma: f64, counts: &SeverityCounts) -> f64 {
    gamma * counts.weighted_average()
}

/// 두 시각 사이의 경과 시간 (시간 단위)
pub fn hours_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - earlier).num_milliseconds() as f64 / 3_600_000.0
}

/// 심각도 버킷별 엔트리 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// error 버킷 (severity 0–2)
    pub error: u64,
    /// warning 버킷 (severity 3–4)
    pub warning: u64,
    /// info 버킷 (severity 5–7)
    pub info: u64,
}

impl SeverityCounts {
    /// 엔트리 목록에서 버킷별 개수를 셉니다.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            counts.add(entry.priority);
        }
        counts
    }

    /// priority 하나를 해당 버킷에 더합니다.
    pub fn add(&mut self, priority: i64) {
        match SeverityBucket::from_priority(priority) {
            SeverityBucket::Error => self.error += 1,
            SeverityBucket::Warning => self.warning += 1,
            SeverityBucket::Info => self.info += 1,
        }
    }

    /// 전체 개수
    pub fn total(&self) -> u64 {
        self.error + self.warning + self.info
    }

    /// 가중 평균 (error 10, warning 5, info 1). 비어 있으면 0.
    pub fn weighted_average(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let (error_w, warning_w, info_w) = SEVERITY_WEIGHTS;
        (error_w * self.error as f64 + warning_w * self.warning as f64 + info_w * self.info as f64)
            / total as f64
    }
}
