//! 점수 가중치와 윈도우
//!
//! [`ScoreWeights`]는 core의 [`ScoringConfig`]에서 점수 계산에 필요한 값만 추린 것입니다.

use chrono::{DateTime, TimeDelta, Utc};
use hostlog_core::config::ScoringConfig;
use serde::Serialize;

/// 심각도 버킷별 가중치 (error, warning, info)
pub const SEVERITY_WEIGHTS: (f64, f64, f64) = (10.0, 5.0, 1.0);

/// 점수 가중치
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    /// 시간 감쇠 가중치 (α)
    pub alpha: f64,
    /// 시간당 감쇠율 (λ)
    pub lambda: f64,
    /// 볼륨 가중치 (β)
    pub beta: f64,
    /// 심각도 가중치 (γ)
    pub gamma: f64,
    /// 볼륨 상한
    pub volume_cap: u64,
    /// 최소 점수
    pub min_score: f64,
    /// 볼륨 윈도우 (초)
    pub volume_window_secs: u64,
    /// 심각도 윈도우 (초)
    pub severity_window_secs: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::from_core(&ScoringConfig::default())
    }
}

impl ScoreWeights {
    /// core 설정에서 가중치를 생성합니다.
    pub fn from_core(config: &ScoringConfig) -> Self {
        Self {
            alpha: config.alpha,
            lambda: config.lambda,
            beta: config.beta,
            gamma: config.gamma,
            volume_cap: config.volume_cap,
            min_score: config.min_score,
            volume_window_secs: config.volume_window_secs,
            severity_window_secs: config.severity_window_secs,
        }
    }

    /// 볼륨 윈도우 시작 시각
    pub fn volume_since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        window_start(now, self.volume_window_secs)
    }

    /// 심각도 윈도우 시작 시각
    pub fn severity_since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        window_start(now, self.severity_window_secs)
    }
}

fn window_start(now: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    let span = i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX);
    now.checked_sub_signed(span)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_match_reference_constants() {
        let w = ScoreWeights::default();
        assert_eq!(w.alpha, 10.0);
        assert_eq!(w.lambda, 0.2);
        assert_eq!(w.beta, 0.5);
        assert_eq!(w.gamma, 5.0);
        assert_eq!(w.volume_cap, 100);
        assert_eq!(w.min_score, 0.1);
    }

    #[test]
    fn windows_subtract_from_now() {
        let w = ScoreWeights::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        assert_eq!(
            w.volume_since(now),
            Utc.with_ymd_and_hms(2024, 6, 2, 11, 0, 0).unwrap()
        );
        assert_eq!(
            w.severity_since(now),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn huge_window_saturates() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        assert_eq!(window_start(now, u64::MAX), DateTime::<Utc>::MIN_UTC);
    }
}
