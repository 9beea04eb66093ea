//! 설정 관리: hostlog.toml 파싱 및 런타임 설정
//!
//! [`HostlogConfig`]는 모든 컴포넌트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`HOSTLOG_STORAGE_DB_PATH=/data/logs.db` 형식)
//! 3. 설정 파일 (`hostlog.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), hostlog_core::error::HostlogError> {
//! use hostlog_core::config::HostlogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HostlogConfig::load("hostlog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HostlogConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, HostlogError};

/// hostlog 통합 설정
///
/// `hostlog.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 컴포넌트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostlogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 수집 설정
    #[serde(default)]
    pub ingest: IngestConfig,
    /// 가시성 점수 설정
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// 메트릭 노출 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl HostlogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HostlogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에서 시작하여 설정을 로드합니다.
    ///
    /// CLI처럼 설정 파일 없이도 동작해야 하는 경우에 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, HostlogError> {
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(HostlogError::Config(ConfigError::FileNotFound { path })) => {
                tracing::debug!(path = %path, "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HostlogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HostlogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HostlogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HostlogError> {
        toml::from_str(toml_str).map_err(|e| {
            HostlogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `HOSTLOG_{SECTION}_{FIELD}`
    /// 예: `HOSTLOG_SCORING_ALPHA=12.5`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "HOSTLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "HOSTLOG_GENERAL_LOG_FORMAT");

        // Storage
        override_string(&mut self.storage.db_path, "HOSTLOG_STORAGE_DB_PATH");
        override_u32(&mut self.storage.pool_size, "HOSTLOG_STORAGE_POOL_SIZE");
        override_u64(
            &mut self.storage.busy_timeout_ms,
            "HOSTLOG_STORAGE_BUSY_TIMEOUT_MS",
        );

        // Ingest
        override_string(&mut self.ingest.client_field, "HOSTLOG_INGEST_CLIENT_FIELD");
        override_usize(
            &mut self.ingest.frequency_channel_capacity,
            "HOSTLOG_INGEST_FREQUENCY_CHANNEL_CAPACITY",
        );

        // Scoring
        override_f64(&mut self.scoring.alpha, "HOSTLOG_SCORING_ALPHA");
        override_f64(&mut self.scoring.lambda, "HOSTLOG_SCORING_LAMBDA");
        override_f64(&mut self.scoring.beta, "HOSTLOG_SCORING_BETA");
        override_f64(&mut self.scoring.gamma, "HOSTLOG_SCORING_GAMMA");
        override_u64(&mut self.scoring.volume_cap, "HOSTLOG_SCORING_VOLUME_CAP");
        override_f64(&mut self.scoring.min_score, "HOSTLOG_SCORING_MIN_SCORE");
        override_u64(
            &mut self.scoring.volume_window_secs,
            "HOSTLOG_SCORING_VOLUME_WINDOW_SECS",
        );
        override_u64(
            &mut self.scoring.severity_window_secs,
            "HOSTLOG_SCORING_SEVERITY_WINDOW_SECS",
        );
        override_u64(
            &mut self.scoring.report_interval_secs,
            "HOSTLOG_SCORING_REPORT_INTERVAL_SECS",
        );
        override_usize(&mut self.scoring.top_hosts, "HOSTLOG_SCORING_TOP_HOSTS");

        // Metrics
        override_bool(&mut self.metrics.enabled, "HOSTLOG_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "HOSTLOG_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "HOSTLOG_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HostlogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.storage.db_path.trim().is_empty() {
            return Err(invalid("storage.db_path", "must not be empty"));
        }
        if self.storage.pool_size == 0 {
            return Err(invalid("storage.pool_size", "must be greater than 0"));
        }

        if self.ingest.client_field.is_empty() {
            return Err(invalid("ingest.client_field", "must not be empty"));
        }
        if self.ingest.frequency_channel_capacity == 0 {
            return Err(invalid(
                "ingest.frequency_channel_capacity",
                "must be greater than 0",
            ));
        }

        self.scoring.validate()?;

        if self.metrics.enabled && self.metrics.endpoint != "/metrics" {
            return Err(invalid("metrics.endpoint", "only '/metrics' is supported"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> HostlogError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite 데이터베이스 파일 경로
    pub db_path: String,
    /// 커넥션 풀 크기
    pub pool_size: u32,
    /// 잠금 대기 시간 (밀리초)
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "hostlog.db".to_owned(),
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// 수집 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// 클라이언트 주소(`host:port`)를 담은 필드명
    pub client_field: String,
    /// 필드 빈도 업데이트 채널 용량
    pub frequency_channel_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            client_field: "client".to_owned(),
            frequency_channel_capacity: 1024,
        }
    }
}

/// 가시성 점수 설정
///
/// `score = max(min_score, alpha * e^(-lambda * T) + beta * min(V, volume_cap) + gamma * S)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// 시간 감쇠 가중치 (α)
    pub alpha: f64,
    /// 감쇠율 (λ, 시간당)
    pub lambda: f64,
    /// 볼륨 가중치 (β)
    pub beta: f64,
    /// 심각도 가중치 (γ)
    pub gamma: f64,
    /// 볼륨 상한 (건)
    pub volume_cap: u64,
    /// 최소 점수
    pub min_score: f64,
    /// 볼륨 집계 윈도우 (초)
    pub volume_window_secs: u64,
    /// 심각도 집계 윈도우 (초)
    pub severity_window_secs: u64,
    /// 데몬의 상위 호스트 보고 주기 (초)
    pub report_interval_secs: u64,
    /// 보고할 상위 호스트 수
    pub top_hosts: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alpha: 10.0,
            lambda: 0.2,
            beta: 0.5,
            gamma: 5.0,
            volume_cap: 100,
            min_score: 0.1,
            volume_window_secs: 3_600,
            severity_window_secs: 86_400,
            report_interval_secs: 60,
            top_hosts: 3,
        }
    }
}

impl ScoringConfig {
    /// 점수 설정의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HostlogError> {
        let weights = [
            ("scoring.alpha", self.alpha),
            ("scoring.lambda", self.lambda),
            ("scoring.beta", self.beta),
            ("scoring.gamma", self.gamma),
        ];
        for (field, value) in weights {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, "must be a positive finite number"));
            }
        }

        if !self.min_score.is_finite() || self.min_score < 0.0 {
            return Err(invalid("scoring.min_score", "must be >= 0"));
        }
        if self.volume_window_secs == 0 {
            return Err(invalid("scoring.volume_window_secs", "must be greater than 0"));
        }
        if self.severity_window_secs < self.volume_window_secs {
            return Err(invalid(
                "scoring.severity_window_secs",
                "must not be shorter than volume_window_secs",
            ));
        }
        if self.report_interval_secs == 0 {
            return Err(invalid(
                "scoring.report_interval_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// 메트릭 노출 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 엔드포인트 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, env_key: &str, type_name: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                expected = type_name,
                "failed to parse env var, ignoring"
            ),
        }
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    override_parsed(target, env_key, "bool");
}

fn override_usize(target: &mut usize, env_key: &str) {
    override_parsed(target, env_key, "usize");
}

fn override_u16(target: &mut u16, env_key: &str) {
    override_parsed(target, env_key, "u16");
}

fn override_u32(target: &mut u32, env_key: &str) {
    override_parsed(target, env_key, "u32");
}

fn override_u64(target: &mut u64, env_key: &str) {
    override_parsed(target, env_key, "u64");
}

fn override_f64(target: &mut f64, env_key: &str) {
    override_parsed(target, env_key, "f64");
}
