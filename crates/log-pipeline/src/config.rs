//! 수집 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`IngestConfig`]를
//! 기반으로 파이프라인 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```
//! use hostlog_core::config::HostlogConfig;
//! use hostlog_pipeline::config::PipelineConfig;
//!
//! let core_config = HostlogConfig::default();
//! let config = PipelineConfig::from_core(&core_config.ingest);
//! assert_eq!(config.client_field, "client");
//! ```

use hostlog_core::config::IngestConfig;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// 수집 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 발신 주소(`host:port`)를 담은 필드명
    pub client_field: String,
    /// 필드 빈도 채널 용량
    pub frequency_channel_capacity: usize,
    /// JSON 라인 최대 길이 (바이트)
    pub max_line_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_core(&IngestConfig::default())
    }
}

impl PipelineConfig {
    /// core의 `IngestConfig`에서 파이프라인 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &IngestConfig) -> Self {
        Self {
            client_field: core.client_field.clone(),
            frequency_channel_capacity: core.frequency_channel_capacity,
            max_line_length: 64 * 1024,
        }
    }

    /// 설정 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.client_field.is_empty() {
            return Err(IngestError::Config {
                field: "client_field".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.frequency_channel_capacity == 0 {
            return Err(IngestError::Config {
                field: "frequency_channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        if self.max_line_length == 0 {
            return Err(IngestError::Config {
                field: "max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_copies_fields() {
        let core = IngestConfig {
            client_field: "remote".to_owned(),
            frequency_channel_capacity: 16,
        };
        let config = PipelineConfig::from_core(&core);
        assert_eq!(config.client_field, "remote");
        assert_eq!(config.frequency_channel_capacity, 16);
        assert_eq!(config.max_line_length, 64 * 1024);
    }

    #[test]
    fn empty_client_field_rejected() {
        let config = PipelineConfig {
            client_field: String::new(),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = PipelineConfig {
            frequency_channel_capacity: 0,
            ..PipelineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("frequency_channel_capacity"));
    }
}
