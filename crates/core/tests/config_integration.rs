//! hostlog.toml 통합 설정 테스트
//!
//! - hostlog.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use hostlog_core::config::HostlogConfig;
use hostlog_core::error::{ConfigError, HostlogError};
use serial_test::serial;

const EXAMPLE: &str = include_str!("../../../hostlog.toml.example");

// =============================================================================
// hostlog.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let config = HostlogConfig::parse(EXAMPLE).expect("example config should parse");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.storage.db_path, "hostlog.db");
    assert_eq!(config.ingest.client_field, "client");
}

#[test]
fn example_config_passes_validation() {
    let config = HostlogConfig::parse(EXAMPLE).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let from_file = HostlogConfig::parse(EXAMPLE).expect("should parse");
    let from_code = HostlogConfig::default();

    assert_eq!(from_file.general.log_level, from_code.general.log_level);
    assert_eq!(from_file.general.log_format, from_code.general.log_format);

    assert_eq!(from_file.storage.db_path, from_code.storage.db_path);
    assert_eq!(from_file.storage.pool_size, from_code.storage.pool_size);
    assert_eq!(
        from_file.storage.busy_timeout_ms,
        from_code.storage.busy_timeout_ms
    );

    assert_eq!(from_file.ingest.client_field, from_code.ingest.client_field);
    assert_eq!(
        from_file.ingest.frequency_channel_capacity,
        from_code.ingest.frequency_channel_capacity
    );

    assert_eq!(from_file.scoring, from_code.scoring);

    assert_eq!(from_file.metrics.enabled, from_code.metrics.enabled);
    assert_eq!(from_file.metrics.listen_addr, from_code.metrics.listen_addr);
    assert_eq!(from_file.metrics.port, from_code.metrics.port);
    assert_eq!(from_file.metrics.endpoint, from_code.metrics.endpoint);
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_general_only() {
    let toml = r#"
[general]
log_level = "debug"
log_format = "pretty"
"#;
    let config = HostlogConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "pretty");
    // 나머지 섹션은 기본값
    assert_eq!(config.storage.pool_size, 8);
    assert_eq!(config.scoring.alpha, 10.0);
    assert!(!config.metrics.enabled);
}

#[test]
fn partial_config_scoring_only() {
    let toml = r#"
[scoring]
alpha = 4.0
lambda = 0.05
volume_cap = 500
"#;
    let config = HostlogConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.scoring.alpha, 4.0);
    assert_eq!(config.scoring.lambda, 0.05);
    assert_eq!(config.scoring.volume_cap, 500);
    assert_eq!(config.scoring.beta, 0.5);
    assert_eq!(config.scoring.gamma, 5.0);
}

#[test]
fn unknown_keys_are_ignored() {
    let toml = r#"
[general]
log_level = "warn"
unknown_key = "whatever"
"#;
    let config = HostlogConfig::parse(toml).expect("should parse");
    assert_eq!(config.general.log_level, "warn");
}

// =============================================================================
// 에러 케이스
// =============================================================================

#[test]
fn empty_file_yields_defaults() {
    let config = HostlogConfig::parse("").expect("empty should parse");
    config.validate().expect("defaults validate");
}

#[test]
fn wrong_type_is_parse_error() {
    let toml = r#"
[storage]
pool_size = "eight"
"#;
    let err = HostlogConfig::parse(toml).unwrap_err();
    assert!(matches!(
        err,
        HostlogError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn negative_min_score_fails_validation() {
    let toml = r#"
[scoring]
min_score = -1.0
"#;
    let config = HostlogConfig::parse(toml).expect("should parse");
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        HostlogError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "scoring.min_score"
    ));
}

// =============================================================================
// 파일 로딩 + 환경변수 우선순위
// =============================================================================

#[tokio::test]
#[serial]
async fn load_applies_env_over_file() {
    let dir = std::env::temp_dir().join(format!("hostlog-config-test-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("hostlog.toml");
    tokio::fs::write(
        &path,
        "[general]\nlog_level = \"debug\"\n[scoring]\ntop_hosts = 5\n",
    )
    .await
    .unwrap();

    // SAFETY: serial 테스트로 실행되어 환경변수 조작이 다른 테스트와 겹치지 않습니다.
    unsafe { std::env::set_var("HOSTLOG_GENERAL_LOG_LEVEL", "error") };
    let result = HostlogConfig::load(&path).await;
    unsafe { std::env::remove_var("HOSTLOG_GENERAL_LOG_LEVEL") };
    let _ = tokio::fs::remove_dir_all(&dir).await;

    let config = result.expect("should load");
    assert_eq!(config.general.log_level, "error");
    assert_eq!(config.scoring.top_hosts, 5);
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_env_override() {
    let dir = std::env::temp_dir().join(format!("hostlog-config-env-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("hostlog.toml");
    tokio::fs::write(&path, "").await.unwrap();

    // SAFETY: serial 테스트로 실행되어 환경변수 조작이 다른 테스트와 겹치지 않습니다.
    unsafe { std::env::set_var("HOSTLOG_GENERAL_LOG_FORMAT", "xml") };
    let result = HostlogConfig::load(&path).await;
    unsafe { std::env::remove_var("HOSTLOG_GENERAL_LOG_FORMAT") };
    let _ = tokio::fs::remove_dir_all(&dir).await;

    assert!(result.is_err());
}
