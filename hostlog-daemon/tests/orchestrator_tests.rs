//! Orchestrator integration tests.
//!
//! Tests the full flow: config -> store open -> input read -> report -> shutdown.

use std::time::Duration;

use hostlog_core::config::{HostlogConfig, StorageConfig};
use hostlog_core::store::{FrequencyStore, LogStore};
use hostlog_daemon::orchestrator::{InputSource, Orchestrator};
use hostlog_storage::SqliteStore;
use tokio::io::{AsyncWriteExt, BufReader};

/// Config pointing at a fresh database inside `dir`.
fn test_config(dir: &tempfile::TempDir) -> HostlogConfig {
    let mut config = HostlogConfig::default();
    config.storage.db_path = dir.path().join("daemon.db").display().to_string();
    config.storage.pool_size = 4;
    config.metrics.enabled = false;
    config
}

fn reopen(config: &HostlogConfig) -> SqliteStore {
    let storage: &StorageConfig = &config.storage;
    SqliteStore::open(storage).expect("reopen store")
}

const INPUT: &str = concat!(
    r#"{"client":"10.0.0.1:514","content":"disk full","priority":3}"#,
    "\n",
    r#"{"client":"10.0.0.1:40000","content":"retrying","priority":4}"#,
    "\n",
    "{broken\n",
    r#"{"client":"10.0.0.2:514","content":"cron ran","priority":14}"#,
    "\n",
);

#[tokio::test]
async fn file_input_is_ingested_until_eof() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.jsonl");
    std::fs::write(&input_path, INPUT).unwrap();

    let config = test_config(&dir);
    let mut orchestrator = Orchestrator::build_from_config(config.clone())
        .await
        .expect("build orchestrator");

    let never = std::future::pending::<anyhow::Result<&'static str>>();
    let reader = BufReader::new(tokio::fs::File::open(&input_path).await.unwrap());
    let summary = orchestrator.run_until(reader, never).await.unwrap();

    assert_eq!(summary.lines, 4);
    assert_eq!(summary.stored, 3);
    assert_eq!(summary.decode_errors, 1);

    let store = reopen(&config);
    let mut hosts = store.distinct_host_identities().unwrap();
    hosts.sort();
    assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.2"]);

    // frequency updates are drained before run_until returns
    let freqs = store.list_frequencies("10.0.0.1").unwrap();
    assert!(freqs.iter().any(|f| f.field_name == "content" && f.count == 2));
}

#[tokio::test]
async fn run_via_input_source_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.jsonl");
    std::fs::write(&input_path, INPUT).unwrap();

    let config = test_config(&dir);
    let mut orchestrator = Orchestrator::build_from_config(config).await.unwrap();
    let summary = orchestrator
        .run(InputSource::File(input_path))
        .await
        .unwrap();
    assert_eq!(summary.stored, 3);
}

#[tokio::test]
async fn shutdown_signal_stops_open_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::build_from_config(test_config(&dir))
        .await
        .unwrap();

    let (mut writer, reader) = tokio::io::duplex(4096);
    writer
        .write_all(b"{\"client\":\"10.0.0.3:514\",\"content\":\"hello\"}\n")
        .await
        .unwrap();

    let signal = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok("TEST")
    };
    let summary = orchestrator
        .run_until(BufReader::new(reader), signal)
        .await
        .unwrap();

    // the writer is still open; only the signal ended the loop
    assert_eq!(summary.stored, 1);
    drop(writer);
}

#[tokio::test]
async fn top_hosts_report_ranks_error_heavy_host_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.scoring.top_hosts = 1;
    let mut orchestrator = Orchestrator::build_from_config(config).await.unwrap();

    let now = chrono::Utc::now().to_rfc3339();
    let input = format!(
        "{{\"client\":\"10.0.0.1:514\",\"priority\":2,\"timestamp\":\"{now}\"}}\n\
         {{\"client\":\"10.0.0.2:514\",\"priority\":6,\"timestamp\":\"{now}\"}}\n"
    );
    let never = std::future::pending::<anyhow::Result<&'static str>>();
    orchestrator
        .run_until(BufReader::new(std::io::Cursor::new(input.into_bytes())), never)
        .await
        .unwrap();

    let top = orchestrator.report_top_hosts().await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].host_identity, "10.0.0.1");
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.storage.pool_size = 0;
    let err = Orchestrator::build_from_config(config).await.err().unwrap();
    assert!(err.to_string().contains("storage.pool_size"));
}

#[tokio::test]
async fn build_from_missing_file_fails() {
    let err = Orchestrator::build(std::path::Path::new("/nonexistent/hostlog.toml"))
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("failed to load config"));
}
