//! 통합 테스트 -- 수집 파이프라인 전체 흐름 검증
//!
//! 실제 SQLite 저장소 위에서 필드 맵 수집부터 조회까지 확인합니다.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use hostlog_core::config::StorageConfig;
use hostlog_core::types::FieldMapping;
use hostlog_pipeline::{
    FieldBag, FieldValue, IngestPipeline, IngestPipelineBuilder, PipelineConfig, ingest_lines,
};
use hostlog_storage::SqliteStore;
use tokio::io::BufReader;

fn open_pipeline() -> (tempfile::TempDir, IngestPipeline) {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = StorageConfig {
        db_path: dir.path().join("pipeline.db").display().to_string(),
        pool_size: 4,
        busy_timeout_ms: 5_000,
    };
    let store = Arc::new(SqliteStore::open(&storage).expect("open store"));
    let pipeline = IngestPipelineBuilder::new()
        .config(PipelineConfig::default())
        .stores(store)
        .build()
        .expect("build pipeline");
    (dir, pipeline)
}

fn bag(pairs: &[(&str, FieldValue)]) -> FieldBag {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

/// 매핑이 없으면 기본 필드명, 매핑 등록 후에는 매핑 필드명을 사용
#[tokio::test]
async fn mapping_fallback_then_custom_names() {
    let (_dir, pipeline) = open_pipeline();

    let message = bag(&[
        ("client", "10.0.0.7:40000".into()),
        ("content", "default content".into()),
        ("msg", "custom content".into()),
        ("priority", 3_i64.into()),
        ("pri", 11_i64.into()),
    ]);

    let first = pipeline.ingest(message.clone()).await.unwrap();
    assert_eq!(first.content, "default content");
    assert_eq!(first.priority, 3);

    pipeline
        .upsert_mapping(FieldMapping {
            host_identity: "10.0.0.7".to_owned(),
            hostname_field: "host".to_owned(),
            content_field: "msg".to_owned(),
            priority_field: "pri".to_owned(),
            timestamp_field: "ts".to_owned(),
        })
        .await
        .unwrap();

    let second = pipeline.ingest(message).await.unwrap();
    assert_eq!(second.content, "custom content");
    assert_eq!(second.priority, 11);

    // 매핑 삭제 후 다시 기본값
    assert!(pipeline.delete_mapping("10.0.0.7").await.unwrap());
    assert!(pipeline.resolve_mapping("10.0.0.7").await.unwrap().is_none());

    pipeline.shutdown().await;
}

/// 포트만 다른 발신 주소는 같은 호스트로 묶임
#[tokio::test]
async fn ports_collapse_to_one_host_identity() {
    let (_dir, pipeline) = open_pipeline();

    for origin in ["10.0.0.5:51820", "10.0.0.5:9999"] {
        pipeline
            .ingest(bag(&[("client", origin.into()), ("content", "x".into())]))
            .await
            .unwrap();
    }

    let hosts = pipeline.hosts().await.unwrap();
    assert_eq!(hosts, vec!["10.0.0.5"]);

    let page = pipeline
        .query_filtered(vec!["10.0.0.5".to_owned()], 0)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    pipeline.shutdown().await;
}

/// 필드가 없거나 타입이 달라도 엔트리는 기본값으로 저장됨
#[tokio::test]
async fn malformed_fields_are_defaulted() {
    let (_dir, pipeline) = open_pipeline();

    let entry = pipeline
        .ingest(bag(&[
            ("client", "192.0.2.10:514".into()),
            ("priority", "high".into()),
            ("timestamp", 12345_i64.into()),
        ]))
        .await
        .unwrap();

    assert_eq!(entry.host_identity, "192.0.2.10");
    assert_eq!(entry.hostname, "");
    assert_eq!(entry.content, "");
    assert_eq!(entry.priority, 0);
    assert_eq!(entry.timestamp, Utc.timestamp_opt(0, 0).unwrap());
    pipeline.shutdown().await;
}

/// client 필드가 없으면 빈 호스트 식별자로 저장됨
#[tokio::test]
async fn missing_client_yields_empty_identity() {
    let (_dir, pipeline) = open_pipeline();
    let entry = pipeline
        .ingest(bag(&[("content", "orphan".into())]))
        .await
        .unwrap();
    assert_eq!(entry.host_identity, "");
    pipeline.shutdown().await;
}

/// 필드 빈도는 비동기로 누적되고 종료 시 모두 기록됨
#[tokio::test]
async fn field_frequencies_accumulate() {
    let (_dir, pipeline) = open_pipeline();

    for _ in 0..3 {
        pipeline
            .ingest(bag(&[
                ("client", "10.0.0.8:514".into()),
                ("content", "a".into()),
            ]))
            .await
            .unwrap();
    }
    pipeline
        .ingest(bag(&[
            ("client", "10.0.0.8:514".into()),
            ("appname", "cron".into()),
        ]))
        .await
        .unwrap();
    pipeline.shutdown().await;

    let freqs = pipeline.list_frequencies("10.0.0.8").await.unwrap();
    let counts: Vec<_> = freqs
        .iter()
        .map(|f| (f.field_name.as_str(), f.count))
        .collect();
    assert_eq!(counts, vec![("client", 4), ("content", 3), ("appname", 1)]);
}

/// JSON lines 입력: 잘못된 줄은 건너뛰고 나머지는 저장
#[tokio::test]
async fn ingest_lines_skips_malformed_input() {
    let (_dir, pipeline) = open_pipeline();

    let input = concat!(
        r#"{"client":"10.0.0.9:514","content":"first","priority":14,"timestamp":"2024-05-01T10:00:00Z"}"#,
        "\n",
        "not json at all\n",
        "\n",
        r#"{"client":"10.0.0.9:514","nested":{"a":1}}"#,
        "\n",
        r#"{"client":"10.0.0.9:514","content":"second"}"#,
        "\n",
    );

    let summary = ingest_lines(&pipeline, BufReader::new(input.as_bytes()), None)
        .await
        .unwrap();
    assert_eq!(summary.lines, 4);
    assert_eq!(summary.stored, 2);
    assert_eq!(summary.decode_errors, 2);
    assert_eq!(summary.store_errors, 0);

    let recent = pipeline.query_recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].content, "second");
    assert_eq!(
        recent[1].timestamp,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    );

    let stats = pipeline.stats();
    assert_eq!(stats.received, 2);
    assert_eq!(stats.stored, 2);
    pipeline.shutdown().await;
}

/// 종료 신호를 받으면 읽기를 멈춤
#[tokio::test]
async fn ingest_lines_stops_on_shutdown() {
    let (_dir, pipeline) = open_pipeline();
    let (tx, rx) = tokio::sync::broadcast::channel(1);

    // 끝나지 않는 입력
    let (_writer, reader) = tokio::io::duplex(64);
    let handle = {
        let reader = BufReader::new(reader);
        async { ingest_lines(&pipeline, reader, Some(rx)).await }
    };

    tx.send(()).unwrap();
    let summary = handle.await.unwrap();
    assert_eq!(summary.lines, 0);
    pipeline.shutdown().await;
}

/// 여러 태스크의 동시 수집에서 엔트리가 유실되지 않음
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingest_loses_nothing() {
    let (_dir, pipeline) = open_pipeline();
    let pipeline = Arc::new(pipeline);

    let mut handles = Vec::new();
    for t in 0..8 {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move {
            for i in 0..20 {
                pipeline
                    .ingest(bag(&[
                        ("client", format!("10.1.0.{t}:514").into()),
                        ("content", format!("line {i}").into()),
                    ]))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let page = pipeline.query_filtered(Vec::new(), 0).await.unwrap();
    assert_eq!(page.total, 160);
    assert_eq!(page.last_page, 1);
    assert_eq!(pipeline.hosts().await.unwrap().len(), 8);
    pipeline.shutdown().await;
}
