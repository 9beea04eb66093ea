//! 점수 계산 벤치마크
//!
//! 순수 성분 계산과 SQLite 기반 전체 호스트 점수 계산을 측정합니다.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hostlog_core::config::StorageConfig;
use hostlog_core::store::LogStore;
use hostlog_core::types::NewLogEntry;
use hostlog_storage::SqliteStore;
use hostlog_visibility::components::{self, SeverityCounts};
use hostlog_visibility::{ScoreWeights, VisibilityScorer, rank};

fn bench_components(c: &mut Criterion) {
    let counts = SeverityCounts {
        error: 12,
        warning: 40,
        info: 300,
    };

    let mut group = c.benchmark_group("components");
    group.throughput(Throughput::Elements(1));

    group.bench_function("time_decay", |b| {
        b.iter(|| components::time_decay(black_box(10.0), black_box(0.2), black_box(3.5)))
    });
    group.bench_function("severity", |b| {
        b.iter(|| components::severity(black_box(5.0), black_box(&counts)))
    });

    group.finish();
}

fn seeded_store(dir: &tempfile::TempDir, hosts: usize, per_host: usize) -> Arc<SqliteStore> {
    let config = StorageConfig {
        db_path: dir.path().join("bench.db").display().to_string(),
        pool_size: 4,
        busy_timeout_ms: 5_000,
    };
    let store = Arc::new(SqliteStore::open(&config).unwrap());
    let now = Utc::now();
    for h in 0..hosts {
        for i in 0..per_host {
            store
                .append(NewLogEntry {
                    host_identity: format!("10.0.{}.{}", h / 256, h % 256),
                    hostname: format!("node-{h}"),
                    content: format!("event {i}"),
                    priority: (i % 8) as i64,
                    timestamp: now - TimeDelta::minutes(i as i64),
                })
                .unwrap();
        }
    }
    store
}

fn bench_score_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_all");
    group.sample_size(20);

    for hosts in [10, 50] {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn LogStore> = seeded_store(&dir, hosts, 50);
        let scorer = VisibilityScorer::new(store, ScoreWeights::default());

        group.throughput(Throughput::Elements(hosts as u64));
        group.bench_with_input(BenchmarkId::from_parameter(hosts), &hosts, |b, _| {
            b.iter(|| scorer.score_all_at(black_box(Utc::now())).unwrap())
        });
    }

    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let scores: HashMap<String, f64> = (0..1_000)
        .map(|i| (format!("host-{i}"), (i % 97) as f64 * 0.7))
        .collect();

    c.bench_function("rank_1000_hosts", |b| b.iter(|| rank(black_box(&scores))));
}

criterion_group!(benches, bench_components, bench_score_all, bench_rank);
criterion_main!(benches);
