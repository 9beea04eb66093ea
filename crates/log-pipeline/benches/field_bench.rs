//! 필드 맵 디코딩/정규화 벤치마크
//!
//! JSON 라인 디코딩과 기본/커스텀 매핑 정규화의 처리량을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use hostlog_pipeline::field::field_names;
use hostlog_pipeline::{FieldNames, decode_bag, resolve_host_identity};

/// 기본 필드명만 있는 짧은 메시지
const LINE_SHORT: &str = r#"{"client":"10.0.0.5:51820","hostname":"web-01","content":"request processed","priority":14,"timestamp":"2024-01-15T12:00:00Z"}"#;

/// 커스텀 필드와 부가 필드가 많은 긴 메시지
const LINE_LONG: &str = r#"{"client":"[2001:db8::1]:514","source_host":"production-web-server-01","msg":"Authentication failure for user admin@example.com from IP address 203.0.113.45 using password authentication method after 3 previous attempts","pri":34,"ts":"2024-01-15T12:00:00.123Z","facility":"auth","appname":"sshd","procid":"12345","msgid":"ID123","region":"us-east-1","environment":"production","version":"2.5.1"}"#;

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_bag");

    group.throughput(Throughput::Elements(1));
    group.bench_function("short", |b| {
        b.iter(|| decode_bag(black_box(LINE_SHORT), 1).unwrap())
    });
    group.bench_function("long", |b| {
        b.iter(|| decode_bag(black_box(LINE_LONG), 1).unwrap())
    });

    group.throughput(Throughput::Elements(1000));
    group.bench_function("throughput_1000", |b| {
        b.iter(|| {
            for line_no in 1..=1000 {
                decode_bag(black_box(LINE_SHORT), line_no).unwrap();
            }
        })
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let short = decode_bag(LINE_SHORT, 1).unwrap();
    let long = decode_bag(LINE_LONG, 1).unwrap();
    let defaults = FieldNames::default();
    let custom = FieldNames {
        hostname: "source_host".to_owned(),
        content: "msg".to_owned(),
        priority: "pri".to_owned(),
        timestamp: "ts".to_owned(),
    };

    let mut group = c.benchmark_group("normalize");
    group.throughput(Throughput::Elements(1));

    group.bench_function("default_mapping", |b| {
        b.iter(|| defaults.normalize(black_box("10.0.0.5"), black_box(&short)))
    });
    group.bench_function("custom_mapping", |b| {
        b.iter(|| custom.normalize(black_box("2001:db8::1"), black_box(&long)))
    });
    group.bench_function("host_identity", |b| {
        b.iter(|| resolve_host_identity(black_box("[2001:db8::1]:514")))
    });
    group.bench_function("field_names", |b| b.iter(|| field_names(black_box(&long))));

    group.finish();
}

criterion_group!(benches, bench_decode, bench_normalize);
criterion_main!(benches);
