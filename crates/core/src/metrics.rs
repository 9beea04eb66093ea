//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `hostlog_`
//! - 모듈명: `ingest_`, `frequency_`, `storage_`, `scoring_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(hostlog_core::metrics::INGEST_ENTRIES_STORED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 심각도 버킷 레이블 키 (error, warning, info)
pub const LABEL_SEVERITY: &str = "severity";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Ingest 메트릭 ──────────────────────────────────────────────────

/// Ingest: 수신된 필드 맵 수 (counter)
pub const INGEST_MESSAGES_RECEIVED_TOTAL: &str = "hostlog_ingest_messages_received_total";

/// Ingest: 저장 완료된 엔트리 수 (counter, label: severity)
pub const INGEST_ENTRIES_STORED_TOTAL: &str = "hostlog_ingest_entries_stored_total";

/// Ingest: 저장 실패 수 (counter)
pub const INGEST_STORE_ERRORS_TOTAL: &str = "hostlog_ingest_store_errors_total";

/// Ingest: 매핑 조회 실패로 기본 필드명을 사용한 횟수 (counter)
pub const INGEST_MAPPING_FALLBACKS_TOTAL: &str = "hostlog_ingest_mapping_fallbacks_total";

/// Ingest: 필드 맵 하나의 처리 지연 시간 (histogram, 초)
pub const INGEST_DURATION_SECONDS: &str = "hostlog_ingest_duration_seconds";

// ─── Frequency 메트릭 ───────────────────────────────────────────────

/// Frequency: 기록된 필드 관측 수 (counter)
pub const FREQUENCY_FIELDS_RECORDED_TOTAL: &str = "hostlog_frequency_fields_recorded_total";

/// Frequency: 채널 포화로 버려진 업데이트 수 (counter)
pub const FREQUENCY_UPDATES_DROPPED_TOTAL: &str = "hostlog_frequency_updates_dropped_total";

/// Frequency: 저장 실패 수 (counter)
pub const FREQUENCY_STORE_ERRORS_TOTAL: &str = "hostlog_frequency_store_errors_total";

// ─── Scoring 메트릭 ─────────────────────────────────────────────────

/// Scoring: 마지막 점수 계산에 포함된 호스트 수 (gauge)
pub const SCORING_HOSTS_SCORED: &str = "hostlog_scoring_hosts_scored";

/// Scoring: 점수 계산에서 제외된 호스트 수 (counter)
pub const SCORING_HOST_ERRORS_TOTAL: &str = "hostlog_scoring_host_errors_total";

/// Scoring: 전체 호스트 점수 계산 소요 시간 (histogram, 초)
pub const SCORING_DURATION_SECONDS: &str = "hostlog_scoring_duration_seconds";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "hostlog_daemon_uptime_seconds";

/// Daemon: 입력 라인 디코딩 실패 수 (counter)
pub const DAEMON_DECODE_ERRORS_TOTAL: &str = "hostlog_daemon_decode_errors_total";

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "hostlog_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 수집 지연 시간 히스토그램 버킷 (초)
///
/// 100us ~ 1s 범위 (SQLite 쓰기 포함)
pub const INGEST_DURATION_BUCKETS: [f64; 8] = [0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 1.0];

/// 점수 계산 소요 시간 히스토그램 버킷 (초)
pub const SCORING_DURATION_BUCKETS: [f64; 8] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `hostlog-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Ingest
    describe_counter!(
        INGEST_MESSAGES_RECEIVED_TOTAL,
        "Total number of field maps received for ingestion"
    );
    describe_counter!(
        INGEST_ENTRIES_STORED_TOTAL,
        "Total number of normalized log entries persisted"
    );
    describe_counter!(
        INGEST_STORE_ERRORS_TOTAL,
        "Total number of log entries that failed to persist"
    );
    describe_counter!(
        INGEST_MAPPING_FALLBACKS_TOTAL,
        "Mapping lookups that failed and fell back to default field names"
    );
    describe_histogram!(
        INGEST_DURATION_SECONDS,
        "Time to normalize and persist a single field map in seconds"
    );

    // Frequency
    describe_counter!(
        FREQUENCY_FIELDS_RECORDED_TOTAL,
        "Total number of field observations recorded"
    );
    describe_counter!(
        FREQUENCY_UPDATES_DROPPED_TOTAL,
        "Field frequency updates dropped because the channel was full"
    );
    describe_counter!(
        FREQUENCY_STORE_ERRORS_TOTAL,
        "Field frequency updates that failed to persist"
    );

    // Scoring
    describe_gauge!(
        SCORING_HOSTS_SCORED,
        "Number of hosts included in the last scoring pass"
    );
    describe_counter!(
        SCORING_HOST_ERRORS_TOTAL,
        "Hosts skipped during scoring because a component failed"
    );
    describe_histogram!(
        SCORING_DURATION_SECONDS,
        "Time to score all hosts in seconds"
    );

    // Daemon
    describe_gauge!(DAEMON_UPTIME_SECONDS, "hostlog daemon uptime in seconds");
    describe_counter!(
        DAEMON_DECODE_ERRORS_TOTAL,
        "Input lines that could not be decoded as a field map"
    );
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}
