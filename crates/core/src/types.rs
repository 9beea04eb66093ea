//! 도메인 타입: 시스템 전역에서 사용되는 공통 타입
//!
//! 수집 파이프라인, 저장소, 점수 엔진이 공유하는 데이터 구조를 정의합니다.
//! 모든 레코드는 호스트 식별자(`host_identity`, 포트를 제외한 순수 주소)로 연결됩니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 페이지당 로그 엔트리 수 (고정)
pub const PAGE_SIZE: usize = 100;

/// 매핑이 없을 때 사용하는 기본 호스트명 필드
pub const DEFAULT_HOSTNAME_FIELD: &str = "hostname";
/// 매핑이 없을 때 사용하는 기본 본문 필드
pub const DEFAULT_CONTENT_FIELD: &str = "content";
/// 매핑이 없을 때 사용하는 기본 priority 필드
pub const DEFAULT_PRIORITY_FIELD: &str = "priority";
/// 매핑이 없을 때 사용하는 기본 타임스탬프 필드
pub const DEFAULT_TIMESTAMP_FIELD: &str = "timestamp";

/// 저장 전의 정규화된 로그 엔트리
///
/// 필드 추출과 매핑 해석을 마친 결과입니다. `id`와 `created_at`은
/// 저장소가 부여합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLogEntry {
    /// 호스트 식별자 (포트 제외 주소)
    pub host_identity: String,
    /// 메시지에 실린 호스트명 라벨
    pub hostname: String,
    /// 로그 본문
    pub content: String,
    /// syslog priority (facility * 8 + severity)
    pub priority: i64,
    /// 메시지 타임스탬프
    pub timestamp: DateTime<Utc>,
}

/// 저장된 로그 엔트리
///
/// 생성 후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 저장소가 부여한 ID
    pub id: i64,
    /// 호스트 식별자 (포트 제외 주소)
    pub host_identity: String,
    /// 메시지에 실린 호스트명 라벨
    pub hostname: String,
    /// 로그 본문
    pub content: String,
    /// syslog priority (facility * 8 + severity)
    pub priority: i64,
    /// 메시지 타임스탬프
    pub timestamp: DateTime<Utc>,
    /// 저장 시각
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    /// priority 하위 3비트에서 심각도 버킷을 구합니다.
    pub fn severity_bucket(&self) -> SeverityBucket {
        SeverityBucket::from_priority(self.priority)
    }

    /// 표시용 심각도 레벨을 구합니다.
    pub fn severity_level(&self) -> SeverityLevel {
        SeverityLevel::from_priority(self.priority)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} [{}]: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.host_identity,
            self.severity_level(),
            self.content,
        )
    }
}

/// 필터링된 페이지 조회 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPage {
    /// 해당 페이지의 엔트리 (created_at 내림차순)
    pub entries: Vec<LogEntry>,
    /// 0부터 시작하는 마지막 페이지 인덱스 (결과가 없으면 0)
    pub last_page: u64,
    /// 필터에 매칭된 전체 엔트리 수
    pub total: u64,
}

impl LogPage {
    /// 전체 매칭 수로부터 마지막 페이지 인덱스를 계산합니다.
    ///
    /// `ceil(total / PAGE_SIZE) - 1`이며, `total`이 0이면 0입니다.
    pub fn last_page_for(total: u64) -> u64 {
        let page_size = PAGE_SIZE as u64;
        total.div_ceil(page_size).saturating_sub(1)
    }
}

/// 호스트별 필드 매핑
///
/// 수신 필드 맵의 임의 필드명을 네 가지 정규 속성으로 연결합니다.
/// 호스트 식별자당 최대 하나만 존재합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// 호스트 식별자 (고유 키)
    pub host_identity: String,
    /// 호스트명 라벨을 담은 필드명
    pub hostname_field: String,
    /// 본문을 담은 필드명
    pub content_field: String,
    /// priority를 담은 필드명
    pub priority_field: String,
    /// 타임스탬프를 담은 필드명
    pub timestamp_field: String,
}

impl FieldMapping {
    /// 기본 필드명으로 구성된 매핑을 생성합니다.
    pub fn default_for(host_identity: impl Into<String>) -> Self {
        Self {
            host_identity: host_identity.into(),
            hostname_field: DEFAULT_HOSTNAME_FIELD.to_owned(),
            content_field: DEFAULT_CONTENT_FIELD.to_owned(),
            priority_field: DEFAULT_PRIORITY_FIELD.to_owned(),
            timestamp_field: DEFAULT_TIMESTAMP_FIELD.to_owned(),
        }
    }
}

impl fmt::Display for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: hostname={} content={} priority={} timestamp={}",
            self.host_identity,
            self.hostname_field,
            self.content_field,
            self.priority_field,
            self.timestamp_field,
        )
    }
}

/// 호스트별 필드 관측 빈도
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFrequency {
    /// 호스트 식별자
    pub host_identity: String,
    /// 원본 필드명
    pub field_name: String,
    /// 관측 횟수
    pub count: u64,
}

/// 호스트 가시성 점수
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostScore {
    /// 호스트 식별자
    pub host_identity: String,
    /// 점수 (최소 0.1)
    pub score: f64,
}

impl fmt::Display for HostScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2}", self.host_identity, self.score)
    }
}

/// 점수 계산용 심각도 버킷
///
/// syslog priority의 하위 3비트(severity)로 결정됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityBucket {
    /// severity 0–2 (emerg, alert, crit)
    Error,
    /// severity 3–4 (err, warning)
    Warning,
    /// severity 5–7 (notice, info, debug)
    Info,
}

impl SeverityBucket {
    /// priority에서 버킷을 구합니다.
    pub fn from_priority(priority: i64) -> Self {
        match priority & 7 {
            0..=2 => Self::Error,
            3 | 4 => Self::Warning,
            _ => Self::Info,
        }
    }
}

/// 표시용 심각도 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    /// severity 0–2
    Error,
    /// severity 3–4
    Warning,
    /// severity 5
    Info,
    /// severity 6–7
    Debug,
}

impl SeverityLevel {
    /// priority에서 표시 레벨을 구합니다.
    pub fn from_priority(priority: i64) -> Self {
        match priority & 7 {
            0..=2 => Self::Error,
            3 | 4 => Self::Warning,
            5 => Self::Info,
            _ => Self::Debug,
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
            Self::Info => write!(f, "Info"),
            Self::Debug => write!(f, "Debug"),
        }
    }
}
