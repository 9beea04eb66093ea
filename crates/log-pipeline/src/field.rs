//! 필드 맵과 타입별 값 추출
//!
//! 상류 syslog 리스너는 메시지 하나를 필드명 → 값 맵([`FieldBag`])으로 넘겨줍니다.
//! 값은 문자열, 정수, 타임스탬프 중 하나이며([`FieldValue`]),
//! [`extract`]는 원하는 타입으로 꺼내되 없거나 타입이 다르면 기본값을 돌려줍니다.
//!
//! # 기본값
//! - `String`: 빈 문자열
//! - `i64`: 0
//! - `DateTime<Utc>`: Unix epoch (1970-01-01T00:00:00Z)
//!
//! # JSON lines의 타임스탬프
//! JSON에는 타임스탬프 타입이 없으므로 디코딩된 문자열은 모두 `Str`으로 남습니다.
//! `extract::<DateTime<Utc>>`는 `Timestamp` 값과 함께 RFC 3339 형식의 `Str` 값도
//! 타임스탬프로 읽습니다. 본문이 타임스탬프처럼 보여도 문자열로는 그대로 꺼낼 수 있습니다.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// 메시지 하나의 필드 맵
pub type FieldBag = HashMap<String, FieldValue>;

/// 필드 값
///
/// JSON에서 디코딩할 때 정수는 `Int`, 문자열은 `Str`이 됩니다.
/// 실수, 불리언, null, 배열, 객체는 거부됩니다. `Timestamp`는 리스너가
/// 타입을 알고 넘기는 경우에 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 문자열
    Str(String),
    /// 64비트 정수
    Int(i64),
    /// UTC 타임스탬프
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// 값의 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

struct FieldValueVisitor;

impl Visitor<'_> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(FieldValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(FieldValue::Int)
            .map_err(|_| E::custom(format!("integer {v} does not fit in i64")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(FieldValue::Str(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(FieldValue::Str(v))
    }
}

/// [`extract`]로 꺼낼 수 있는 타입
///
/// 해당 변형이 아니면 `None`을 돌려주고, `extract`가 `Default`로 대체합니다.
pub trait FieldType: Default {
    /// 값이 이 타입의 변형이면 꺼냅니다.
    fn from_field(value: &FieldValue) -> Option<Self>;
}

impl FieldType for String {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FieldType for i64 {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FieldType for DateTime<Utc> {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Timestamp(ts) => Some(*ts),
            FieldValue::Str(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            FieldValue::Int(_) => None,
        }
    }
}

/// 필드 맵에서 `key`의 값을 `T`로 꺼냅니다.
///
/// 키가 없거나 다른 타입이면 `T::default()`를 반환합니다. 실패하지 않습니다.
pub fn extract<T: FieldType>(bag: &FieldBag, key: &str) -> T {
    bag.get(key).and_then(T::from_field).unwrap_or_default()
}

/// JSON 객체 한 줄을 필드 맵으로 디코딩합니다.
///
/// `line_no`는 에러 메시지용 1-based 라인 번호입니다.
pub fn decode_bag(line: &str, line_no: usize) -> Result<FieldBag, IngestError> {
    serde_json::from_str(line).map_err(|e| IngestError::Decode {
        line: line_no,
        reason: e.to_string(),
    })
}

/// 필드명 목록을 정렬해 반환합니다.
pub fn field_names(bag: &FieldBag) -> Vec<String> {
    let mut names: Vec<String> = bag.keys().cloned().collect();
    names.sort_unstable();
    names
}
