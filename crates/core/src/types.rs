//! 도메인 타입 -- 파싱된 CEF 레코드와 필드 값
//!
//! 파서가 생성하고 호출자가 소유하는 데이터 구조를 정의합니다.
//! [`CefRecord`]는 생성 이후 변경할 수 없으며, 접근자 메서드로만 읽습니다.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;

/// 최종 출력 키 -> 타입이 지정된 값 (원본 등장 순서 유지)
pub type FieldMap = IndexMap<String, FieldValue>;

/// 확장 필드의 타입 변환 결과
///
/// JSON 직렬화 시 태그 없이 네이티브 숫자/문자열로 출력됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 32비트 정수 (포트, PID 등)
    Int(i32),
    /// 64비트 정수 (`cn1`, `eventId` 등)
    Long(i64),
    /// 32비트 부동소수점 (`cfp1`..`cfp4`)
    Float(f32),
    /// 64비트 부동소수점 (위도/경도)
    Double(f64),
    /// 문자열 (기본값)
    String(String),
}

impl FieldValue {
    /// 문자열 값이면 참조를 반환합니다.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 값의 타입 이름 (로그/디버깅용)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int32",
            Self::Long(_) => "int64",
            Self::Float(_) => "float32",
            Self::Double(_) => "float64",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// 사람이 읽을 수 있는 심각도 구간
///
/// 정규화된 숫자 심각도(-1, 0..=10)를 CEF 표준 구간으로 묶습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    /// -1
    Unknown,
    /// 0..=3
    Low,
    /// 4..=6
    Medium,
    /// 7..=8
    High,
    /// 9..=10
    VeryHigh,
}

impl SeverityLevel {
    /// 숫자 심각도를 구간으로 변환합니다.
    ///
    /// 범위를 벗어난 값은 파서가 미리 거부하므로 `Unknown`으로 취급합니다.
    pub fn from_severity(severity: i32) -> Self {
        match severity {
            0..=3 => Self::Low,
            4..=6 => Self::Medium,
            7..=8 => Self::High,
            9..=10 => Self::VeryHigh,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY HIGH",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CEF 헤더 값
///
/// 파이프로 구분된 헤더 섹션 0..=6에서 얻은 값을 담습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CefHeader {
    /// syslog 타임스탬프 (없으면 파싱 시각), 설정된 타임존 기준
    pub timestamp: DateTime<FixedOffset>,
    /// `CEF:<version>`의 버전
    pub version: i32,
    pub device_vendor: String,
    pub device_product: String,
    pub device_version: String,
    pub device_event_class_id: String,
    pub name: String,
    /// 정규화된 심각도 (-1..=10)
    pub severity: i32,
}

/// 파싱된 CEF 레코드
///
/// 헤더, 확장 필드, 메시지가 모두 준비된 뒤 한 번에 생성됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CefRecord {
    #[serde(flatten)]
    header: CefHeader,
    message: Option<String>,
    fields: FieldMap,
}

impl CefRecord {
    /// 헤더와 확장 필드로 레코드를 조립합니다.
    pub fn new(header: CefHeader, message: Option<String>, fields: FieldMap) -> Self {
        Self {
            header,
            message,
            fields,
        }
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.header.timestamp
    }

    pub fn version(&self) -> i32 {
        self.header.version
    }

    pub fn device_vendor(&self) -> &str {
        &self.header.device_vendor
    }

    pub fn device_product(&self) -> &str {
        &self.header.device_product
    }

    pub fn device_version(&self) -> &str {
        &self.header.device_version
    }

    pub fn device_event_class_id(&self) -> &str {
        &self.header.device_event_class_id
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn severity(&self) -> i32 {
        self.header.severity
    }

    /// 심각도 구간 (`"VERY HIGH"` 등)
    pub fn human_readable_severity(&self) -> SeverityLevel {
        SeverityLevel::from_severity(self.header.severity)
    }

    /// `msg` 확장 필드의 값 (없으면 `None`)
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// 단일 필드 조회
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn header(&self) -> &CefHeader {
        &self.header
    }
}

impl fmt::Display for CefRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}|{}|{} {}: {}",
            self.human_readable_severity(),
            self.header.device_vendor,
            self.header.device_product,
            self.header.device_version,
            self.header.device_event_class_id,
            self.header.name,
        )
    }
}
