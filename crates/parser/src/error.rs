//! CEF 파서 에러 타입
//!
//! [`CefParseError`]는 한 줄 전체를 거부하는 치명적 에러입니다.
//! 필드 하나의 변환 실패는 에러가 아니라 경고([`FieldWarning`](cefpost_core::FieldWarning))로 처리됩니다.
//! `From<CefParseError> for CefpostError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use std::fmt;

use cefpost_core::error::{CefpostError, ConfigError, ParseError};

/// 이스케이프 오류가 발생한 토크나이저 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStage {
    /// 파이프 헤더 (`\|`, `\\` 허용)
    Header,
    /// 확장 필드 (`\=`, `\\` 허용)
    Extension,
}

impl fmt::Display for EscapeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Extension => f.write_str("extension"),
        }
    }
}

/// 실패 분류 -- 메트릭 레이블과 상위 에러 변환에 사용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    MalformedHeader,
    MalformedExtension,
    EmptyPayload,
    InvalidSeverity,
    TooLarge,
    Config,
}

impl FailureCategory {
    /// 메트릭 레이블 값
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::MalformedHeader => "malformed_header",
            Self::MalformedExtension => "malformed_extension",
            Self::EmptyPayload => "empty_payload",
            Self::InvalidSeverity => "invalid_severity",
            Self::TooLarge => "too_large",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// CEF 파싱 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CefParseError {
    /// 파이프 섹션 부족 또는 `CEF:<version>` 패턴 불일치
    #[error("not recognized as CEF: {reason}")]
    MalformedHeader {
        /// 실패 사유
        reason: String,
    },

    /// 허용되지 않은 문자를 이스케이프함
    #[error("invalid escape sequence '\\{found}' in {stage} at offset {offset}")]
    InvalidEscape {
        /// 발생 단계
        stage: EscapeStage,
        /// 백슬래시의 바이트 오프셋 (해당 단계 입력 기준)
        offset: usize,
        /// 백슬래시 다음 문자
        found: char,
    },

    /// 같은 키가 두 번 등장함
    #[error("malformed CEF message: duplicate key '{key}'")]
    DuplicateKey {
        /// 중복된 키
        key: String,
    },

    /// 확장 필드 섹션이 비어 있음
    #[error("no CEF payload found")]
    EmptyPayload,

    /// 심각도 토큰을 해석할 수 없음
    #[error("'{token}' {reason}")]
    InvalidSeverity {
        /// 원본 심각도 토큰
        token: String,
        /// 실패 사유
        reason: &'static str,
    },

    /// 입력이 허용 크기를 초과함
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge {
        /// 입력 크기 (바이트)
        size: usize,
        /// 허용 최대 크기
        max: usize,
    },

    /// 파서 설정 오류 (타임존 등)
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl CefParseError {
    pub(crate) fn malformed_header(reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            reason: reason.into(),
        }
    }

    /// 에러를 실패 분류로 묶습니다.
    ///
    /// 헤더 단계의 이스케이프 오류는 헤더 오류로, 확장 단계의 이스케이프 오류와
    /// 중복 키는 확장 필드 오류로 분류됩니다.
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::MalformedHeader { .. }
            | Self::InvalidEscape {
                stage: EscapeStage::Header,
                ..
            } => FailureCategory::MalformedHeader,
            Self::InvalidEscape {
                stage: EscapeStage::Extension,
                ..
            }
            | Self::DuplicateKey { .. } => FailureCategory::MalformedExtension,
            Self::EmptyPayload => FailureCategory::EmptyPayload,
            Self::InvalidSeverity { .. } => FailureCategory::InvalidSeverity,
            Self::TooLarge { .. } => FailureCategory::TooLarge,
            Self::Config { .. } => FailureCategory::Config,
        }
    }
}

impl From<CefParseError> for CefpostError {
    fn from(err: CefParseError) -> Self {
        let category = err.category();
        match err {
            CefParseError::Config { field, reason } => {
                CefpostError::Config(ConfigError::InvalidValue { field, reason })
            }
            CefParseError::TooLarge { size, max } => {
                CefpostError::Parse(ParseError::TooLarge { size, max })
            }
            CefParseError::EmptyPayload => CefpostError::Parse(ParseError::EmptyPayload),
            other => {
                let detail = other.to_string();
                let parse_err = match category {
                    FailureCategory::MalformedExtension => ParseError::MalformedExtension(detail),
                    FailureCategory::InvalidSeverity => ParseError::InvalidSeverity(detail),
                    _ => ParseError::MalformedHeader(detail),
                };
                CefpostError::Parse(parse_err)
            }
        }
    }
}
