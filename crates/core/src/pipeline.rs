//! 파이프라인 trait -- 파서 확장 포인트 정의

use std::fmt;

use serde::Serialize;

/// 필드 하나가 드롭된 사유
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldWarningReason {
    /// 숫자 변환 실패 (형식 오류 또는 오버플로우)
    InvalidNumber {
        /// 목표 타입 이름 (int32, int64, float32, float64)
        target: &'static str,
        /// 원본 값
        value: String,
        /// 표준 라이브러리 파싱 에러 메시지
        detail: String,
    },
    /// `<key>Label` 형제 필드가 없음
    MissingLabel {
        /// 찾으려 한 라벨 키
        label_key: String,
    },
}

impl FieldWarningReason {
    /// 메트릭 레이블 값
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::InvalidNumber { .. } => "invalid_number",
            Self::MissingLabel { .. } => "missing_label",
        }
    }
}

impl fmt::Display for FieldWarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber {
                target,
                value,
                detail,
            } => write!(f, "cannot convert '{value}' to {target}: {detail}"),
            Self::MissingLabel { label_key } => write!(f, "missing label field '{label_key}'"),
        }
    }
}

/// 복구 가능한 필드 변환 실패
///
/// 해당 필드만 결과에서 빠지고 파싱은 계속됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    /// 원본 확장 키
    pub key: String,
    /// 드롭 사유
    pub reason: FieldWarningReason,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field [{}] skipped: {}", self.key, self.reason)
    }
}

/// 필드 드롭 경고를 받는 싱크
///
/// 파서와 함께 여러 스레드에서 공유됩니다.
pub trait WarningSink: Send + Sync {
    /// 필드 하나가 드롭될 때마다 호출됩니다.
    fn field_dropped(&self, warning: &FieldWarning);
}
