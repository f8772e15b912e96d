//! 심각도 정규화

use crate::error::CefParseError;

/// 알 수 없는 심각도
pub const UNKNOWN_SEVERITY: i32 = -1;

/// 허용되는 최대 심각도
pub const MAX_SEVERITY: i32 = 10;

/// 심각도 토큰을 `-1..=10` 범위의 정수로 정규화합니다.
///
/// 숫자 해석을 먼저 시도하고, 실패하면 대소문자 구분 없이 단어를 매칭합니다.
///
/// | 단어 | 값 |
/// |---|---|
/// | `low` | 3 |
/// | `med`, `medium` | 6 |
/// | `high` | 8 |
/// | `very high`, `very-high` | 10 |
/// | `unknown` | -1 |
pub fn normalize_severity(token: &str) -> Result<i32, CefParseError> {
    if let Ok(value) = token.parse::<i32>() {
        if (UNKNOWN_SEVERITY..=MAX_SEVERITY).contains(&value) {
            return Ok(value);
        }
        return Err(CefParseError::InvalidSeverity {
            token: token.to_owned(),
            reason: "is not a valid severity, should be 0..10, or -1 for unknown",
        });
    }

    match token.to_lowercase().as_str() {
        "low" => Ok(3),
        "med" | "medium" => Ok(6),
        "high" => Ok(8),
        "very high" | "very-high" => Ok(10),
        "unknown" => Ok(UNKNOWN_SEVERITY),
        _ => Err(CefParseError::InvalidSeverity {
            token: token.to_owned(),
            reason: "is not a valid string or numeric severity",
        }),
    }
}
