//! syslog 헤더 추출기
//!
//! 헤더 섹션 0에서 선택적 syslog 봉투와 `CEF:<version>`을 해석합니다.
//!
//! ```text
//! <132>Aug 14 14:26:55 ossec-host CEF:0
//! ^^^^^ ^^^^^^^^^^^^^^^ ^^^^^^^^^^ ^^^^^
//! PRI   BSD 타임스탬프   무시됨      버전
//! ```

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime};
use regex::Regex;

use crate::error::CefParseError;
use crate::timezone::Timezone;

/// 선택적 `<PRI>Mon D HH:MM:SS ...` 봉투 + 필수 `CEF:<digits>`
const SYSLOG_CEF_PATTERN: &str =
    r"(?s)^(?:<[0-9]+>([A-Za-z]{3}\s+[0-9]{1,2} [0-9]{1,2}:[0-9]{1,2}:[0-9]{1,2}).*)?CEF:([0-9]+)$";

/// 섹션 0에서 얻은 값
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    /// 봉투의 타임스탬프, 없으면 파싱 시각
    pub timestamp: DateTime<FixedOffset>,
    pub version: i32,
}

/// syslog 봉투 + CEF 버전 추출기
#[derive(Debug, Clone)]
pub struct SyslogHeaderExtractor {
    pattern: Regex,
}

impl SyslogHeaderExtractor {
    pub fn new() -> Result<Self, CefParseError> {
        let pattern = Regex::new(SYSLOG_CEF_PATTERN).map_err(|e| CefParseError::Config {
            field: "syslog_pattern".to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// 섹션 0을 해석합니다.
    ///
    /// 타임스탬프의 연도는 `tz` 기준 현재 연도로 채우고, 시각은 변환 없이
    /// `tz`의 벽시계 시각으로 취급합니다.
    pub fn extract(&self, section: &str, tz: &Timezone) -> Result<HeaderInfo, CefParseError> {
        let caps = self
            .pattern
            .captures(section)
            .ok_or_else(|| CefParseError::malformed_header("missing CEF:<version> marker"))?;

        let version = caps
            .get(2)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .parse::<i32>()
            .map_err(|e| CefParseError::malformed_header(format!("invalid CEF version: {e}")))?;

        let timestamp = match caps.get(1) {
            Some(ts) => parse_bsd_timestamp(ts.as_str(), tz)?,
            None => tz.now(),
        };

        Ok(HeaderInfo { timestamp, version })
    }
}

/// 연도 없는 타임스탬프를 검증할 때 쓰는 윤년 (`Feb 29` 허용)
const VALIDATION_YEAR: i32 = 2000;

/// RFC 3164 타임스탬프 (`Aug 14 14:26:55`)를 현재 연도 기준으로 파싱합니다.
///
/// 현재 연도가 평년이면 `Feb 29`는 `Feb 28`로 당겨집니다.
fn parse_bsd_timestamp(timestamp: &str, tz: &Timezone) -> Result<DateTime<FixedOffset>, CefParseError> {
    let invalid = |reason: String| {
        CefParseError::malformed_header(format!("invalid syslog timestamp '{timestamp}': {reason}"))
    };

    let timestamp_with_year = format!("{VALIDATION_YEAR} {timestamp}");
    let naive = NaiveDateTime::parse_from_str(&timestamp_with_year, "%Y %b %d %H:%M:%S")
        .map_err(|e| invalid(e.to_string()))?;

    let current_year = tz.now().year();
    let naive = in_year(naive, current_year)
        .ok_or_else(|| invalid(format!("cannot be placed in year {current_year}")))?;

    tz.localize(&naive)
        .ok_or_else(|| invalid(format!("out of range in timezone {tz}")))
}

/// 연도를 바꾸고, 평년의 2월 29일은 28일로 맞춥니다.
fn in_year(naive: NaiveDateTime, year: i32) -> Option<NaiveDateTime> {
    naive
        .with_year(year)
        .or_else(|| naive.with_day(28).and_then(|clamped| clamped.with_year(year)))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Timelike};

    use super::*;

    fn extractor() -> SyslogHeaderExtractor {
        SyslogHeaderExtractor::new().unwrap()
    }

    #[test]
    fn bare_cef_marker_uses_now() {
        let tz = Timezone::utc();
        let before = tz.now();
        let info = extractor().extract("CEF:0", &tz).unwrap();
        assert_eq!(info.version, 0);
        assert!(info.timestamp >= before);
        assert!(info.timestamp <= tz.now());
    }

    #[test]
    fn syslog_envelope_sets_timestamp() {
        let tz: Timezone = "+01:00".parse().unwrap();
        let info = extractor()
            .extract("<132>Aug 14 14:26:55 CEF:0", &tz)
            .unwrap();
        assert_eq!(info.timestamp.year(), tz.now().year());
        assert_eq!(info.timestamp.month(), 8);
        assert_eq!(info.timestamp.day(), 14);
        assert_eq!(info.timestamp.hour(), 14);
        assert_eq!(info.timestamp.minute(), 26);
        assert_eq!(info.timestamp.second(), 55);
        assert_eq!(info.timestamp.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn hostname_is_discarded() {
        let info = extractor()
            .extract("<132>Aug 14 14:26:55 ossec-host CEF:1", &Timezone::utc())
            .unwrap();
        assert_eq!(info.version, 1);
        assert_eq!(info.timestamp.hour(), 14);
    }

    #[test]
    fn single_digit_day_with_padding() {
        let info = extractor()
            .extract("<13>Aug  4 04:05:06 host CEF:0", &Timezone::utc())
            .unwrap();
        assert_eq!(info.timestamp.day(), 4);
        assert_eq!(info.timestamp.hour(), 4);
    }

    #[test]
    fn text_before_marker_without_envelope_fails() {
        let err = extractor().extract("garbage CEF:0", &Timezone::utc()).unwrap_err();
        assert!(matches!(err, CefParseError::MalformedHeader { .. }));
    }

    #[test]
    fn missing_marker_fails() {
        let err = extractor().extract("LEEF:1.0", &Timezone::utc()).unwrap_err();
        assert!(matches!(err, CefParseError::MalformedHeader { .. }));
    }

    #[test]
    fn non_numeric_version_fails() {
        let err = extractor().extract("CEF:x", &Timezone::utc()).unwrap_err();
        assert!(matches!(err, CefParseError::MalformedHeader { .. }));
    }

    #[test]
    fn overflowing_version_fails() {
        let err = extractor()
            .extract("CEF:99999999999", &Timezone::utc())
            .unwrap_err();
        assert!(err.to_string().contains("invalid CEF version"));
    }

    #[test]
    fn impossible_date_fails() {
        let err = extractor()
            .extract("<132>Feb 30 25:61:00 CEF:0", &Timezone::utc())
            .unwrap_err();
        assert!(err.to_string().contains("invalid syslog timestamp"));
    }

    #[test]
    fn feb_29_is_clamped_outside_leap_years() {
        let naive = NaiveDateTime::parse_from_str("2000 Feb 29 10:00:00", "%Y %b %d %H:%M:%S")
            .unwrap();
        let clamped = in_year(naive, 2025).unwrap();
        assert_eq!((clamped.year(), clamped.month(), clamped.day()), (2025, 2, 28));
        assert_eq!(clamped.hour(), 10);

        let kept = in_year(naive, 2028).unwrap();
        assert_eq!((kept.month(), kept.day()), (2, 29));
    }

    #[test]
    fn feb_29_envelope_is_accepted_in_any_year() {
        let tz = Timezone::utc();
        let info = extractor()
            .extract("<132>Feb 29 10:00:00 host CEF:0", &tz)
            .unwrap();
        assert_eq!(info.timestamp.year(), tz.now().year());
        assert_eq!(info.timestamp.month(), 2);
        assert!(matches!(info.timestamp.day(), 28 | 29));
        assert_eq!(info.timestamp.hour(), 10);
    }

    #[test]
    fn dst_gap_time_is_shifted_forward() {
        let tz: Timezone = "Europe/Berlin".parse().unwrap();
        let berlin = chrono_tz::Europe::Berlin;
        let year = tz.now().year();
        // 3월 마지막 일요일 02:00-03:00 은 베를린에 없다
        let gap_day = (25..=31)
            .find(|day| {
                let naive = NaiveDate::from_ymd_opt(year, 3, *day)
                    .unwrap()
                    .and_hms_opt(2, 30, 0)
                    .unwrap();
                berlin.from_local_datetime(&naive).single().is_none()
            })
            .unwrap();

        let info = extractor()
            .extract(&format!("<132>Mar {gap_day} 02:30:00 host CEF:0"), &tz)
            .unwrap();
        assert_eq!(info.timestamp.day(), gap_day);
        assert_eq!(info.timestamp.hour(), 3);
        assert_eq!(info.timestamp.minute(), 30);
        assert_eq!(info.timestamp.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn priority_without_timestamp_fails() {
        let err = extractor().extract("<132>CEF:0", &Timezone::utc()).unwrap_err();
        assert!(matches!(err, CefParseError::MalformedHeader { .. }));
    }
}
