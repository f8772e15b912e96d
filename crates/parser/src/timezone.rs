//! 파서 타임존
//!
//! syslog 타임스탬프에는 연도와 타임존이 없으므로 설정된 타임존의 벽시계 시각으로
//! 해석합니다. IANA 이름(`Europe/Berlin`)과 고정 오프셋(`+01:00`)을 모두 받습니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// 설정된 타임존
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timezone {
    /// IANA 타임존 (서머타임 반영)
    Named(Tz),
    /// 고정 UTC 오프셋
    Fixed(FixedOffset),
}

impl Timezone {
    /// UTC
    pub fn utc() -> Self {
        Self::Named(Tz::UTC)
    }

    /// 현재 시각
    pub fn now(&self) -> DateTime<FixedOffset> {
        let now = Utc::now();
        match self {
            Self::Named(tz) => now.with_timezone(tz).fixed_offset(),
            Self::Fixed(offset) => now.with_timezone(offset),
        }
    }

    /// 벽시계 시각에 타임존을 붙입니다 (시각 자체는 변환하지 않음).
    ///
    /// 서머타임 종료로 두 번 등장하는 시각은 이른 쪽을 택하고,
    /// 서머타임 시작으로 건너뛴 시각은 간격만큼 뒤로 밀립니다 (베를린 02:30 → 03:30).
    /// `None`은 날짜 범위를 벗어날 때뿐입니다.
    pub fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Named(tz) => match tz.from_local_datetime(naive) {
                LocalResult::None => shift_past_gap(tz, naive),
                resolved => resolved.earliest().map(|dt| dt.fixed_offset()),
            },
            Self::Fixed(offset) => offset.from_local_datetime(naive).single(),
        }
    }
}

/// 간격 직전의 오프셋으로 벽시계 시각을 해석합니다.
fn shift_past_gap(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    let day_before = naive.checked_sub_signed(TimeDelta::days(1))?;
    let before_gap = tz.offset_from_utc_datetime(&day_before).fix();
    let instant =
        naive.checked_sub_signed(TimeDelta::seconds(i64::from(before_gap.local_minus_utc())))?;
    Some(tz.from_utc_datetime(&instant).fixed_offset())
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for Timezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('+') || s.starts_with('-') {
            return parse_fixed_offset(s).map(Self::Fixed);
        }
        s.parse::<Tz>().map(Self::Named).map_err(|e| e.to_string())
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tz) => f.write_str(tz.name()),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// `+HH:MM`, `+HHMM`, `+HH` 형식의 오프셋
fn parse_fixed_offset(s: &str) -> Result<FixedOffset, String> {
    let invalid = || format!("invalid UTC offset '{s}', expected +HH:MM");

    let (sign, rest) = s.split_at(1);
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let (hours, minutes) = match digits.len() {
        2 => (&digits[..2], "00"),
        4 => (&digits[..2], &digits[2..]),
        _ => return Err(invalid()),
    };
    if rest.contains(':') && (rest.len() != 5 || rest.as_bytes().get(2) != Some(&b':')) {
        return Err(invalid());
    }

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    let seconds = (hours * 3600 + minutes * 60) * if sign == "-" { -1 } else { 1 };
    FixedOffset::east_opt(seconds).ok_or_else(invalid)
}
