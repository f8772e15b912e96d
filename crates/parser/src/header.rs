//! 파이프 헤더 토크나이저
//!
//! CEF 라인을 정확히 8개의 파이프 구분 섹션으로 나눕니다.
//!
//! ```text
//! CEF:0|Vendor|Product|1.0|100|Name|10|src=10.0.0.1 msg=a|b
//! [0]   [1]    [2]     [3] [4] [5]  [6] [7] -- 7번째 파이프 이후는 모두 섹션 7
//! ```
//!
//! 처음 7개의 구분자를 찾는 동안에만 `\|`, `\\` 이스케이프가 유효합니다.
//! 그 이후의 문자는 백슬래시와 파이프를 포함해 그대로 마지막 섹션에 복사됩니다.

use std::borrow::Cow;

use crate::error::{CefParseError, EscapeStage};
use crate::scan::{Segment, char_after};

/// 헤더 섹션 수
pub const SECTION_COUNT: usize = 8;

/// 섹션을 닫는 구분자 수
const DELIMITER_COUNT: usize = SECTION_COUNT - 1;

/// 정확히 8개의 헤더 섹션
///
/// 이스케이프가 없는 섹션은 원본 라인을 빌려 씁니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeTokens<'a> {
    sections: [Cow<'a, str>; SECTION_COUNT],
}

impl<'a> PipeTokens<'a> {
    /// 섹션 0: 선택적 syslog 헤더 + `CEF:<version>`
    pub fn syslog_header(&self) -> &str {
        &self.sections[0]
    }

    pub fn device_vendor(&self) -> &str {
        &self.sections[1]
    }

    pub fn device_product(&self) -> &str {
        &self.sections[2]
    }

    pub fn device_version(&self) -> &str {
        &self.sections[3]
    }

    pub fn device_event_class_id(&self) -> &str {
        &self.sections[4]
    }

    pub fn name(&self) -> &str {
        &self.sections[5]
    }

    pub fn severity(&self) -> &str {
        &self.sections[6]
    }

    /// 섹션 7: 확장 필드 원문 (이스케이프 해제하지 않음)
    pub fn extension(&self) -> &str {
        &self.sections[7]
    }

    pub fn as_slice(&self) -> &[Cow<'a, str>] {
        &self.sections
    }

    pub fn into_sections(self) -> [Cow<'a, str>; SECTION_COUNT] {
        self.sections
    }
}

/// 라인을 8개의 헤더 섹션으로 분리합니다.
///
/// 7개 미만의 구분자는 `MalformedHeader`, `\` 다음에 `\`나 `|`가 아닌 문자가 오면
/// `InvalidEscape`를 반환합니다.
pub fn split_header(line: &str) -> Result<PipeTokens<'_>, CefParseError> {
    let bytes = line.as_bytes();
    let mut sections: Vec<Cow<'_, str>> = Vec::with_capacity(SECTION_COUNT);
    let mut segment = Segment::new(line);
    let mut i = 0;

    while i < bytes.len() && sections.len() < DELIMITER_COUNT {
        match bytes[i] {
            b'\\' => match bytes.get(i + 1) {
                Some(&next @ (b'\\' | b'|')) => {
                    segment.push_unescaped(i, char::from(next), i + 2);
                    i += 2;
                }
                Some(_) => {
                    return Err(CefParseError::InvalidEscape {
                        stage: EscapeStage::Header,
                        offset: i,
                        found: char_after(line, i).unwrap_or('\\'),
                    });
                }
                // 마지막 문자가 백슬래시면 구분자가 모자라므로 아래에서 거부된다
                None => break,
            },
            b'|' => {
                sections.push(segment.take(i, i + 1));
                i += 1;
            }
            _ => i += 1,
        }
    }

    sections.push(segment.take(bytes.len(), bytes.len()));

    let found = sections.len();
    let sections: [Cow<'_, str>; SECTION_COUNT] = sections.try_into().map_err(|_| {
        CefParseError::malformed_header(format!(
            "{SECTION_COUNT} pipe-separated sections required, found {found}"
        ))
    })?;

    Ok(PipeTokens { sections })
}
