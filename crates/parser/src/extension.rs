//! 확장 필드 토크나이저
//!
//! 헤더 섹션 7의 `key=value` 나열을 순서를 유지한 키/값 쌍으로 나눕니다.
//! 값에는 이스케이프되지 않은 공백이 들어갈 수 있으므로, `=`를 만날 때마다
//! 그 앞 구간의 **마지막 공백**을 이전 값과 다음 키의 경계로 봅니다.
//!
//! ```text
//! dvc=ip-172-30-2-212   cfp2=90.01
//!     ^^^^^^^^^^^^^^^^^^ ^^^^
//!     dvc 값 (공백 2개 유지) 다음 키, 경계 공백 1개만 소비
//! ```
//!
//! 유효한 이스케이프는 `\\`와 `\=` 뿐입니다.

use std::borrow::Cow;

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::error::{CefParseError, EscapeStage};
use crate::scan::{Segment, char_after};

/// 원본 순서를 유지하는 고유 키/값 쌍
pub type ExtensionPairs<'a> = IndexMap<Cow<'a, str>, Cow<'a, str>>;

/// 확장 필드를 키/값 쌍으로 분리합니다 (중복 키 허용).
///
/// 마지막 쌍 `(현재 키, 남은 버퍼)`는 항상 포함됩니다.
pub fn split_extension(payload: &str) -> Result<Vec<(Cow<'_, str>, Cow<'_, str>)>, CefParseError> {
    let bytes = payload.as_bytes();
    let mut pairs = Vec::new();
    let mut segment = Segment::new(payload);
    let mut current_key: Cow<'_, str> = Cow::Borrowed("");
    let mut end = bytes.len();
    let mut i = 0;

    while i < end {
        match bytes[i] {
            b'\\' => match bytes.get(i + 1) {
                Some(&next @ (b'\\' | b'=')) => {
                    segment.push_unescaped(i, char::from(next), i + 2);
                    i += 2;
                }
                Some(_) => {
                    return Err(CefParseError::InvalidEscape {
                        stage: EscapeStage::Extension,
                        offset: i,
                        found: char_after(payload, i).unwrap_or('\\'),
                    });
                }
                // 끝에 홀로 남은 백슬래시는 버린다
                None => end = i,
            },
            b'=' => {
                let preceding = segment.take(i, i + 1);
                match split_last_space(preceding) {
                    Ok((value, next_key)) => {
                        pairs.push((current_key, value));
                        current_key = next_key;
                    }
                    Err(whole) => current_key = whole,
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    pairs.push((current_key, segment.take(end, end)));
    Ok(pairs)
}

/// 쌍을 고유 키 맵으로 접습니다. 같은 키가 두 번 나오면 `DuplicateKey`입니다.
pub fn fold_unique<'a>(
    pairs: Vec<(Cow<'a, str>, Cow<'a, str>)>,
) -> Result<ExtensionPairs<'a>, CefParseError> {
    let mut unique = ExtensionPairs::with_capacity(pairs.len());
    for (key, value) in pairs {
        match unique.entry(key) {
            Entry::Occupied(entry) => {
                return Err(CefParseError::DuplicateKey {
                    key: entry.key().to_string(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
    Ok(unique)
}

/// 확장 필드를 분리하고 고유 키 맵으로 만듭니다.
pub fn tokenize(payload: &str) -> Result<ExtensionPairs<'_>, CefParseError> {
    fold_unique(split_extension(payload)?)
}

/// 마지막 공백을 기준으로 `(앞부분, 뒷부분)`으로 나눕니다. 공백이 없으면 원본을 돌려줍니다.
fn split_last_space(text: Cow<'_, str>) -> Result<(Cow<'_, str>, Cow<'_, str>), Cow<'_, str>> {
    let Some(pos) = text.rfind(' ') else {
        return Err(text);
    };
    Ok(match text {
        Cow::Borrowed(s) => (Cow::Borrowed(&s[..pos]), Cow::Borrowed(&s[pos + 1..])),
        Cow::Owned(mut s) => {
            let tail = s[pos + 1..].to_owned();
            s.truncate(pos);
            (Cow::Owned(s), Cow::Owned(tail))
        }
    })
}
