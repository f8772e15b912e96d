//! 토크나이저 공용 스캔 버퍼
//!
//! 이스케이프가 없는 구간은 원본 문자열의 슬라이스로 빌려 쓰고,
//! 이스케이프를 만난 구간만 소유 문자열로 복사합니다.

use std::borrow::Cow;

/// 원본 입력 위의 진행 중인 구간
pub(crate) struct Segment<'a> {
    src: &'a str,
    start: usize,
    owned: Option<String>,
}

impl<'a> Segment<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            start: 0,
            owned: None,
        }
    }

    /// `upto` 직전까지를 확정하고 이스케이프 해제된 문자 `ch`를 덧붙인 뒤
    /// `resume` 위치부터 다시 누적합니다.
    pub(crate) fn push_unescaped(&mut self, upto: usize, ch: char, resume: usize) {
        let buf = self.owned.get_or_insert_with(String::new);
        buf.push_str(&self.src[self.start..upto]);
        buf.push(ch);
        self.start = resume;
    }

    /// `end` 직전까지의 구간을 꺼내고 `resume` 위치에서 새 구간을 시작합니다.
    pub(crate) fn take(&mut self, end: usize, resume: usize) -> Cow<'a, str> {
        let tail = &self.src[self.start..end];
        self.start = resume;
        match self.owned.take() {
            Some(mut buf) => {
                buf.push_str(tail);
                Cow::Owned(buf)
            }
            None => Cow::Borrowed(tail),
        }
    }
}

/// `offset`에 있는 백슬래시 다음 문자
pub(crate) fn char_after(src: &str, offset: usize) -> Option<char> {
    src.get(offset + 1..).and_then(|rest| rest.chars().next())
}
