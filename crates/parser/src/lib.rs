#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`header`]: 파이프 헤더 토크나이저
//! - [`syslog`]: syslog 봉투와 CEF 버전 추출
//! - [`extension`]: 확장 필드 토크나이저
//! - [`severity`]: 심각도 정규화
//! - [`fields`]: 필드 타입 변환과 라벨 치환
//! - [`parser`]: 전체 단계를 실행하는 [`CefParser`]
//! - [`timezone`]: syslog 타임스탬프용 타임존
//! - [`error`]: 도메인 에러 타입

pub mod error;
pub mod extension;
pub mod fields;
pub mod header;
pub mod parser;
pub mod severity;
pub mod sink;
pub mod syslog;
pub mod timezone;

mod scan;

// --- 주요 타입 re-export ---

// 파서
pub use parser::{CefParser, ParseOutcome};

// 에러
pub use error::{CefParseError, EscapeStage, FailureCategory};

// 단계별 구성 요소
pub use extension::ExtensionPairs;
pub use fields::{CoercedFields, FieldKind};
pub use header::PipeTokens;
pub use sink::TracingWarningSink;
pub use syslog::{HeaderInfo, SyslogHeaderExtractor};
pub use timezone::Timezone;
