//! CEF 파서 -- 토크나이저와 변환 단계를 순서대로 실행합니다.
//!
//! # 처리 단계
//! ```text
//! 크기 검사 -> 헤더 분리 -> syslog/버전 -> 본문 -> 심각도 -> 확장 필드 -> msg 추출 -> CefRecord
//! ```
//!
//! 어느 단계에서든 치명적 에러가 나면 라인 전체가 거부됩니다.
//! 필드 단위 변환 실패는 경고로만 남고 레코드는 생성됩니다.
//!
//! # 사용 예시
//! ```
//! use cefpost_parser::CefParser;
//! use cefpost_core::ParserConfig;
//!
//! let parser = CefParser::new(&ParserConfig::default()).unwrap();
//! let record = parser
//!     .parse("CEF:0|Vendor|Product|1.0|100|Port scan|7|src=10.0.0.1 spt=22")
//!     .unwrap();
//! assert_eq!(record.severity(), 7);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use cefpost_core::metrics as m;
use cefpost_core::{CefHeader, CefRecord, FieldWarning, ParserConfig, WarningSink};
use tracing::debug;

use crate::error::CefParseError;
use crate::extension;
use crate::fields::{self, CoercedFields};
use crate::header::split_header;
use crate::severity::normalize_severity;
use crate::sink::TracingWarningSink;
use crate::syslog::SyslogHeaderExtractor;
use crate::timezone::Timezone;

/// `message`로 옮겨지는 확장 키
pub const MESSAGE_KEY: &str = "msg";

/// 레코드와 함께 반환되는 필드 경고
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub record: CefRecord,
    pub warnings: Vec<FieldWarning>,
}

/// CEF 라인 파서
///
/// 설정(타임존, 최대 길이)과 경고 싱크만 보유하며 호출 간에 변경되는 상태가 없습니다.
/// 여러 스레드에서 `&CefParser`를 공유해도 안전합니다.
#[derive(Clone)]
pub struct CefParser {
    timezone: Timezone,
    max_line_length: usize,
    syslog: SyslogHeaderExtractor,
    warning_sink: Arc<dyn WarningSink>,
}

impl CefParser {
    /// 설정으로 파서를 생성합니다.
    ///
    /// 타임존을 해석할 수 없으면 `CefParseError::Config`를 반환합니다.
    pub fn new(config: &ParserConfig) -> Result<Self, CefParseError> {
        let timezone = config
            .timezone
            .parse::<Timezone>()
            .map_err(|reason| CefParseError::Config {
                field: "parser.timezone".to_owned(),
                reason,
            })?;

        Ok(Self {
            timezone,
            max_line_length: config.max_line_length,
            syslog: SyslogHeaderExtractor::new()?,
            warning_sink: Arc::new(TracingWarningSink),
        })
    }

    /// 타임존을 교체합니다.
    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// 필드 경고를 받을 싱크를 교체합니다.
    pub fn with_warning_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.warning_sink = sink;
        self
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// CEF 라인 한 줄을 파싱합니다.
    pub fn parse(&self, line: &str) -> Result<CefRecord, CefParseError> {
        self.parse_with_warnings(line).map(|outcome| outcome.record)
    }

    /// 파싱하고 드롭된 필드 경고도 함께 반환합니다.
    ///
    /// 경고는 반환과 별개로 경고 싱크에도 전달됩니다.
    pub fn parse_with_warnings(&self, line: &str) -> Result<ParseOutcome, CefParseError> {
        let started = Instant::now();
        let result = self.parse_line(line);
        metrics::histogram!(m::PARSER_PARSE_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(outcome) => {
                metrics::counter!(m::PARSER_LINES_PARSED_TOTAL).increment(1);
                for warning in &outcome.warnings {
                    metrics::counter!(
                        m::PARSER_FIELDS_DROPPED_TOTAL,
                        m::LABEL_REASON => warning.reason.as_label()
                    )
                    .increment(1);
                    self.warning_sink.field_dropped(warning);
                }
                debug!(
                    vendor = outcome.record.device_vendor(),
                    product = outcome.record.device_product(),
                    fields = outcome.record.fields().len(),
                    dropped = outcome.warnings.len(),
                    "parsed CEF line"
                );
            }
            Err(e) => {
                metrics::counter!(
                    m::PARSER_PARSE_ERRORS_TOTAL,
                    m::LABEL_REASON => e.category().as_label()
                )
                .increment(1);
                debug!(error = %e, category = %e.category(), "rejected CEF line");
            }
        }

        result
    }

    fn parse_line(&self, line: &str) -> Result<ParseOutcome, CefParseError> {
        if line.len() > self.max_line_length {
            return Err(CefParseError::TooLarge {
                size: line.len(),
                max: self.max_line_length,
            });
        }

        let tokens = split_header(line)?;
        let info = self.syslog.extract(tokens.syslog_header(), &self.timezone)?;
        let severity = normalize_severity(tokens.severity())?;

        if tokens.extension().is_empty() {
            return Err(CefParseError::EmptyPayload);
        }
        let pairs = extension::tokenize(tokens.extension())?;
        let CoercedFields { fields, warnings } = fields::coerce(&pairs)?;

        let message = fields.get(MESSAGE_KEY).map(ToString::to_string);

        let [_, vendor, product, version, class_id, name, _, _] = tokens.into_sections();
        let header = CefHeader {
            timestamp: info.timestamp,
            version: info.version,
            device_vendor: vendor.into_owned(),
            device_product: product.into_owned(),
            device_version: version.into_owned(),
            device_event_class_id: class_id.into_owned(),
            name: name.into_owned(),
            severity,
        };

        Ok(ParseOutcome {
            record: CefRecord::new(header, message, fields),
            warnings,
        })
    }
}

impl fmt::Debug for CefParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CefParser")
            .field("timezone", &self.timezone)
            .field("max_line_length", &self.max_line_length)
            .finish_non_exhaustive()
    }
}
