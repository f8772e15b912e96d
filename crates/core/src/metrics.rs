//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 파서는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `cefpost_`
//! - 모듈명: `parser_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(cefpost_core::metrics::PARSER_LINES_PARSED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 실패/드롭 사유 레이블 키
pub const LABEL_REASON: &str = "reason";

// ─── Parser 메트릭 ──────────────────────────────────────────────────

/// Parser: 성공적으로 파싱된 라인 수 (counter)
pub const PARSER_LINES_PARSED_TOTAL: &str = "cefpost_parser_lines_parsed_total";

/// Parser: 거부된 라인 수 (counter, label: reason)
pub const PARSER_PARSE_ERRORS_TOTAL: &str = "cefpost_parser_parse_errors_total";

/// Parser: 변환 실패로 드롭된 필드 수 (counter, label: reason)
pub const PARSER_FIELDS_DROPPED_TOTAL: &str = "cefpost_parser_fields_dropped_total";

/// Parser: 한 라인 파싱 소요 시간 (histogram, 초)
pub const PARSER_PARSE_DURATION_SECONDS: &str = "cefpost_parser_parse_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        PARSER_LINES_PARSED_TOTAL,
        "Total number of CEF lines successfully parsed"
    );
    describe_counter!(
        PARSER_PARSE_ERRORS_TOTAL,
        "Total number of CEF lines rejected, by failure category"
    );
    describe_counter!(
        PARSER_FIELDS_DROPPED_TOTAL,
        "Total number of extension fields dropped during type coercion"
    );
    describe_histogram!(
        PARSER_PARSE_DURATION_SECONDS,
        "Time to parse a single CEF line in seconds"
    );
}
