#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use cefpost_core::config::ParserConfig;
use cefpost_core::types::FieldValue;
use cefpost_parser::CefParser;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    vendor: String,
    product: String,
    version: String,
    class_id: String,
    name: String,
    severity: u8,
    /// 확장 필드 (최대 8개로 제한)
    extension: Vec<(String, String)>,
}

fn escape_header(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('|', "\\|")
}

fn escape_value(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('=', "\\=")
}

fuzz_target!(|input: FuzzInput| {
    // 키는 영숫자만 남기고 인덱스를 붙여 고유하게 만든다 (Label 접미사 회피)
    let pairs: Vec<(String, String)> = input
        .extension
        .iter()
        .take(8)
        .enumerate()
        .map(|(i, (key, value))| {
            let key: String = key.chars().filter(char::is_ascii_alphanumeric).collect();
            (format!("fz{key}{i}"), value.clone())
        })
        .collect();
    if pairs.is_empty() {
        return;
    }

    let severity = i32::from(input.severity % 11);
    let extension: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", escape_value(v)))
        .collect();
    let line = format!(
        "CEF:0|{}|{}|{}|{}|{}|{}|{}",
        escape_header(&input.vendor),
        escape_header(&input.product),
        escape_header(&input.version),
        escape_header(&input.class_id),
        escape_header(&input.name),
        severity,
        extension.join(" "),
    );

    let Ok(parser) = CefParser::new(&ParserConfig::default()) else {
        return;
    };
    let parser = parser.with_max_line_length(usize::MAX);

    // 이스케이프된 입력은 항상 파싱되고 원본 값을 복원해야 한다
    let record = match parser.parse(&line) {
        Ok(record) => record,
        Err(e) => panic!("escaped line rejected: {e}\nline: {line:?}"),
    };

    assert_eq!(record.device_vendor(), input.vendor);
    assert_eq!(record.device_product(), input.product);
    assert_eq!(record.device_version(), input.version);
    assert_eq!(record.device_event_class_id(), input.class_id);
    assert_eq!(record.name(), input.name);
    assert_eq!(record.severity(), severity);
    for (key, value) in &pairs {
        assert_eq!(
            record.field(key),
            Some(&FieldValue::String(value.clone())),
            "key {key}"
        );
    }
});
