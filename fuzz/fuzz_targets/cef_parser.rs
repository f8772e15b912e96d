#![no_main]

use cefpost_core::config::ParserConfig;
use cefpost_parser::CefParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(parser) = CefParser::new(&ParserConfig::default()) else {
        return;
    };

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(record) = parser.parse(line) {
        assert!((-1..=10).contains(&record.severity()));
    }
});
