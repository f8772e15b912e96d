#![no_main]

use cefpost_parser::header::{SECTION_COUNT, split_header};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        if let Ok(tokens) = split_header(line) {
            assert_eq!(tokens.as_slice().len(), SECTION_COUNT);
        }
    }
});
