#![no_main]

use libfuzzer_sys::fuzz_target;
use txsum::parser::RecordParser;
use txsum::{Period, SummaryError};

fuzz_target!(|data: &[u8]| {
    let period = match Period::new(2023, 10) {
        Ok(period) => period,
        Err(_) => return,
    };
    let total_lines = data.split(|b| *b == b'\n').count() as u64;

    for item in RecordParser::new(data) {
        match item {
            Ok(record) => {
                let _ = period.contains(record.date);
            }
            Err(SummaryError::InvalidRecord { line, .. }) => {
                assert!(line >= 1 && line <= total_lines);
                break;
            }
            Err(_) => break,
        }
    }
});
