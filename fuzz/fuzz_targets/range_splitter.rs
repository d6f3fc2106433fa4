#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use txsum::parallel::splitter::{is_partition, split_ranges};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let num_parts = (data[0] as usize % 32) + 1;
    let lookback = (data[1] as u64 % 64) + 1;
    let body = &data[3..];
    let init_offset = (data[2] as u64).min(body.len() as u64);
    let size = body.len() as u64;

    let mut cursor = Cursor::new(body);
    let ranges = match split_ranges(&mut cursor, size, num_parts, init_offset, lookback) {
        Ok(ranges) => ranges,
        Err(_) => return,
    };

    assert!(ranges.len() <= num_parts);
    assert!(is_partition(&ranges, init_offset, size));
    for range in ranges.iter().take(ranges.len().saturating_sub(1)) {
        assert_eq!(body[(range.end() - 1) as usize], b'\n');
    }
});
