//! Line-aligned byte range splitting
//!
//! Cuts the data region of a file into at most `num_parts` contiguous ranges
//! whose boundaries always sit right after a `\n`, so that each range can be
//! parsed on its own without ever seeing half a record.

use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{Result, SummaryError};

/// Default lookback window in bytes. A record line longer than this cannot be
/// used as a cut point and makes the splitter fall back to fewer, larger ranges.
pub const DEFAULT_LOOKBACK: u64 = 64 * 1024;

/// A contiguous slice of the input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: u64,
    pub length: u64,
}

impl ByteRange {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Compute line-aligned ranges covering `[init_offset, size)`
///
/// For each boundary the ideal cut is `offset + split`, where `split` is an even
/// share of the data region. The window `[cut - lookback, cut)` is read and the
/// boundary is placed right after its last newline. When the window holds no
/// newline, splitting stops and everything left becomes one final range, so no
/// data is ever dropped. At most `num_parts` ranges are returned; the last one
/// always extends to `size`.
pub fn split_ranges<R: Read + Seek>(
    source: &mut R,
    size: u64,
    num_parts: usize,
    init_offset: u64,
    lookback: u64,
) -> Result<Vec<ByteRange>> {
    if num_parts == 0 {
        return Err(SummaryError::Split(
            "number of parts must be at least 1".to_string(),
        ));
    }
    if lookback == 0 {
        return Err(SummaryError::Split(
            "lookback window must be at least 1 byte".to_string(),
        ));
    }
    if init_offset > size {
        return Err(SummaryError::Split(format!(
            "data offset {} lies beyond end of file ({} bytes)",
            init_offset, size
        )));
    }

    let data_len = size - init_offset;
    if data_len == 0 {
        return Ok(Vec::new());
    }

    let split = (data_len / num_parts as u64).max(1);
    let mut window = vec![0u8; lookback.min(split) as usize];
    let mut ranges = Vec::with_capacity(num_parts);
    let mut offset = init_offset;

    while offset < size && ranges.len() + 1 < num_parts {
        let cut = offset + split;
        if cut >= size {
            break;
        }

        let window_start = cut.saturating_sub(lookback).max(offset);
        let window_len = (cut - window_start) as usize;
        let chunk = &mut window[..window_len];

        source
            .seek(SeekFrom::Start(window_start))
            .map_err(|e| SummaryError::io("failed to seek while splitting", e))?;
        source
            .read_exact(chunk)
            .map_err(|e| SummaryError::io("failed to read while splitting", e))?;

        match chunk.iter().rposition(|&b| b == b'\n') {
            Some(pos) => {
                let next = window_start + pos as u64 + 1;
                ranges.push(ByteRange {
                    offset,
                    length: next - offset,
                });
                offset = next;
            }
            None => {
                log::debug!(
                    "no line break in {} bytes before offset {}; remaining {} bytes become one range",
                    window_len,
                    cut,
                    size - offset
                );
                break;
            }
        }
    }

    if offset < size {
        ranges.push(ByteRange {
            offset,
            length: size - offset,
        });
    }

    Ok(ranges)
}

/// Count the `\n` bytes in the first `end` bytes of `source`
pub fn count_lines_before<R: Read>(source: R, end: u64) -> io::Result<u64> {
    let mut limited = source.take(end);
    let mut buf = vec![0u8; 64 * 1024];
    let mut lines = 0u64;
    loop {
        let n = match limited.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        lines += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
    }
    Ok(lines)
}

/// Check that `ranges` partition `[init_offset, size)` in order, without gaps or overlaps
pub fn is_partition(ranges: &[ByteRange], init_offset: u64, size: u64) -> bool {
    let mut expected = init_offset;
    for range in ranges {
        if range.offset != expected || range.length == 0 {
            return false;
        }
        expected = range.end();
    }
    expected == size
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn split(data: &[u8], parts: usize, init: u64, lookback: u64) -> Vec<ByteRange> {
        let mut cursor = Cursor::new(data);
        split_ranges(&mut cursor, data.len() as u64, parts, init, lookback).unwrap()
    }

    fn assert_line_aligned(data: &[u8], ranges: &[ByteRange], init: u64) {
        for range in ranges {
            if range.offset != init {
                assert_eq!(
                    data[range.offset as usize - 1],
                    b'\n',
                    "range {:?} does not start after a newline",
                    range
                );
            }
            let end = range.end() as usize;
            if end != data.len() {
                assert_eq!(data[end - 1], b'\n', "range {:?} ends mid-line", range);
            }
        }
    }

    fn sample(lines: usize) -> Vec<u8> {
        let mut data = b"date,amount,content\n".to_vec();
        for i in 0..lines {
            data.extend_from_slice(format!("2023/10/{:02},{},Item {}\n", i % 28 + 1, i, i).as_bytes());
        }
        data
    }

    #[test]
    fn test_even_split_is_line_aligned() {
        let data = sample(100);
        let ranges = split(&data, 4, 20, DEFAULT_LOOKBACK);
        assert_eq!(ranges.len(), 4);
        assert!(is_partition(&ranges, 20, data.len() as u64));
        assert_line_aligned(&data, &ranges, 20);
    }

    #[test]
    fn test_single_part_covers_everything() {
        let data = sample(10);
        let ranges = split(&data, 1, 20, DEFAULT_LOOKBACK);
        assert_eq!(
            ranges,
            vec![ByteRange {
                offset: 20,
                length: data.len() as u64 - 20
            }]
        );
    }

    #[test]
    fn test_missing_trailing_newline_keeps_last_line() {
        let mut data = sample(30);
        data.extend_from_slice(b"2023/10/31,5,Last line without newline");
        let ranges = split(&data, 3, 20, 64);
        assert!(ranges.len() <= 3);
        assert!(is_partition(&ranges, 20, data.len() as u64));
        assert_line_aligned(&data, &ranges, 20);
        assert_eq!(ranges.last().unwrap().end(), data.len() as u64);
    }

    #[test]
    fn test_file_smaller_than_lookback() {
        let data = sample(5);
        assert!(data.len() < DEFAULT_LOOKBACK as usize);
        let ranges = split(&data, 8, 20, DEFAULT_LOOKBACK);
        assert!(!ranges.is_empty() && ranges.len() <= 8);
        assert!(is_partition(&ranges, 20, data.len() as u64));
        assert_line_aligned(&data, &ranges, 20);
    }

    #[test]
    fn test_line_longer_than_lookback_degrades_to_fewer_ranges() {
        let mut data = Vec::new();
        data.extend_from_slice(b"2023/10/01,1,short\n");
        data.extend_from_slice(format!("2023/10/02,2,{}\n", "x".repeat(500)).as_bytes());
        data.extend_from_slice(b"2023/10/03,3,short\n");

        let ranges = split(&data, 4, 0, 16);
        assert!(ranges.len() < 4);
        assert!(is_partition(&ranges, 0, data.len() as u64));
        assert_line_aligned(&data, &ranges, 0);
    }

    #[test]
    fn test_no_newline_at_all_yields_single_range() {
        let data = b"2023/10/01,1,no newline anywhere in this file".to_vec();
        let ranges = split(&data, 4, 0, 8);
        assert_eq!(
            ranges,
            vec![ByteRange {
                offset: 0,
                length: data.len() as u64
            }]
        );
    }

    #[test]
    fn test_more_parts_than_bytes() {
        let data = b"a\nb\nc\n".to_vec();
        let ranges = split(&data, 50, 0, DEFAULT_LOOKBACK);
        assert!(is_partition(&ranges, 0, data.len() as u64));
        assert_line_aligned(&data, &ranges, 0);
    }

    #[test]
    fn test_empty_data_region() {
        let data = b"date,amount,content\n".to_vec();
        assert!(split(&data, 4, 20, DEFAULT_LOOKBACK).is_empty());
    }

    #[test]
    fn test_invalid_arguments() {
        let data = sample(3);
        let mut cursor = Cursor::new(&data);
        let size = data.len() as u64;
        assert!(matches!(
            split_ranges(&mut cursor, size, 0, 0, DEFAULT_LOOKBACK),
            Err(SummaryError::Split(_))
        ));
        assert!(matches!(
            split_ranges(&mut cursor, size, 2, size + 1, DEFAULT_LOOKBACK),
            Err(SummaryError::Split(_))
        ));
        assert!(matches!(
            split_ranges(&mut cursor, size, 2, 0, 0),
            Err(SummaryError::Split(_))
        ));
    }

    #[test]
    fn test_count_lines_before() {
        let data = b"h\n1\n22\n333\n";
        assert_eq!(count_lines_before(&data[..], 0).unwrap(), 0);
        assert_eq!(count_lines_before(&data[..], 2).unwrap(), 1);
        assert_eq!(count_lines_before(&data[..], 7).unwrap(), 3);
        assert_eq!(count_lines_before(&data[..], 100).unwrap(), 4);
    }

    #[test]
    fn test_is_partition_detects_gaps_and_overlaps() {
        let ok = [
            ByteRange { offset: 5, length: 5 },
            ByteRange { offset: 10, length: 3 },
        ];
        assert!(is_partition(&ok, 5, 13));
        assert!(!is_partition(&ok, 5, 14));

        let gap = [
            ByteRange { offset: 5, length: 4 },
            ByteRange { offset: 10, length: 3 },
        ];
        assert!(!is_partition(&gap, 5, 13));

        let overlap = [
            ByteRange { offset: 5, length: 6 },
            ByteRange { offset: 10, length: 3 },
        ];
        assert!(!is_partition(&overlap, 5, 13));
        assert!(is_partition(&[], 7, 7));
    }

    proptest! {
        #[test]
        fn prop_ranges_partition_data_region(
            lines in prop::collection::vec("[a-z0-9,/ ]{0,40}", 0..60),
            header in prop::bool::ANY,
            trailing_newline in prop::bool::ANY,
            parts in 1usize..10,
            lookback in 1u64..96,
        ) {
            let mut data = Vec::new();
            if header {
                data.extend_from_slice(b"date,amount,content\n");
            }
            let init = data.len() as u64;
            data.extend_from_slice(lines.join("\n").as_bytes());
            if trailing_newline && !lines.is_empty() {
                data.push(b'\n');
            }

            let ranges = split(&data, parts, init, lookback);
            prop_assert!(ranges.len() <= parts);
            prop_assert!(is_partition(&ranges, init, data.len() as u64));
            for range in &ranges {
                if range.offset != init {
                    prop_assert_eq!(data[range.offset as usize - 1], b'\n');
                }
                let end = range.end() as usize;
                if end != data.len() {
                    prop_assert_eq!(data[end - 1], b'\n');
                }
            }
        }
    }
}
