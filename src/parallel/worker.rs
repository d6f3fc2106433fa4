//! Worker thread for processing one byte range

use crossbeam_channel::Sender;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Instant;

use crate::error::{Result, SummaryError};
use crate::parser::RecordParser;
use crate::period::Period;
use crate::summary::PartialSummary;

use super::splitter::ByteRange;
use super::types::RangeResult;

/// Parse and aggregate the records in `range` through an independent handle.
///
/// Line numbers in a returned error are relative to the range start, counting
/// its first line as 1.
pub(crate) fn process_range(path: &Path, range: ByteRange, period: Period) -> Result<PartialSummary> {
    let mut file = File::open(path)
        .map_err(|e| SummaryError::io(format!("failed to open {}", path.display()), e))?;
    file.seek(SeekFrom::Start(range.offset)).map_err(|e| {
        SummaryError::io(
            format!("failed to seek to offset {} in {}", range.offset, path.display()),
            e,
        )
    })?;

    let reader = BufReader::new(file.take(range.length));
    PartialSummary::collect(RecordParser::new(reader), period)
}

/// Worker thread body: process one range and report back exactly once
pub(crate) fn worker_thread(
    index: usize,
    path: &Path,
    range: ByteRange,
    period: Period,
    result_sender: Sender<RangeResult>,
) {
    let started = Instant::now();
    let outcome = process_range(path, range, period);
    let elapsed = started.elapsed();

    match &outcome {
        Ok(partial) => log::debug!(
            "range {} done: {} records scanned, {} matched in {:?}",
            index,
            partial.records_scanned,
            partial.records.len(),
            elapsed
        ),
        Err(err) => log::debug!("range {} failed after {:?}: {}", index, elapsed, err),
    }

    // A closed channel means the dispatcher is gone; nothing left to report to
    let _ = result_sender.send(RangeResult {
        index,
        outcome,
        elapsed,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_process_range_reads_only_its_slice() {
        let content = "date,amount,content\n2023/10/01,100,A\n2023/10/02,-40,B\n2023/10/03,7,C\n";
        let file = write_temp(content);
        let offset = content.find("2023/10/02").unwrap() as u64;
        let end = content.find("2023/10/03").unwrap() as u64;

        let partial = process_range(
            file.path(),
            ByteRange {
                offset,
                length: end - offset,
            },
            Period::parse("202310").unwrap(),
        )
        .unwrap();

        assert_eq!(partial.records.len(), 1);
        assert_eq!(partial.records[0].content, "B");
        assert_eq!(partial.total_income, 0);
        assert_eq!(partial.total_expenditure, -40);
    }

    #[test]
    fn test_process_range_error_line_is_range_relative() {
        let content = "date,amount,content\n2023/10/01,100,A\n2023/10/02,oops,B\n";
        let file = write_temp(content);
        let offset = content.find("2023/10/01").unwrap() as u64;

        let err = process_range(
            file.path(),
            ByteRange {
                offset,
                length: content.len() as u64 - offset,
            },
            Period::parse("202310").unwrap(),
        )
        .unwrap_err();

        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_worker_thread_reports_once() {
        let file = write_temp("2023/10/01,5,A\n");
        let (tx, rx) = crossbeam_channel::unbounded();
        worker_thread(
            3,
            file.path(),
            ByteRange {
                offset: 0,
                length: 15,
            },
            Period::parse("202310").unwrap(),
            tx,
        );

        let result = rx.recv().unwrap();
        assert_eq!(result.index, 3);
        assert_eq!(result.outcome.unwrap().total_income, 5);
        assert!(rx.recv().is_err());
    }
}
