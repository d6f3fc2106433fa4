use std::io::{self, BufRead};
use std::iter::FusedIterator;

use csv::{ReaderBuilder, Trim};

use crate::error::{RecordField, Result, SummaryError};
use crate::record::{parse_date, Record};

/// Column names of the optional header line, in order
pub const HEADER_COLUMNS: [&str; 3] = ["date", "amount", "content"];

/// Streaming parser for `date,amount,content` records
///
/// The stream must start at the first record; header handling is done by the
/// caller (see [`probe_header`]). Records are produced lazily, one physical line
/// at a time. Blank lines are skipped but still counted. The first error ends
/// the sequence.
pub struct RecordParser<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    next_line: u64,
    finished: bool,
}

impl<R: BufRead> RecordParser<R> {
    pub fn new(reader: R) -> Self {
        Self::starting_at_line(reader, 1)
    }

    /// Create a parser whose first input line is reported as `first_line`
    pub fn starting_at_line(reader: R, first_line: u64) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(128),
            next_line: first_line,
            finished: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .map_err(|e| SummaryError::io("failed to read records", e))?;
            if read == 0 {
                return Ok(None);
            }

            let line_no = self.next_line;
            self.next_line += 1;

            let line = std::str::from_utf8(&self.buf).map_err(|e| {
                SummaryError::record(
                    line_no,
                    RecordField::Layout,
                    format!("line is not valid UTF-8: {}", e),
                )
            })?;
            let line = line.trim_end_matches('\n').trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            return parse_line(line, line_no).map(Some);
        }
    }
}

impl<R: BufRead> Iterator for RecordParser<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for RecordParser<R> {}

/// Parse a single line (without its terminator) into a [`Record`]
pub fn parse_line(line: &str, line_no: u64) -> Result<Record> {
    if line.contains('"') {
        let row = parse_quoted_line(line, line_no)?;
        let fields: Vec<&str> = row.iter().collect();
        build_record(&fields, line_no)
    } else {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        build_record(&fields, line_no)
    }
}

/// Quoted fields go through the CSV reader so embedded commas and escaped quotes work
fn parse_quoted_line(line: &str, line_no: u64) -> Result<csv::StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(row)) => Ok(row),
        Some(Err(e)) => Err(SummaryError::record(
            line_no,
            RecordField::Layout,
            format!("unreadable CSV line: {}", e),
        )),
        None => Err(SummaryError::record(
            line_no,
            RecordField::Layout,
            "empty record",
        )),
    }
}

/// Validate trimmed field values and convert them into a [`Record`]
fn build_record(fields: &[&str], line_no: u64) -> Result<Record> {
    if fields.len() != HEADER_COLUMNS.len() {
        return Err(SummaryError::record(
            line_no,
            RecordField::Layout,
            format!(
                "expected {} fields, found {}",
                HEADER_COLUMNS.len(),
                fields.len()
            ),
        ));
    }

    for (index, value) in fields.iter().enumerate() {
        if value.is_empty() {
            return Err(SummaryError::record(
                line_no,
                RecordField::from_column(index),
                "field is empty",
            ));
        }
    }

    let date = parse_date(fields[0]).ok_or_else(|| {
        SummaryError::record(
            line_no,
            RecordField::Date,
            format!("'{}' does not match YYYY/MM/DD", fields[0]),
        )
    })?;

    let amount = fields[1].parse::<i64>().map_err(|e| {
        SummaryError::record(
            line_no,
            RecordField::Amount,
            format!("'{}' is not an integer: {}", fields[1], e),
        )
    })?;

    Ok(Record::new(date, amount, fields[2]))
}

/// Check whether a line is the `date,amount,content` header
///
/// Matching is case-insensitive, tolerates whitespace around each column and a
/// leading UTF-8 byte order mark.
pub fn is_header_line(line: &str) -> bool {
    let line = line
        .trim_start_matches('\u{feff}')
        .trim_end_matches(&['\r', '\n'][..]);
    let columns: Vec<&str> = line.split(',').collect();
    columns.len() == HEADER_COLUMNS.len()
        && columns
            .iter()
            .zip(HEADER_COLUMNS.iter())
            .all(|(column, expected)| column.trim().eq_ignore_ascii_case(expected))
}

/// First line of an input, read ahead of record parsing
#[derive(Debug, Clone)]
pub struct HeaderProbe {
    /// Raw bytes of the first line including its terminator
    pub line: Vec<u8>,
    pub is_header: bool,
}

impl HeaderProbe {
    /// Bytes that must be skipped before the data region starts
    pub fn data_offset(&self) -> u64 {
        if self.is_header {
            self.line.len() as u64
        } else {
            0
        }
    }

    /// Physical line number of the first data line
    pub fn first_data_line(&self) -> u64 {
        if self.is_header {
            2
        } else {
            1
        }
    }
}

/// Read the first line of `reader` and decide whether it is a header
pub fn probe_header<R: BufRead>(reader: &mut R) -> io::Result<HeaderProbe> {
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    let is_header = !line.is_empty() && is_header_line(&String::from_utf8_lossy(&line));
    Ok(HeaderProbe { line, is_header })
}
