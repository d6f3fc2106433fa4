use std::fmt;
use std::io;

use thiserror::Error;

/// Column of a record that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    /// The record as a whole (wrong number of columns)
    Layout,
    Date,
    Amount,
    Content,
}

impl RecordField {
    /// Column name as it appears in the header
    pub fn name(self) -> &'static str {
        match self {
            RecordField::Layout => "record",
            RecordField::Date => "date",
            RecordField::Amount => "amount",
            RecordField::Content => "content",
        }
    }

    pub(crate) fn from_column(index: usize) -> Self {
        match index {
            0 => RecordField::Date,
            1 => RecordField::Amount,
            _ => RecordField::Content,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which running total overflowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalKind {
    Income,
    Expenditure,
}

impl fmt::Display for TotalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalKind::Income => f.write_str("income"),
            TotalKind::Expenditure => f.write_str("expenditure"),
        }
    }
}

/// Every way a summary invocation can fail. None of them are retried.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("invalid period '{input}': {reason}")]
    InvalidPeriod { input: String, reason: String },

    #[error("malformed record at line {line} ({field}): {reason}")]
    InvalidRecord {
        line: u64,
        field: RecordField,
        reason: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot split data region: {0}")]
    Split(String),

    #[error("{kind} total overflows a 64-bit integer")]
    TotalOverflow { kind: TotalKind },

    #[error("range worker {index} terminated without reporting a result")]
    WorkerPanicked { index: usize },
}

impl SummaryError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        SummaryError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn period(input: &str, reason: impl Into<String>) -> Self {
        SummaryError::InvalidPeriod {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn record(line: u64, field: RecordField, reason: impl Into<String>) -> Self {
        SummaryError::InvalidRecord {
            line,
            field,
            reason: reason.into(),
        }
    }

    /// Shift a range-relative record line number so it counts from the start of the file.
    /// `lines_before` is the number of complete lines preceding the range.
    pub(crate) fn rebase_line(self, lines_before: u64) -> Self {
        match self {
            SummaryError::InvalidRecord {
                line,
                field,
                reason,
            } => SummaryError::InvalidRecord {
                line: line + lines_before,
                field,
                reason,
            },
            other => other,
        }
    }

    /// Line number of a malformed record, if this is one
    pub fn line(&self) -> Option<u64> {
        match self {
            SummaryError::InvalidRecord { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SummaryError>;
