use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, SummaryError};

/// A calendar month used to select records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(SummaryError::period(
                &format!("{:04}{:02}", year, month),
                format!("month must be between 01 and 12, got {:02}", month),
            ));
        }
        Ok(Self { year, month })
    }

    /// Parse a `YYYYMM` string
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() != 6 {
            return Err(SummaryError::period(
                input,
                format!("expected YYYYMM, got {} characters", input.chars().count()),
            ));
        }
        if !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SummaryError::period(input, "expected only digits"));
        }

        // Both slices are ASCII digits, so these cannot overflow or fail
        let year: i32 = input[..4]
            .parse()
            .map_err(|e| SummaryError::period(input, format!("invalid year: {}", e)))?;
        let month: u32 = input[4..]
            .parse()
            .map_err(|e| SummaryError::period(input, format!("invalid month: {}", e)))?;

        if !(1..=12).contains(&month) {
            return Err(SummaryError::period(
                input,
                format!("month must be between 01 and 12, got {:02}", month),
            ));
        }

        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for Period {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self> {
        Period::parse(s)
    }
}

/// Formats as `YYYY/MM`, the form used in the summary output
impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}
