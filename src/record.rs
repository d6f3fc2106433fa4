use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Day format used by the input file and the JSON output
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// One income (positive) or expenditure (negative) entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub amount: i64,
    pub content: String,
}

impl Record {
    pub fn new(date: NaiveDate, amount: i64, content: impl Into<String>) -> Self {
        Self {
            date,
            amount,
            content: content.into(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0
    }
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
}

/// Parse a `YYYY/MM/DD` date. Unpadded or signed components are rejected
/// so that formatting the result reproduces the input exactly.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'/' || bytes[7] != b'/' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
