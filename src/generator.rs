//! Random transaction data for benchmarks and manual testing
//!
//! Output is fully determined by the seed and the end date, so a failing run
//! can be reproduced from its command line.

use anyhow::{anyhow, Context, Result};
use chrono::{Months, NaiveDate};
use std::io::Write;

use crate::parser::HEADER_COLUMNS;
use crate::record::{Record, DATE_FORMAT};

/// File written when no output path is given
pub const DEFAULT_OUTPUT: &str = "generated_transactions.csv";

pub const DEFAULT_YEARS: u32 = 5;

/// Descriptions drawn from for the content column
pub const CONTENTS: [&str; 25] = [
    "Rent",
    "Salary",
    "Groceries",
    "Utilities",
    "Dining Out",
    "Entertainment",
    "Healthcare",
    "Transportation",
    "Investment",
    "Freelance Work",
    "Bonus",
    "Car Maintenance",
    "Subscriptions",
    "Shopping",
    "Books",
    "Gas",
    "Internet Bill",
    "Phone Bill",
    "Project Payment",
    "Debit",
    "Credit Card Payment",
    "Insurance",
    "Travel",
    "Education",
    "Miscellaneous",
];

/// Endless stream of random records dated within `years` years up to `end_date`
pub struct RecordGenerator {
    rng: fastrand::Rng,
    start: NaiveDate,
    span_days: i64,
}

impl RecordGenerator {
    pub fn new(seed: u64, end_date: NaiveDate, years: u32) -> Result<Self> {
        let months = years
            .checked_mul(12)
            .ok_or_else(|| anyhow!("year span {} is too large", years))?;
        let start = end_date
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| anyhow!("{} years before {} is out of range", years, end_date))?;

        Ok(Self {
            rng: fastrand::Rng::with_seed(seed),
            start,
            span_days: (end_date - start).num_days(),
        })
    }

    fn random_date(&mut self) -> NaiveDate {
        let offset = self.rng.i64(0..=self.span_days);
        self.start + chrono::Duration::days(offset)
    }

    /// Withdrawals -1000..=-10 and deposits 10..=100000, equally likely
    fn random_amount(&mut self) -> i64 {
        if self.rng.bool() {
            -self.rng.i64(10..=1000)
        } else {
            self.rng.i64(10..=100_000)
        }
    }

    fn random_content(&mut self) -> &'static str {
        CONTENTS[self.rng.usize(..CONTENTS.len())]
    }

    pub fn next_record(&mut self) -> Record {
        let date = self.random_date();
        let amount = self.random_amount();
        Record::new(date, amount, self.random_content())
    }
}

impl Iterator for RecordGenerator {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        Some(self.next_record())
    }
}

/// Write a header and `records` as CSV; returns the number of records written
pub fn write_csv<W, I>(writer: W, records: I) -> Result<u64>
where
    W: Write,
    I: IntoIterator<Item = Record>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer
        .write_record(HEADER_COLUMNS)
        .context("error writing CSV header")?;

    let mut written = 0u64;
    for record in records {
        let date = record.date.format(DATE_FORMAT).to_string();
        let amount = record.amount.to_string();
        csv_writer
            .write_record([date.as_str(), amount.as_str(), record.content.as_str()])
            .with_context(|| format!("error writing record {}", written + 1))?;
        written += 1;
    }

    csv_writer.flush().context("error flushing CSV output")?;
    Ok(written)
}
