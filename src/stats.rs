use std::time::{Duration, Instant};

use crate::summary::PartialSummary;

/// Statistics collected while summarizing one input
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    pub records_scanned: u64,
    pub records_matched: u64,
    pub ranges: usize,
    pub workers: usize,
    pub processing_time: Duration,
    pub start_time: Option<Instant>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Count the records of a finished partial
    pub fn record_partial(&mut self, partial: &PartialSummary) {
        self.records_scanned += partial.records_scanned;
        self.records_matched += partial.records.len() as u64;
    }

    /// Fold per-range stats together. Timing keeps the longer of the two.
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.records_scanned += other.records_scanned;
        self.records_matched += other.records_matched;
        self.ranges += other.ranges;
        self.workers = self.workers.max(other.workers);
        self.processing_time = self.processing_time.max(other.processing_time);
    }

    pub fn finish(&mut self) {
        if let Some(start) = self.start_time {
            self.processing_time = start.elapsed();
        }
    }

    pub fn records_filtered(&self) -> u64 {
        self.records_scanned.saturating_sub(self.records_matched)
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Records processed: {} total, {} matched, {} filtered",
            self.records_scanned,
            self.records_matched,
            self.records_filtered()
        );

        if self.workers > 1 {
            output.push_str(&format!(
                ", {} ranges on {} workers",
                self.ranges, self.workers
            ));
        }

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(" in {}ms", processing_time_ms));

        if processing_time_ms > 0 && self.records_scanned > 0 {
            let records_per_sec = (self.records_scanned as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} records/s)", records_per_sec));
        }

        output
    }
}
