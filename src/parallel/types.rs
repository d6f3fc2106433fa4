//! Type definitions for parallel processing
//!
//! Contains the processor configuration and the messages workers send back.

use std::time::Duration;

use crate::error::Result;
use crate::stats::ProcessingStats;
use crate::summary::PartialSummary;

use super::splitter::{ByteRange, DEFAULT_LOOKBACK};

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Requested number of ranges, one worker thread each
    pub num_workers: usize,
    /// Bytes scanned backwards from an ideal cut to find a line break
    pub lookback: u64,
}

impl ParallelConfig {
    pub fn with_workers(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Self::default()
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.num_workers > 1
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            lookback: DEFAULT_LOOKBACK,
        }
    }
}

/// Where the records of a file live: after the optional header, up to EOF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRegion {
    pub init_offset: u64,
    pub size: u64,
}

impl DataRegion {
    pub fn len(&self) -> u64 {
        self.size.saturating_sub(self.init_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of processing one range, tagged with its position in the file
#[derive(Debug)]
pub(crate) struct RangeResult {
    pub index: usize,
    pub outcome: Result<PartialSummary>,
    pub elapsed: Duration,
}

/// Merged output of a parallel run
#[derive(Debug, Default)]
pub struct ParallelOutput {
    pub partial: PartialSummary,
    pub ranges: Vec<ByteRange>,
    /// Per-range counts merged; time is the slowest range
    pub stats: ProcessingStats,
}
