//! Summarization entry points
//!
//! Locates the data region of an input, then runs either the single-pass
//! sequential pipeline or the parallel range processor. Both produce the same
//! `Summary` for the same input.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use std::time::Instant;

use crate::error::{Result, SummaryError};
use crate::parallel::{DataRegion, ParallelConfig, ParallelProcessor};
use crate::parser::{probe_header, RecordParser};
use crate::period::Period;
use crate::stats::ProcessingStats;
use crate::summary::{PartialSummary, Summary};

/// A finished summary plus how it was produced
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub summary: Summary,
    pub stats: ProcessingStats,
}

/// Find where records start in `path`: after the header line when present
pub fn locate_data_region(path: &Path) -> Result<DataRegion> {
    let file = open(path)?;
    let size = file
        .metadata()
        .map_err(|e| SummaryError::io(format!("failed to stat {}", path.display()), e))?
        .len();

    let mut reader = BufReader::new(file);
    let probe = probe_header(&mut reader)
        .map_err(|e| SummaryError::io(format!("failed to read {}", path.display()), e))?;
    if probe.is_header {
        log::debug!("header line found, data starts at byte {}", probe.data_offset());
    }

    Ok(DataRegion {
        init_offset: probe.data_offset(),
        size,
    })
}

/// Summarize a file, in parallel when `config` asks for more than one worker
pub fn summarize_file(path: &Path, period: Period, config: &ParallelConfig) -> Result<PipelineResult> {
    let mut stats = ProcessingStats::new();

    let partial = if config.is_parallel() {
        let region = locate_data_region(path)?;
        let processor = ParallelProcessor::new(config.clone());
        let output = processor.process_file(path, region, period)?;
        stats.merge(&output.stats);
        output.partial
    } else {
        log::debug!("summarizing {} sequentially", path.display());
        let reader = BufReader::new(open(path)?);
        let partial = collect_sequential(reader, period)?;
        stats.record_partial(&partial);
        stats.ranges = 1;
        partial
    };

    stats.workers = config.num_workers.max(1);
    Ok(finish(period, partial, stats))
}

/// Summarize any buffered stream in a single pass
pub fn summarize_reader<R: BufRead>(reader: R, period: Period) -> Result<PipelineResult> {
    let mut stats = ProcessingStats::new();
    let partial = collect_sequential(reader, period)?;
    stats.record_partial(&partial);
    stats.ranges = 1;
    stats.workers = 1;
    Ok(finish(period, partial, stats))
}

fn collect_sequential<R: BufRead>(mut reader: R, period: Period) -> Result<PartialSummary> {
    let probe = probe_header(&mut reader)
        .map_err(|e| SummaryError::io("failed to read records", e))?;

    if probe.is_header {
        PartialSummary::collect(
            RecordParser::starting_at_line(reader, probe.first_data_line()),
            period,
        )
    } else {
        // The probed line is data; put it back in front of the stream
        let replay = Cursor::new(probe.line).chain(reader);
        PartialSummary::collect(RecordParser::new(replay), period)
    }
}

fn finish(period: Period, partial: PartialSummary, mut stats: ProcessingStats) -> PipelineResult {
    stats.finish();
    PipelineResult {
        summary: Summary::from_partial(period, partial),
        stats,
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| SummaryError::io(format!("failed to open {}", path.display()), e))
}
