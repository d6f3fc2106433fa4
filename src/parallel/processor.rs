//! Main parallel processor
//!
//! Splits the data region into line-aligned ranges, runs one scoped worker
//! thread per range and folds the partial results back together in file order.

use crossbeam_channel::bounded;
use std::fs::File;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::{Result, SummaryError};
use crate::period::Period;
use crate::stats::ProcessingStats;
use crate::summary::PartialSummary;

use super::splitter::{count_lines_before, is_partition, split_ranges, ByteRange};
use super::types::{DataRegion, ParallelConfig, ParallelOutput, RangeResult};
use super::worker::worker_thread;

/// Main parallel processor
pub struct ParallelProcessor {
    config: ParallelConfig,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        let cpus = num_cpus::get();
        if config.num_workers > cpus {
            log::warn!(
                "{} workers requested but only {} CPUs available",
                config.num_workers,
                cpus
            );
        }
        Self { config }
    }

    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Summarize the data region of `path` in parallel.
    ///
    /// The merged records are in file order, exactly as a sequential scan
    /// would produce them. On failure the error of the earliest failing range
    /// is returned with its line number rebased onto the whole file.
    pub fn process_file(
        &self,
        path: &Path,
        region: DataRegion,
        period: Period,
    ) -> Result<ParallelOutput> {
        if region.is_empty() {
            log::debug!("{} has no records after the header", path.display());
            return Ok(ParallelOutput::default());
        }

        let mut file = open(path)?;
        let ranges = split_ranges(
            &mut file,
            region.size,
            self.config.num_workers.max(1),
            region.init_offset,
            self.config.lookback,
        )?;
        drop(file);
        debug_assert!(is_partition(&ranges, region.init_offset, region.size));

        log::debug!(
            "split {} bytes of {} into {} ranges ({} requested)",
            region.len(),
            path.display(),
            ranges.len(),
            self.config.num_workers
        );
        for (index, range) in ranges.iter().enumerate() {
            log::debug!(
                "range {}: offset {} length {}",
                index,
                range.offset,
                range.length
            );
        }

        let results = run_workers(path, &ranges, period);
        let (partial, stats) = aggregate(path, &ranges, results)?;

        Ok(ParallelOutput {
            partial,
            ranges,
            stats,
        })
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| SummaryError::io(format!("failed to open {}", path.display()), e))
}

/// Run one worker per range and collect exactly one result per range, in range order
fn run_workers(path: &Path, ranges: &[ByteRange], period: Period) -> Vec<RangeResult> {
    if ranges.is_empty() {
        return Vec::new();
    }

    let (result_sender, result_receiver) = bounded::<RangeResult>(ranges.len());

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(ranges.len());
        for (index, range) in ranges.iter().copied().enumerate() {
            let sender = result_sender.clone();
            handles.push(scope.spawn(move || worker_thread(index, path, range, period, sender)));
        }
        // Only worker clones remain, so the channel disconnects once they all finish
        drop(result_sender);

        let mut slots: Vec<Option<RangeResult>> = (0..ranges.len()).map(|_| None).collect();
        for _ in 0..ranges.len() {
            match result_receiver.recv() {
                Ok(result) => {
                    log::trace!("range {} reported after {:?}", result.index, result.elapsed);
                    let index = result.index;
                    slots[index] = Some(result);
                }
                Err(_) => break,
            }
        }

        for (index, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                log::error!("worker for range {} panicked", index);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| RangeResult {
                    index,
                    outcome: Err(SummaryError::WorkerPanicked { index }),
                    elapsed: Duration::ZERO,
                })
            })
            .collect()
    })
}

/// Merge results in range order; the first failure in file order wins
fn aggregate(
    path: &Path,
    ranges: &[ByteRange],
    results: Vec<RangeResult>,
) -> Result<(PartialSummary, ProcessingStats)> {
    let mut merged = PartialSummary::default();
    let mut stats = ProcessingStats::default();
    for RangeResult {
        index,
        outcome,
        elapsed,
    } in results
    {
        match outcome {
            Ok(partial) => {
                let mut range_stats = ProcessingStats {
                    ranges: 1,
                    workers: ranges.len(),
                    processing_time: elapsed,
                    ..Default::default()
                };
                range_stats.record_partial(&partial);
                stats.merge(&range_stats);
                merged.merge(partial)?;
            }
            Err(err) => {
                if err.line().is_none() {
                    return Err(err);
                }
                let lines_before = count_lines_before(open(path)?, ranges[index].offset)
                    .map_err(|e| {
                        SummaryError::io(format!("failed to read {}", path.display()), e)
                    })?;
                return Err(err.rebase_line(lines_before));
            }
        }
    }
    Ok((merged, stats))
}
