use anyhow::{anyhow, bail, Context, Result};
use log::LevelFilter;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::parallel::ParallelConfig;
use crate::period::Period;

/// Main configuration struct for txsum
#[derive(Debug, Clone)]
pub struct TxsumConfig {
    pub input: InputConfig,
    pub performance: PerformanceConfig,
    pub output: OutputConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub period: Period,
    /// Absolute path of an existing regular file
    pub file: PathBuf,
}

/// Performance configuration
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    pub workers: usize,
    pub lookback: u64,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub output_file: Option<PathBuf>,
    pub compact: bool,
    pub stats: bool,
}

impl TxsumConfig {
    /// Create configuration from CLI arguments
    ///
    /// Period and file must be present by now; interactive mode fills them in
    /// before this is called.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let period_text = cli
            .period
            .as_deref()
            .ok_or_else(|| anyhow!("missing required option --period (or use --interactive)"))?;
        let file = cli
            .file
            .as_deref()
            .ok_or_else(|| anyhow!("missing required option --file (or use --interactive)"))?;

        Ok(Self {
            input: InputConfig {
                period: Period::parse(period_text.trim())?,
                file: validate_input_path(file)?,
            },
            performance: PerformanceConfig {
                workers: cli.workers,
                lookback: cli.lookback,
            },
            output: OutputConfig {
                output_file: cli.output_file.clone(),
                compact: cli.compact,
                stats: cli.stats,
            },
        })
    }

    /// Check if the range-splitting path should be used
    pub fn should_use_parallel(&self) -> bool {
        self.performance.workers > 1
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        ParallelConfig {
            num_workers: self.performance.workers,
            lookback: self.performance.lookback,
        }
    }
}

/// `-q` keeps only errors, default shows warnings, each `-v` adds a level
pub fn log_level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// The input must exist and be a regular file; returns its absolute path
pub fn validate_input_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        bail!("file path is empty");
    }
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("cannot access input file '{}'", path.display()))?;
    if !metadata.is_file() {
        bail!("input path '{}' is not a regular file", path.display());
    }
    std::fs::canonicalize(path)
        .with_context(|| format!("cannot resolve input file '{}'", path.display()))
}
