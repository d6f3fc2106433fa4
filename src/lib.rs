// Core library for txsum: monthly transaction summaries over large CSV files

pub mod cli;
pub mod config;
pub mod config_file;
pub mod error;
pub mod generator;
pub mod interactive;
pub mod parallel;
pub mod parser;
pub mod period;
pub mod pipeline;
pub mod platform;
pub mod record;
pub mod stats;
pub mod summary;

pub use cli::Cli;
pub use config::TxsumConfig;
pub use error::{RecordField, Result, SummaryError, TotalKind};
pub use parallel::{ByteRange, DataRegion, ParallelConfig, ParallelProcessor};
pub use period::Period;
pub use pipeline::{summarize_file, summarize_reader, PipelineResult};
pub use record::Record;
pub use stats::ProcessingStats;
pub use summary::{PartialSummary, Summary};
