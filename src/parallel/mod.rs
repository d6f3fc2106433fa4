//! Parallel processing for large transaction files
//!
//! The data region of a file is cut into line-aligned byte ranges, each range
//! is summarized by its own thread through an independent file handle, and the
//! partial results are merged in file order.
//!
//! # Module Structure
//!
//! - `splitter`: Line-aligned range computation
//! - `types`: Configuration, data region and worker messages
//! - `worker`: Per-range worker thread
//! - `processor`: Main ParallelProcessor orchestration

mod processor;
pub mod splitter;
mod types;
mod worker;

// Re-export public types
pub use processor::ParallelProcessor;
pub use splitter::{split_ranges, ByteRange, DEFAULT_LOOKBACK};
pub use types::{DataRegion, ParallelConfig, ParallelOutput};
