// Command-line interface definition

use clap::Parser;
use std::path::PathBuf;

use crate::parallel::DEFAULT_LOOKBACK;

#[derive(Parser, Debug, Clone)]
#[command(name = "txsum")]
#[command(about = "Summarize one month of income and expenditure from a transaction CSV file")]
#[command(
    long_about = "Summarize one month of income and expenditure from a transaction CSV file\n\nThe input holds one `date,amount,content` record per line (date as YYYY/MM/DD,\namount as a signed integer), optionally preceded by a header line. Records in the\nrequested period are totalled and printed as JSON, newest first.\n\nMODES:\n  -w 0 or -w 1   Single pass over the file (default)\n  -w N           Split the file into N line-aligned ranges processed in parallel\n\nEXAMPLES:\n  txsum -p 202310 -f transactions.csv\n  txsum -p 202310 -f big.csv -w 8 --stats\n  txsum -i"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Month to summarize, as YYYYMM
    #[arg(
        short = 'p',
        long = "period",
        value_name = "YYYYMM",
        help_heading = "Input Options"
    )]
    pub period: Option<String>,

    /// Transaction CSV file
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Input Options"
    )]
    pub file: Option<PathBuf>,

    /// Prompt for the period and file path
    #[arg(short = 'i', long = "interactive", help_heading = "Input Options")]
    pub interactive: bool,

    /// Number of parallel range workers (0 or 1 processes the file in a single pass)
    #[arg(
        short = 'w',
        long = "workers",
        value_name = "N",
        default_value_t = 0,
        help_heading = "Performance Options"
    )]
    pub workers: usize,

    /// Bytes scanned back from each ideal split point to find a line break
    #[arg(
        long = "lookback",
        value_name = "BYTES",
        default_value_t = DEFAULT_LOOKBACK,
        value_parser = clap::value_parser!(u64).range(1..),
        help_heading = "Performance Options"
    )]
    pub lookback: u64,

    /// Write the summary to FILE instead of stdout
    #[arg(
        short = 'o',
        long = "output-file",
        value_name = "FILE",
        help_heading = "Output Options"
    )]
    pub output_file: Option<PathBuf>,

    /// Emit single-line JSON
    #[arg(
        long = "compact",
        help_heading = "Output Options",
        overrides_with = "pretty"
    )]
    pub compact: bool,

    /// Emit indented JSON (default)
    #[arg(
        long = "pretty",
        help_heading = "Output Options",
        overrides_with = "compact"
    )]
    pub pretty: bool,

    /// Print processing statistics to stderr
    #[arg(
        short = 's',
        long = "stats",
        help_heading = "Output Options",
        overrides_with = "no_stats"
    )]
    pub stats: bool,

    /// Disable processing statistics explicitly
    #[arg(
        long = "no-stats",
        help_heading = "Output Options",
        overrides_with = "stats"
    )]
    pub no_stats: bool,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help_heading = "Logging Options",
        overrides_with = "quiet"
    )]
    pub verbose: u8,

    /// Only report errors
    #[arg(
        short = 'q',
        long = "quiet",
        help_heading = "Logging Options",
        overrides_with = "verbose"
    )]
    pub quiet: bool,

    /// Specify custom configuration file path
    #[arg(
        long = "config-file",
        value_name = "PATH",
        help_heading = "Configuration Options"
    )]
    pub config_file: Option<PathBuf>,

    /// Ignore configuration files
    #[arg(long = "ignore-config", help_heading = "Configuration Options")]
    pub ignore_config: bool,

    /// Use alias from configuration file
    #[arg(
        short = 'a',
        long = "alias",
        value_name = "NAME",
        help_heading = "Configuration Options"
    )]
    pub alias: Vec<String>,

    /// Show configuration files and exit
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,
}
