use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use env_logger::Env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use txsum::config::log_level_for;
use txsum::generator::{write_csv, RecordGenerator, DEFAULT_OUTPUT, DEFAULT_YEARS};
use txsum::platform::ExitCode;
use txsum::record::parse_date;

/// Generate a random transaction CSV file
#[derive(Parser, Debug)]
#[command(name = "txsum-gen")]
#[command(version)]
#[command(args_override_self = true)]
struct GenArgs {
    /// Number of records to generate
    rows: u64,

    /// Random seed; the same seed and end date always produce the same file
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Output file
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Last possible record date, as YYYY/MM/DD (default: today)
    #[arg(long = "end-date", value_name = "YYYY/MM/DD", value_parser = parse_end_date)]
    end_date: Option<NaiveDate>,

    /// How many years back from the end date records may fall
    #[arg(long = "years", default_value_t = DEFAULT_YEARS)]
    years: u32,

    /// Increase diagnostic output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_end_date(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("'{}' is not a YYYY/MM/DD date", value))
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn run(args: GenArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(clock_seed);
    let end_date = args.end_date.unwrap_or_else(|| Local::now().date_naive());
    log::info!(
        "generating {} records ending {} with seed {}",
        args.rows,
        end_date,
        seed
    );

    let mut generator = RecordGenerator::new(seed, end_date, args.years)?;
    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let records = (0..args.rows).map(|_| generator.next_record());
    let written = write_csv(BufWriter::new(file), records)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    eprintln!(
        "Wrote {} records to {} (seed {})",
        written,
        args.output.display(),
        seed
    );
    Ok(())
}

fn main() {
    let args = GenArgs::parse();

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(
        log_level_for(args.verbose, false).to_string().to_lowercase(),
    ));
    builder.format_timestamp(None);
    let _ = builder.try_init();

    if let Err(e) = run(args) {
        eprintln!("txsum-gen: Error: {:#}", e);
        ExitCode::GeneralError.exit();
    }
}
