use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches};
use env_logger::Env;
use std::path::PathBuf;

use txsum::config_file::ConfigFile;
use txsum::interactive;
use txsum::pipeline::summarize_file;
use txsum::platform::{ExitCode, OutputSink};
use txsum::{Cli, TxsumConfig};

fn main() {
    let rust_log_set = init_logging();

    // Process command line arguments with config file support
    let mut cli = process_args_with_config(std::env::args().collect());

    if !rust_log_set {
        log::set_max_level(txsum::config::log_level_for(cli.verbose, cli.quiet));
    }

    if cli.interactive {
        match interactive::prompt_for_inputs(cli.period.as_deref(), cli.file.as_deref()) {
            Ok(answers) => {
                cli.period = Some(answers.period);
                cli.file = Some(answers.file);
            }
            Err(e) => {
                eprintln!("txsum: Error: {:#}", e);
                ExitCode::GeneralError.exit();
            }
        }
    }

    let config = match TxsumConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("txsum: Error: {:#}", e);
            ExitCode::InvalidUsage.exit();
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("txsum: Error: {:#}", e);
        ExitCode::GeneralError.exit();
    }
    ExitCode::Success.exit();
}

/// Install the stderr logger. Returns whether RUST_LOG is in control of the level.
fn init_logging() -> bool {
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("trace"));
    builder.format_timestamp(None).format_target(false);
    if !rust_log_set {
        builder.filter_module("rustyline", log::LevelFilter::Warn);
    }
    if builder.try_init().is_ok() && !rust_log_set {
        // Warnings only until -v/-q are known
        log::set_max_level(log::LevelFilter::Warn);
    }
    rust_log_set
}

fn run(config: &TxsumConfig) -> Result<()> {
    if config.should_use_parallel() {
        log::info!(
            "summarizing {} for {} across {} range workers",
            config.input.file.display(),
            config.input.period,
            config.performance.workers
        );
    } else {
        log::info!(
            "summarizing {} for {} in a single pass",
            config.input.file.display(),
            config.input.period
        );
    }

    let result = summarize_file(
        &config.input.file,
        config.input.period,
        &config.parallel_config(),
    )?;

    let document = if config.output.compact {
        result.summary.to_json_compact()
    } else {
        result.summary.to_json_pretty()
    }
    .context("failed to serialize summary")?;

    let mut sink = OutputSink::from_option(config.output.output_file.as_deref())?;
    sink.write_document(&document)?;

    if config.output.stats {
        eprintln!("{}", result.stats.format_stats());
    }
    Ok(())
}

/// Extract the --config-file value from raw args
fn extract_config_file_arg(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config-file" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(value) = arg.strip_prefix("--config-file=") {
            return Some(PathBuf::from(value));
        }
    }
    None
}

/// Apply config file defaults and aliases, then parse with clap.
///
/// `--show-config` is handled here and exits.
fn process_args_with_config(raw_args: Vec<String>) -> Cli {
    let config_file_path = extract_config_file_arg(&raw_args);
    let ignore_config = raw_args.iter().any(|arg| arg == "--ignore-config");

    if raw_args.iter().any(|arg| arg == "--show-config") {
        match ConfigFile::load_with_custom_path(config_file_path.as_deref()) {
            Ok(config_file) => {
                print!("{}", config_file.describe(config_file_path.as_deref()));
                ExitCode::Success.exit();
            }
            Err(e) => {
                eprintln!("txsum: Config file error: {:#}", e);
                ExitCode::GeneralError.exit();
            }
        }
    }

    let processed_args = if ignore_config {
        raw_args
    } else {
        let loaded = ConfigFile::load_with_custom_path(config_file_path.as_deref())
            .and_then(|config_file| config_file.process_args(raw_args));
        match loaded {
            Ok(processed) => processed,
            Err(e) => {
                eprintln!("txsum: Config error: {:#}", e);
                ExitCode::GeneralError.exit();
            }
        }
    };
    log::debug!("effective arguments: {:?}", processed_args);

    let matches = Cli::command()
        .try_get_matches_from(processed_args)
        .unwrap_or_else(|e| e.exit());
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| {
        eprintln!("txsum: Error: {}", e);
        ExitCode::InvalidUsage.exit();
    })
}
