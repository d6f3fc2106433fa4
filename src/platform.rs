use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    BrokenPipe = 141, // 128 + SIGPIPE (13)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Broken pipe detection, including the Windows error codes for a closed pipe
pub fn is_broken_pipe(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::BrokenPipe {
        return true;
    }
    cfg!(windows) && matches!(e.raw_os_error(), Some(232) | Some(109))
}

/// Where the summary document goes
pub enum OutputSink {
    Stdout(io::Stdout),
    File { writer: BufWriter<File>, path: PathBuf },
}

impl OutputSink {
    pub fn stdout() -> Self {
        OutputSink::Stdout(io::stdout())
    }

    /// Create (or truncate) an output file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| anyhow!(create_error_message(path, &e)))?;
        Ok(OutputSink::File {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn from_option(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::create(path),
            None => Ok(Self::stdout()),
        }
    }

    /// Write `document` followed by a newline and flush.
    ///
    /// A closed stdout pipe ends the process quietly with exit code 141.
    pub fn write_document(&mut self, document: &str) -> Result<()> {
        match self {
            OutputSink::Stdout(stdout) => {
                let mut lock = stdout.lock();
                let outcome = writeln!(lock, "{}", document).and_then(|_| lock.flush());
                match outcome {
                    Ok(()) => Ok(()),
                    Err(e) if is_broken_pipe(&e) => ExitCode::BrokenPipe.exit(),
                    Err(e) => Err(anyhow!("Failed to write to stdout: {}", e)),
                }
            }
            OutputSink::File { writer, path } => writeln!(writer, "{}", document)
                .and_then(|_| writer.flush())
                .map_err(|e| anyhow!("Output file write failed '{}': {}", path.display(), e)),
        }
    }
}

/// Create a helpful error message for file creation failures
fn create_error_message(path: &Path, error: &io::Error) -> String {
    let base_msg = format!("Cannot create output file '{}': {}", path.display(), error);

    let suggestion = match error.kind() {
        io::ErrorKind::NotFound => "Parent directory does not exist, create it first",
        io::ErrorKind::PermissionDenied => "Check file permissions or choose a writable location",
        _ if path.is_dir() => "Path points to a directory, specify a filename instead",
        _ => return base_msg,
    };

    format!("{}\nSuggestion: {}", base_msg, suggestion)
}
