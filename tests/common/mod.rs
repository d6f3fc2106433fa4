// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::{NamedTempFile, TempDir};

pub const HEADER: &str = "date,amount,content\n";

/// Isolated working directory: no project or user config files leak into a run
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the sandbox and return its absolute path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, content).expect("Failed to write sandbox file");
        path
    }

    fn command(&self, binary: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(binary);
        cmd.args(args)
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env_remove("RUST_LOG")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run txsum inside the sandbox
    pub fn run_txsum(&self, args: &[&str]) -> (String, String, i32) {
        collect(self.command(env!("CARGO_BIN_EXE_txsum"), args))
    }

    /// Run txsum-gen inside the sandbox
    pub fn run_generator(&self, args: &[&str]) -> (String, String, i32) {
        collect(self.command(env!("CARGO_BIN_EXE_txsum-gen"), args))
    }
}

fn collect(mut cmd: Command) -> (String, String, i32) {
    let output = cmd.output().expect("Failed to execute binary");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Run txsum against a temporary file holding `file_content`
pub fn run_txsum_with_file(args: &[&str], file_content: &str) -> (String, String, i32) {
    let sandbox = Sandbox::new();
    let path = sandbox.write("transactions.csv", file_content);
    let path = path.to_str().expect("temp path is not UTF-8").to_string();

    let mut full_args = args.to_vec();
    full_args.push("-f");
    full_args.push(&path);
    sandbox.run_txsum(&full_args)
}

/// Named temp file with the given content, kept alive by the caller
pub fn temp_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Parse stdout as JSON, with the raw text in the panic message on failure
pub fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, stdout))
}

/// Contents of the `transactions` array as `(date, amount, content)` tuples
pub fn transactions(value: &serde_json::Value) -> Vec<(String, i64, String)> {
    value["transactions"]
        .as_array()
        .expect("transactions is not an array")
        .iter()
        .map(|t| {
            (
                t["date"].as_str().unwrap_or_default().to_string(),
                t["amount"].as_i64().unwrap_or_default(),
                t["content"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

/// A header plus `rows` deterministic records spread over two months
pub fn sample_csv(rows: usize) -> String {
    let mut content = String::from(HEADER);
    for i in 0..rows {
        let amount = if i % 4 == 0 { -(i as i64 % 900) - 10 } else { (i as i64 % 5000) + 10 };
        content.push_str(&format!(
            "2023/{:02}/{:02},{},Item {}\n",
            9 + i % 2,
            i % 28 + 1,
            amount,
            i
        ));
    }
    content
}
