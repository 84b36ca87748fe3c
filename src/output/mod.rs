//! Progress emission sinks.
//!
//! The monitor and runner report progress through an explicitly passed
//! [`ProgressSink`] rather than a process-global logger, so callers choose
//! the destination (console, run-log file, or a capturing buffer in tests).

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

/// Width of the `=` rule lines in file logs and section headers.
const RULE_WIDTH: usize = 70;

/// Destination for progress and report lines.
///
/// One line per `emit` call; implementations decide where it goes.
pub trait ProgressSink {
    /// Write one line of output.
    fn emit(&mut self, text: &str);

    /// Write a section header: a blank line, a rule, the title, and a rule.
    fn section(&mut self, title: &str) {
        let rule = "=".repeat(RULE_WIDTH);
        self.emit("");
        self.emit(&rule);
        self.emit(title);
        self.emit(&rule);
    }
}

/// Sink that prints to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Sink that appends to a run-log file, flushing after every line.
///
/// Writes a banner with the start timestamp on creation and a closing
/// footer when dropped.
pub struct FileSink {
    file: File,
    path: PathBuf,
}

impl FileSink {
    /// Create `log.txt` inside `log_dir` and write the banner header.
    pub fn create(log_dir: &Path) -> io::Result<Self> {
        Self::create_named(log_dir, "log.txt")
    }

    /// Create a named log file inside `log_dir` and write the banner header.
    pub fn create_named(log_dir: &Path, file_name: &str) -> io::Result<Self> {
        let path = log_dir.join(file_name);
        let file = File::create(&path)?;
        let mut sink = Self { file, path };

        let rule = "=".repeat(RULE_WIDTH);
        sink.emit(&rule);
        sink.emit("SIMULATION LOG");
        sink.emit(&format!(
            "Started: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        sink.emit(&rule);
        sink.emit("");
        Ok(sink)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressSink for FileSink {
    fn emit(&mut self, text: &str) {
        // Flush per line so the log is readable while a job is running.
        let _ = writeln!(self.file, "{text}");
        let _ = self.file.flush();
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let rule = "=".repeat(RULE_WIDTH);
        self.emit("");
        self.emit(&rule);
        self.emit(&format!(
            "Log ended: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        self.emit(&rule);
    }
}

/// Sink that captures emitted lines in memory, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Lines emitted so far, in order.
    pub lines: Vec<String>,
}

impl MemorySink {
    /// Create an empty capturing sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl ProgressSink for MemorySink {
    fn emit(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}
