//! Monitor command implementation.
//!
//! This module implements the `impactrun monitor` command for attaching to
//! an existing solver status file.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::monitor::{JobMonitor, MonitorError, MonitorOutcome};
use crate::output::{ConsoleSink, FileSink, ProgressSink};
use crate::workspace;

/// Result type for monitor command operations.
pub type MonitorCommandResult = Result<MonitorOutcome, MonitorCommandError>;

/// Error type for monitor command operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorCommandError {
    /// The log directory could not be prepared.
    #[error("Failed to prepare log directory: {0}")]
    LogSetup(std::io::Error),
    /// The status-file monitor failed.
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// Execute the monitor command.
pub fn monitor(
    sta_path: &Path,
    interval_secs: u64,
    log_dir: Option<&Path>,
) -> MonitorCommandResult {
    let cancel = Arc::new(AtomicBool::new(false));
    super::install_interrupt_handler(&cancel);

    let mut sink: Box<dyn ProgressSink> = match log_dir {
        Some(dir) => {
            workspace::create_directory(dir).map_err(MonitorCommandError::LogSetup)?;
            Box::new(FileSink::create(dir).map_err(MonitorCommandError::LogSetup)?)
        }
        None => Box::new(ConsoleSink),
    };

    let outcome = JobMonitor::new(sta_path.to_path_buf(), sink.as_mut())
        .with_poll_interval(Duration::from_secs(interval_secs))
        .with_cancel_flag(cancel)
        .run()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_monitor_completed_file() {
        let temp = TempDir::new().unwrap();
        let sta = temp.path().join("job.sta");
        fs::write(&sta, "THE ANALYSIS HAS COMPLETED SUCCESSFULLY\n").unwrap();

        let outcome = monitor(&sta, 0, None).unwrap();
        assert_eq!(outcome, MonitorOutcome::Completed);
    }

    #[test]
    fn test_monitor_writes_log_file() {
        let temp = TempDir::new().unwrap();
        let sta = temp.path().join("job.sta");
        fs::write(&sta, "*** ANALYSIS ABORTED\n").unwrap();
        let log_dir = temp.path().join("logs");

        let outcome = monitor(&sta, 0, Some(&log_dir)).unwrap();
        assert_eq!(outcome, MonitorOutcome::Failed);

        let entries: Vec<_> = fs::read_dir(&log_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
