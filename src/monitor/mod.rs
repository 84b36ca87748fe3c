//! Solver status-file monitoring.
//!
//! Polls the continuously growing `.sta` file written by the external
//! solver, incrementally parses increment records, applies the
//! kinetic-energy early-stop heuristic, and reports a terminal outcome.
//!
//! The whole file is re-read on every poll: the producer may extend or
//! rewrite it between polls, so correctness relies on the monotonic
//! consumed-line index, never on byte offsets. A partially written final
//! line simply fails classification this poll and is re-read whole on the
//! next one.

mod classifier;
mod tracker;

pub use classifier::{
    classify, completion_status, parse_increment, IncrementRecord, JobStatus, LineClass,
    PROGRESS_ANCHOR,
};
pub use tracker::{KineticEnergyTracker, Verdict};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::output::ProgressSink;

/// Default delay between status-file polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Number of fixed header rows between the progress anchor and the data.
const ANCHOR_HEADER_ROWS: usize = 2;

/// Terminal result of one monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Natural completion, or the early-stop heuristic fired.
    Completed,
    /// The solver reported an abort or termination.
    Failed,
    /// The caller's cancellation flag was raised.
    Interrupted,
}

/// Error type for monitoring operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Reading the status file failed with something other than not-found.
    /// (Absence is a retryable condition, not an error.)
    #[error("Failed to read status file: {0}")]
    ReadError(#[from] io::Error),
}

/// Per-session bookkeeping for the poll loop.
#[derive(Debug, Default)]
struct MonitorState {
    /// Line index where increment data begins (two past the anchor).
    section_start: Option<usize>,
    /// Index of the first line not yet consumed; only ever advances.
    next_line: usize,
    /// Whether the one-time column header has been emitted.
    header_emitted: bool,
}

/// Polling monitor for one solver job's status file.
pub struct JobMonitor<'a> {
    sta_path: PathBuf,
    poll_interval: Duration,
    cancel: Arc<AtomicBool>,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> JobMonitor<'a> {
    /// Create a monitor for the given status file, emitting to `sink`.
    pub fn new(sta_path: impl Into<PathBuf>, sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            sta_path: sta_path.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: Arc::new(AtomicBool::new(false)),
            sink,
        }
    }

    /// Override the fixed delay between polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Attach a cancellation flag; raising it ends the session with
    /// [`MonitorOutcome::Interrupted`] on the next poll.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the monitoring session until a terminal condition.
    ///
    /// Polls at the fixed interval with no retry limit and no timeout: an
    /// absent or stalled status file means indefinite polling unless the
    /// cancellation flag is raised.
    pub fn run(&mut self) -> Result<MonitorOutcome, MonitorError> {
        let mut state = MonitorState::default();
        let mut tracker = KineticEnergyTracker::new();

        loop {
            if self.cancel.load(Ordering::SeqCst) {
                return Ok(MonitorOutcome::Interrupted);
            }

            let lines = match read_status_lines(&self.sta_path) {
                Ok(lines) => lines,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    self.sink.emit(&format!(
                        "Status file not found: {}. Waiting for file to be created...",
                        self.sta_path.display()
                    ));
                    self.wait();
                    continue;
                }
                Err(e) => return Err(MonitorError::ReadError(e)),
            };

            if let Some(outcome) = consume_lines(&mut state, &mut tracker, &lines, self.sink) {
                return Ok(outcome);
            }

            self.wait();
        }
    }

    fn wait(&self) {
        if !self.poll_interval.is_zero() {
            thread::sleep(self.poll_interval);
        }
    }
}

/// Process the lines of one poll, skipping everything already consumed.
///
/// Returns a terminal outcome as soon as one is detected.
fn consume_lines(
    state: &mut MonitorState,
    tracker: &mut KineticEnergyTracker,
    lines: &[String],
    sink: &mut dyn ProgressSink,
) -> Option<MonitorOutcome> {
    if state.section_start.is_none() {
        state.section_start = lines
            .iter()
            .position(|l| l.contains(PROGRESS_ANCHOR))
            .map(|i| i + 1 + ANCHOR_HEADER_ROWS);
    }

    for i in state.next_line..lines.len() {
        let line = lines[i].trim();

        // Terminal markers take precedence everywhere, even before the
        // table anchor or interleaved with unparseable text.
        if let Some(status) = completion_status(line) {
            return Some(report_status(status, sink));
        }

        // Everything before the anchor (and its two header rows) is ignored.
        if state.section_start.map_or(true, |start| i < start) {
            state.next_line = i + 1;
            continue;
        }

        match classify(line) {
            // Completion already handled above
            LineClass::Status(_) => {}
            LineClass::Header | LineClass::Noise => {}
            LineClass::Increment => match parse_increment(line) {
                Some(record) => {
                    if !state.header_emitted {
                        sink.section(&IncrementRecord::table_header());
                        state.header_emitted = true;
                    }
                    sink.emit(&record.format_row());

                    if let Verdict::Stop { minimum, current } =
                        tracker.observe(record.kinetic_energy)
                    {
                        sink.emit("");
                        sink.emit(&format!(
                            "Kinetic energy is increasing (min: {minimum:.3e}, current: {current:.3e})"
                        ));
                        sink.emit("Stopping analysis - minimum energy state reached.");
                        return Some(MonitorOutcome::Completed);
                    }
                }
                // Malformed data-shaped line: pass it through untouched
                None => sink.emit(line),
            },
            LineClass::Text => sink.emit(line),
        }

        state.next_line = i + 1;
    }

    None
}

fn report_status(status: JobStatus, sink: &mut dyn ProgressSink) -> MonitorOutcome {
    sink.emit("");
    match status {
        JobStatus::Completed => {
            sink.emit("Job completed successfully.");
            MonitorOutcome::Completed
        }
        JobStatus::Failed => {
            sink.emit("Job did not complete successfully.");
            MonitorOutcome::Failed
        }
    }
}

/// Read the full current contents of the status file as lines.
///
/// Pure read, whole file every time; a missing file surfaces as the
/// `NotFound` error kind for the caller to retry on.
fn read_status_lines(path: &Path) -> io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents.lines().map(str::to_string).collect())
}

/// Monitor a job's status file until the solver finishes or the early-stop
/// heuristic fires.
///
/// Returns `true` for a successful completion (including an early stop),
/// `false` for a reported failure or a cancelled session.
pub fn monitor_job(sta_path: &Path, sink: &mut dyn ProgressSink) -> Result<bool, MonitorError> {
    let outcome = JobMonitor::new(sta_path, sink).run()?;
    Ok(outcome == MonitorOutcome::Completed)
}
