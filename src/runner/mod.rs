//! Solver job submission and lifecycle control.
//!
//! This module owns the boundary to the external explicit-dynamics solver:
//! spawning the solver process for a job, monitoring its status file, and
//! shutting the job down when the monitor reports success.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::monitor::{JobMonitor, MonitorError, MonitorOutcome, DEFAULT_POLL_INTERVAL};
use crate::output::ProgressSink;

/// Error type for solver job operations.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The solver command was not found on this system.
    #[error("Solver not found: {0}. Is it installed and in your PATH?")]
    NotFound(String),
    /// Spawning the solver process failed.
    #[error("Failed to spawn solver: {0}")]
    SpawnError(std::io::Error),
    /// The status-file monitor failed.
    #[error(transparent)]
    MonitorError(#[from] MonitorError),
}

/// Configuration for invoking the external solver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Solver command name (e.g. "abaqus").
    pub command: String,
    /// Directory the solver runs in; status files appear here.
    pub work_dir: PathBuf,
    /// Number of CPUs requested for the job.
    pub cpus: u32,
    /// Submit with double precision.
    pub double_precision: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            command: "abaqus".to_string(),
            work_dir: PathBuf::from("."),
            cpus: 1,
            double_precision: true,
        }
    }
}

/// Handle to a submitted solver job.
#[derive(Debug)]
pub struct SolverJob {
    name: String,
    child: Child,
}

impl SolverJob {
    /// The job name this handle controls.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kill the spawned solver process.
    pub fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill()
    }

    /// Block until the spawned process exits; true if it exited cleanly.
    pub fn wait(&mut self) -> std::io::Result<bool> {
        Ok(self.child.wait()?.success())
    }
}

/// Submits solver jobs and drives their run/stop/kill lifecycle.
pub struct JobRunner {
    config: SolverConfig,
    poll_interval: Duration,
    cancel: Arc<AtomicBool>,
}

impl JobRunner {
    /// Create a runner with the given solver configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the monitor's poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Attach a cancellation flag shared with the monitor.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Path of the status file the solver writes for `job_name`.
    pub fn sta_path(&self, job_name: &str) -> PathBuf {
        self.config.work_dir.join(format!("{job_name}.sta"))
    }

    /// Submit a job to the external solver.
    pub fn submit(&self, job_name: &str) -> Result<SolverJob, RunnerError> {
        let mut cmd = Command::new(&self.config.command);
        cmd.arg(format!("job={job_name}"))
            .arg(format!("cpus={}", self.config.cpus));
        if self.config.double_precision {
            cmd.arg("double=both");
        }
        cmd.current_dir(&self.config.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunnerError::NotFound(self.config.command.clone())
            } else {
                RunnerError::SpawnError(e)
            }
        })?;

        Ok(SolverJob {
            name: job_name.to_string(),
            child,
        })
    }

    /// Monitor the job's status file and drive the process accordingly.
    ///
    /// On a successful outcome (natural completion or KE early stop) the
    /// job handle is killed and the out-of-band terminate command is issued
    /// as well, because the handle's own kill does not guarantee the
    /// underlying solver processes have stopped. On a reported failure the
    /// solver is expected to be exiting on its own and nothing is forced.
    /// A cancelled session kills the handle but skips the terminate
    /// command.
    ///
    /// Returns `true` only for a successful outcome.
    pub fn wait_with_monitoring(
        &self,
        job: &mut SolverJob,
        sink: &mut dyn ProgressSink,
    ) -> Result<bool, RunnerError> {
        let sta_path = self.sta_path(&job.name);
        let outcome = JobMonitor::new(sta_path, sink)
            .with_poll_interval(self.poll_interval)
            .with_cancel_flag(self.cancel.clone())
            .run()?;

        match outcome {
            MonitorOutcome::Completed => {
                let _ = job.kill();
                self.terminate(&job.name);
                Ok(true)
            }
            MonitorOutcome::Failed => Ok(false),
            MonitorOutcome::Interrupted => {
                let _ = job.kill();
                Ok(false)
            }
        }
    }

    /// Issue the job-name-scoped terminate command.
    ///
    /// Advisory cleanup: failures are ignored and never propagated.
    fn terminate(&self, job_name: &str) {
        let _ = Command::new(&self.config.command)
            .arg("terminate")
            .arg(format!("job={job_name}"))
            .current_dir(&self.config.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
}
