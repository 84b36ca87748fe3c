//! Run command implementation.
//!
//! This module implements the `impactrun run` command: expand the study,
//! pick one case, submit it to the solver, and monitor the job to
//! completion.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, StudyConfig};
use crate::output::{ConsoleSink, FileSink, ProgressSink};
use crate::runner::{JobRunner, RunnerError, SolverConfig};
use crate::study::{split_into_cases, CaseConfig, ModelInput, StudyError};
use crate::workspace;

/// Result type for run command operations. `Ok(true)` means the job
/// reached a successful outcome (or was submitted with `--no-wait`).
pub type RunCommandResult = Result<bool, RunCommandError>;

/// Error type for run command operations.
#[derive(Debug, thiserror::Error)]
pub enum RunCommandError {
    /// The study definition could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Expanding or loading a case failed.
    #[error(transparent)]
    Study(#[from] StudyError),
    /// Submitting or monitoring the solver job failed.
    #[error(transparent)]
    Runner(#[from] RunnerError),
    /// A working or log directory could not be prepared.
    #[error("Failed to prepare directory: {0}")]
    DirSetup(#[from] std::io::Error),
    /// The requested case number is outside the expanded study.
    #[error("Case {requested} does not exist; study expands to {available} cases")]
    NoSuchCase {
        /// The 1-based case number asked for.
        requested: usize,
        /// How many cases the study expands to.
        available: usize,
    },
}

/// Everything the run command needs, gathered from CLI arguments.
#[derive(Debug)]
pub struct RunOptions<'a> {
    /// Path to the study definition JSON.
    pub study_path: &'a Path,
    /// 1-based case number to run.
    pub case: usize,
    /// Directory expanded case files are written into.
    pub cases_dir: &'a Path,
    /// Directory the solver runs in.
    pub work_dir: &'a Path,
    /// Directory for the run log and model summary; console when absent.
    pub log_dir: Option<&'a Path>,
    /// Solver command name.
    pub solver: &'a str,
    /// CPUs requested for the job.
    pub cpus: u32,
    /// Monitor poll interval, in seconds.
    pub interval_secs: u64,
    /// Submit and return without monitoring.
    pub no_wait: bool,
}

/// Execute the run command.
pub fn run(opts: &RunOptions) -> RunCommandResult {
    let study = StudyConfig::load(opts.study_path)?;
    let timestamp = super::cases::default_timestamp();
    let refs = split_into_cases(&study, opts.cases_dir, &timestamp)?;

    let index = opts
        .case
        .checked_sub(1)
        .filter(|i| *i < refs.len())
        .ok_or(RunCommandError::NoSuchCase {
            requested: opts.case,
            available: refs.len(),
        })?;
    let case = CaseConfig::load(&refs[index].path)?;
    let model = ModelInput::from_case(&case)?;

    workspace::create_directory(opts.work_dir)?;
    let mut sink: Box<dyn ProgressSink> = match opts.log_dir {
        Some(dir) => {
            workspace::create_directory(dir)?;
            model.write_summary(dir)?;
            Box::new(FileSink::create(dir)?)
        }
        None => Box::new(ConsoleSink),
    };

    sink.section(&format!("JOB {}", model.job_name()));
    sink.emit(&format!("Study: {}", case.study_name));
    sink.emit(&format!("Case: {} of {}", opts.case, refs.len()));
    sink.emit(&format!("Impact energy: {:.1} J", model.impact_energy_j()));

    let cancel = Arc::new(AtomicBool::new(false));
    super::install_interrupt_handler(&cancel);

    let runner = JobRunner::new(SolverConfig {
        command: opts.solver.to_string(),
        work_dir: opts.work_dir.to_path_buf(),
        cpus: opts.cpus,
        double_precision: true,
    })
    .with_poll_interval(Duration::from_secs(opts.interval_secs))
    .with_cancel_flag(cancel);

    let mut job = runner.submit(&model.job_name())?;
    if opts.no_wait {
        sink.emit("");
        sink.emit(&format!("Submitted job {}; not waiting.", job.name()));
        return Ok(true);
    }

    let ok = runner.wait_with_monitoring(&mut job, sink.as_mut())?;
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::SAMPLE_STUDY;
    use std::fs;
    use tempfile::TempDir;

    fn write_study(temp: &TempDir) -> std::path::PathBuf {
        let path = temp.path().join("study.json");
        fs::write(&path, SAMPLE_STUDY).unwrap();
        path
    }

    fn options<'a>(study_path: &'a Path, temp: &'a TempDir) -> RunOptions<'a> {
        RunOptions {
            study_path,
            case: 1,
            cases_dir: temp.path(),
            work_dir: temp.path(),
            log_dir: None,
            solver: "true",
            cpus: 1,
            interval_secs: 0,
            no_wait: true,
        }
    }

    #[test]
    fn test_run_no_wait_submits_and_returns() {
        let temp = TempDir::new().unwrap();
        let study_path = write_study(&temp);
        let opts = options(&study_path, &temp);

        assert!(run(&opts).unwrap());
    }

    #[test]
    fn test_run_rejects_out_of_range_case() {
        let temp = TempDir::new().unwrap();
        let study_path = write_study(&temp);

        let mut opts = options(&study_path, &temp);
        opts.case = 99;
        let err = run(&opts).unwrap_err();
        assert!(matches!(
            err,
            RunCommandError::NoSuchCase {
                requested: 99,
                available: 4
            }
        ));

        opts.case = 0;
        assert!(matches!(
            run(&opts).unwrap_err(),
            RunCommandError::NoSuchCase { .. }
        ));
    }

    #[test]
    fn test_run_writes_model_summary_to_log_dir() {
        let temp = TempDir::new().unwrap();
        let study_path = write_study(&temp);
        let log_dir = temp.path().join("logs");

        let mut opts = options(&study_path, &temp);
        opts.log_dir = Some(&log_dir);
        assert!(run(&opts).unwrap());
        assert!(log_dir.join("config_summary.txt").is_file());
    }

    #[test]
    fn test_run_with_missing_solver() {
        let temp = TempDir::new().unwrap();
        let study_path = write_study(&temp);

        let mut opts = options(&study_path, &temp);
        opts.solver = "nonexistent_solver_command_12345";
        assert!(matches!(
            run(&opts).unwrap_err(),
            RunCommandError::Runner(RunnerError::NotFound(_))
        ));
    }
}
