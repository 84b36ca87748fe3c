//! CLI commands and argument handling.
//!
//! This module contains the clap CLI definitions and command implementations.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config;
use crate::monitor::MonitorOutcome;

/// Parametric composite impact studies for explicit-dynamics solvers.
///
/// Expand a parametric study into simulation cases, submit them to the
/// solver, and monitor the status file with an automatic kinetic-energy
/// early stop.
#[derive(Parser, Debug)]
#[command(name = "impactrun")]
#[command(author, version = crate::VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands for impactrun.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand the study definition into per-case files.
    ///
    /// Writes one case{N}.json per parameter combination under
    /// <out-dir>/<timestamp>/, with material presets resolved inline.
    ///
    /// Examples:
    ///   impactrun cases                     # Expand inputs/study.json
    ///   impactrun cases my_study.json       # Expand a specific study
    ///   impactrun cases -o /tmp/cases       # Write somewhere else
    Cases(CasesCommand),

    /// Preview the parametric study without expanding it.
    ///
    /// Prints the total number of configurations and the unique-value
    /// count for each parameter.
    Summary(SummaryCommand),

    /// Expand the study, submit one case, and monitor it.
    ///
    /// Picks a case by number (default 1), submits it to the solver, and
    /// watches its status file until completion, failure, or the
    /// kinetic-energy early stop.
    ///
    /// Examples:
    ///   impactrun run                       # Run case 1 of inputs/study.json
    ///   impactrun run -c 3                  # Run case 3
    ///   impactrun run --no-wait             # Submit and return immediately
    ///   impactrun run -l outputs/run1       # Log to a file instead of stdout
    Run(RunCommand),

    /// Attach to an existing solver status file and monitor it.
    ///
    /// Waits for the file to appear if it does not exist yet. Exit code 0
    /// for a successful outcome, 1 for failure, 130 when interrupted.
    Monitor(MonitorCommand),

    /// Generate shell completions.
    ///
    /// Outputs completion script to stdout for the specified shell.
    /// Example: impactrun completions bash > /etc/bash_completion.d/impactrun
    Completions(CompletionsCommand),
}

/// Arguments for the cases command.
#[derive(Args, Debug)]
pub struct CasesCommand {
    /// Path to the study definition JSON.
    #[arg(default_value = config::STUDY_FILE)]
    pub study: PathBuf,

    /// Directory to write expanded case files into.
    #[arg(short = 'o', long, default_value = config::CASES_DIR)]
    pub out_dir: PathBuf,

    /// Expansion label (defaults to today's date, YYYYMMDD).
    #[arg(long)]
    pub timestamp: Option<String>,
}

/// Arguments for the summary command.
#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// Path to the study definition JSON.
    #[arg(default_value = config::STUDY_FILE)]
    pub study: PathBuf,
}

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Path to the study definition JSON.
    #[arg(default_value = config::STUDY_FILE)]
    pub study: PathBuf,

    /// Case number to run (1-based).
    #[arg(short = 'c', long, default_value_t = 1)]
    pub case: usize,

    /// Directory expanded case files are written into.
    #[arg(long, default_value = config::CASES_DIR)]
    pub cases_dir: PathBuf,

    /// Directory the solver runs in; status files appear here.
    #[arg(short = 'w', long, default_value = config::TEMP_DIR)]
    pub work_dir: PathBuf,

    /// Write progress to a log file in this directory instead of stdout.
    #[arg(short = 'l', long)]
    pub log_dir: Option<PathBuf>,

    /// Solver command to invoke.
    #[arg(long, env = "IMPACTRUN_SOLVER", default_value = "abaqus")]
    pub solver: String,

    /// Number of CPUs to request for the job.
    #[arg(long, default_value_t = 1)]
    pub cpus: u32,

    /// Status-file poll interval, in seconds.
    #[arg(short = 'i', long, default_value_t = 5)]
    pub interval: u64,

    /// Submit the job and return without monitoring.
    #[arg(long)]
    pub no_wait: bool,
}

/// Arguments for the monitor command.
#[derive(Args, Debug)]
pub struct MonitorCommand {
    /// Path to the solver status (.sta) file.
    pub sta_file: PathBuf,

    /// Poll interval, in seconds.
    #[arg(short = 'i', long, default_value_t = 5)]
    pub interval: u64,

    /// Write progress to a log file in this directory instead of stdout.
    #[arg(short = 'l', long)]
    pub log_dir: Option<PathBuf>,
}

/// Arguments for the completions command.
#[derive(Args, Debug)]
pub struct CompletionsCommand {
    /// Shell to generate completions for.
    #[arg(value_parser = ["bash", "zsh", "fish"])]
    pub shell: String,
}

// ============================================================================
// Command implementations
// ============================================================================

impl CasesCommand {
    /// Execute the cases command.
    pub fn execute(&self) {
        match commands::cases::cases(&self.study, &self.out_dir, self.timestamp.as_deref()) {
            Ok(()) => {}
            Err(e) => {
                eprintln!("\x1b[31mError:\x1b[0m {e}");
                std::process::exit(1);
            }
        }
    }
}

impl SummaryCommand {
    /// Execute the summary command.
    pub fn execute(&self) {
        match commands::summary::summary(&self.study) {
            Ok(()) => {}
            Err(e) => {
                eprintln!("\x1b[31mError:\x1b[0m {e}");
                std::process::exit(1);
            }
        }
    }
}

impl RunCommand {
    /// Execute the run command.
    pub fn execute(&self) {
        let opts = commands::run::RunOptions {
            study_path: &self.study,
            case: self.case,
            cases_dir: &self.cases_dir,
            work_dir: &self.work_dir,
            log_dir: self.log_dir.as_deref(),
            solver: &self.solver,
            cpus: self.cpus,
            interval_secs: self.interval,
            no_wait: self.no_wait,
        };
        match commands::run::run(&opts) {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("\x1b[31mError:\x1b[0m {e}");
                std::process::exit(1);
            }
        }
    }
}

impl MonitorCommand {
    /// Execute the monitor command.
    pub fn execute(&self) {
        match commands::monitor::monitor(&self.sta_file, self.interval, self.log_dir.as_deref()) {
            Ok(MonitorOutcome::Completed) => {}
            Ok(MonitorOutcome::Failed) => std::process::exit(1),
            Ok(MonitorOutcome::Interrupted) => std::process::exit(130),
            Err(e) => {
                eprintln!("\x1b[31mError:\x1b[0m {e}");
                std::process::exit(1);
            }
        }
    }
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self) {
        match commands::completions::completions(&self.shell) {
            Ok(()) => {}
            Err(e) => {
                eprintln!("\x1b[31mError:\x1b[0m {e}");
                std::process::exit(1);
            }
        }
    }
}
