//! impactrun - parametric composite impact studies for explicit-dynamics solvers.
//!
//! This library provides the core functionality for the impactrun CLI tool:
//! expanding a parametric study definition into simulation cases, submitting
//! each case to an external solver, and monitoring the solver's status file
//! to decide when to let a job finish, stop it early, or report failure.

#![deny(missing_docs)]

/// Version string from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod monitor;
pub mod output;
pub mod runner;
pub mod study;
pub mod workspace;

// Re-export key types for convenience
pub use monitor::{monitor_job, JobMonitor, MonitorError, MonitorOutcome};
pub use runner::{JobRunner, SolverConfig};
