//! Summary command implementation.
//!
//! This module implements the `impactrun summary` command for previewing a
//! parametric study without expanding it.

use std::path::Path;

use crate::config::{ConfigError, StudyConfig};
use crate::output::ConsoleSink;
use crate::study::write_study_summary;

/// Result type for summary command operations.
pub type SummaryCommandResult = Result<(), ConfigError>;

/// Execute the summary command.
pub fn summary(study_path: &Path) -> SummaryCommandResult {
    let study = StudyConfig::load(study_path)?;
    let mut sink = ConsoleSink;
    write_study_summary(&study, &mut sink);
    Ok(())
}
