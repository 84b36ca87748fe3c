//! Cases command implementation.
//!
//! This module implements the `impactrun cases` command for expanding a
//! study definition into per-case files.

use std::path::Path;

use crate::config::{ConfigError, StudyConfig};
use crate::study::{split_into_cases, StudyError};

/// Result type for cases command operations.
pub type CasesCommandResult = Result<(), CasesCommandError>;

/// Error type for cases command operations.
#[derive(Debug, thiserror::Error)]
pub enum CasesCommandError {
    /// The study definition could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Expanding the study failed.
    #[error(transparent)]
    Study(#[from] StudyError),
}

/// Execute the cases command.
pub fn cases(study_path: &Path, out_dir: &Path, timestamp: Option<&str>) -> CasesCommandResult {
    let study = StudyConfig::load(study_path)?;
    let timestamp = timestamp
        .map(str::to_string)
        .unwrap_or_else(default_timestamp);

    let refs = split_into_cases(&study, out_dir, &timestamp)?;
    for case in &refs {
        println!("Created: {}", case.path.display());
    }
    println!();
    println!(
        "SUCCESS: Created {} case files in {}",
        refs.len(),
        out_dir.join(&timestamp).display()
    );
    Ok(())
}

/// Today's date as a YYYYMMDD expansion label.
pub(crate) fn default_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}
