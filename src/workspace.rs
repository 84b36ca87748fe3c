//! Workspace directory management.
//!
//! Helpers for the `outputs/` and `temp/` trees a study run works in.
//! Deletion helpers are best-effort: failures downgrade to warnings so a
//! locked scratch file never aborts a run.

use std::fs;
use std::io;
use std::path::Path;

/// Create a directory (and any missing parents) if it does not exist.
pub fn create_directory(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Remove all contents of a directory, keeping the directory itself.
///
/// Individual deletions that fail are reported as warnings and skipped.
pub fn clean_directory(path: &Path) -> io::Result<()> {
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let item = entry.path();
        let result = if item.is_dir() {
            fs::remove_dir_all(&item)
        } else {
            fs::remove_file(&item)
        };
        if let Err(e) = result {
            eprintln!("Warning: Failed to delete {}: {e}", item.display());
        }
    }
    Ok(())
}

/// Remove one file from a directory if present; absence is fine.
pub fn remove_file_in(dir: &Path, file_name: &str) {
    let path = dir.join(file_name);
    if path.is_file() {
        if let Err(e) = fs::remove_file(&path) {
            eprintln!("Warning: Failed to delete {}: {e}", path.display());
        }
    }
}

/// Remove an entire directory tree if present.
pub fn remove_directory(path: &Path) {
    if path.is_dir() {
        if let Err(e) = fs::remove_dir_all(path) {
            eprintln!("Warning: Failed to delete directory {}: {e}", path.display());
        }
    }
}
