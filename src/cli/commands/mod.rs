//! Command implementations for the CLI.
//!
//! Each submodule implements one subcommand as a fallible function; the
//! thin `execute()` wrappers in [`crate::cli`] handle exit codes.

pub mod cases;
pub mod completions;
pub mod monitor;
pub mod run;
pub mod summary;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Wire Ctrl-C to the shared cancellation flag.
///
/// Installation failure is not fatal; the session just loses graceful
/// interruption.
pub(crate) fn install_interrupt_handler(cancel: &Arc<AtomicBool>) {
    let flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        eprintln!("Warning: Failed to install Ctrl-C handler: {e}");
    }
}
