//! Status-line classification and increment parsing.
//!
//! The solver's status file mixes a structured increment table with banner
//! text, header rows, warnings, and terminal status markers. Classification
//! works on trimmed lines with fixed prefix/substring tests; there is no
//! grammar to speak of.

/// Marker line that introduces the structured increment table.
pub const PROGRESS_ANCHOR: &str = "SOLUTION PROGRESS";

const SUCCESS_MARKER: &str = "THE ANALYSIS HAS COMPLETED SUCCESSFULLY";
const ABORT_MARKER: &str = "ANALYSIS ABORTED";
const TERMINATE_MARKER: &str = "ANALYSIS TERMINATED";

/// Terminal status reported by the solver in its status file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// The analysis completed successfully.
    Completed,
    /// The analysis was aborted or terminated.
    Failed,
}

/// Category of one trimmed status-file line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Solver reported a terminal status; takes precedence over everything.
    Status(JobStatus),
    /// Progress-table column header row; suppressed from output.
    Header,
    /// Candidate increment-data line.
    Increment,
    /// Known noise (warnings, frame notices, blank lines); suppressed.
    Noise,
    /// Anything else; emitted verbatim.
    Text,
}

/// Check a line for a terminal status marker.
///
/// Markers may appear anywhere in the file, before or after the progress
/// anchor, so this check never depends on table position.
pub fn completion_status(line: &str) -> Option<JobStatus> {
    if line.contains(SUCCESS_MARKER) {
        Some(JobStatus::Completed)
    } else if line.contains(ABORT_MARKER) || line.contains(TERMINATE_MARKER) {
        Some(JobStatus::Failed)
    } else {
        None
    }
}

fn is_header_line(line: &str) -> bool {
    (line.starts_with("STEP") && line.contains("ORIGIN"))
        || (line.starts_with("STEP") && line.contains("TOTAL") && line.contains("WALL"))
        || (line.starts_with("INCREMENT") && line.contains("TIME"))
}

fn is_increment_line(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
        && line.contains("E+")
        && line.contains("E-")
}

fn is_noise_line(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("INSTANCE WITH CRITICAL")
        || line.starts_with("Output Field Frame")
}

/// Classify one trimmed status-file line.
pub fn classify(line: &str) -> LineClass {
    if let Some(status) = completion_status(line) {
        LineClass::Status(status)
    } else if is_header_line(line) {
        LineClass::Header
    } else if is_increment_line(line) {
        LineClass::Increment
    } else if is_noise_line(line) {
        LineClass::Noise
    } else {
        LineClass::Text
    }
}

/// One parsed progress sample from the increment table.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementRecord {
    /// Increment number.
    pub increment: u64,
    /// Time within the current step, in seconds.
    pub step_time: f64,
    /// Total analysis time, in seconds.
    pub total_time: f64,
    /// Wall-clock time as printed by the solver; display-only.
    pub wall_time: String,
    /// Current stable time increment size.
    pub stable_increment_size: f64,
    /// Kinetic energy at this increment.
    pub kinetic_energy: f64,
    /// Total energy at this increment.
    pub total_energy: f64,
}

impl IncrementRecord {
    /// One-time column header for the formatted table.
    pub fn table_header() -> String {
        format!(
            "{:<8} {:<12} {:<10} {:<12} {:<10} {:<10}",
            "Inc", "Step Time", "Wall Time", "Stable Inc", "KE", "Total E"
        )
    }

    /// Format this record as one table row.
    pub fn format_row(&self) -> String {
        format!(
            "{:<8} {:<12.4e} {:<10} {:<12.4e} {:<10.3e} {:<10.3e}",
            self.increment,
            self.step_time,
            self.wall_time,
            self.stable_increment_size,
            self.kinetic_energy,
            self.total_energy
        )
    }
}

/// Parse an increment-data line into a record.
///
/// Tokens map positionally: 0 increment, 1 step time, 2 total time,
/// 3 wall time (kept as text), 4 stable increment size, 6 kinetic energy,
/// 7 total energy. Token 5 is unused. Returns `None` when the token count
/// is short or any numeric field is malformed; callers emit the raw line
/// instead of failing.
pub fn parse_increment(line: &str) -> Option<IncrementRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 7 {
        return None;
    }

    Some(IncrementRecord {
        increment: tokens[0].parse().ok()?,
        step_time: tokens[1].parse().ok()?,
        total_time: tokens[2].parse().ok()?,
        wall_time: tokens[3].to_string(),
        stable_increment_size: tokens[4].parse().ok()?,
        kinetic_energy: tokens.get(6)?.parse().ok()?,
        total_energy: tokens.get(7)?.parse().ok()?,
    })
}
