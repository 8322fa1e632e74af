use crate::error::{CaptureError, RecognitionError};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::time::Instant;

/// Outcome of one capture -> recognize -> match iteration
#[derive(Debug, Default)]
pub struct CycleResult {
    pub raw_text: String,
    /// In desired_outcomes order, no duplicates
    pub matched_outcomes: Vec<String>,
    /// Outcomes that fired an alert this cycle
    pub newly_alerted: Vec<String>,
    pub screenshot: Option<PathBuf>,
    pub capture_error: Option<CaptureError>,
    pub recognition_error: Option<RecognitionError>,
}

impl CycleResult {
    pub fn is_success(&self) -> bool {
        self.capture_error.is_none() && self.recognition_error.is_none()
    }
}

/// Outcomes that have already alerted during this run.
///
/// Grows monotonically; only a process restart clears it.
#[derive(Debug, Default, Clone)]
pub struct AlertState {
    already_alerted: HashSet<String>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alerted(&self, outcome: &str) -> bool {
        self.already_alerted.contains(outcome)
    }

    /// Record an outcome. Returns false if it had already alerted.
    pub fn mark_alerted(&mut self, outcome: &str) -> bool {
        if self.already_alerted.contains(outcome) {
            return false;
        }
        self.already_alerted.insert(outcome.to_string())
    }

    pub fn len(&self) -> usize {
        self.already_alerted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.already_alerted.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.already_alerted.iter().map(String::as_str)
    }
}

/// Debug screenshot timer, owned by the recorder
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DebugTimerState {
    /// None until the first successful write
    pub last_screenshot_time: Option<Instant>,
    /// Files written so far in this run, used to keep names unique
    pub written: u64,
}
