//! Point-in-time view of a job returned to pollers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters and per-URL outcomes of one job at one instant.
///
/// `Default` is the zero snapshot returned for identifiers this process never issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Submitted URLs in submission order (display order only).
    pub urls: Vec<String>,
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    /// URL → outcome string; partial while the job is in flight.
    pub results: BTreeMap<String, String>,
}

impl JobSnapshot {
    /// True once every item has completed. The zero snapshot is terminal.
    pub fn is_terminal(&self) -> bool {
        self.completed >= self.total
    }

    pub fn failed(&self) -> usize {
        self.completed - self.succeeded
    }

    /// Outcome for `url`, if its item has completed.
    pub fn result(&self, url: &str) -> Option<&str> {
        self.results.get(url).map(String::as_str)
    }

    /// Checks `succeeded <= completed <= total`.
    pub fn counters_consistent(&self) -> bool {
        self.succeeded <= self.completed && self.completed <= self.total
    }
}
