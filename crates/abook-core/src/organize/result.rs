//! Outcome of an organize run

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::plan::PlanState;
use crate::utils::format_bytes;

/// What happened to one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    /// `Completed` or `Failed`
    pub state: PlanState,
    pub files: usize,
    pub bytes: u64,
    pub error: Option<String>,
}

impl UnitOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == PlanState::Completed
    }
}

/// Aggregate over all plans of one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Plans not started because the run was cancelled
    pub skipped: usize,
    pub files: usize,
    pub bytes: u64,
    pub duration: Duration,
    pub outcomes: Vec<UnitOutcome>,
    pub cancelled: bool,
    /// Empty directories removed by the final sweep
    pub removed_directories: usize,
}

impl OrganizationResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: UnitOutcome) {
        if outcome.succeeded() {
            self.succeeded += 1;
            self.files += outcome.files;
            self.bytes += outcome.bytes;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// True when no unit failed
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn size_display(&self) -> String {
        format_bytes(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(state: PlanState, bytes: u64) -> UnitOutcome {
        UnitOutcome {
            source: PathBuf::from("/src/a"),
            target: PathBuf::from("/dest/a"),
            state,
            files: 2,
            bytes,
            error: (state == PlanState::Failed).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_record_counts() {
        let mut result = OrganizationResult::new(3);
        result.record(outcome(PlanState::Completed, 2048));
        assert!(result.success());
        result.record(outcome(PlanState::Failed, 100));

        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.files, 2);
        assert_eq!(result.bytes, 2048);
        assert!(!result.success());
        assert_eq!(result.failures().count(), 1);
        assert_eq!(result.size_display(), "2 KB");
    }
}
