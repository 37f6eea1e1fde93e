//! What the organizer is asked to do for one unit

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::OperationKind;
use crate::metadata::ConsolidatedMetadata;

/// One unit's source, target and operation.
///
/// For single-file units `source` is the file and `target` the directory
/// the file is placed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationPlan {
    pub source: PathBuf,
    pub metadata: ConsolidatedMetadata,
    pub target: PathBuf,
    pub operation: OperationKind,
    pub is_single_file: bool,
}

impl OrganizationPlan {
    pub fn new(
        source: PathBuf,
        metadata: ConsolidatedMetadata,
        target: PathBuf,
        operation: OperationKind,
    ) -> Self {
        Self {
            source,
            metadata,
            target,
            operation,
            is_single_file: false,
        }
    }

    pub fn single_file(mut self, is_single_file: bool) -> Self {
        self.is_single_file = is_single_file;
        self
    }

    /// Last component of the source, for progress display
    pub fn unit_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Lifecycle of a plan during one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanState {
    Pending,
    /// Collecting the unit's files
    Preparing,
    /// Checking the operation can run
    Validating,
    Executing,
    Completed,
    Failed,
}

impl PlanState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Preparing => write!(f, "Preparing"),
            Self::Validating => write!(f, "Validating"),
            Self::Executing => write!(f, "Executing"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}
