//! Preview data: operations, issues and statistics

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::OperationKind;
use crate::metadata::ConsolidatedMetadata;
use crate::organize::OrganizationPlan;
use crate::utils::format_bytes;

/// What would happen to a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewAction {
    /// The unit would be copied/moved/linked to its target
    Organize,
    /// Nothing would happen (already in place, or ignored)
    Skip,
}

impl fmt::Display for PreviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organize => write!(f, "Organize"),
            Self::Skip => write!(f, "Skip"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    MissingTitle,
    MissingAuthor,
    LowConfidence,
    ExtractionFailed,
    /// The target directory already exists
    TargetExists,
    /// The unit already sits at its target
    AlreadyOrganized,
    /// Another unit resolves to the same target
    DuplicateTarget,
    /// Another unit has the same normalized author and title
    DuplicateBook,
    /// Author or narrator spellings that look like the same person
    SimilarNames,
    UnsupportedOperation,
    /// Marked with `.ignore`
    Ignored,
}

/// A problem or remark attached to an operation or to the whole preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewIssue {
    pub severity: IssueSeverity,
    pub kind: IssueKind,
    pub message: String,
    /// Unit the issue is about, `None` for library-level issues
    pub unit: Option<PathBuf>,
}

impl PreviewIssue {
    pub fn new(severity: IssueSeverity, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            unit: None,
        }
    }

    pub fn for_unit(mut self, unit: impl Into<PathBuf>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// One unit in the preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewOperation {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub operation: OperationKind,
    pub action: PreviewAction,
    pub file_count: usize,
    pub size_bytes: u64,
    pub is_single_file: bool,
    pub metadata: ConsolidatedMetadata,
    pub issues: Vec<PreviewIssue>,
}

impl PreviewOperation {
    /// "Author - Title" for listings
    pub fn display_name(&self) -> String {
        match (self.metadata.author(), self.metadata.title()) {
            (Some(author), Some(title)) => format!("{} - {}", author, title),
            (None, Some(title)) => title.to_string(),
            _ => self.source.display().to_string(),
        }
    }

    /// Most severe issue on this operation
    pub fn max_severity(&self) -> Option<IssueSeverity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    /// The plan the organizer would execute for this operation
    pub fn to_plan(&self) -> OrganizationPlan {
        OrganizationPlan::new(
            self.source.clone(),
            self.metadata.clone(),
            self.destination.clone(),
            self.operation,
        )
        .single_file(self.is_single_file)
    }
}

/// Aggregate numbers over a preview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewStatistics {
    pub total_units: usize,
    pub total_files: usize,
    pub total_bytes: u64,
    pub to_process: usize,
    pub to_skip: usize,
    /// Bytes of the units that would be processed
    pub bytes_to_process: u64,
    pub info_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
    pub average_confidence: f64,
}

impl PreviewStatistics {
    /// Human-readable size of the units that would be processed
    pub fn size_display(&self) -> String {
        format_bytes(self.bytes_to_process)
    }
}

/// Everything a preview produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResult {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub operation: OperationKind,
    /// One entry per unit, ordered by source path
    pub operations: Vec<PreviewOperation>,
    /// Library-level issues (duplicates, similar names)
    pub issues: Vec<PreviewIssue>,
    pub statistics: PreviewStatistics,
}

impl PreviewResult {
    pub fn new(source_root: PathBuf, destination_root: PathBuf, operation: OperationKind) -> Self {
        Self {
            source_root,
            destination_root,
            operation,
            operations: Vec::new(),
            issues: Vec::new(),
            statistics: PreviewStatistics::default(),
        }
    }

    /// Recompute the statistics from operations and issues
    pub fn update_statistics(&mut self) {
        let mut stats = PreviewStatistics {
            total_units: self.operations.len(),
            ..Default::default()
        };
        let mut confidence_sum = 0.0;

        for op in &self.operations {
            stats.total_files += op.file_count;
            stats.total_bytes += op.size_bytes;
            confidence_sum += op.metadata.confidence;
            match op.action {
                PreviewAction::Organize => {
                    stats.to_process += 1;
                    stats.bytes_to_process += op.size_bytes;
                }
                PreviewAction::Skip => stats.to_skip += 1,
            }
        }

        let all_issues = self
            .operations
            .iter()
            .flat_map(|op| op.issues.iter())
            .chain(self.issues.iter());
        for issue in all_issues {
            match issue.severity {
                IssueSeverity::Info => stats.info_count += 1,
                IssueSeverity::Warning => stats.warning_count += 1,
                IssueSeverity::Error => stats.error_count += 1,
            }
        }

        if !self.operations.is_empty() {
            stats.average_confidence = confidence_sum / self.operations.len() as f64;
        }
        self.statistics = stats;
    }

    /// Plans for every operation that would organize its unit
    pub fn plans(&self) -> Vec<OrganizationPlan> {
        self.operations
            .iter()
            .filter(|op| op.action == PreviewAction::Organize)
            .map(PreviewOperation::to_plan)
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.statistics.error_count > 0
    }

    /// Operations carrying at least one issue of `severity`
    pub fn operations_with(&self, severity: IssueSeverity) -> impl Iterator<Item = &PreviewOperation> {
        self.operations
            .iter()
            .filter(move |op| op.issues.iter().any(|i| i.severity == severity))
    }
}
