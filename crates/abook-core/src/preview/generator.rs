//! Side-effect-free dry run over a source tree

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use super::types::{IssueKind, IssueSeverity, PreviewAction, PreviewIssue, PreviewOperation, PreviewResult};
use crate::config::{CacheMode, OperationKind, OrganizerConfig};
use crate::dedup::{find_key_collisions, tally, DuplicateDetector, DuplicateKey};
use crate::error::Result;
use crate::extract::TagExtractor;
use crate::metadata::{MetadataExtractor, UnitMetadata};
use crate::organize::operator_for;
use crate::overrides::LIST_SEPARATOR;
use crate::path::{needs_reorganize, path_key, PathGenerator};
use crate::progress::CancelFlag;
use crate::scanner::{AudiobookUnit, DirectoryScanner, ScanOptions};

/// Confidence below which a unit gets a `LowConfidence` warning
pub const DEFAULT_LOW_CONFIDENCE: f64 = 0.5;

/// Knobs for one preview run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    pub operation: OperationKind,
    /// Similarity threshold for the author/narrator grouping
    pub duplicate_threshold: f64,
    pub low_confidence_threshold: f64,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self::from_config(&OrganizerConfig::default())
    }
}

impl PreviewOptions {
    pub fn from_config(config: &OrganizerConfig) -> Self {
        Self {
            operation: config.operation,
            duplicate_threshold: config.duplicate_threshold,
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE,
        }
    }

    pub fn with_operation(mut self, operation: OperationKind) -> Self {
        self.operation = operation;
        self
    }
}

/// Builds [`PreviewResult`]s without touching the filesystem.
///
/// The tag cache is never written, even when the configuration asks for
/// `ReadWrite`.
pub struct PreviewGenerator {
    config: OrganizerConfig,
    tag_extractor: Option<TagExtractor>,
    detector: DuplicateDetector,
    cancellation: Option<CancelFlag>,
}

impl Default for PreviewGenerator {
    fn default() -> Self {
        Self::new(OrganizerConfig::default())
    }
}

impl PreviewGenerator {
    pub fn new(config: OrganizerConfig) -> Self {
        Self {
            config,
            tag_extractor: None,
            detector: DuplicateDetector::new(),
            cancellation: None,
        }
    }

    pub fn with_tag_extractor(mut self, tags: TagExtractor) -> Self {
        self.tag_extractor = Some(tags);
        self
    }

    pub fn with_detector(mut self, detector: DuplicateDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Cancellation applies to the scan phase
    pub fn with_cancellation(mut self, token: CancelFlag) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn extractor(&self, source: &Path) -> MetadataExtractor {
        let cache_mode = match self.config.tag_cache {
            CacheMode::ReadWrite => CacheMode::ReadOnly,
            mode => mode,
        };
        let tags = self
            .tag_extractor
            .clone()
            .unwrap_or_default()
            .with_cache_mode(cache_mode);
        MetadataExtractor::from_config(source, &self.config).with_tag_extractor(tags)
    }

    /// Scan `source`, extract every unit and describe what organizing into
    /// `destination` would do.
    pub fn preview(&self, source: &Path, destination: &Path, options: &PreviewOptions) -> Result<PreviewResult> {
        let start = Instant::now();

        let mut scanner = DirectoryScanner::new(source).with_options(ScanOptions {
            strict_volume_names: self.config.strict_volume_names,
            split_single_file_books: self.config.split_single_file_books,
        });
        if let Some(token) = &self.cancellation {
            scanner = scanner.with_cancellation(token.clone());
        }
        let units = scanner.scan()?;

        let extractor = self.extractor(source);
        let extracted: Vec<(&AudiobookUnit, UnitMetadata)> = units
            .par_iter()
            .map(|unit| (unit, extractor.extract(unit)))
            .collect();

        let generator = PathGenerator::from_config(&self.config);
        let mut result = PreviewResult::new(source.to_path_buf(), destination.to_path_buf(), options.operation);
        result.operations = extracted
            .into_iter()
            .map(|(unit, meta)| self.operation_for(unit, meta, &generator, destination, options))
            .collect();

        mark_duplicate_targets(&mut result.operations);
        result.issues.extend(duplicate_book_issues(&result.operations));
        result.issues.extend(self.similar_name_issues(&result.operations, options.duplicate_threshold));
        result.update_statistics();

        info!(
            "Preview of {}: {} units, {} to process, {} errors in {:.1}s",
            source.display(),
            result.statistics.total_units,
            result.statistics.to_process,
            result.statistics.error_count,
            start.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    fn operation_for(
        &self,
        unit: &AudiobookUnit,
        meta: UnitMetadata,
        generator: &PathGenerator,
        destination: &Path,
        options: &PreviewOptions,
    ) -> PreviewOperation {
        let consolidated = meta.consolidated;
        let target = generator.generate_target_path(&consolidated, destination);
        let mut issues = Vec::new();
        let mut action = PreviewAction::Organize;

        let issue = |severity, kind, message: String| PreviewIssue::new(severity, kind, message).for_unit(unit.path.clone());

        if unit.markers.ignored {
            action = PreviewAction::Skip;
            issues.push(issue(IssueSeverity::Info, IssueKind::Ignored, "Marked with .ignore".to_string()));
        } else if !needs_reorganize(unit.directory_path(), &target) {
            action = PreviewAction::Skip;
            issues.push(issue(
                IssueSeverity::Info,
                IssueKind::AlreadyOrganized,
                "Already at its target".to_string(),
            ));
        }

        if consolidated.title.is_none() {
            issues.push(issue(IssueSeverity::Warning, IssueKind::MissingTitle, "No title found".to_string()));
        }
        if consolidated.author.is_none() {
            issues.push(issue(IssueSeverity::Warning, IssueKind::MissingAuthor, "No author found".to_string()));
        }
        if consolidated.confidence < options.low_confidence_threshold {
            issues.push(issue(
                IssueSeverity::Warning,
                IssueKind::LowConfidence,
                format!("Metadata confidence {:.0}%", consolidated.confidence * 100.0),
            ));
        }
        if let Some(reason) = meta.tag_error {
            issues.push(issue(IssueSeverity::Warning, IssueKind::ExtractionFailed, reason));
        }

        if action == PreviewAction::Organize {
            if target.exists() {
                issues.push(issue(
                    IssueSeverity::Warning,
                    IssueKind::TargetExists,
                    format!("{} already exists", target.display()),
                ));
            }
            if let Err(e) = operator_for(options.operation).can_execute(&unit.path, &target) {
                issues.push(issue(IssueSeverity::Error, IssueKind::UnsupportedOperation, e.to_string()));
            }
        }

        debug!("Preview {} -> {}", unit.path.display(), target.display());
        PreviewOperation {
            source: unit.path.clone(),
            destination: target,
            operation: options.operation,
            action,
            file_count: unit.file_count(),
            size_bytes: unit.total_size,
            is_single_file: unit.is_single_file,
            metadata: consolidated,
            issues,
        }
    }

    fn similar_name_issues(&self, operations: &[PreviewOperation], threshold: f64) -> Vec<PreviewIssue> {
        let roles: [(&str, fn(&PreviewOperation) -> Option<&str>); 2] = [
            ("Author", |op| op.metadata.author()),
            ("Narrator", |op| op.metadata.narrator()),
        ];

        let mut issues = Vec::new();
        for (role, value) in roles {
            let names = tally(
                operations
                    .iter()
                    .filter_map(value)
                    .flat_map(|v| v.split(LIST_SEPARATOR.trim())),
            );
            for group in self.detector.group(&names, threshold) {
                let spellings: Vec<&str> = group.variants.iter().map(|v| v.name.as_str()).collect();
                issues.push(PreviewIssue::new(
                    IssueSeverity::Info,
                    IssueKind::SimilarNames,
                    format!(
                        "{} spellings look alike: {} (most common: {})",
                        role,
                        spellings.join(", "),
                        group.canonical
                    ),
                ));
            }
        }
        issues
    }
}

/// Flag every pair of non-ignored operations sharing a target
fn mark_duplicate_targets(operations: &mut [PreviewOperation]) {
    let mut by_target: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, op) in operations.iter().enumerate() {
        if !op.has_issue(IssueKind::Ignored) {
            by_target.entry(path_key(&op.destination)).or_default().push(i);
        }
    }

    for indices in by_target.values().filter(|g| g.len() > 1) {
        let sources: Vec<PathBuf> = indices.iter().map(|&i| operations[i].source.clone()).collect();
        for &i in indices {
            let others: Vec<String> = sources
                .iter()
                .filter(|s| **s != operations[i].source)
                .map(|s| s.display().to_string())
                .collect();
            let op = &mut operations[i];
            let issue = PreviewIssue::new(
                IssueSeverity::Error,
                IssueKind::DuplicateTarget,
                format!("Same target as {}", others.join(", ")),
            )
            .for_unit(op.source.clone());
            op.issues.push(issue);
        }
    }
}

/// One warning per unit whose normalized author and title were seen before
fn duplicate_book_issues(operations: &[PreviewOperation]) -> Vec<PreviewIssue> {
    let keyed = operations.iter().filter_map(|op| {
        let author = op.metadata.author()?;
        let title = op.metadata.title()?;
        Some((DuplicateKey::new(author, title), op.source.clone()))
    });

    find_key_collisions(keyed)
        .into_iter()
        .map(|m| {
            PreviewIssue::new(
                IssueSeverity::Warning,
                IssueKind::DuplicateBook,
                format!(
                    "{} has the same author and title as {}",
                    m.duplicate.display(),
                    m.existing.display()
                ),
            )
            .for_unit(m.duplicate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extract::{FileTags, TagSource};
    use crate::markers::{set_marker, Marker};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Tags keyed by the audio file's parent folder name
    struct FolderTags(Vec<(&'static str, FileTags)>);

    impl TagSource for FolderTags {
        fn read(&self, path: &Path) -> Result<FileTags> {
            let folder = path
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            self.0
                .iter()
                .find(|(name, _)| *name == folder)
                .map(|(_, tags)| tags.clone())
                .ok_or_else(|| Error::Extraction {
                    path: path.to_path_buf(),
                    reason: "no tags".into(),
                })
        }
    }

    fn tags(artist: &str, album: &str) -> FileTags {
        FileTags {
            artist: Some(artist.into()),
            album: Some(album.into()),
            ..Default::default()
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"audio").unwrap();
    }

    fn generator(source: FolderTags) -> PreviewGenerator {
        PreviewGenerator::default().with_tag_extractor(TagExtractor::new(Arc::new(source)))
    }

    #[test]
    fn test_preview_plans_and_leaves_tree_untouched() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        touch(&src.join("dune/01.mp3"));
        touch(&src.join("hobbit/01.mp3"));
        let dest = temp.path().join("dest");

        let gen = generator(FolderTags(vec![
            ("dune", tags("Frank Herbert", "Dune")),
            ("hobbit", tags("J. R. R. Tolkien", "The Hobbit")),
        ]));
        let result = gen.preview(&src, &dest, &PreviewOptions::default()).unwrap();

        assert_eq!(result.operations.len(), 2);
        assert_eq!(result.operations[0].destination, dest.join("Frank Herbert/Dune"));
        assert_eq!(result.operations[0].action, PreviewAction::Organize);
        assert_eq!(result.plans().len(), 2);
        assert!(!dest.exists());
        assert!(!src.join("dune/mp3tags.json").exists());
        assert!(!result.has_errors());
    }

    #[test]
    fn test_preview_is_repeatable() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        touch(&src.join("a/01.mp3"));
        touch(&src.join("b/01.mp3"));
        let gen = generator(FolderTags(vec![
            ("a", tags("Jon Smith", "One")),
            ("b", tags("Jón Smith", "Two")),
        ]));

        let first = gen.preview(&src, temp.path(), &PreviewOptions::default()).unwrap();
        let second = gen.preview(&src, temp.path(), &PreviewOptions::default()).unwrap();
        assert_eq!(first, second);
        assert!(first.issues.iter().any(|i| i.kind == IssueKind::SimilarNames));
    }

    #[test]
    fn test_duplicate_target_and_book() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        touch(&src.join("copy1/01.mp3"));
        touch(&src.join("copy2/01.mp3"));
        let gen = generator(FolderTags(vec![
            ("copy1", tags("Frank Herbert", "Dune")),
            ("copy2", tags("Frank Herbert", "Dune")),
        ]));

        let result = gen.preview(&src, &temp.path().join("dest"), &PreviewOptions::default()).unwrap();
        assert!(result.operations.iter().all(|op| op.has_issue(IssueKind::DuplicateTarget)));
        let books: Vec<_> = result.issues.iter().filter(|i| i.kind == IssueKind::DuplicateBook).collect();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].unit.as_deref(), Some(src.join("copy2").as_path()));
        assert!(result.has_errors());
    }

    #[test]
    fn test_ignored_and_in_place_units_are_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("lib");
        touch(&root.join("Frank Herbert/Dune/01.mp3"));
        touch(&root.join("skipme/01.mp3"));
        set_marker(&root.join("skipme"), Marker::Ignore, true).unwrap();

        let gen = generator(FolderTags(vec![
            ("Dune", tags("Frank Herbert", "Dune")),
            ("skipme", tags("Someone", "Else")),
        ]));
        let result = gen.preview(&root, &root, &PreviewOptions::default()).unwrap();

        assert_eq!(result.statistics.to_skip, 2);
        assert!(result.operations[0].has_issue(IssueKind::AlreadyOrganized));
        assert!(result.operations[1].has_issue(IssueKind::Ignored));
        assert!(result.plans().is_empty());
    }

    #[test]
    fn test_extraction_failure_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        touch(&src.join("Frank Herbert/Dune/01.mp3"));

        let result = generator(FolderTags(vec![]))
            .preview(&src, &temp.path().join("dest"), &PreviewOptions::default())
            .unwrap();
        let op = &result.operations[0];
        assert!(op.has_issue(IssueKind::ExtractionFailed));
        assert_eq!(op.metadata.title(), Some("Dune"));
        assert_eq!(op.destination, temp.path().join("dest/Frank Herbert/Dune"));
    }
}
