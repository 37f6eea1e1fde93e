//! Executes organization plans unit by unit

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use super::cleanup::{remove_empty_dirs, remove_empty_tree};
use super::operator::{operator_for, FileOperator};
use super::plan::{OrganizationPlan, PlanState};
use super::result::{OrganizationResult, UnitOutcome};
use crate::config::{OperationKind, OrganizerConfig, VerifyMode};
use crate::error::{Error, Result};
use crate::extract::TagExtractor;
use crate::metadata::MetadataExtractor;
use crate::path::{needs_reorganize, path_key, PathGenerator};
use crate::progress::{is_cancelled, CancelFlag};
use crate::scanner::{is_audio_file, DirectoryScanner, ScanOptions};

/// Progress information for organize callbacks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeProgress {
    /// Zero-based index of the current unit
    pub unit_index: usize,
    pub unit_total: usize,
    pub unit_name: String,
    pub current_file: Option<PathBuf>,
    /// Bytes done within the current unit
    pub bytes_done: u64,
    pub bytes_total: u64,
    /// Whole-run completion in `[0, 100]`
    pub percent: f64,
    pub state: PlanState,
}

/// Progress callback for organizing
pub type OrganizeProgressCallback = Box<dyn Fn(&OrganizeProgress) + Send + Sync>;

/// One file of a unit and where it goes
#[derive(Debug, Clone)]
struct FileTask {
    source: PathBuf,
    destination: PathBuf,
    size: u64,
}

/// Runs plans through the matching [`FileOperator`]
pub struct FileOrganizer {
    config: OrganizerConfig,
    operators: Vec<Box<dyn FileOperator>>,
    tag_extractor: Option<TagExtractor>,
    progress_callback: Option<OrganizeProgressCallback>,
    cancellation: Option<CancelFlag>,
}

impl Default for FileOrganizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FileOrganizer {
    pub fn new() -> Self {
        Self::from_config(OrganizerConfig::default())
    }

    pub fn from_config(config: OrganizerConfig) -> Self {
        Self {
            config,
            operators: OperationKind::ALL.into_iter().map(operator_for).collect(),
            tag_extractor: None,
            progress_callback: None,
            cancellation: None,
        }
    }

    pub fn with_verify(mut self, mode: VerifyMode) -> Self {
        self.config.verify = mode;
        self
    }

    pub fn with_cleanup(mut self, enabled: bool) -> Self {
        self.config.cleanup_empty_dirs = enabled;
        self
    }

    /// Replace the stock operator of the same kind
    pub fn with_operator(mut self, operator: Box<dyn FileOperator>) -> Self {
        let kind = operator.kind();
        self.operators.retain(|o| o.kind() != kind);
        self.operators.push(operator);
        self
    }

    /// Tag extractor used when [`reorganize`](Self::reorganize) rebuilds metadata
    pub fn with_tag_extractor(mut self, tags: TagExtractor) -> Self {
        self.tag_extractor = Some(tags);
        self
    }

    pub fn with_progress_callback(mut self, callback: OrganizeProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_cancellation(mut self, token: CancelFlag) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        is_cancelled(self.cancellation.as_ref())
    }

    fn operator(&self, kind: OperationKind) -> Result<&dyn FileOperator> {
        self.operators
            .iter()
            .find(|o| o.kind() == kind)
            .map(|o| o.as_ref())
            .ok_or_else(|| Error::UnsupportedOperation {
                operation: kind.to_string(),
                reason: "no operator registered".to_string(),
            })
    }

    /// Reject plan lists where two units resolve to the same target.
    ///
    /// Targets are compared case-insensitively, since the destination may
    /// live on a case-insensitive filesystem.
    pub fn validate_plans(plans: &[OrganizationPlan]) -> Result<()> {
        let mut by_target: BTreeMap<String, Vec<&OrganizationPlan>> = BTreeMap::new();
        for plan in plans {
            by_target.entry(path_key(&plan.target)).or_default().push(plan);
        }

        match by_target.into_values().find(|group| group.len() > 1) {
            Some(group) => Err(Error::PathCollision {
                target: group[0].target.clone(),
                sources: group.iter().map(|p| p.source.clone()).collect(),
            }),
            None => Ok(()),
        }
    }

    /// Execute `plans` in order.
    ///
    /// Duplicate targets abort before anything is touched. After that a
    /// failing unit is recorded and the batch continues. Cancellation is
    /// honoured between units; remaining plans are counted as skipped.
    /// Empty directories under `source_root` are swept after a move run
    /// when cleanup is enabled.
    pub fn organize(&self, plans: &[OrganizationPlan], source_root: &Path) -> Result<OrganizationResult> {
        let start = Instant::now();
        Self::validate_plans(plans)?;

        let total = plans.len();
        let mut result = OrganizationResult::new(total);
        info!("Organizing {} units", total);

        for (index, plan) in plans.iter().enumerate() {
            if self.is_cancelled() {
                info!("Organize cancelled by user at unit {}/{}", index, total);
                result.cancelled = true;
                result.skipped = total - index;
                break;
            }
            let outcome = self.run_plan(index, total, plan);
            result.record(outcome);
        }

        let moved_any = plans
            .iter()
            .zip(&result.outcomes)
            .any(|(plan, outcome)| plan.operation.removes_source() && outcome.succeeded());
        if self.config.cleanup_empty_dirs && moved_any && source_root.is_dir() {
            result.removed_directories = remove_empty_dirs(source_root);
        }

        result.duration = start.elapsed();
        info!(
            "Organized {}/{} units ({} failed, {} skipped) in {:.1}s",
            result.succeeded,
            result.total,
            result.failed,
            result.skipped,
            result.duration.as_secs_f64()
        );
        Ok(result)
    }

    /// Move every misplaced unit of a library to its computed target
    pub fn reorganize(&self, library_root: &Path) -> Result<OrganizationResult> {
        let plans = self.plan_reorganize(library_root)?;
        self.organize(&plans, library_root)
    }

    /// Move plans for the units of `library_root` whose target differs
    /// from their current location. `.ignore`-marked units are left alone.
    pub fn plan_reorganize(&self, library_root: &Path) -> Result<Vec<OrganizationPlan>> {
        let mut scanner = DirectoryScanner::new(library_root).with_options(ScanOptions {
            strict_volume_names: self.config.strict_volume_names,
            split_single_file_books: self.config.split_single_file_books,
        });
        if let Some(token) = &self.cancellation {
            scanner = scanner.with_cancellation(token.clone());
        }
        let units = scanner.scan()?;

        let mut extractor = MetadataExtractor::from_config(library_root, &self.config);
        if let Some(tags) = &self.tag_extractor {
            extractor = extractor.with_tag_extractor(tags.clone());
        }
        let generator = PathGenerator::from_config(&self.config);

        let plans: Vec<OrganizationPlan> = units
            .par_iter()
            .filter(|unit| {
                if unit.markers.ignored {
                    debug!("Ignoring {}", unit.path.display());
                }
                !unit.markers.ignored
            })
            .filter_map(|unit| {
                let meta = extractor.extract(unit);
                let target = generator.generate_target_path(&meta.consolidated, library_root);
                needs_reorganize(unit.directory_path(), &target).then(|| {
                    OrganizationPlan::new(
                        unit.path.clone(),
                        meta.consolidated,
                        target,
                        OperationKind::Move,
                    )
                    .single_file(unit.is_single_file)
                })
            })
            .collect();

        info!("{} of {} units are misplaced", plans.len(), units.len());
        Ok(plans)
    }

    fn run_plan(&self, index: usize, total: usize, plan: &OrganizationPlan) -> UnitOutcome {
        let mut outcome = UnitOutcome {
            source: plan.source.clone(),
            target: plan.target.clone(),
            state: PlanState::Pending,
            files: 0,
            bytes: 0,
            error: None,
        };

        match self.execute_plan(index, total, plan) {
            Ok((files, bytes)) => {
                outcome.state = PlanState::Completed;
                outcome.files = files;
                outcome.bytes = bytes;
                debug!("Organized {} -> {}", plan.source.display(), plan.target.display());
            }
            Err(e) => {
                error!("Failed to organize {}: {}", plan.source.display(), e);
                outcome.state = PlanState::Failed;
                outcome.error = Some(e.to_string());
            }
        }

        self.report(index, total, plan, None, outcome.bytes, outcome.bytes, outcome.state);
        outcome
    }

    fn execute_plan(&self, index: usize, total: usize, plan: &OrganizationPlan) -> Result<(usize, u64)> {
        self.report(index, total, plan, None, 0, 0, PlanState::Preparing);
        let operator = self.operator(plan.operation)?;
        let files = collect_files(plan)?;
        let bytes_total: u64 = files.iter().map(|f| f.size).sum();

        self.report(index, total, plan, None, 0, bytes_total, PlanState::Validating);
        operator.can_execute(&plan.source, &plan.target)?;

        let mut bytes_before = 0u64;
        for task in &files {
            self.report(
                index,
                total,
                plan,
                Some(&task.destination),
                bytes_before,
                bytes_total,
                PlanState::Executing,
            );
            let mut on_progress = |done: u64| {
                self.report(
                    index,
                    total,
                    plan,
                    Some(&task.destination),
                    bytes_before + done,
                    bytes_total,
                    PlanState::Executing,
                );
            };
            self.place_file(operator, task, &mut on_progress)?;
            bytes_before += task.size;
        }

        if plan.operation.removes_source() && !plan.is_single_file {
            remove_empty_tree(&plan.source);
        }
        Ok((files.len(), bytes_total))
    }

    /// Place one file, skipping it when a byte-identical copy is already there
    fn place_file(&self, operator: &dyn FileOperator, task: &FileTask, progress: &mut dyn FnMut(u64)) -> Result<()> {
        if fs::symlink_metadata(&task.destination).is_ok() {
            let existing = fs::metadata(&task.destination).map(|m| m.len()).ok();
            let identical = existing == Some(task.size)
                && file_checksum(&task.source)? == file_checksum(&task.destination)?;
            if !identical {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!(
                        "{} already exists with different content",
                        task.destination.display()
                    ),
                )));
            }
            debug!("Already in place: {}", task.destination.display());
            if operator.kind().removes_source() {
                fs::remove_file(&task.source)?;
            }
            progress(task.size);
            return Ok(());
        }

        let expected = match self.config.verify {
            VerifyMode::Checksum => Some(file_checksum(&task.source)?),
            _ => None,
        };

        operator.execute(&task.source, &task.destination, progress)?;
        self.verify(task, expected)
    }

    fn verify(&self, task: &FileTask, expected: Option<blake3::Hash>) -> Result<()> {
        if self.config.verify == VerifyMode::None {
            return Ok(());
        }

        let written = fs::metadata(&task.destination)?.len();
        if written != task.size {
            return Err(Error::Other(format!(
                "Size mismatch for {}: expected {} bytes, found {}",
                task.destination.display(),
                task.size,
                written
            )));
        }

        if let Some(expected) = expected {
            let actual = file_checksum(&task.destination)?;
            if actual != expected {
                return Err(Error::Other(format!(
                    "Checksum mismatch for {}",
                    task.destination.display()
                )));
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn report(
        &self,
        unit_index: usize,
        unit_total: usize,
        plan: &OrganizationPlan,
        current_file: Option<&Path>,
        bytes_done: u64,
        bytes_total: u64,
        state: PlanState,
    ) {
        let Some(callback) = &self.progress_callback else {
            return;
        };

        let unit_fraction = if state.is_finished() {
            1.0
        } else if bytes_total > 0 {
            bytes_done as f64 / bytes_total as f64
        } else {
            0.0
        };
        let percent = if unit_total == 0 {
            100.0
        } else {
            ((unit_index as f64 + unit_fraction) / unit_total as f64 * 100.0).min(100.0)
        };

        callback(&OrganizeProgress {
            unit_index,
            unit_total,
            unit_name: plan.unit_name(),
            current_file: current_file.map(Path::to_path_buf),
            bytes_done,
            bytes_total,
            percent,
            state,
        });
    }
}

/// Every file the plan has to place, with destinations.
///
/// Directory units keep their relative layout so volume folders survive.
/// Files already under the target are left out, which matters when the
/// target lies inside the source directory. When the unit holds audio of its
/// own, subfolders with audio are separate units and are left out too.
fn collect_files(plan: &OrganizationPlan) -> Result<Vec<FileTask>> {
    if plan.is_single_file {
        let size = fs::metadata(&plan.source)?.len();
        let name = plan.source.file_name().ok_or_else(|| Error::Other(format!(
            "Single-file unit has no file name: {}",
            plan.source.display()
        )))?;
        return Ok(vec![FileTask {
            source: plan.source.clone(),
            destination: plan.target.join(name),
            size,
        }]);
    }

    if !plan.source.is_dir() {
        return Err(Error::Scan {
            path: plan.source.clone(),
            message: "unit directory not found".to_string(),
        });
    }

    let owns_audio = has_direct_audio(&plan.source);
    let walker = WalkDir::new(&plan.source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(owns_audio && e.depth() > 0 && e.file_type().is_dir() && has_direct_audio(e.path()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() || entry.path().starts_with(&plan.target) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(&plan.source)
            .map_err(|e| Error::Other(e.to_string()))?;
        let size = entry.metadata().map_err(io::Error::from)?.len();
        files.push(FileTask {
            source: entry.path().to_path_buf(),
            destination: plan.target.join(relative),
            size,
        });
    }

    if files.is_empty() {
        warn!("No files to organize in {}", plan.source.display());
    }
    Ok(files)
}

fn has_direct_audio(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries.flatten().any(|e| {
                e.file_type().map(|t| t.is_file()).unwrap_or(false) && is_audio_file(&e.path())
            })
        })
        .unwrap_or(false)
}

fn file_checksum(path: &Path) -> Result<blake3::Hash> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ConsolidatedMetadata;
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn plan(source: PathBuf, target: PathBuf, operation: OperationKind) -> OrganizationPlan {
        OrganizationPlan::new(source, ConsolidatedMetadata::default(), target, operation)
    }

    fn make_unit(dir: &Path, files: &[(&str, usize)]) {
        for (name, size) in files {
            let path = dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, vec![b'a'; *size]).unwrap();
        }
    }

    #[test]
    fn test_copy_preserves_layout() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/Book");
        make_unit(&source, &[("CD1/01.mp3", 100), ("CD2/01.mp3", 200), ("bookinfo.json", 10)]);
        let target = temp.path().join("dest/Author/Book");

        let result = FileOrganizer::new()
            .with_verify(VerifyMode::Checksum)
            .organize(&[plan(source.clone(), target.clone(), OperationKind::Copy)], &temp.path().join("src"))
            .unwrap();

        assert!(result.success());
        assert_eq!(result.files, 3);
        assert_eq!(result.bytes, 310);
        assert!(target.join("CD1/01.mp3").exists());
        assert!(target.join("CD2/01.mp3").exists());
        assert!(source.join("CD1/01.mp3").exists());
        assert_eq!(result.removed_directories, 0);
    }

    #[test]
    fn test_move_removes_source_and_sweeps() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        let source = root.join("Author/Book");
        make_unit(&source, &[("01.mp3", 10), ("02.mp3", 10)]);
        let target = temp.path().join("dest/Author/Book");

        let result = FileOrganizer::new()
            .organize(&[plan(source.clone(), target.clone(), OperationKind::Move)], &root)
            .unwrap();

        assert!(result.success());
        assert!(!source.exists());
        assert!(!root.join("Author").exists());
        assert!(root.exists());
        assert!(target.join("02.mp3").exists());
    }

    #[test]
    fn test_collision_rejected_before_any_mutation() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("src/a");
        let b = temp.path().join("src/b");
        make_unit(&a, &[("01.mp3", 5)]);
        make_unit(&b, &[("01.mp3", 5)]);
        let target = temp.path().join("dest/Author/Title");

        let plans = vec![
            plan(a.clone(), target.clone(), OperationKind::Move),
            plan(b.clone(), temp.path().join("dest/author/title/"), OperationKind::Move),
        ];
        let err = FileOrganizer::new().organize(&plans, &temp.path().join("src")).unwrap_err();

        match err {
            Error::PathCollision { sources, .. } => assert_eq!(sources, vec![a.clone(), b]),
            other => panic!("unexpected error: {}", other),
        }
        assert!(a.join("01.mp3").exists());
        assert!(!temp.path().join("dest").exists());
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("src/good");
        make_unit(&good, &[("01.mp3", 5)]);
        let plans = vec![
            plan(temp.path().join("src/missing"), temp.path().join("dest/A/Missing"), OperationKind::Copy),
            plan(good, temp.path().join("dest/A/Good"), OperationKind::Copy),
        ];

        let result = FileOrganizer::new().organize(&plans, &temp.path().join("src")).unwrap();
        assert_eq!(result.failed, 1);
        assert_eq!(result.succeeded, 1);
        assert!(!result.success());
        assert!(result.outcomes[0].error.is_some());
        assert_eq!(result.outcomes[0].state, PlanState::Failed);
    }

    #[test]
    fn test_restart_skips_identical_and_rejects_different_size() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/Book");
        make_unit(&source, &[("01.mp3", 10), ("02.mp3", 10)]);
        let target = temp.path().join("dest/A/Book");
        make_unit(&target, &[("01.mp3", 10)]);

        let organizer = FileOrganizer::new();
        let result = organizer
            .organize(&[plan(source.clone(), target.clone(), OperationKind::Copy)], &temp.path().join("src"))
            .unwrap();
        assert!(result.success());
        assert_eq!(result.files, 2);

        fs::write(target.join("02.mp3"), b"different").unwrap();
        let result = organizer
            .organize(&[plan(source, target, OperationKind::Copy)], &temp.path().join("src"))
            .unwrap();
        assert_eq!(result.failed, 1);
    }

    #[test]
    fn test_same_size_different_content_keeps_source_on_move() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/Dune");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("01.mp3"), b"AAAAAAAAAA").unwrap();
        let target = temp.path().join("dest/Frank Herbert/Dune");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("01.mp3"), b"BBBBBBBBBB").unwrap();

        let result = FileOrganizer::new()
            .with_verify(VerifyMode::Checksum)
            .organize(&[plan(source.clone(), target.clone(), OperationKind::Move)], &temp.path().join("src"))
            .unwrap();

        assert!(!result.success());
        assert_eq!(result.failed, 1);
        let message = result.outcomes[0].error.clone().unwrap();
        assert!(message.contains("different content"), "{}", message);
        assert_eq!(fs::read(source.join("01.mp3")).unwrap(), b"AAAAAAAAAA");
        assert_eq!(fs::read(target.join("01.mp3")).unwrap(), b"BBBBBBBBBB");
    }

    #[test]
    fn test_nested_unit_files_stay_with_their_own_unit() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        let parent = root.join("Dune");
        make_unit(&parent, &[("01.mp3", 10), ("cover.jpg", 3), ("Extras/interview.mp3", 7)]);
        let parent_target = temp.path().join("dest/Frank Herbert/Dune");
        let child_target = temp.path().join("dest/Frank Herbert/Extras");

        let plans = vec![
            plan(parent.clone(), parent_target.clone(), OperationKind::Move),
            plan(parent.join("Extras"), child_target.clone(), OperationKind::Move),
        ];
        let result = FileOrganizer::new().organize(&plans, &root).unwrap();

        assert!(result.success(), "{:?}", result.outcomes);
        assert_eq!(result.files, 3);
        assert!(parent_target.join("01.mp3").exists());
        assert!(parent_target.join("cover.jpg").exists());
        assert!(!parent_target.join("Extras").exists());
        assert!(child_target.join("interview.mp3").exists());
        assert!(!parent.exists());
    }

    #[test]
    fn test_single_file_unit_goes_into_target_dir() {
        let temp = TempDir::new().unwrap();
        let source_dir = temp.path().join("src/Mixed");
        make_unit(&source_dir, &[("One.m4b", 20), ("Two.m4b", 30)]);
        let target = temp.path().join("dest/A/One");

        let result = FileOrganizer::new()
            .organize(
                &[plan(source_dir.join("One.m4b"), target.clone(), OperationKind::Move).single_file(true)],
                &temp.path().join("src"),
            )
            .unwrap();

        assert!(result.success());
        assert!(target.join("One.m4b").exists());
        assert!(!source_dir.join("One.m4b").exists());
        assert!(source_dir.join("Two.m4b").exists());
    }

    #[test]
    fn test_cancelled_before_first_unit() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/Book");
        make_unit(&source, &[("01.mp3", 5)]);
        let token = crate::progress::cancel_flag();
        token.store(true, Ordering::SeqCst);

        let result = FileOrganizer::new()
            .with_cancellation(token)
            .organize(
                &[plan(source, temp.path().join("dest/A/Book"), OperationKind::Copy)],
                &temp.path().join("src"),
            )
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.succeeded, 0);
        assert!(!temp.path().join("dest").exists());
    }

    #[test]
    fn test_progress_reaches_completion() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/Book");
        make_unit(&source, &[("01.mp3", 64)]);
        let seen: Arc<Mutex<Vec<OrganizeProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        FileOrganizer::new()
            .with_progress_callback(Box::new(move |p: &OrganizeProgress| sink.lock().unwrap().push(p.clone())))
            .organize(
                &[plan(source, temp.path().join("dest/A/Book"), OperationKind::Copy)],
                &temp.path().join("src"),
            )
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first().unwrap().state, PlanState::Preparing);
        let last = seen.last().unwrap();
        assert_eq!(last.state, PlanState::Completed);
        assert_eq!(last.percent, 100.0);
        assert!(seen.iter().any(|p| p.current_file.is_some()));
    }

    #[test]
    fn test_hard_link_operation() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/Book");
        make_unit(&source, &[("01.mp3", 8)]);
        let target = temp.path().join("dest/A/Book");

        let result = FileOrganizer::new()
            .with_verify(VerifyMode::Size)
            .organize(&[plan(source.clone(), target.clone(), OperationKind::HardLink)], &temp.path().join("src"))
            .unwrap();
        assert!(result.success());
        assert!(source.join("01.mp3").exists());
        assert!(target.join("01.mp3").exists());
    }
}
