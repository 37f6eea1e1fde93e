//! Cascading sidecar overrides from a unit up to the library root

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::schema::{MetadataOverride, BOOKINFO_FILE, METADATA_FILE};
use crate::extract::TAG_CACHE_FILE;
use crate::metadata::BookMetadataCandidate;

/// Role of a directory level in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelKind {
    /// The unit's own directory
    Book,
    /// Anything between the author folder and the book
    Series,
    /// The first directory below the root
    Author,
}

/// One sidecar found while walking up from a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideLevel {
    pub directory: PathBuf,
    /// The sidecar file the values were read from
    pub file: PathBuf,
    pub kind: LevelKind,
    /// Depth below the root (1 = directly under root)
    pub depth: usize,
    pub values: MetadataOverride,
}

/// Sidecar levels ordered child-most first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalOverrideChain {
    levels: Vec<OverrideLevel>,
}

impl HierarchicalOverrideChain {
    pub fn new(levels: Vec<OverrideLevel>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[OverrideLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The level belonging to the unit's own directory, if it has a sidecar
    pub fn book_level(&self) -> Option<&OverrideLevel> {
        self.levels.iter().find(|l| l.kind == LevelKind::Book)
    }

    /// Per field, the value of the most specific level that defines it
    pub fn effective(&self) -> MetadataOverride {
        let mut effective = MetadataOverride::default();
        for level in &self.levels {
            effective.inherit_from(&level.values);
        }
        effective
    }

    /// The `OverrideJson` candidate of the effective values
    pub fn to_candidate(&self) -> BookMetadataCandidate {
        self.effective().to_candidate()
    }
}

/// Read the sidecar of one directory.
///
/// `bookinfo.json` is preferred; when it is missing or malformed
/// `metadata.json` is tried. Malformed files are logged and treated as absent.
pub fn load_level_file(dir: &Path) -> Option<(PathBuf, MetadataOverride)> {
    for name in [BOOKINFO_FILE, METADATA_FILE] {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        match MetadataOverride::from_file(&path) {
            Ok(values) => return Some((path, values)),
            Err(e) => warn!("Ignoring override file: {}", e),
        }
    }
    None
}

/// Walk from `unit_dir` up to, but not including, `root` and collect sidecars.
///
/// Returns `None` when no level has a usable sidecar. A unit outside the
/// root only contributes its own directory.
pub fn load_chain(unit_dir: &Path, root: &Path) -> Option<HierarchicalOverrideChain> {
    let mut directories = Vec::new();
    if unit_dir.starts_with(root) {
        let mut current = Some(unit_dir);
        while let Some(dir) = current {
            if dir == root || !dir.starts_with(root) {
                break;
            }
            directories.push(dir);
            current = dir.parent();
        }
    } else {
        directories.push(unit_dir);
    }

    let levels: Vec<OverrideLevel> = directories
        .into_iter()
        .filter_map(|dir| {
            let (file, values) = load_level_file(dir)?;
            let depth = level_depth(dir, root);
            let kind = if dir == unit_dir {
                LevelKind::Book
            } else if depth == 1 {
                LevelKind::Author
            } else {
                LevelKind::Series
            };
            debug!("Override level {:?} at {}", kind, file.display());
            Some(OverrideLevel {
                directory: dir.to_path_buf(),
                file,
                kind,
                depth,
                values,
            })
        })
        .collect();

    (!levels.is_empty()).then(|| HierarchicalOverrideChain::new(levels))
}

/// Chain for a single-file book that shares its folder with other books.
///
/// The book level is `<stem>.json` next to the file. The folder's own
/// sidecar describes every book in it, so it is demoted to a series (or
/// author) level and loses the fields that only fit one book.
pub fn load_file_chain(file: &Path, root: &Path) -> Option<HierarchicalOverrideChain> {
    let dir = file.parent()?;
    let mut levels = Vec::new();

    if let Some(path) = per_file_sidecar(file) {
        match MetadataOverride::from_file(&path) {
            Ok(values) => {
                debug!("Override level Book at {}", path.display());
                levels.push(OverrideLevel {
                    directory: dir.to_path_buf(),
                    file: path,
                    kind: LevelKind::Book,
                    depth: level_depth(dir, root),
                    values,
                });
            }
            Err(e) => warn!("Ignoring override file: {}", e),
        }
    }

    if let Some(chain) = load_chain(dir, root) {
        for mut level in chain.levels {
            if level.kind == LevelKind::Book {
                level.kind = if level.depth <= 1 {
                    LevelKind::Author
                } else {
                    LevelKind::Series
                };
                level.values.title = None;
                level.values.series_number = None;
                level.values.disc_number = None;
                level.values.description = None;
            }
            levels.push(level);
        }
    }

    (!levels.is_empty()).then(|| HierarchicalOverrideChain::new(levels))
}

fn per_file_sidecar(file: &Path) -> Option<PathBuf> {
    let name = format!("{}.json", file.file_stem()?.to_string_lossy());
    if [BOOKINFO_FILE, METADATA_FILE, TAG_CACHE_FILE].contains(&name.as_str()) {
        return None;
    }
    let path = file.with_file_name(name);
    path.is_file().then_some(path)
}

fn level_depth(dir: &Path, root: &Path) -> usize {
    dir.strip_prefix(root)
        .map(|rel| rel.components().count())
        .unwrap_or(1)
}
