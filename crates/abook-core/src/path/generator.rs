//! Deterministic `Author/[Series/]Title` target paths

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::OrganizerConfig;
use crate::metadata::ConsolidatedMetadata;
use crate::text::transliterate;
use crate::utils::sanitize_component;

/// Folder used when no author is known
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
/// Folder used when no title is known
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// How metadata values become folder names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPolicy {
    /// Keep UTF-8 names; otherwise names are transliterated to ASCII
    pub preserve_diacritics: bool,
}

impl PathPolicy {
    /// A safe folder name for `value`, or `None` if nothing usable remains.
    ///
    /// In ASCII mode a name whose letters all lack an ASCII rendition keeps
    /// its UTF-8 form, so distinct non-Latin titles stay distinct.
    pub fn component(&self, value: &str) -> Option<String> {
        if !self.preserve_diacritics {
            let ascii = folder_name(&transliterate(value));
            let has_letters = |n: &str| n.chars().any(char::is_alphanumeric);
            if ascii.as_deref().is_some_and(has_letters) || !has_letters(value) {
                return ascii;
            }
        }
        folder_name(value)
    }
}

fn folder_name(value: &str) -> Option<String> {
    let name = sanitize_component(value);
    let name = name.trim_start_matches(['.', ' ']).to_string();
    (!name.is_empty()).then_some(name)
}

/// Computes target paths from consolidated metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct PathGenerator {
    policy: PathPolicy,
}

impl PathGenerator {
    pub fn new(policy: PathPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &OrganizerConfig) -> Self {
        Self::new(PathPolicy {
            preserve_diacritics: config.preserve_diacritics,
        })
    }

    pub fn policy(&self) -> PathPolicy {
        self.policy
    }

    /// `Author/[Series/]Title` relative to the destination root.
    ///
    /// Only the first of several `;`-separated authors names the folder.
    pub fn relative_path(&self, meta: &ConsolidatedMetadata) -> PathBuf {
        let author = meta
            .author()
            .and_then(|a| a.split(';').map(str::trim).find(|a| !a.is_empty()))
            .and_then(|a| self.policy.component(a))
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        let title = meta
            .title()
            .and_then(|t| self.policy.component(t))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let mut path = PathBuf::from(author);
        if let Some(series) = meta.series().and_then(|s| self.policy.component(s)) {
            path.push(series);
        }
        path.push(title);
        path
    }

    /// Target directory for a unit. Same input, same output.
    pub fn generate_target_path(&self, meta: &ConsolidatedMetadata, destination: &Path) -> PathBuf {
        destination.join(self.relative_path(meta))
    }
}

/// Normalized form used for path equality and collision checks
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .trim()
        .trim_end_matches('/')
        .to_lowercase()
}

/// Case-insensitive, trailing-separator-insensitive path equality
pub fn paths_equivalent(a: &Path, b: &Path) -> bool {
    path_key(a) == path_key(b)
}

/// Whether a unit at `current` is misplaced relative to `target`
pub fn needs_reorganize(current: &Path, target: &Path) -> bool {
    !paths_equivalent(current, target)
}
