//! Author/series inferred from where a unit sits below the library root

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use tracing::debug;

use super::patterns::{clean_segment, looks_like_author, series_prefix};
use crate::metadata::{BookMetadataCandidate, MetadataSource};

const AUTHOR_SCORE: f64 = 0.7;
const EXPLICIT_SERIES_SCORE: f64 = 0.8;
const POSITIONAL_SERIES_SCORE: f64 = 0.5;

/// What the folder structure says about a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyResult {
    pub author: Option<String>,
    pub series: Option<String>,
    pub confidence: f64,
    /// Depth below the root of the author folder (1 = directly under root)
    pub author_level: Option<usize>,
    pub series_level: Option<usize>,
}

impl HierarchyResult {
    pub fn to_candidate(&self) -> BookMetadataCandidate {
        let mut candidate = BookMetadataCandidate::new(MetadataSource::FolderHierarchy);
        candidate.author = self.author.clone();
        candidate.series = self.series.clone();
        candidate.with_confidence(self.confidence)
    }
}

/// Positional analysis of the folders between root and unit
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderHierarchyAnalyzer;

impl FolderHierarchyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze `unit_path` below `root`.
    ///
    /// Returns `None` when the unit is not below the root or neither author
    /// nor series could be inferred.
    pub fn analyze(&self, unit_path: &Path, root: &Path) -> Option<HierarchyResult> {
        let relative = match unit_path.strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => {
                debug!("{} is not below {}", unit_path.display(), root.display());
                return None;
            }
        };

        let mut components: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(clean_segment(&s.to_string_lossy()).0),
                _ => None,
            })
            .collect();
        // The unit itself never names its own author or series
        components.pop();

        let mut result = HierarchyResult {
            author: None,
            series: None,
            confidence: 0.0,
            author_level: None,
            series_level: None,
        };

        if let Some(index) = components.iter().position(|c| looks_like_author(c)) {
            result.author = Some(components[index].clone());
            result.author_level = Some(index + 1);
            result.confidence += AUTHOR_SCORE;
        }

        if let Some(parent) = components.last().filter(|c| !c.is_empty()) {
            let level = components.len();
            if let Some(series) = series_prefix(parent) {
                result.series = Some(series);
                result.series_level = Some(level);
                result.confidence += EXPLICIT_SERIES_SCORE;
            } else if result.author.is_some()
                && result.author_level != Some(level)
                && !looks_like_author(parent)
            {
                result.series = Some(parent.clone());
                result.series_level = Some(level);
                result.confidence += POSITIONAL_SERIES_SCORE;
            }
        }

        if result.author.is_none() && result.series.is_none() {
            return None;
        }
        result.confidence = result.confidence.min(1.0);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(unit: &str) -> Option<HierarchyResult> {
        FolderHierarchyAnalyzer::new().analyze(Path::new(unit), Path::new("/src"))
    }

    #[test]
    fn test_author_and_positional_series() {
        let r = analyze("/src/John Doe/Mystery Series/01 - The Clue.mp3").unwrap();
        assert_eq!(r.author.as_deref(), Some("John Doe"));
        assert_eq!(r.series.as_deref(), Some("Mystery Series"));
        assert_eq!(r.author_level, Some(1));
        assert_eq!(r.series_level, Some(2));
        assert!((r.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_author_only() {
        let r = analyze("/src/Frank Herbert/Dune").unwrap();
        assert_eq!(r.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(r.series, None);
        assert!((r.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_series_without_author() {
        let r = analyze("/src/audio/Series Discworld/Mort").unwrap();
        assert_eq!(r.author, None);
        assert_eq!(r.series.as_deref(), Some("Discworld"));
        assert!((r.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_author_shaped_parent_is_not_series() {
        let r = analyze("/src/Terry Pratchett/Neil Gaiman/Good Omens").unwrap();
        assert_eq!(r.author.as_deref(), Some("Terry Pratchett"));
        assert_eq!(r.series, None);
    }

    #[test]
    fn test_nothing_found() {
        assert!(analyze("/src/books/Dune").is_none());
        assert!(analyze("/src/Dune").is_none());
        assert!(analyze("/elsewhere/John Doe/Dune").is_none());
    }

    #[test]
    fn test_to_candidate() {
        let r = analyze("/src/John Doe/Mystery Series/Book").unwrap();
        let c = r.to_candidate();
        assert_eq!(c.source, MetadataSource::FolderHierarchy);
        assert_eq!(c.series.as_deref(), Some("Mystery Series"));
        assert_eq!(c.title, None);
    }
}
