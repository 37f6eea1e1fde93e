//! Runs every extractor for a unit and consolidates the results

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::candidate::BookMetadataCandidate;
use super::consolidated::ConsolidatedMetadata;
use super::consolidator::MetadataConsolidator;
use crate::config::OrganizerConfig;
use crate::extract::{FilenameParser, FolderHierarchyAnalyzer, TagExtractor};
use crate::overrides::{load_chain, load_file_chain, HierarchicalOverrideChain};
use crate::scanner::AudiobookUnit;

/// Everything known about one unit after extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitMetadata {
    pub unit_path: PathBuf,
    /// Non-empty candidates, override first
    pub candidates: Vec<BookMetadataCandidate>,
    pub consolidated: ConsolidatedMetadata,
    /// Why tag reading failed, if it did
    pub tag_error: Option<String>,
    pub override_chain: Option<HierarchicalOverrideChain>,
}

/// Extraction pipeline bound to one source root
#[derive(Clone)]
pub struct MetadataExtractor {
    root: PathBuf,
    tags: TagExtractor,
    parser: FilenameParser,
    hierarchy: FolderHierarchyAnalyzer,
    consolidator: MetadataConsolidator,
}

impl MetadataExtractor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tags: TagExtractor::default(),
            parser: FilenameParser::new(),
            hierarchy: FolderHierarchyAnalyzer::new(),
            consolidator: MetadataConsolidator::default(),
        }
    }

    /// Pipeline using the weights and cache mode from `config`
    pub fn from_config(root: impl Into<PathBuf>, config: &OrganizerConfig) -> Self {
        Self::new(root)
            .with_tag_extractor(TagExtractor::default().with_cache_mode(config.tag_cache))
            .with_consolidator(MetadataConsolidator::new(
                config.source_weights,
                config.field_weights,
            ))
    }

    pub fn with_tag_extractor(mut self, tags: TagExtractor) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_consolidator(mut self, consolidator: MetadataConsolidator) -> Self {
        self.consolidator = consolidator;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tag_extractor(&self) -> &TagExtractor {
        &self.tags
    }

    pub fn consolidator(&self) -> &MetadataConsolidator {
        &self.consolidator
    }

    /// Extract and consolidate metadata for one unit.
    ///
    /// A tag failure is recorded in [`UnitMetadata::tag_error`]; the other
    /// sources still contribute.
    pub fn extract(&self, unit: &AudiobookUnit) -> UnitMetadata {
        let mut candidates = Vec::with_capacity(4);

        let override_chain = if unit.is_single_file {
            load_file_chain(&unit.path, &self.root)
        } else {
            load_chain(unit.directory_path(), &self.root)
        };
        if let Some(chain) = &override_chain {
            candidates.push(chain.to_candidate());
        }

        let tag_error = match self.tags.extract(unit) {
            Ok(extraction) => {
                candidates.push(extraction.candidate);
                None
            }
            Err(e) => {
                warn!("Tag extraction failed for {}: {}", unit.path.display(), e);
                Some(e.to_string())
            }
        };

        if let Some(result) = self.hierarchy.analyze(&unit.path, &self.root) {
            candidates.push(result.to_candidate());
        }
        candidates.push(self.parser.parse_unit(unit, &self.root));

        candidates.retain(|c| !c.is_empty());
        let consolidated = self.consolidator.consolidate(&candidates);

        UnitMetadata {
            unit_path: unit.path.clone(),
            candidates,
            consolidated,
            tag_error,
            override_chain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::extract::{FileTags, TagSource};
    use crate::metadata::{MetadataField, MetadataSource};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedTags(FileTags);

    impl TagSource for FixedTags {
        fn read(&self, _path: &Path) -> Result<FileTags> {
            Ok(self.0.clone())
        }
    }

    fn extractor(root: &Path, tags: FileTags) -> MetadataExtractor {
        MetadataExtractor::new(root)
            .with_tag_extractor(TagExtractor::new(Arc::new(FixedTags(tags))))
            .with_consolidator(MetadataConsolidator::default().with_current_year(2024))
    }

    #[test]
    fn test_override_beats_tags() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Frank Herbert/Dune");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("01.mp3"), b"x").unwrap();
        fs::write(dir.join("bookinfo.json"), r#"{"title": "Dune (Override)"}"#).unwrap();
        let unit = AudiobookUnit::directory(dir.clone(), vec![dir.join("01.mp3")], 1);

        let tags = FileTags {
            album: Some("Dune".into()),
            artist: Some("Frank Herbert".into()),
            ..Default::default()
        };
        let meta = extractor(temp.path(), tags).extract(&unit);

        assert_eq!(meta.consolidated.title(), Some("Dune (Override)"));
        assert_eq!(
            meta.consolidated.field_source(MetadataField::Title),
            Some(MetadataSource::OverrideJson)
        );
        assert_eq!(meta.consolidated.author(), Some("Frank Herbert"));
        assert_eq!(meta.candidates[0].source, MetadataSource::OverrideJson);
        assert!(meta.override_chain.is_some());
        assert!(meta.tag_error.is_none());
    }

    #[test]
    fn test_tag_failure_is_not_fatal() {
        struct Broken;
        impl TagSource for Broken {
            fn read(&self, path: &Path) -> Result<FileTags> {
                Err(crate::Error::Extraction {
                    path: path.to_path_buf(),
                    reason: "corrupt".into(),
                })
            }
        }

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Frank Herbert/Dune");
        fs::create_dir_all(&dir).unwrap();
        let unit = AudiobookUnit::directory(dir.clone(), vec![dir.join("01.mp3")], 1);

        let meta = MetadataExtractor::new(temp.path())
            .with_tag_extractor(TagExtractor::new(Arc::new(Broken)))
            .extract(&unit);
        assert!(meta.tag_error.is_some());
        assert_eq!(meta.consolidated.title(), Some("Dune"));
        assert_eq!(meta.consolidated.author(), Some("Frank Herbert"));
        assert!(meta.candidates.iter().all(|c| c.source != MetadataSource::Tags));
    }
}
