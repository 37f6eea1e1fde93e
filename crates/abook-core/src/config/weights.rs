//! Consolidation weights.
//!
//! Both tables are empirically chosen defaults, kept configurable.

use serde::{Deserialize, Serialize};

use crate::metadata::{MetadataField, MetadataSource};

/// Reliability of each metadata source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    pub override_file: f64,
    pub tags: f64,
    pub hierarchy: f64,
    pub filename: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            override_file: 1.0,
            tags: 0.8,
            hierarchy: 0.6,
            filename: 0.4,
        }
    }
}

impl SourceWeights {
    pub fn weight(&self, source: MetadataSource) -> f64 {
        match source {
            MetadataSource::Manual | MetadataSource::OverrideJson => self.override_file,
            MetadataSource::Tags => self.tags,
            MetadataSource::FolderHierarchy => self.hierarchy,
            MetadataSource::FilenameParser => self.filename,
        }
    }
}

/// Importance of each field in the overall confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub title: f64,
    pub author: f64,
    pub series: f64,
    pub sequence: f64,
    pub narrator: f64,
    pub year: f64,
    pub genre: f64,
    pub description: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 0.30,
            author: 0.25,
            series: 0.15,
            sequence: 0.10,
            narrator: 0.10,
            year: 0.05,
            genre: 0.03,
            description: 0.02,
        }
    }
}

impl FieldWeights {
    pub fn weight(&self, field: MetadataField) -> f64 {
        match field {
            MetadataField::Title => self.title,
            MetadataField::Author => self.author,
            MetadataField::Series => self.series,
            MetadataField::Sequence => self.sequence,
            MetadataField::Narrator => self.narrator,
            MetadataField::Year => self.year,
            MetadataField::Genre => self.genre,
            MetadataField::Description => self.description,
        }
    }
}
