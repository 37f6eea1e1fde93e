//! Per-source metadata opinions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a piece of metadata came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataSource {
    /// Embedded audio tags
    Tags,
    /// Heuristics over file and folder names
    FilenameParser,
    /// Position of folders between the library root and the unit
    FolderHierarchy,
    /// Cascaded `bookinfo.json` / `metadata.json` sidecars
    OverrideJson,
    /// Explicitly applied by the user after consolidation
    Manual,
}

impl MetadataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tags => "Tags",
            Self::FilenameParser => "FilenameParser",
            Self::FolderHierarchy => "FolderHierarchy",
            Self::OverrideJson => "OverrideJson",
            Self::Manual => "Manual",
        }
    }
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metadata fields the organizer reconciles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataField {
    Title,
    Author,
    Narrator,
    Series,
    Sequence,
    Year,
    Genre,
    Description,
}

impl MetadataField {
    pub const ALL: [MetadataField; 8] = [
        Self::Title,
        Self::Author,
        Self::Narrator,
        Self::Series,
        Self::Sequence,
        Self::Year,
        Self::Genre,
        Self::Description,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Narrator => "narrator",
            Self::Series => "series",
            Self::Sequence => "sequence",
            Self::Year => "year",
            Self::Genre => "genre",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One source's opinion about a book.
///
/// Every field is optional; `confidence` is the source's own estimate of
/// how much of this opinion can be trusted, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMetadataCandidate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub narrator: Option<String>,
    pub series: Option<String>,
    pub series_sequence: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub source: MetadataSource,
    pub confidence: f64,
    /// Fields filled from a fallback rather than observed in the source
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<MetadataField>,
}

impl BookMetadataCandidate {
    /// Create an empty candidate for the given source
    pub fn new(source: MetadataSource) -> Self {
        Self {
            title: None,
            author: None,
            narrator: None,
            series: None,
            series_sequence: None,
            year: None,
            genre: None,
            description: None,
            source,
            confidence: 0.0,
            derived: Vec::new(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Value of a field, `None` when absent or blank
    pub fn value(&self, field: MetadataField) -> Option<&str> {
        let value = match field {
            MetadataField::Title => self.title.as_deref(),
            MetadataField::Author => self.author.as_deref(),
            MetadataField::Narrator => self.narrator.as_deref(),
            MetadataField::Series => self.series.as_deref(),
            MetadataField::Sequence => self.series_sequence.as_deref(),
            MetadataField::Year => self.year.as_deref(),
            MetadataField::Genre => self.genre.as_deref(),
            MetadataField::Description => self.description.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Set a field; blank values clear it
    pub fn set(&mut self, field: MetadataField, value: impl Into<String>) {
        let value = value.into();
        let value = if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        };
        match field {
            MetadataField::Title => self.title = value,
            MetadataField::Author => self.author = value,
            MetadataField::Narrator => self.narrator = value,
            MetadataField::Series => self.series = value,
            MetadataField::Sequence => self.series_sequence = value,
            MetadataField::Year => self.year = value,
            MetadataField::Genre => self.genre = value,
            MetadataField::Description => self.description = value,
        }
    }

    /// Whether the field is present
    pub fn has(&self, field: MetadataField) -> bool {
        self.value(field).is_some()
    }

    /// Mark a field as filled from a fallback
    pub fn mark_derived(&mut self, field: MetadataField) {
        if !self.derived.contains(&field) {
            self.derived.push(field);
        }
    }

    pub fn is_derived(&self, field: MetadataField) -> bool {
        self.derived.contains(&field)
    }

    /// Whether no field carries a value
    pub fn is_empty(&self) -> bool {
        MetadataField::ALL.iter().all(|f| !self.has(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_value_trim() {
        let mut c = BookMetadataCandidate::new(MetadataSource::Tags);
        c.set(MetadataField::Title, "  The Clue ");
        c.set(MetadataField::Author, "   ");
        assert_eq!(c.value(MetadataField::Title), Some("The Clue"));
        assert_eq!(c.value(MetadataField::Author), None);
        assert!(!c.is_empty());
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let mut c = BookMetadataCandidate::new(MetadataSource::FilenameParser);
        c.genre = Some(String::new());
        assert!(!c.has(MetadataField::Genre));
        assert!(c.is_empty());
    }

    #[test]
    fn test_confidence_clamped() {
        let c = BookMetadataCandidate::new(MetadataSource::Tags).with_confidence(1.7);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_mark_derived_once() {
        let mut c = BookMetadataCandidate::new(MetadataSource::Tags);
        c.mark_derived(MetadataField::Title);
        c.mark_derived(MetadataField::Title);
        assert_eq!(c.derived.len(), 1);
        assert!(c.is_derived(MetadataField::Title));
        assert!(!c.is_derived(MetadataField::Author));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(MetadataSource::OverrideJson.to_string(), "OverrideJson");
        assert_eq!(MetadataSource::FilenameParser.to_string(), "FilenameParser");
    }
}
