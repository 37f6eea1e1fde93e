//! Sidecar override schemas: the native flat one and the third-party one

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::metadata::{
    parse_year, BookMetadataCandidate, ConsolidatedMetadata, MetadataField, MetadataSource,
    OVERRIDE_CONFIDENCE,
};

/// Native sidecar written by this tool
pub const BOOKINFO_FILE: &str = "bookinfo.json";
/// Sidecar in the native or the third-party schema
pub const METADATA_FILE: &str = "metadata.json";
/// `source` value protecting a sidecar from regeneration
pub const MANUAL_SOURCE: &str = "manual";
/// `source` value of sidecars generated from consolidated metadata
pub const GENERATED_SOURCE: &str = "abook";

/// Separator for list values kept in a single field
pub const LIST_SEPARATOR: &str = "; ";

/// Parsed sidecar content. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataOverride {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub series_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub narrator: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Accept strings, numbers and string lists where a string is expected
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| value_to_string(&v)))
}

fn value_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => join_list(items.iter().filter_map(value_to_string)),
        Value::Null | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn join_list(items: impl Iterator<Item = String>) -> String {
    items
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Split a `"; "`-joined field back into its items
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// One entry of the third-party `series` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum AbsSeries {
    Entry {
        #[serde(alias = "name")]
        series: String,
        #[serde(
            default,
            deserialize_with = "lenient_string",
            skip_serializing_if = "Option::is_none"
        )]
        sequence: Option<String>,
    },
    /// `"Name #3"` shorthand
    Text(String),
}

impl AbsSeries {
    fn name_and_sequence(&self) -> (String, Option<String>) {
        match self {
            Self::Entry { series, sequence } => (series.trim().to_string(), sequence.clone()),
            Self::Text(text) => match text.rsplit_once('#') {
                Some((name, seq)) if !seq.trim().is_empty() => {
                    (name.trim().to_string(), Some(seq.trim().to_string()))
                }
                _ => (text.trim().to_string(), None),
            },
        }
    }
}

/// The third-party `metadata.json` layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AbsMetadata {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub narrators: Vec<String>,
    #[serde(default)]
    pub series: Vec<AbsSeries>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub published_year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AbsMetadata {
    fn into_override(self) -> MetadataOverride {
        let non_empty = |s: String| (!s.is_empty()).then_some(s);
        let (series, series_number) = match self.series.first() {
            Some(entry) => {
                let (name, seq) = entry.name_and_sequence();
                (non_empty(name), seq)
            }
            None => (None, None),
        };

        MetadataOverride {
            author: non_empty(join_list(self.authors.into_iter())),
            title: self.title,
            series,
            series_number,
            narrator: non_empty(join_list(self.narrators.into_iter())),
            year: self.published_year,
            genre: non_empty(join_list(self.genres.into_iter())),
            publisher: self.publisher,
            description: self.description,
            language: self.language,
            ..Default::default()
        }
    }

    pub(crate) fn from_override(values: &MetadataOverride) -> Self {
        let list = |v: &Option<String>| v.as_deref().map(split_list).unwrap_or_default();
        let series = values
            .series
            .as_ref()
            .map(|name| {
                vec![AbsSeries::Entry {
                    series: name.clone(),
                    sequence: values.series_number.clone(),
                }]
            })
            .unwrap_or_default();

        Self {
            title: values.title.clone(),
            authors: list(&values.author),
            narrators: list(&values.narrator),
            series,
            genres: list(&values.genre),
            published_year: values.year.clone(),
            publisher: values.publisher.clone(),
            description: values.description.clone(),
            language: values.language.clone(),
        }
    }
}

impl MetadataOverride {
    /// Parse sidecar JSON in either schema.
    ///
    /// The third-party schema is recognized by an array-typed `series` key.
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        if value.get("series").map(Value::is_array).unwrap_or(false) {
            let abs: AbsMetadata = serde_json::from_value(value)?;
            Ok(abs.into_override())
        } else {
            serde_json::from_value(value)
        }
    }

    /// Read and parse a sidecar file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content).map_err(|e| Error::OverrideParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build a generated record from consolidated metadata
    pub fn from_consolidated(meta: &ConsolidatedMetadata) -> Self {
        let owned = |v: Option<&str>| v.map(str::to_string);
        Self {
            author: owned(meta.author()),
            title: owned(meta.title()),
            series: owned(meta.series()),
            series_number: owned(meta.sequence()),
            narrator: owned(meta.narrator()),
            year: meta.year().map(|y| y.to_string()),
            genre: owned(meta.genre()),
            description: owned(meta.description()),
            source: Some(GENERATED_SOURCE.to_string()),
            ..Default::default()
        }
    }

    /// Whether the record is manually curated and must not be regenerated
    pub fn is_manual(&self) -> bool {
        self.source
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case(MANUAL_SOURCE))
            .unwrap_or(false)
    }

    /// Year as a number, from values like `"1965"` or `"2015-03-01"`
    pub fn parsed_year(&self) -> Option<u32> {
        self.year.as_deref().and_then(parse_year)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fill every field this record lacks from `parent`
    pub fn inherit_from(&mut self, parent: &MetadataOverride) {
        fn fill(slot: &mut Option<String>, value: &Option<String>) {
            if slot.is_none() {
                slot.clone_from(value);
            }
        }
        fill(&mut self.author, &parent.author);
        fill(&mut self.title, &parent.title);
        fill(&mut self.series, &parent.series);
        fill(&mut self.series_number, &parent.series_number);
        fill(&mut self.narrator, &parent.narrator);
        fill(&mut self.year, &parent.year);
        fill(&mut self.disc_number, &parent.disc_number);
        fill(&mut self.genre, &parent.genre);
        fill(&mut self.publisher, &parent.publisher);
        fill(&mut self.description, &parent.description);
        fill(&mut self.language, &parent.language);
        fill(&mut self.source, &parent.source);
    }

    /// The `OverrideJson` candidate for these values
    pub fn to_candidate(&self) -> BookMetadataCandidate {
        let mut candidate = BookMetadataCandidate::new(MetadataSource::OverrideJson)
            .with_confidence(OVERRIDE_CONFIDENCE);
        let fields = [
            (MetadataField::Title, &self.title),
            (MetadataField::Author, &self.author),
            (MetadataField::Narrator, &self.narrator),
            (MetadataField::Series, &self.series),
            (MetadataField::Sequence, &self.series_number),
            (MetadataField::Year, &self.year),
            (MetadataField::Genre, &self.genre),
            (MetadataField::Description, &self.description),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                candidate.set(field, value.clone());
            }
        }
        candidate
    }
}
