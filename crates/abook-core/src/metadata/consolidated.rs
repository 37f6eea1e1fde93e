//! The merged, per-unit metadata record

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::candidate::{MetadataField, MetadataSource};
use crate::config::FieldWeights;
use crate::overrides::MetadataOverride;

/// A consolidated value with its confidence and winning source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field<T> {
    pub value: T,
    pub confidence: f64,
    pub source: MetadataSource,
}

impl<T> Field<T> {
    pub fn new(value: T, confidence: f64, source: MetadataSource) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
            source,
        }
    }

    fn manual(value: T) -> Self {
        Self::new(value, 1.0, MetadataSource::Manual)
    }
}

/// One record per unit.
///
/// Fields without any contributing candidate stay `None`; they never hold
/// an empty string and never count towards [`confidence`](Self::confidence).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedMetadata {
    pub title: Option<Field<String>>,
    pub author: Option<Field<String>>,
    pub narrator: Option<Field<String>>,
    pub series: Option<Field<String>>,
    pub sequence: Option<Field<String>>,
    pub year: Option<Field<u32>>,
    pub genre: Option<Field<String>>,
    pub description: Option<Field<String>>,
    /// Weighted average of the present fields' confidences
    pub confidence: f64,
}

impl ConsolidatedMetadata {
    pub fn title(&self) -> Option<&str> {
        self.title.as_ref().map(|f| f.value.as_str())
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_ref().map(|f| f.value.as_str())
    }

    pub fn narrator(&self) -> Option<&str> {
        self.narrator.as_ref().map(|f| f.value.as_str())
    }

    pub fn series(&self) -> Option<&str> {
        self.series.as_ref().map(|f| f.value.as_str())
    }

    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_ref().map(|f| f.value.as_str())
    }

    pub fn year(&self) -> Option<u32> {
        self.year.as_ref().map(|f| f.value)
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_ref().map(|f| f.value.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_ref().map(|f| f.value.as_str())
    }

    /// Confidence of a single field, `None` when the field is absent
    pub fn field_confidence(&self, field: MetadataField) -> Option<f64> {
        self.field_meta(field).map(|(confidence, _)| confidence)
    }

    /// Winning source of a single field
    pub fn field_source(&self, field: MetadataField) -> Option<MetadataSource> {
        self.field_meta(field).map(|(_, source)| source)
    }

    fn field_meta(&self, field: MetadataField) -> Option<(f64, MetadataSource)> {
        fn meta<T>(f: &Option<Field<T>>) -> Option<(f64, MetadataSource)> {
            f.as_ref().map(|f| (f.confidence, f.source))
        }
        match field {
            MetadataField::Title => meta(&self.title),
            MetadataField::Author => meta(&self.author),
            MetadataField::Narrator => meta(&self.narrator),
            MetadataField::Series => meta(&self.series),
            MetadataField::Sequence => meta(&self.sequence),
            MetadataField::Year => meta(&self.year),
            MetadataField::Genre => meta(&self.genre),
            MetadataField::Description => meta(&self.description),
        }
    }

    /// Fields that carry a value
    pub fn present_fields(&self) -> Vec<MetadataField> {
        MetadataField::ALL
            .into_iter()
            .filter(|f| self.field_meta(*f).is_some())
            .collect()
    }

    /// Recompute the overall confidence from the present fields.
    ///
    /// Absent fields are left out of both numerator and denominator.
    pub fn recompute_confidence(&mut self, weights: &FieldWeights) {
        let mut weighted = 0.0;
        let mut total = 0.0;
        for field in MetadataField::ALL {
            if let Some((confidence, _)) = self.field_meta(field) {
                let w = weights.weight(field);
                weighted += w * confidence;
                total += w;
            }
        }
        self.confidence = if total > 0.0 {
            (weighted / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Apply explicit user values on top of the consolidated ones.
    ///
    /// Every field the override sets is replaced with confidence 1.0 and
    /// the [`MetadataSource::Manual`] marker.
    pub fn apply_override(&mut self, values: &MetadataOverride, weights: &FieldWeights) {
        fn set(slot: &mut Option<Field<String>>, value: &Option<String>) {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *slot = Some(Field::manual(v.to_string()));
            }
        }

        set(&mut self.title, &values.title);
        set(&mut self.author, &values.author);
        set(&mut self.narrator, &values.narrator);
        set(&mut self.series, &values.series);
        set(&mut self.sequence, &values.series_number);
        set(&mut self.genre, &values.genre);
        set(&mut self.description, &values.description);
        if let Some(year) = values.parsed_year() {
            self.year = Some(Field::manual(year));
        }

        self.recompute_confidence(weights);
    }

    /// Replace the author with its canonical synonym, if one is known.
    ///
    /// `canonical` maps every variant name to its group's canonical name.
    /// Returns `true` when the author changed.
    pub fn canonicalize_author(&mut self, canonical: &HashMap<String, String>) -> bool {
        canonicalize(&mut self.author, canonical)
    }

    /// Replace the narrator with its canonical synonym, if one is known
    pub fn canonicalize_narrator(&mut self, canonical: &HashMap<String, String>) -> bool {
        canonicalize(&mut self.narrator, canonical)
    }
}

fn canonicalize(slot: &mut Option<Field<String>>, canonical: &HashMap<String, String>) -> bool {
    let Some(field) = slot.as_mut() else {
        return false;
    };
    match canonical.get(&field.value) {
        Some(name) if *name != field.value => {
            field.value = name.clone();
            true
        }
        _ => false,
    }
}
