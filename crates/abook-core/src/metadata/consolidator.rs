//! Field-wise weighted selection across metadata sources

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::candidate::{BookMetadataCandidate, MetadataField, MetadataSource};
use super::consolidated::{ConsolidatedMetadata, Field};
use crate::config::{FieldWeights, SourceWeights};

/// Confidence assigned to every override-chain candidate
pub const OVERRIDE_CONFIDENCE: f64 = 0.95;

/// Confidence bonus per extra candidate agreeing with the winner
const AGREEMENT_BONUS: f64 = 0.1;

/// Earliest year accepted as a publication year
pub const MIN_YEAR: u32 = 1900;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").unwrap());

/// First four-digit run in `text`, e.g. `"2015-03-01"` gives 2015
pub fn parse_year(text: &str) -> Option<u32> {
    YEAR_RE
        .captures(text.trim())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether `year` is a plausible publication year
pub fn is_valid_year(year: u32, current_year: u32) -> bool {
    (MIN_YEAR..=current_year + 1).contains(&year)
}

/// Merges candidates from all sources into one record
#[derive(Debug, Clone)]
pub struct MetadataConsolidator {
    source_weights: SourceWeights,
    field_weights: FieldWeights,
    current_year: u32,
}

impl Default for MetadataConsolidator {
    fn default() -> Self {
        Self::new(SourceWeights::default(), FieldWeights::default())
    }
}

/// A non-empty value offered by one candidate
struct Offer<'a> {
    value: &'a str,
    source: MetadataSource,
    confidence: f64,
}

impl MetadataConsolidator {
    pub fn new(source_weights: SourceWeights, field_weights: FieldWeights) -> Self {
        Self {
            source_weights,
            field_weights,
            current_year: chrono::Local::now().year() as u32,
        }
    }

    /// Pin the reference year used for year validation
    pub fn with_current_year(mut self, year: u32) -> Self {
        self.current_year = year;
        self
    }

    pub fn field_weights(&self) -> &FieldWeights {
        &self.field_weights
    }

    /// Consolidate all candidates for one unit
    pub fn consolidate(&self, candidates: &[BookMetadataCandidate]) -> ConsolidatedMetadata {
        let text_eq = |a: &str, b: &str| a.to_lowercase() == b.to_lowercase();
        let sequence_eq = |a: &str, b: &str| match (parse_number(a), parse_number(b)) {
            (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
            _ => a.to_lowercase() == b.to_lowercase(),
        };

        let mut meta = ConsolidatedMetadata {
            title: self.pick(candidates, MetadataField::Title, text_eq),
            author: self.pick(candidates, MetadataField::Author, text_eq),
            narrator: self.pick(candidates, MetadataField::Narrator, text_eq),
            series: self.pick(candidates, MetadataField::Series, text_eq),
            sequence: self.pick(candidates, MetadataField::Sequence, sequence_eq),
            year: self.pick_year(candidates),
            genre: self.pick(candidates, MetadataField::Genre, text_eq),
            description: self.pick(candidates, MetadataField::Description, text_eq),
            confidence: 0.0,
        };
        meta.recompute_confidence(&self.field_weights);

        debug!(
            "Consolidated {} candidates: {} fields, confidence {:.2}",
            candidates.len(),
            meta.present_fields().len(),
            meta.confidence
        );
        meta
    }

    /// Self-confidence of a candidate as used during selection
    fn effective_confidence(candidate: &BookMetadataCandidate) -> f64 {
        match candidate.source {
            MetadataSource::OverrideJson => OVERRIDE_CONFIDENCE,
            MetadataSource::Manual => 1.0,
            _ => candidate.confidence.clamp(0.0, 1.0),
        }
    }

    /// Offers for a field; derived values only when nothing else exists
    fn offers<'a>(
        candidates: &'a [BookMetadataCandidate],
        field: MetadataField,
    ) -> Vec<Offer<'a>> {
        let collect = |derived: bool| -> Vec<Offer<'a>> {
            candidates
                .iter()
                .filter(|c| c.is_derived(field) == derived)
                .filter_map(|c| {
                    c.value(field).map(|value| Offer {
                        value,
                        source: c.source,
                        confidence: Self::effective_confidence(c),
                    })
                })
                .collect()
        };

        let observed = collect(false);
        if observed.is_empty() {
            collect(true)
        } else {
            observed
        }
    }

    /// Index of the winning offer: highest weight x confidence, then longest
    fn winner(&self, offers: &[Offer<'_>]) -> Option<usize> {
        let mut best: Option<(usize, f64, usize)> = None;
        for (idx, offer) in offers.iter().enumerate() {
            let score = self.source_weights.weight(offer.source) * offer.confidence;
            let len = offer.value.chars().count();
            let better = match best {
                None => true,
                Some((_, best_score, best_len)) => {
                    score > best_score + f64::EPSILON
                        || ((score - best_score).abs() <= f64::EPSILON && len > best_len)
                }
            };
            if better {
                best = Some((idx, score, len));
            }
        }
        best.map(|(idx, _, _)| idx)
    }

    fn pick<F>(
        &self,
        candidates: &[BookMetadataCandidate],
        field: MetadataField,
        agrees: F,
    ) -> Option<Field<String>>
    where
        F: Fn(&str, &str) -> bool,
    {
        let offers = Self::offers(candidates, field);
        let idx = self.winner(&offers)?;
        let winner = &offers[idx];

        let agreeing = offers
            .iter()
            .enumerate()
            .filter(|(i, o)| *i != idx && agrees(o.value, winner.value))
            .count();
        if agreeing + 1 < offers.len() {
            debug!(
                "Conflicting values for {}: chose '{}' from {}",
                field, winner.value, winner.source
            );
        }

        let confidence = (winner.confidence + AGREEMENT_BONUS * agreeing as f64).min(1.0);
        Some(Field::new(winner.value.to_string(), confidence, winner.source))
    }

    fn pick_year(&self, candidates: &[BookMetadataCandidate]) -> Option<Field<u32>> {
        let offers: Vec<(u32, Offer<'_>)> = Self::offers(candidates, MetadataField::Year)
            .into_iter()
            .filter_map(|o| {
                let year = parse_year(o.value)?;
                if is_valid_year(year, self.current_year) {
                    Some((year, o))
                } else {
                    debug!("Discarding implausible year {} from {}", year, o.source);
                    None
                }
            })
            .collect();

        let plain: Vec<Offer<'_>> = offers
            .iter()
            .map(|(_, o)| Offer {
                value: o.value,
                source: o.source,
                confidence: o.confidence,
            })
            .collect();
        let idx = self.winner(&plain)?;
        let (year, winner) = &offers[idx];

        let agreeing = offers
            .iter()
            .enumerate()
            .filter(|(i, (y, _))| *i != idx && y == year)
            .count();
        let confidence = (winner.confidence + AGREEMENT_BONUS * agreeing as f64).min(1.0);
        Some(Field::new(*year, confidence, winner.source))
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}
