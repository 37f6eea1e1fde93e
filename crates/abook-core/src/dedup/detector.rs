//! Fuzzy grouping of name variants

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::union_find::UnionFind;
use crate::config::DEFAULT_DUPLICATE_THRESHOLD;
use crate::text::{StandardNormalizer, TextNormalizer};

/// One spelling of a name and how often it occurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameVariant {
    pub name: String,
    pub count: usize,
}

/// Names considered the same, with the most frequent one as canonical
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub canonical: String,
    /// Members in first-seen order, canonical included
    pub variants: Vec<NameVariant>,
}

impl DuplicateGroup {
    pub fn total_count(&self) -> usize {
        self.variants.iter().map(|v| v.count).sum()
    }

    /// Variants other than the canonical name
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .map(|v| v.name.as_str())
            .filter(move |n| *n != self.canonical)
    }
}

/// Count names in first-seen order
pub fn tally<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for name in names.into_iter().map(str::trim).filter(|n| !n.is_empty()) {
        match index.get(name) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(name, counts.len());
                counts.push((name.to_string(), 1));
            }
        }
    }
    counts
}

/// Map every alias to its group's canonical name
pub fn canonical_map(groups: &[DuplicateGroup]) -> HashMap<String, String> {
    groups
        .iter()
        .flat_map(|g| g.aliases().map(move |a| (a.to_string(), g.canonical.clone())))
        .collect()
}

/// Groups near-identical names.
///
/// Every pair of distinct names is compared, so this is meant for author and
/// narrator lists, not for per-unit data.
#[derive(Clone)]
pub struct DuplicateDetector {
    normalizer: Arc<dyn TextNormalizer>,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self {
            normalizer: Arc::new(StandardNormalizer),
        }
    }

    pub fn with_normalizer(normalizer: Arc<dyn TextNormalizer>) -> Self {
        Self { normalizer }
    }

    /// Group `names` whose similarity reaches `threshold`.
    ///
    /// `names` is an ordered `(name, occurrences)` sequence; repeated names
    /// have their counts summed. Only groups with two or more members are
    /// returned. The canonical name is the most frequent member, ties going
    /// to the one seen first.
    pub fn group(&self, names: &[(String, usize)], threshold: f64) -> Vec<DuplicateGroup> {
        let threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_DUPLICATE_THRESHOLD
        };

        let mut distinct: Vec<NameVariant> = Vec::new();
        for (name, count) in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            match distinct.iter_mut().find(|v| v.name == name) {
                Some(v) => v.count += count,
                None => distinct.push(NameVariant {
                    name: name.to_string(),
                    count: *count,
                }),
            }
        }

        let mut uf = UnionFind::new(distinct.len());
        for i in 0..distinct.len() {
            for j in (i + 1)..distinct.len() {
                let score = self.normalizer.similarity(&distinct[i].name, &distinct[j].name);
                if score >= threshold {
                    uf.union(i, j);
                }
            }
        }

        let groups: Vec<DuplicateGroup> = uf
            .sets()
            .into_iter()
            .filter(|members| members.len() > 1)
            .map(|members| {
                let variants: Vec<NameVariant> =
                    members.iter().map(|&i| distinct[i].clone()).collect();
                let mut canonical = &variants[0];
                for v in &variants[1..] {
                    if v.count > canonical.count {
                        canonical = v;
                    }
                }
                DuplicateGroup {
                    canonical: canonical.name.clone(),
                    variants,
                }
            })
            .collect();

        debug!(
            "Grouped {} distinct names into {} duplicate groups",
            distinct.len(),
            groups.len()
        );
        groups
    }
}
