//! Exact-key duplicate checks on normalized `author|title`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::text::{StandardNormalizer, TextNormalizer};

/// `normalize(author)|normalize(title)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DuplicateKey(String);

impl DuplicateKey {
    pub fn new(author: &str, title: &str) -> Self {
        Self::with_normalizer(&StandardNormalizer, author, title)
    }

    pub fn with_normalizer(normalizer: &dyn TextNormalizer, author: &str, title: &str) -> Self {
        Self(format!(
            "{}|{}",
            normalizer.normalize(author),
            normalizer.normalize(title)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the colliding entry was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Two entries of the same library share a key
    WithinLibrary,
    /// An incoming entry matches one already in the library
    ExistsInLibrary,
}

/// One collision: `existing` was seen first and is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMatch<T> {
    pub kind: MatchType,
    pub key: DuplicateKey,
    pub existing: T,
    pub duplicate: T,
}

/// Every entry whose key was already taken, first-seen wins
pub fn find_key_collisions<T: Clone>(
    items: impl IntoIterator<Item = (DuplicateKey, T)>,
) -> Vec<KeyMatch<T>> {
    let mut seen: HashMap<DuplicateKey, T> = HashMap::new();
    let mut matches = Vec::new();
    for (key, item) in items {
        match seen.get(&key) {
            Some(existing) => matches.push(KeyMatch {
                kind: MatchType::WithinLibrary,
                key,
                existing: existing.clone(),
                duplicate: item,
            }),
            None => {
                seen.insert(key, item);
            }
        }
    }
    matches
}

/// Keyed view of an existing library for checking incoming entries
#[derive(Debug, Clone)]
pub struct LibraryIndex<T> {
    entries: HashMap<DuplicateKey, T>,
}

impl<T: Clone> LibraryIndex<T> {
    /// Build the index; on collision the first entry is kept
    pub fn new(items: impl IntoIterator<Item = (DuplicateKey, T)>) -> Self {
        let mut entries = HashMap::new();
        for (key, item) in items {
            entries.entry(key).or_insert(item);
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &DuplicateKey) -> Option<&T> {
        self.entries.get(key)
    }

    /// Whether `incoming` already exists in the library
    pub fn check(&self, key: &DuplicateKey, incoming: T) -> Option<KeyMatch<T>> {
        self.entries.get(key).map(|existing| KeyMatch {
            kind: MatchType::ExistsInLibrary,
            key: key.clone(),
            existing: existing.clone(),
            duplicate: incoming,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalizes() {
        assert_eq!(
            DuplicateKey::new("Karel Čapek", "Válka s mloky!"),
            DuplicateKey::new("karel capek", "VALKA S MLOKY")
        );
        assert_eq!(DuplicateKey::new("A. B", "T").as_str(), "a b|t");
    }

    #[test]
    fn test_two_identical_units_one_collision() {
        let items = vec![
            (DuplicateKey::new("John Doe", "The Clue"), "/a"),
            (DuplicateKey::new("JOHN DOE", "the clue"), "/b"),
            (DuplicateKey::new("John Doe", "Other"), "/c"),
        ];
        let collisions = find_key_collisions(items);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].existing, "/a");
        assert_eq!(collisions[0].duplicate, "/b");
        assert_eq!(collisions[0].kind, MatchType::WithinLibrary);
    }

    #[test]
    fn test_three_way_collision_reports_against_first() {
        let key = DuplicateKey::new("A", "T");
        let collisions = find_key_collisions(vec![(key.clone(), 1), (key.clone(), 2), (key, 3)]);
        assert_eq!(collisions.len(), 2);
        assert!(collisions.iter().all(|m| m.existing == 1));
    }

    #[test]
    fn test_library_index_check() {
        let index = LibraryIndex::new(vec![
            (DuplicateKey::new("A", "T"), "first"),
            (DuplicateKey::new("a", "t"), "second"),
        ]);
        assert_eq!(index.len(), 1);
        let m = index.check(&DuplicateKey::new("A", "T"), "incoming").unwrap();
        assert_eq!(m.kind, MatchType::ExistsInLibrary);
        assert_eq!(m.existing, "first");
        assert!(index.check(&DuplicateKey::new("B", "T"), "x").is_none());
    }
}
