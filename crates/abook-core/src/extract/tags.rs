//! Embedded tag reading and per-unit aggregation

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::contributors::split_contributors;
use super::tag_cache::{file_stamp, TagCache};
use crate::config::CacheMode;
use crate::error::{Error, Result};
use crate::metadata::{is_valid_year, BookMetadataCandidate, MetadataField, MetadataSource};
use crate::scanner::AudiobookUnit;
use crate::text::strip_diacritics;

const TITLE_SCORE: f64 = 0.4;
const AUTHOR_SCORE: f64 = 0.3;
const NARRATOR_SCORE: f64 = 0.1;
const GENRE_SCORE: f64 = 0.1;
const YEAR_SCORE: f64 = 0.1;

static PLACEHOLDER_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:unknown(?: title| album)?|untitled|no title|title|track|audiobook|audio book|chapter|kapitola|part|cast|cd|disc|disk|neznamy|nezname|neznamy titul|bez nazvu)?(?:\s*[#._-]?\s*\d{1,3})?$",
    )
    .unwrap()
});

/// Whether a title is a generic placeholder such as "Unknown" or "Track 01"
pub fn is_placeholder_title(title: &str) -> bool {
    let folded = strip_diacritics(title.trim()).to_lowercase();
    folded.is_empty() || PLACEHOLDER_TITLE_RE.is_match(&folded)
}

/// Tags read from one audio file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Playback length in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
}

/// Anything that can read tags from an audio file
pub trait TagSource: Send + Sync {
    fn read(&self, path: &Path) -> Result<FileTags>;
}

/// Tag source backed by `lofty`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagSource;

impl TagSource for LoftyTagSource {
    fn read(&self, path: &Path) -> Result<FileTags> {
        let extraction_error = |e: lofty::error::LoftyError| Error::Extraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        let tagged_file = Probe::open(path)
            .map_err(extraction_error)?
            .read()
            .map_err(extraction_error)?;

        let duration_ms = tagged_file.properties().duration().as_millis() as u64;
        let mut tags = FileTags {
            duration_ms,
            ..Default::default()
        };

        if let Some(tag) = tagged_file.primary_tag().or(tagged_file.first_tag()) {
            tags.title = tag.title().map(|s| s.to_string());
            tags.album = tag.album().map(|s| s.to_string());
            tags.artist = tag.artist().map(|s| s.to_string());
            tags.genre = tag.genre().map(|s| s.to_string());
            tags.year = tag.year();
            tags.album_artist = tag.get_string(&ItemKey::AlbumArtist).map(|s| s.to_string());
            tags.composer = tag.get_string(&ItemKey::Composer).map(|s| s.to_string());
        }

        Ok(tags)
    }
}

/// Result of reading a unit's tags
#[derive(Debug, Clone)]
pub struct TagExtraction {
    pub candidate: BookMetadataCandidate,
    pub files_read: usize,
    pub files_skipped: usize,
    pub total_duration: Duration,
}

/// Reads all audio files of a unit and aggregates their tags
#[derive(Clone)]
pub struct TagExtractor {
    source: Arc<dyn TagSource>,
    cache_mode: CacheMode,
    current_year: u32,
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new(Arc::new(LoftyTagSource))
    }
}

impl TagExtractor {
    pub fn new(source: Arc<dyn TagSource>) -> Self {
        use chrono::Datelike;
        Self {
            source,
            cache_mode: CacheMode::Off,
            current_year: chrono::Utc::now().year() as u32,
        }
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn with_current_year(mut self, year: u32) -> Self {
        self.current_year = year;
        self
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    /// Read the unit's tags and build the `Tags` candidate.
    ///
    /// Unreadable files are skipped with a warning. Fails with
    /// [`Error::Extraction`] only when no file at all could be read.
    pub fn extract(&self, unit: &AudiobookUnit) -> Result<TagExtraction> {
        let cache_dir = unit.directory_path();
        let mut cache = if self.cache_mode.reads() {
            TagCache::load(cache_dir)
        } else {
            None
        };
        let mut cache_dirty = false;

        let mut all_tags = Vec::with_capacity(unit.audio_files.len());
        let mut skipped = 0usize;

        for file in &unit.audio_files {
            let stamp = file_stamp(file);
            let key = cache_key(cache_dir, file);

            let cached = match (&cache, stamp) {
                (Some(cache), Some((size, modified))) => {
                    cache.lookup(&key, size, modified).cloned()
                }
                _ => None,
            };
            if let Some(tags) = cached {
                all_tags.push(tags);
                continue;
            }

            match self.source.read(file) {
                Ok(tags) => {
                    if self.cache_mode.writes() {
                        if let Some((size, modified)) = stamp {
                            cache
                                .get_or_insert_with(TagCache::default)
                                .insert(key, size, modified, tags.clone());
                            cache_dirty = true;
                        }
                    }
                    all_tags.push(tags);
                }
                Err(e) => {
                    warn!("Skipping unreadable audio file {}: {}", file.display(), e);
                    skipped += 1;
                }
            }
        }

        if all_tags.is_empty() {
            return Err(Error::Extraction {
                path: unit.path.clone(),
                reason: format!("no readable audio files ({} skipped)", skipped),
            });
        }

        if cache_dirty {
            if let Some(cache) = cache.as_mut() {
                cache.scanned_at = chrono::Utc::now();
                if let Err(e) = cache.save(cache_dir) {
                    warn!("Failed to write tag cache in {}: {}", cache_dir.display(), e);
                }
            }
        }

        let total_duration = Duration::from_millis(all_tags.iter().map(|t| t.duration_ms).sum());
        let candidate = self.aggregate(unit, &all_tags);
        debug!(
            "Tags for {}: {} read, {} skipped, confidence {:.2}",
            unit.path.display(),
            all_tags.len(),
            skipped,
            candidate.confidence
        );

        Ok(TagExtraction {
            candidate,
            files_read: all_tags.len(),
            files_skipped: skipped,
            total_duration,
        })
    }

    /// Majority vote per field across the unit's files
    pub fn aggregate(&self, unit: &AudiobookUnit, all_tags: &[FileTags]) -> BookMetadataCandidate {
        let mut candidate = BookMetadataCandidate::new(MetadataSource::Tags);
        let mut score = 0.0;

        let title = majority(all_tags.iter().map(|t| t.album.as_deref()))
            .or_else(|| majority(all_tags.iter().map(|t| t.title.as_deref())));
        match title {
            Some(title) if !is_placeholder_title(&title) => {
                candidate.set(MetadataField::Title, title);
                score += TITLE_SCORE;
            }
            Some(placeholder) => {
                let folder = unit.folder_name();
                debug!("Placeholder title '{}', using folder name '{}'", placeholder, folder);
                candidate.set(MetadataField::Title, folder);
                candidate.mark_derived(MetadataField::Title);
            }
            None => {}
        }

        let combined = majority(all_tags.iter().map(|t| t.album_artist.as_deref()))
            .or_else(|| majority(all_tags.iter().map(|t| t.artist.as_deref())));
        let contributors = combined.as_deref().map(split_contributors);

        if let Some(author) = contributors.as_ref().and_then(|c| c.author.clone()) {
            candidate.set(MetadataField::Author, author);
            score += AUTHOR_SCORE;
        }

        let narrator = contributors
            .and_then(|c| c.narrator)
            .or_else(|| majority(all_tags.iter().map(|t| t.composer.as_deref())));
        if let Some(narrator) = narrator {
            candidate.set(MetadataField::Narrator, narrator);
            score += NARRATOR_SCORE;
        }

        if let Some(genre) = majority(all_tags.iter().map(|t| t.genre.as_deref())) {
            candidate.set(MetadataField::Genre, genre);
            score += GENRE_SCORE;
        }

        let years: Vec<String> = all_tags
            .iter()
            .filter_map(|t| t.year)
            .map(|y| y.to_string())
            .collect();
        if let Some(year) = majority(years.iter().map(|y| Some(y.as_str()))) {
            if year
                .parse::<u32>()
                .map(|y| is_valid_year(y, self.current_year))
                .unwrap_or(false)
            {
                candidate.set(MetadataField::Year, year);
                score += YEAR_SCORE;
            }
        }

        candidate.with_confidence(score)
    }
}

/// Cache key of a file: its path relative to the cache directory
fn cache_key(dir: &Path, file: &Path) -> String {
    file.strip_prefix(dir)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Most frequent non-empty value; ties go to the value seen first
fn majority<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values.flatten().map(str::trim).filter(|v| !v.is_empty()) {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map(|(_, n)| count > n).unwrap_or(true) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.to_string())
}
