//! Title/author/series guesses from path segments

use std::path::{Component, Path, PathBuf};

use super::patterns::{clean_segment, leading_number, looks_like_author, series_prefix};
use super::tags::is_placeholder_title;
use crate::metadata::{BookMetadataCandidate, MetadataField, MetadataSource};
use crate::scanner::{is_audio_file, AudiobookUnit};

/// How many trailing path segments are considered
const MAX_SEGMENTS: usize = 3;

const SERIES_SCORE: f64 = 0.2;
const NUMBERED_TITLE_SCORE: f64 = 0.3;
const AUTHOR_SCORE: f64 = 0.25;
const PLAIN_TITLE_SCORE: f64 = 0.1;
const FALLBACK_TITLE_SCORE: f64 = 0.05;

/// Pattern-based parser over the last few segments of a unit's path.
///
/// Segments are read from the unit's own name upward. Within one parse a
/// field, once filled, is never overwritten by a later match.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameParser;

impl FilenameParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a unit using its path relative to `root`.
    ///
    /// A directory unit whose audio is named `NN - Title` (one file, or
    /// several agreeing on the title) is parsed through that file name, and
    /// its own folder becomes the series.
    pub fn parse_unit(&self, unit: &AudiobookUnit, root: &Path) -> BookMetadataCandidate {
        let relative = unit.path.strip_prefix(root).unwrap_or(&unit.path);
        if unit.is_single_file || unit.is_multi_volume {
            return self.parse(relative);
        }
        let Some(stem) = titled_stem(&unit.audio_files) else {
            return self.parse(relative);
        };

        let mut candidate = self.parse(&relative.join(&stem));
        if candidate.has(MetadataField::Series) || relative.components().count() < 2 {
            return candidate;
        }

        let folder = relative
            .file_name()
            .map(|n| clean_segment(&n.to_string_lossy()).0)
            .unwrap_or_default();
        let same_as = |field: MetadataField| {
            candidate
                .value(field)
                .map(|v| v.eq_ignore_ascii_case(&folder))
                .unwrap_or(false)
        };
        if !folder.is_empty() && !same_as(MetadataField::Title) && !same_as(MetadataField::Author) {
            candidate.set(MetadataField::Series, folder);
            let confidence = candidate.confidence + SERIES_SCORE;
            candidate = candidate.with_confidence(confidence);
        }
        candidate
    }

    /// Parse a path. Only the string content matters; nothing is read from disk.
    pub fn parse(&self, path: &Path) -> BookMetadataCandidate {
        let mut candidate = BookMetadataCandidate::new(MetadataSource::FilenameParser);
        let mut score = 0.0;

        let mut segments: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();

        if let Some(last) = segments.last_mut() {
            if is_audio_file(Path::new(last.as_str())) {
                if let Some(stem) = Path::new(last.as_str()).file_stem() {
                    *last = stem.to_string_lossy().to_string();
                }
            }
        }

        let start = segments.len().saturating_sub(MAX_SEGMENTS);
        let window = &segments[start..];
        let final_segment = window.last().map(|s| clean_segment(s).0);

        for (index, raw) in window.iter().rev().enumerate() {
            let is_final = index == 0;
            let (segment, year) = clean_segment(raw);

            if let Some(year) = year {
                if !candidate.has(MetadataField::Year) {
                    candidate.set(MetadataField::Year, year.to_string());
                }
            }
            if segment.is_empty() {
                continue;
            }

            if let Some(series) = series_prefix(&segment) {
                if !candidate.has(MetadataField::Series) {
                    candidate.set(MetadataField::Series, series);
                    score += SERIES_SCORE;
                }
                continue;
            }

            if let Some((number, title)) = leading_number(&segment) {
                if !candidate.has(MetadataField::Title) {
                    candidate.set(MetadataField::Title, title);
                    if !candidate.has(MetadataField::Sequence) {
                        candidate.set(MetadataField::Sequence, number);
                    }
                    score += NUMBERED_TITLE_SCORE;
                }
                continue;
            }

            if !is_final && looks_like_author(&segment) {
                if !candidate.has(MetadataField::Author) {
                    candidate.set(MetadataField::Author, segment);
                    score += AUTHOR_SCORE;
                }
                continue;
            }

            if !candidate.has(MetadataField::Title) {
                candidate.set(MetadataField::Title, segment);
                score += PLAIN_TITLE_SCORE;
            }
        }

        if !candidate.has(MetadataField::Title) {
            if let Some(fallback) = final_segment.filter(|s| !s.is_empty()) {
                candidate.set(MetadataField::Title, fallback);
                score += FALLBACK_TITLE_SCORE;
            }
        }

        candidate.with_confidence(score)
    }
}

/// Stem shared by a unit's `NN - Title` audio files.
///
/// Returns the first file's stem when every file parses to the same
/// non-placeholder title.
fn titled_stem(files: &[PathBuf]) -> Option<String> {
    let mut stems = files
        .iter()
        .filter_map(|f| f.file_stem())
        .map(|s| s.to_string_lossy().to_string());
    let first = stems.next()?;
    let title_of = |stem: &str| leading_number(&clean_segment(stem).0).map(|(_, title)| title);

    let title = title_of(&first).filter(|t| !is_placeholder_title(t))?;
    if stems.all(|s| title_of(&s).map(|t| t.eq_ignore_ascii_case(&title)).unwrap_or(false)) {
        Some(first)
    } else {
        None
    }
}
