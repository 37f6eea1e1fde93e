//! Name-shape heuristics shared by the filename parser and the hierarchy analyzer

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{repair_mojibake, strip_diacritics};

static SERIES_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:series|serie|série|cyklus|sága|saga)\s*[:\-–]?\s+(.+)$").unwrap()
});

static LEADING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3})(?:\s*[.\-–_)]\s*|\s+)(.+)$").unwrap());

static AUTHOR_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\p{Lu}[\p{L}'’.\-]*(?:\s+\p{Lu}[\p{L}'’.\-]*){1,3}$").unwrap()
});

static BRACKET_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(\[{]\s*(\d{4})\s*[)\]}]").unwrap());

static NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:audio\s?books?|audiokniha|unabridged|abridged|mp3|m4b|aac|\d{2,3}\s?kbps)\b",
    )
    .unwrap()
});

static EMPTY_BRACKETS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(\[{]\s*[,;\-]?\s*[)\]}]").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Words that rule a folder out as a person's name
const NON_AUTHOR_WORDS: &[&str] = &[
    "the", "a", "an", "series", "serie", "saga", "cyklus", "book", "books", "kniha", "knihy",
    "dil", "volume", "vol", "part", "collection", "trilogy", "audiobook", "audiokniha",
    "unabridged", "chapter", "kapitola",
];

/// Encoding repair, underscores to spaces, collapsed whitespace
pub(crate) fn clean_text(text: &str) -> String {
    let repaired = repair_mojibake(text).replace('_', " ");
    WHITESPACE_RE.replace_all(repaired.trim(), " ").to_string()
}

/// A path segment with noise removed, plus a bracketed year if one was present.
///
/// `"The Clue (2019) [Audiobook]"` becomes `("The Clue", Some(2019))`.
pub(crate) fn clean_segment(segment: &str) -> (String, Option<u32>) {
    let text = clean_text(segment);

    let year = BRACKET_YEAR_RE
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());

    let text = BRACKET_YEAR_RE.replace_all(&text, " ");
    let text = NOISE_RE.replace_all(&text, " ");
    let text = EMPTY_BRACKETS_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(text.trim(), " ");
    let text = text
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | ',' | ';' | '.'))
        .to_string();

    (text, year)
}

/// Series name from an explicit `Series <name>` style segment
pub(crate) fn series_prefix(segment: &str) -> Option<String> {
    SERIES_PREFIX_RE
        .captures(segment.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `(sequence, title)` from `"01 Title"`, `"1. Title"` or `"2 - Title"`
pub(crate) fn leading_number(segment: &str) -> Option<(String, String)> {
    let caps = LEADING_NUMBER_RE.captures(segment.trim())?;
    let number = caps.get(1)?.as_str().to_string();
    let rest = caps.get(2)?.as_str().trim().to_string();
    if rest.is_empty() {
        return None;
    }
    Some((number, rest))
}

/// Two to four capitalized words, no digits, no series/book vocabulary
pub(crate) fn looks_like_author(segment: &str) -> bool {
    let segment = segment.trim();
    if !AUTHOR_SHAPE_RE.is_match(segment) {
        return false;
    }
    let folded = strip_diacritics(segment).to_lowercase();
    !folded
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| NON_AUTHOR_WORDS.contains(&word))
}
