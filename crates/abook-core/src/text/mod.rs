//! Text normalization and similarity for names and titles.
//!
//! The organizer treats normalization as a capability: anything that can
//! produce a comparison key and a similarity score in `[0, 1]` can be
//! plugged in through [`TextNormalizer`]. [`StandardNormalizer`] is the
//! built-in implementation used when no other is supplied.

use strsim::normalized_levenshtein;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Produces comparison keys and similarity scores for free text
pub trait TextNormalizer: Send + Sync {
    /// Comparison key: case-, diacritics- and punctuation-insensitive
    fn normalize(&self, text: &str) -> String;

    /// Similarity of two texts in `[0, 1]`, where 1 means equivalent
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Default normalizer built on Unicode decomposition and Levenshtein distance
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNormalizer;

/// Score given to names that only differ by abbreviated given names
const INITIALS_SCORE: f64 = 0.9;

impl TextNormalizer for StandardNormalizer {
    fn normalize(&self, text: &str) -> String {
        let folded = strip_diacritics(text).to_lowercase();
        let spaced: String = folded
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        let na = self.normalize(a);
        let nb = self.normalize(b);

        if na.is_empty() || nb.is_empty() {
            return if na == nb { 1.0 } else { 0.0 };
        }
        if na == nb {
            return 1.0;
        }

        let edit = normalized_levenshtein(&na, &nb);
        let initials = initials_score(&na, &nb);
        edit.max(initials).clamp(0.0, 1.0)
    }
}

/// Score names such as "J. Smith" against "John Smith".
///
/// Both inputs must already be normalized. Returns 0 unless the token
/// counts match, the surnames are identical and every other token is
/// either equal or an initial of its counterpart.
fn initials_score(a: &str, b: &str) -> f64 {
    let ta: Vec<&str> = a.split(' ').collect();
    let tb: Vec<&str> = b.split(' ').collect();

    if ta.len() != tb.len() || ta.len() < 2 || ta.last() != tb.last() {
        return 0.0;
    }

    let given_match = ta[..ta.len() - 1]
        .iter()
        .zip(&tb[..tb.len() - 1])
        .all(|(x, y)| {
            x == y
                || (x.chars().count() == 1 && y.starts_with(*x))
                || (y.chars().count() == 1 && x.starts_with(*y))
        });

    if given_match {
        INITIALS_SCORE
    } else {
        0.0
    }
}

/// Remove diacritics, folding letters that have no decomposition.
///
/// ```
/// use abook_core::text::strip_diacritics;
///
/// assert_eq!(strip_diacritics("Žluťoučký kůň"), "Zlutoucky kun");
/// assert_eq!(strip_diacritics("Łódź"), "Lodz");
/// ```
pub fn strip_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            'đ' => out.push('d'),
            'Đ' => out.push('D'),
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'þ' => out.push_str("th"),
            'Þ' => out.push_str("TH"),
            _ => out.push(c),
        }
    }
    out
}

/// ASCII-only rendition of a name, used by the ASCII-safe path mode.
///
/// Diacritics are stripped, typographic punctuation is mapped to its ASCII
/// counterpart and anything else outside ASCII is dropped.
pub fn transliterate(text: &str) -> String {
    strip_diacritics(text)
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii() => Some(c),
            '‘' | '’' | '‚' | '′' => Some('\''),
            '“' | '”' | '„' | '″' => Some('"'),
            '–' | '—' | '‐' | '‑' => Some('-'),
            '…' => Some('.'),
            c if c.is_whitespace() => Some(' '),
            _ => None,
        })
        .collect()
}

/// Undo UTF-8 text that was decoded as Latin-1 ("Ã©" instead of "é").
///
/// Returns the input unchanged (NFC-composed) when it does not look like
/// mojibake or when the re-decoded bytes are not valid UTF-8.
pub fn repair_mojibake(text: &str) -> String {
    let composed: String = text.nfc().collect();
    if composed.is_ascii() || !composed.chars().all(|c| (c as u32) <= 0xFF) {
        return composed;
    }
    let has_lead_byte = composed
        .chars()
        .any(|c| matches!(c as u32, 0xC2..=0xDF | 0xE0..=0xEF));
    if !has_lead_byte {
        return composed;
    }

    let bytes: Vec<u8> = composed.chars().map(|c| c as u32 as u8).collect();
    match String::from_utf8(bytes) {
        Ok(repaired) => repaired.nfc().collect(),
        Err(_) => composed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let n = StandardNormalizer;
        assert_eq!(n.normalize("  Jón   Smith "), "jon smith");
        assert_eq!(n.normalize("J. R. R. Tolkien"), "j r r tolkien");
        assert_eq!(n.normalize("Čapek, Karel"), "capek karel");
        assert_eq!(n.normalize("---"), "");
    }

    #[test]
    fn test_similarity_identical_after_normalization() {
        let n = StandardNormalizer;
        assert_eq!(n.similarity("Jon Smith", "Jón Smith"), 1.0);
        assert_eq!(n.similarity("KAREL ČAPEK", "karel capek"), 1.0);
    }

    #[test]
    fn test_similarity_initials() {
        let n = StandardNormalizer;
        assert!(n.similarity("J. Smith", "Jon Smith") >= 0.9);
        assert!(n.similarity("J. Smith", "Jón Smith") >= 0.9);
        // Different surnames never get the initials bonus
        assert!(n.similarity("J. Smith", "J. Smyth") < 0.9);
    }

    #[test]
    fn test_similarity_unrelated() {
        let n = StandardNormalizer;
        assert!(n.similarity("Terry Pratchett", "Neil Gaiman") < 0.5);
        assert_eq!(n.similarity("", "Neil Gaiman"), 0.0);
        assert_eq!(n.similarity("", ""), 1.0);
    }

    #[test]
    fn test_transliterate() {
        assert_eq!(transliterate("Příliš žluťoučký"), "Prilis zlutoucky");
        assert_eq!(transliterate("Rock ’n’ Roll – Live"), "Rock 'n' Roll - Live");
        assert_eq!(transliterate("東京 Tokyo"), " Tokyo");
    }

    #[test]
    fn test_repair_mojibake() {
        assert_eq!(repair_mojibake("CafÃ©"), "Café");
        assert_eq!(repair_mojibake("Café"), "Café");
        assert_eq!(repair_mojibake("plain"), "plain");
        // Latin-1 text that is not valid UTF-8 once re-encoded stays as is
        assert_eq!(repair_mojibake("Ã"), "Ã");
    }
}
