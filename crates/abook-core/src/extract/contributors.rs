//! Splitting combined "author / reads narrator" tag values

use once_cell::sync::Lazy;
use regex::Regex;

static NARRATOR_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s*[/|;,\-–]\s*(?:narrated by|performed by|read by|reads|performs|perform|čtou|ctou|čte|cte|účinkují|ucinkuji|účinkuje|ucinkuje)\s*:?\s+",
    )
    .unwrap()
});

/// Author and optional narrator parsed from one tag value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributors {
    pub author: Option<String>,
    pub narrator: Option<String>,
}

/// Split a combined value at the last separator followed by a narrator keyword.
///
/// ```
/// use abook_core::extract::split_contributors;
///
/// let c = split_contributors("Karel Čapek / čte František Filipovský");
/// assert_eq!(c.author.as_deref(), Some("Karel Čapek"));
/// assert_eq!(c.narrator.as_deref(), Some("František Filipovský"));
///
/// let c = split_contributors("Karel Čapek");
/// assert_eq!(c.author.as_deref(), Some("Karel Čapek"));
/// assert_eq!(c.narrator, None);
/// ```
pub fn split_contributors(value: &str) -> Contributors {
    let value = value.trim();
    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    match NARRATOR_SEPARATOR_RE.find_iter(value).last() {
        Some(m) => Contributors {
            author: non_empty(&value[..m.start()]),
            narrator: non_empty(&value[m.end()..]),
        },
        None => Contributors {
            author: non_empty(value),
            narrator: None,
        },
    }
}
