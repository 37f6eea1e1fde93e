//! Utility functions shared across modules.

/// Sanitize a string for use as a single path component.
///
/// Characters that are invalid on common filesystems (`/`, `\`, `:`, `*`,
/// `?`, `"`, `<`, `>`, `|`) and control characters become underscores,
/// runs of whitespace collapse to one space, and leading/trailing
/// whitespace and trailing dots are removed (Windows rejects names ending
/// in a dot).
///
/// # Examples
///
/// ```
/// use abook_core::utils::sanitize_component;
///
/// assert_eq!(sanitize_component("normal name"), "normal name");
/// assert_eq!(sanitize_component("AC/DC"), "AC_DC");
/// assert_eq!(sanitize_component("Title: Part 1"), "Title_ Part 1");
/// assert_eq!(sanitize_component("  spaced   out  "), "spaced out");
/// assert_eq!(sanitize_component("Ends with dots..."), "Ends with dots");
/// ```
pub fn sanitize_component(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect();

    replaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ' '])
        .to_string()
}

/// Format bytes as a human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Lowercased extension of a path, if any
pub(crate) fn extension_lowercase(path: &std::path::Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
