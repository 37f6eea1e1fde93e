//! Sidecar output formats

use std::fmt::Write as _;

use super::schema::{split_list, AbsMetadata, MetadataOverride, BOOKINFO_FILE, METADATA_FILE};
use crate::error::Result;

/// File name of the plain-text export
pub const NFO_FILE: &str = "metadata.nfo";

/// Delimiter line around the description block of an NFO file
pub const NFO_DESCRIPTION_DELIMITER: &str = "=== description ===";

/// Renders an override record into one sidecar file format
pub trait SidecarFormatter: Send + Sync {
    /// File name the output is written to
    fn file_name(&self) -> &'static str;

    fn format(&self, values: &MetadataOverride) -> Result<String>;
}

/// Native `bookinfo.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct BookOrganizerFormatter;

impl SidecarFormatter for BookOrganizerFormatter {
    fn file_name(&self) -> &'static str {
        BOOKINFO_FILE
    }

    fn format(&self, values: &MetadataOverride) -> Result<String> {
        Ok(serde_json::to_string_pretty(values)?)
    }
}

/// Third-party `metadata.json` with list-valued authors, narrators and genres
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsMetadataFormatter;

impl SidecarFormatter for AbsMetadataFormatter {
    fn file_name(&self) -> &'static str {
        METADATA_FILE
    }

    fn format(&self, values: &MetadataOverride) -> Result<String> {
        Ok(serde_json::to_string_pretty(&AbsMetadata::from_override(values))?)
    }
}

/// Plain `key: value` text export
#[derive(Debug, Clone, Copy, Default)]
pub struct NfoFormatter;

impl SidecarFormatter for NfoFormatter {
    fn file_name(&self) -> &'static str {
        NFO_FILE
    }

    fn format(&self, values: &MetadataOverride) -> Result<String> {
        let mut out = String::new();
        let lines = [
            ("title", &values.title),
            ("author", &values.author),
            ("narrator", &values.narrator),
            ("series name", &values.series),
            ("position in series", &values.series_number),
            ("genre", &values.genre),
            ("copyright", &values.year),
            ("publisher", &values.publisher),
            ("language", &values.language),
        ];
        for (key, value) in lines {
            if let Some(value) = value {
                writeln!(out, "{}: {}", key, split_list(value).join(", "))?;
            }
        }

        if let Some(description) = values.description.as_deref() {
            writeln!(out, "{}", NFO_DESCRIPTION_DELIMITER)?;
            writeln!(out, "{}", description.trim())?;
            writeln!(out, "{}", NFO_DESCRIPTION_DELIMITER)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetadataOverride {
        MetadataOverride {
            title: Some("Good Omens".into()),
            author: Some("Terry Pratchett; Neil Gaiman".into()),
            narrator: Some("Stephen Fry".into()),
            series: Some("Standalone".into()),
            series_number: Some("1".into()),
            year: Some("1990".into()),
            description: Some("The world ends on Saturday.".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_bookinfo_uses_native_keys() {
        let json = BookOrganizerFormatter.format(&sample()).unwrap();
        assert!(json.contains("\"seriesNumber\": \"1\""));
        assert!(!json.contains("publisher"));
        assert_eq!(MetadataOverride::from_json_str(&json).unwrap(), sample());
    }

    #[test]
    fn test_abs_format_lists() {
        let json = AbsMetadataFormatter.format(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["authors"][1], "Neil Gaiman");
        assert_eq!(value["series"][0]["series"], "Standalone");
        assert_eq!(value["publishedYear"], "1990");
    }

    #[test]
    fn test_nfo_format() {
        let nfo = NfoFormatter.format(&sample()).unwrap();
        assert!(nfo.contains("title: Good Omens\n"));
        assert!(nfo.contains("author: Terry Pratchett, Neil Gaiman\n"));
        assert!(nfo.contains("series name: Standalone\n"));
        assert!(nfo.contains("position in series: 1\n"));
        assert!(nfo.contains("copyright: 1990\n"));
        assert!(nfo.ends_with(
            "=== description ===\nThe world ends on Saturday.\n=== description ===\n"
        ));
        assert!(!nfo.contains("genre:"));
    }

    #[test]
    fn test_nfo_without_description_has_no_delimiter() {
        let values = MetadataOverride {
            title: Some("Dune".into()),
            ..Default::default()
        };
        let nfo = NfoFormatter.format(&values).unwrap();
        assert_eq!(nfo, "title: Dune\n");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(BookOrganizerFormatter.file_name(), "bookinfo.json");
        assert_eq!(AbsMetadataFormatter.file_name(), "metadata.json");
        assert_eq!(NfoFormatter.file_name(), "metadata.nfo");
    }
}
