//! Marker files left by surrounding tooling.
//!
//! Only the presence of these entries matters; their contents are never read.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Zero-byte file marking a unit as published to a library server
pub const PUBLISHED_MARKER: &str = ".published";
/// Zero-byte file excluding a unit from organizing
pub const IGNORE_MARKER: &str = ".ignore";
/// Reserved subdirectory holding discarded files
pub const TRASH_DIR: &str = ".trash";

/// Marker facts for one directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMarkers {
    pub published: bool,
    pub ignored: bool,
    pub has_trash: bool,
}

impl UnitMarkers {
    /// Read the markers present in `dir`
    pub fn read(dir: &Path) -> Self {
        Self {
            published: dir.join(PUBLISHED_MARKER).is_file(),
            ignored: dir.join(IGNORE_MARKER).is_file(),
            has_trash: dir.join(TRASH_DIR).is_dir(),
        }
    }
}

/// Which marker file to set or clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Published,
    Ignore,
}

impl Marker {
    fn file_name(&self) -> &'static str {
        match self {
            Self::Published => PUBLISHED_MARKER,
            Self::Ignore => IGNORE_MARKER,
        }
    }
}

/// Create or remove a marker file in `dir`
pub fn set_marker(dir: &Path, marker: Marker, present: bool) -> crate::Result<()> {
    let path = dir.join(marker.file_name());
    if present {
        if !path.exists() {
            fs::File::create(&path)?;
        }
    } else if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_markers() {
        let temp = TempDir::new().unwrap();
        assert_eq!(UnitMarkers::read(temp.path()), UnitMarkers::default());

        fs::write(temp.path().join(PUBLISHED_MARKER), b"").unwrap();
        fs::create_dir(temp.path().join(TRASH_DIR)).unwrap();
        let markers = UnitMarkers::read(temp.path());
        assert!(markers.published);
        assert!(markers.has_trash);
        assert!(!markers.ignored);
    }

    #[test]
    fn test_set_and_clear_marker() {
        let temp = TempDir::new().unwrap();
        set_marker(temp.path(), Marker::Ignore, true).unwrap();
        set_marker(temp.path(), Marker::Ignore, true).unwrap();
        assert!(UnitMarkers::read(temp.path()).ignored);
        assert_eq!(fs::metadata(temp.path().join(IGNORE_MARKER)).unwrap().len(), 0);

        set_marker(temp.path(), Marker::Ignore, false).unwrap();
        assert!(!UnitMarkers::read(temp.path()).ignored);
    }
}
