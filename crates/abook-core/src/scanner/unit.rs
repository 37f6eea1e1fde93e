//! Audiobook units produced by the scanner

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::markers::UnitMarkers;
use crate::utils::extension_lowercase;

/// Extensions recognized as audiobook audio
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "m4b"];

/// Whether a path has a recognized audio extension
pub fn is_audio_file(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// One audiobook on disk.
///
/// Identity is the absolute `path`: a directory for regular and
/// multi-volume units, the file itself for single-file books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudiobookUnit {
    pub path: PathBuf,
    /// Audio files in playback order (volume by volume)
    pub audio_files: Vec<PathBuf>,
    /// Sum of the audio files' sizes in bytes
    pub total_size: u64,
    pub is_multi_volume: bool,
    /// Volume folder names in natural order (empty unless multi-volume)
    pub volumes: Vec<String>,
    pub is_single_file: bool,
    pub markers: UnitMarkers,
}

impl AudiobookUnit {
    /// Unit for a directory that directly holds audio files
    pub fn directory(path: PathBuf, audio_files: Vec<PathBuf>, total_size: u64) -> Self {
        let markers = UnitMarkers::read(&path);
        Self {
            path,
            audio_files,
            total_size,
            is_multi_volume: false,
            volumes: Vec::new(),
            is_single_file: false,
            markers,
        }
    }

    /// Unit for a single-file book such as one `.m4b` among several
    pub fn single_file(path: PathBuf, size: u64) -> Self {
        let markers = path.parent().map(UnitMarkers::read).unwrap_or_default();
        Self {
            audio_files: vec![path.clone()],
            path,
            total_size: size,
            is_multi_volume: false,
            volumes: Vec::new(),
            is_single_file: true,
            markers,
        }
    }

    /// Display name: the folder name, or the file stem for single-file units
    pub fn name(&self) -> String {
        let name = if self.is_single_file {
            self.path.file_stem()
        } else {
            self.path.file_name()
        };
        name.map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    /// Directory that contains the unit's files
    pub fn directory_path(&self) -> &Path {
        if self.is_single_file {
            self.path.parent().unwrap_or(&self.path)
        } else {
            &self.path
        }
    }

    /// Name of the folder the unit lives in (its own folder for directory units)
    pub fn folder_name(&self) -> String {
        self.directory_path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn file_count(&self) -> usize {
        self.audio_files.len()
    }
}
