//! Configuration for organizing runs

mod weights;

pub use weights::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// How files reach their target location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Duplicate the files, leaving the source untouched
    #[default]
    Copy,
    /// Relocate the files; nothing remains at the source
    Move,
    /// Hard-link each file (same filesystem only)
    HardLink,
    /// Symbolic link pointing back at each source file
    SymLink,
}

impl OperationKind {
    /// All operation kinds
    pub const ALL: [OperationKind; 4] = [Self::Copy, Self::Move, Self::HardLink, Self::SymLink];

    /// Whether the source files are gone after a successful run
    pub fn removes_source(&self) -> bool {
        matches!(self, Self::Move)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Move => write!(f, "move"),
            Self::HardLink => write!(f, "hardlink"),
            Self::SymLink => write!(f, "symlink"),
        }
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "copy" | "cp" => Ok(Self::Copy),
            "move" | "mv" => Ok(Self::Move),
            "hardlink" | "hard-link" | "link" => Ok(Self::HardLink),
            "symlink" | "symbolic-link" | "softlink" => Ok(Self::SymLink),
            _ => Err(Error::Config(format!(
                "Invalid operation '{}'. Use: copy, move, hardlink or symlink",
                s
            ))),
        }
    }
}

/// Post-copy integrity check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// No verification
    #[default]
    None,
    /// Compare file sizes
    Size,
    /// Compare Blake3 checksums (reads every byte twice)
    Checksum,
}

impl FromStr for VerifyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "size" => Ok(Self::Size),
            "checksum" | "hash" | "blake3" => Ok(Self::Checksum),
            _ => Err(Error::Config(format!(
                "Invalid verify mode '{}'. Use: none, size or checksum",
                s
            ))),
        }
    }
}

/// Whether the per-unit `mp3tags.json` cache is used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Always read audio files
    Off,
    /// Reuse valid cache entries, never write
    #[default]
    ReadOnly,
    /// Reuse valid entries and refresh the cache file
    ReadWrite,
}

impl CacheMode {
    pub fn reads(&self) -> bool {
        !matches!(self, Self::Off)
    }

    pub fn writes(&self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// Default similarity threshold for grouping near-duplicate names
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.8;

/// Configuration for abook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    /// Default operation kind
    pub operation: OperationKind,
    /// Keep UTF-8 names instead of ASCII transliteration
    pub preserve_diacritics: bool,
    /// Similarity threshold in `[0, 1]` for duplicate grouping
    pub duplicate_threshold: f64,
    /// Integrity verification after each file operation
    pub verify: VerifyMode,
    /// Remove empty directories under the source root after a move
    pub cleanup_empty_dirs: bool,
    /// Tag cache usage
    pub tag_cache: CacheMode,
    /// Require volume-like names for multi-volume detection
    pub strict_volume_names: bool,
    /// Treat each `.m4b` in a folder of several as its own book
    pub split_single_file_books: bool,
    /// Per-source reliability weights for consolidation
    pub source_weights: SourceWeights,
    /// Per-field importance weights for overall confidence
    pub field_weights: FieldWeights,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            operation: OperationKind::Copy,
            preserve_diacritics: false,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            verify: VerifyMode::None,
            cleanup_empty_dirs: true,
            tag_cache: CacheMode::ReadOnly,
            strict_volume_names: true,
            split_single_file_books: true,
            source_weights: SourceWeights::default(),
            field_weights: FieldWeights::default(),
        }
    }
}

impl OrganizerConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("abook").join("config.json"))
    }

    /// Load config from disk, falling back to defaults if not found
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| match serde_json::from_str::<Self>(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring invalid config file: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            std::fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Reject values outside their documented ranges
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err(Error::Config(format!(
                "Duplicate threshold must be within [0, 1], got {}",
                self.duplicate_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_parse() {
        assert_eq!("copy".parse::<OperationKind>().unwrap(), OperationKind::Copy);
        assert_eq!("MOVE".parse::<OperationKind>().unwrap(), OperationKind::Move);
        assert_eq!("hard-link".parse::<OperationKind>().unwrap(), OperationKind::HardLink);
        assert_eq!("symlink".parse::<OperationKind>().unwrap(), OperationKind::SymLink);
        assert!("teleport".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_operation_kind_display_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.to_string().parse::<OperationKind>().unwrap(), kind);
        }
        assert!(OperationKind::Move.removes_source());
        assert!(!OperationKind::HardLink.removes_source());
    }

    #[test]
    fn test_verify_mode_parse() {
        assert_eq!("size".parse::<VerifyMode>().unwrap(), VerifyMode::Size);
        assert_eq!("blake3".parse::<VerifyMode>().unwrap(), VerifyMode::Checksum);
        assert!("maybe".parse::<VerifyMode>().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = OrganizerConfig::default();
        assert_eq!(config.operation, OperationKind::Copy);
        assert_eq!(config.duplicate_threshold, 0.8);
        assert!(!config.preserve_diacritics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config: OrganizerConfig =
            serde_json::from_str(r#"{"operation":"move","preserve_diacritics":true}"#).unwrap();
        assert_eq!(config.operation, OperationKind::Move);
        assert!(config.preserve_diacritics);
        assert_eq!(config.tag_cache, CacheMode::ReadOnly);
    }

    #[test]
    fn test_config_validate_threshold() {
        let config = OrganizerConfig {
            duplicate_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
