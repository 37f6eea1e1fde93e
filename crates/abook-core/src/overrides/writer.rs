//! Writing sidecars without clobbering curated ones

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::format::{BookOrganizerFormatter, SidecarFormatter};
use super::schema::{MetadataOverride, BOOKINFO_FILE};
use crate::error::Result;

/// Outcome of a sidecar write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteStatus {
    Written,
    /// The file exists and `force` was not given
    SkippedExisting,
    /// The directory holds a manually curated sidecar; nothing was touched
    Protected,
}

/// Writes one sidecar format into unit directories
pub struct SidecarWriter {
    formatter: Box<dyn SidecarFormatter>,
}

impl Default for SidecarWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SidecarWriter {
    /// Writer for the native `bookinfo.json`
    pub fn new() -> Self {
        Self {
            formatter: Box::new(BookOrganizerFormatter),
        }
    }

    pub fn with_formatter(formatter: Box<dyn SidecarFormatter>) -> Self {
        Self { formatter }
    }

    pub fn file_name(&self) -> &'static str {
        self.formatter.file_name()
    }

    /// Write `values` into `dir`.
    ///
    /// A directory whose `bookinfo.json` (or existing target file) is
    /// marked `source: manual` is never written, regardless of `force`.
    pub fn write(&self, dir: &Path, values: &MetadataOverride, force: bool) -> Result<WriteStatus> {
        let target = dir.join(self.formatter.file_name());

        if is_protected(&dir.join(BOOKINFO_FILE)) || is_protected(&target) {
            info!("Not touching manually curated sidecar in {}", dir.display());
            return Ok(WriteStatus::Protected);
        }

        if target.exists() && !force {
            debug!("Sidecar {} exists, skipping", target.display());
            return Ok(WriteStatus::SkippedExisting);
        }

        let content = self.formatter.format(values)?;
        let temp = target.with_extension("tmp");
        fs::write(&temp, content)?;
        fs::rename(&temp, &target)?;
        debug!("Wrote {}", target.display());
        Ok(WriteStatus::Written)
    }
}

fn is_protected(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    MetadataOverride::from_file(path)
        .map(|o| o.is_manual())
        .unwrap_or(false)
}
