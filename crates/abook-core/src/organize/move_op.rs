//! Rename, falling back to copy-then-delete across volumes

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use super::copy::copy_file;
use super::operator::{ensure_parent, is_cross_device, require_source_file, FileOperator};
use crate::config::OperationKind;
use crate::error::{Error, Result};

/// The rename primitive used by [`MoveOperator`]
pub type RenameFn = Arc<dyn Fn(&Path, &Path) -> io::Result<()> + Send + Sync>;

/// Relocates files; the source is gone afterwards
#[derive(Clone)]
pub struct MoveOperator {
    rename: RenameFn,
}

impl Default for MoveOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveOperator {
    pub fn new() -> Self {
        Self {
            rename: Arc::new(|from: &Path, to: &Path| fs::rename(from, to)),
        }
    }

    /// Replace the rename primitive (tests simulate other volumes this way)
    pub fn with_rename(rename: RenameFn) -> Self {
        Self { rename }
    }
}

impl FileOperator for MoveOperator {
    fn kind(&self) -> OperationKind {
        OperationKind::Move
    }

    fn can_execute(&self, source: &Path, _destination: &Path) -> Result<()> {
        fs::metadata(source)?;
        Ok(())
    }

    fn execute(&self, source: &Path, destination: &Path, progress: &mut dyn FnMut(u64)) -> Result<u64> {
        let size = require_source_file(source)?;
        ensure_parent(destination)?;

        match (self.rename)(source, destination) {
            Ok(()) => {
                debug!("Renamed {} -> {}", source.display(), destination.display());
                progress(size);
                Ok(size)
            }
            Err(e) if is_cross_device(&e) => {
                warn!(
                    "Cross-volume move, falling back to copy and delete: {} -> {}",
                    source.display(),
                    destination.display()
                );
                let copied = copy_file(source, destination, progress)?;
                let written = fs::metadata(destination)?.len();
                if written != size {
                    return Err(Error::Other(format!(
                        "Copied {} bytes of {} for {}, source kept",
                        written,
                        size,
                        source.display()
                    )));
                }
                fs::remove_file(source)?;
                Ok(copied)
            }
            Err(e) => Err(e.into()),
        }
    }
}
