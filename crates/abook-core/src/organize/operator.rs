//! The per-file operation contract shared by copy, move and link

use std::fs;
use std::io;
use std::path::Path;

use super::copy::CopyOperator;
use super::link::{HardLinkOperator, SymbolicLinkOperator};
use super::move_op::MoveOperator;
use crate::config::OperationKind;
use crate::error::{Error, Result};

/// Places one source file at one destination path.
///
/// Implementations share no state; the organizer picks one per run based
/// on [`OperationKind`].
pub trait FileOperator: Send + Sync {
    fn kind(&self) -> OperationKind;

    /// Check that the operation can work between these two locations.
    ///
    /// `destination` does not need to exist yet. Returns
    /// [`Error::UnsupportedOperation`] when it cannot.
    fn can_execute(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Perform the operation and return the number of bytes placed.
    ///
    /// `progress` receives the bytes done so far for this file. Missing
    /// parent directories of `destination` are created.
    fn execute(&self, source: &Path, destination: &Path, progress: &mut dyn FnMut(u64)) -> Result<u64>;
}

/// The stock operator for `kind`
pub fn operator_for(kind: OperationKind) -> Box<dyn FileOperator> {
    match kind {
        OperationKind::Copy => Box::new(CopyOperator::new()),
        OperationKind::Move => Box::new(MoveOperator::new()),
        OperationKind::HardLink => Box::new(HardLinkOperator),
        OperationKind::SymLink => Box::new(SymbolicLinkOperator),
    }
}

/// Whether `err` means source and destination live on different volumes
pub fn is_cross_device(err: &io::Error) -> bool {
    // EXDEV on Unix, ERROR_NOT_SAME_DEVICE on Windows
    #[cfg(unix)]
    let code = Some(18);
    #[cfg(windows)]
    let code = Some(17);
    #[cfg(not(any(unix, windows)))]
    let code: Option<i32> = None;

    if code.is_some() && err.raw_os_error() == code {
        return true;
    }

    let message = err.to_string().to_lowercase();
    message.contains("cross-device")
        || message.contains("different device")
        || message.contains("not same device")
        || message.contains("different disk drive")
}

pub(crate) fn require_source_file(source: &Path) -> Result<u64> {
    let metadata = fs::metadata(source)?;
    if !metadata.is_file() {
        return Err(Error::Other(format!(
            "Source is not a file: {}",
            source.display()
        )));
    }
    Ok(metadata.len())
}

pub(crate) fn ensure_parent(destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_for_kind() {
        for kind in OperationKind::ALL {
            assert_eq!(operator_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_cross_device_detection() {
        #[cfg(unix)]
        assert!(is_cross_device(&io::Error::from_raw_os_error(18)));
        #[cfg(windows)]
        assert!(is_cross_device(&io::Error::from_raw_os_error(17)));

        let heuristic = io::Error::new(io::ErrorKind::Other, "Invalid cross-device link");
        assert!(is_cross_device(&heuristic));
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(!is_cross_device(&denied));
    }
}
