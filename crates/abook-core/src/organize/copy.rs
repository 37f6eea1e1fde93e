//! Chunked copy with progress

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::operator::{ensure_parent, require_source_file, FileOperator};
use crate::config::OperationKind;
use crate::error::Result;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Duplicates files, leaving the source untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOperator;

impl CopyOperator {
    pub fn new() -> Self {
        Self
    }
}

impl FileOperator for CopyOperator {
    fn kind(&self) -> OperationKind {
        OperationKind::Copy
    }

    fn can_execute(&self, source: &Path, _destination: &Path) -> Result<()> {
        fs::metadata(source)?;
        Ok(())
    }

    fn execute(&self, source: &Path, destination: &Path, progress: &mut dyn FnMut(u64)) -> Result<u64> {
        require_source_file(source)?;
        ensure_parent(destination)?;
        copy_file(source, destination, progress)
    }
}

/// Copy `source` to `destination` through a `.part` file.
///
/// The destination only appears under its final name once every byte is
/// written, so an interrupted copy never looks finished.
pub(crate) fn copy_file(source: &Path, destination: &Path, progress: &mut dyn FnMut(u64)) -> Result<u64> {
    let partial = partial_path(destination);
    let copied = match write_chunks(source, &partial, progress) {
        Ok(copied) => copied,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial) {
                debug!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e);
        }
    };

    if let Ok(metadata) = fs::metadata(source) {
        if let Err(e) = fs::set_permissions(&partial, metadata.permissions()) {
            debug!("Could not carry permissions to {}: {}", destination.display(), e);
        }
    }
    fs::rename(&partial, destination)?;
    debug!("Copied {} -> {}", source.display(), destination.display());
    Ok(copied)
}

fn write_chunks(source: &Path, partial: &Path, progress: &mut dyn FnMut(u64)) -> Result<u64> {
    let mut input = File::open(source)?;
    let mut output = File::create(partial)?;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut copied = 0u64;

    loop {
        let read = input.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        output.write_all(&buffer[..read])?;
        copied += read as u64;
        progress(copied);
    }
    output.flush()?;
    Ok(copied)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_creates_parents_and_reports_progress() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.mp3");
        fs::write(&source, vec![7u8; 3000]).unwrap();
        let destination = temp.path().join("out/Author/Title/a.mp3");

        let mut reports = Vec::new();
        let copied = CopyOperator::new()
            .execute(&source, &destination, &mut |b| reports.push(b))
            .unwrap();

        assert_eq!(copied, 3000);
        assert_eq!(reports.last(), Some(&3000));
        assert_eq!(fs::read(&destination).unwrap(), vec![7u8; 3000]);
        assert!(source.exists());
        assert!(!partial_path(&destination).exists());
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let result = CopyOperator::new().execute(
            &temp.path().join("missing.mp3"),
            &temp.path().join("out.mp3"),
            &mut |_| {},
        );
        assert!(result.is_err());
        assert!(!temp.path().join("out.mp3").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_carries_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.mp3");
        fs::write(&source, b"audio").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o640)).unwrap();
        let destination = temp.path().join("out/a.mp3");

        CopyOperator::new()
            .execute(&source, &destination, &mut |_| {})
            .unwrap();

        let mode = fs::metadata(&destination).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/x/01.mp3")),
            PathBuf::from("/x/01.mp3.part")
        );
    }
}
