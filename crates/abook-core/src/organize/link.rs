//! Hard and symbolic link operators

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::operator::{ensure_parent, require_source_file, FileOperator};
use crate::config::OperationKind;
use crate::error::{Error, Result};

/// Hard-links each file; source and destination must share a volume
#[derive(Debug, Clone, Copy, Default)]
pub struct HardLinkOperator;

impl FileOperator for HardLinkOperator {
    fn kind(&self) -> OperationKind {
        OperationKind::HardLink
    }

    fn can_execute(&self, source: &Path, destination: &Path) -> Result<()> {
        if same_volume(source, destination) {
            Ok(())
        } else {
            Err(Error::UnsupportedOperation {
                operation: OperationKind::HardLink.to_string(),
                reason: format!(
                    "{} and {} are on different volumes",
                    source.display(),
                    destination.display()
                ),
            })
        }
    }

    fn execute(&self, source: &Path, destination: &Path, progress: &mut dyn FnMut(u64)) -> Result<u64> {
        let size = require_source_file(source)?;
        self.can_execute(source, destination)?;
        ensure_parent(destination)?;

        fs::hard_link(source, destination)?;
        debug!("Hard-linked {} -> {}", destination.display(), source.display());
        progress(size);
        Ok(size)
    }
}

/// Creates a symbolic link at the destination pointing at the source
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicLinkOperator;

impl FileOperator for SymbolicLinkOperator {
    fn kind(&self) -> OperationKind {
        OperationKind::SymLink
    }

    fn can_execute(&self, source: &Path, _destination: &Path) -> Result<()> {
        fs::metadata(source)?;
        if cfg!(any(unix, windows)) {
            Ok(())
        } else {
            Err(Error::UnsupportedOperation {
                operation: OperationKind::SymLink.to_string(),
                reason: "symbolic links are not available on this platform".to_string(),
            })
        }
    }

    fn execute(&self, source: &Path, destination: &Path, progress: &mut dyn FnMut(u64)) -> Result<u64> {
        let size = require_source_file(source)?;
        ensure_parent(destination)?;

        // Relative links would resolve against the destination directory
        let target = fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf());
        create_symlink(&target, destination)?;
        debug!("Symlinked {} -> {}", destination.display(), target.display());
        progress(size);
        Ok(size)
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(target, link)?;
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> Result<()> {
    Err(Error::UnsupportedOperation {
        operation: OperationKind::SymLink.to_string(),
        reason: "symbolic links are not available on this platform".to_string(),
    })
}

/// Whether two paths live on the same volume.
///
/// The destination usually does not exist yet, so the nearest existing
/// ancestor of each path is inspected.
pub fn same_volume(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        let device = |path: &Path| {
            path.ancestors()
                .find_map(|p| fs::metadata(p).ok())
                .map(|m| m.dev())
        };
        if let (Some(x), Some(y)) = (device(a), device(b)) {
            return x == y;
        }
    }

    volume_root(a) == volume_root(b)
}

/// Drive prefix or root of an absolute path, lowercased
fn volume_root(path: &Path) -> Option<String> {
    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    absolute.components().find_map(|c| match c {
        Component::Prefix(prefix) => Some(prefix.as_os_str().to_string_lossy().to_lowercase()),
        Component::RootDir => Some(String::from("/")),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hard_link_same_volume() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.mp3");
        fs::write(&source, b"audio").unwrap();
        let destination = temp.path().join("Author/Title/a.mp3");

        let operator = HardLinkOperator;
        assert!(operator.can_execute(&source, &destination).is_ok());
        let linked = operator.execute(&source, &destination, &mut |_| {}).unwrap();

        assert_eq!(linked, 5);
        assert!(source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"audio");
    }

    #[test]
    fn test_same_volume_for_missing_destination() {
        let temp = TempDir::new().unwrap();
        assert!(same_volume(temp.path(), &temp.path().join("not/yet/there")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_points_at_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.mp3");
        fs::write(&source, b"audio").unwrap();
        let destination = temp.path().join("links/a.mp3");

        SymbolicLinkOperator
            .execute(&source, &destination, &mut |_| {})
            .unwrap();

        let meta = fs::symlink_metadata(&destination).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(fs::read(&destination).unwrap(), b"audio");
        assert_eq!(fs::read_link(&destination).unwrap(), fs::canonicalize(&source).unwrap());
    }

    #[test]
    fn test_volume_root() {
        #[cfg(unix)]
        assert_eq!(volume_root(Path::new("/a/b")), Some("/".to_string()));
        #[cfg(windows)]
        assert_eq!(
            volume_root(Path::new(r"C:\a\b")),
            volume_root(Path::new(r"c:\x"))
        );
    }
}
