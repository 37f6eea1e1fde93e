//! Empty-directory sweep

use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Remove every empty directory below `root`, deepest first.
///
/// `root` itself is kept. Directories that still hold anything (including
/// hidden files) are left alone. Returns the number removed.
pub fn remove_empty_dirs(root: &Path) -> usize {
    let removed = sweep(root, 1);
    if removed > 0 {
        info!("Removed {} empty directories under {}", removed, root.display());
    }
    removed
}

/// Like [`remove_empty_dirs`] but also removes `dir` if it ends up empty
pub(crate) fn remove_empty_tree(dir: &Path) -> usize {
    sweep(dir, 0)
}

fn sweep(root: &Path, min_depth: usize) -> usize {
    let mut removed = 0;
    for entry in WalkDir::new(root)
        .min_depth(min_depth)
        .contents_first(true)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        // remove_dir refuses non-empty directories
        if fs::remove_dir(entry.path()).is_ok() {
            debug!("Removed empty directory {}", entry.path().display());
            removed += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_nested_empty_dirs_keeps_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("keep/inner")).unwrap();
        fs::write(root.join("keep/inner/file.mp3"), b"x").unwrap();
        fs::create_dir_all(root.join("hidden")).unwrap();
        fs::write(root.join("hidden/.published"), b"").unwrap();

        assert_eq!(remove_empty_dirs(root), 3);
        assert!(root.exists());
        assert!(!root.join("a").exists());
        assert!(root.join("keep/inner/file.mp3").exists());
        assert!(root.join("hidden").exists());
    }

    #[test]
    fn test_remove_empty_tree_includes_dir() {
        let temp = TempDir::new().unwrap();
        let unit = temp.path().join("Book");
        fs::create_dir_all(unit.join("CD1")).unwrap();
        fs::create_dir_all(unit.join("CD2")).unwrap();

        assert_eq!(remove_empty_tree(&unit), 3);
        assert!(!unit.exists());
        assert!(temp.path().exists());
    }
}
