//! Workspace file lookup

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directories never searched for artifacts
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// All files under `root` named exactly `file_name`, in sorted walk order
pub fn find_files(root: &Path, file_name: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == file_name)
        .map(|e| e.into_path())
        .collect()
}

/// First file under `root` named `file_name`
///
/// With several candidates the first in sorted walk order wins; there is no
/// disambiguation by path.
pub fn find_file(root: &Path, file_name: &str) -> Option<PathBuf> {
    let mut matches = find_files(root, file_name).into_iter();
    let first = matches.next()?;
    let others = matches.count();
    if others > 0 {
        debug!(
            "{} other files named {} ignored, using {}",
            others,
            file_name,
            first.display()
        );
    }
    Some(first)
}
