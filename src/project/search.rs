//! File system searches under layer roots.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory depth used when looking up a single file by name.
pub const MAX_SEARCH_DEPTH: usize = 12;

/// Every file below `root` whose name ends with `.extension`.
///
/// Errors while walking are returned, not skipped: a layer that cannot be
/// read makes the whole search unreliable.
pub fn find_files_with_extension(root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let suffix = format!(".{extension}");
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(&suffix) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// First file below `root` named exactly `file_name`, searching at most
/// `MAX_SEARCH_DEPTH` levels. Unreadable directories are skipped.
pub fn find_file_named(root: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .max_depth(MAX_SEARCH_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name().to_string_lossy() == file_name)
        .map(|entry| entry.into_path())
}
