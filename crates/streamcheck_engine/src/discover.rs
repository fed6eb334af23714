use std::fs;
use std::path::{Path, PathBuf};

use crate::types::RunError;

/// Enumerate playlist files directly under `folder` (non-recursive).
///
/// Accepts `.m3u` and `.m3u8` extensions, case-insensitively. Paths are
/// sorted so a run over the same folder is reproducible.
pub fn discover_playlists(folder: &Path) -> Result<Vec<PathBuf>, RunError> {
    if !folder.is_dir() {
        return Err(RunError::FolderNotFound(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && has_playlist_extension(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(RunError::NoPlaylists(folder.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

fn has_playlist_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("m3u") || ext.eq_ignore_ascii_case("m3u8"))
}
