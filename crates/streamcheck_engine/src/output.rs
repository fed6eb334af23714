use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use streamcheck_core::{category_label, category_slug, serialize_playlist, Channel};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("output location missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the output directory exists and is writable; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), WriteError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| WriteError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(WriteError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| WriteError::OutputDir(e.to_string()))?;
    }
    // Writability probe: a temp file must be creatable in the directory.
    NamedTempFile::new_in(dir).map_err(|e| WriteError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Serialize `channels` as M3U and write them atomically to `path`.
///
/// The parent directory is created when missing. The content lands in a
/// temp file first and is renamed into place, so a crash or disk-full
/// never leaves a truncated playlist at `path`.
pub fn write_playlist(path: &Path, channels: &[Channel]) -> Result<(), WriteError> {
    let dir = parent_dir(path);
    ensure_output_dir(dir)?;
    write_atomic(dir, path, &serialize_playlist(channels))
}

/// Partition `channels` by category and write one `<slug>.m3u8` per
/// category into `dir`, returning the written paths in first-seen
/// category order.
///
/// Distinct category names that slug to the same stem overwrite each
/// other (last write wins); each path appears once in the returned list.
pub fn write_by_category(dir: &Path, channels: &[Channel]) -> Result<Vec<PathBuf>, WriteError> {
    ensure_output_dir(dir)?;

    let mut groups: Vec<(String, Vec<Channel>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for channel in channels {
        let label = category_label(channel.group.as_deref()).to_string();
        let slot = *index.entry(label.clone()).or_insert_with(|| {
            groups.push((label, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(channel.clone());
    }

    let mut written = Vec::new();
    for (label, members) in &groups {
        let path = dir.join(format!("{}.m3u8", category_slug(label)));
        write_atomic(dir, &path, &serialize_playlist(members))?;
        if !written.contains(&path) {
            written.push(path);
        }
    }
    Ok(written)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn write_atomic(dir: &Path, target: &Path, content: &str) -> Result<(), WriteError> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    if target.exists() {
        fs::remove_file(target)?;
    }
    tmp.persist(target).map_err(|e| WriteError::Io(e.error))?;
    Ok(())
}
