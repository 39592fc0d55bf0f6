//! Filesystem access.
//!
//! The metadata pass never touches storage directly. It reads through the
//! [`FileSystem`] capability so hosts can hand in their own (possibly
//! in-memory) view of the build inputs.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Read and list access to build inputs.
pub trait FileSystem: Sync {
    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` names an existing file.
    fn is_file(&self, path: &Path) -> bool;

    /// Recursively list files under `dir` whose names end with `suffix`.
    ///
    /// Returned paths are relative to `dir` and sorted. A missing or
    /// unreadable `dir` is an error.
    fn list_files(&self, dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn list_files(&self, dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
        (**self).list_files(dir, suffix)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
        let mut results = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(suffix));
            if matches {
                results.push(relative_path(dir, entry.path()));
            }
        }

        results.sort();
        Ok(results)
    }
}

/// Normalize a path without touching the filesystem: `.` components are
/// dropped and `..` pops the previous component.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Stable string form of a path, used as a manifest key.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}
