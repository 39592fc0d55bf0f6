//! Test utilities for stmeta unit tests.
//!
//! Provides an in-memory [`FileSystem`] and fixtures for the projects the
//! metadata pass is exercised against.

pub mod fixtures;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::util::fs::FileSystem;

pub use fixtures::*;

/// In-memory filesystem.
///
/// Directories exist implicitly as the parents of added files, unless added
/// explicitly with [`MockFileSystem::add_dir`].
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: BTreeMap<PathBuf, String>,
    dirs: Vec<PathBuf>,
    unreadable: Vec<PathBuf>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Add an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        self.dirs.push(path.as_ref().to_path_buf());
    }

    /// Make reads of `path` fail with a permission error.
    pub fn deny_read(&mut self, path: impl AsRef<Path>) {
        self.unreadable.push(path.as_ref().to_path_buf());
    }

    fn dir_exists(&self, dir: &Path) -> bool {
        self.dirs.iter().any(|d| d.starts_with(dir))
            || self.files.keys().any(|f| f.starts_with(dir) && f != dir)
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.unreadable.iter().any(|p| path.starts_with(p)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn list_files(&self, dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
        if self.unreadable.iter().any(|p| dir.starts_with(p)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", dir.display()),
            ));
        }
        if !self.dir_exists(dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {}", dir.display()),
            ));
        }

        Ok(self
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(dir).ok())
            .filter(|rel| {
                rel.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(suffix))
            })
            .map(Path::to_path_buf)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_list_files() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/p/v/b.st.css", "");
        fs.add_file("/p/v/a/c.st.css", "");
        fs.add_file("/p/v/a/c.md", "");
        fs.add_file("/p/other.st.css", "");

        let files = fs.list_files(Path::new("/p/v"), ".st.css").unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("a/c.st.css"), PathBuf::from("b.st.css")]
        );
    }

    #[test]
    fn test_mock_missing_and_denied() {
        let mut fs = MockFileSystem::new();
        fs.add_dir("/p/empty");
        fs.add_file("/p/secret/x.st.css", "");
        fs.deny_read("/p/secret");

        assert!(fs.list_files(Path::new("/p/empty"), ".st.css").unwrap().is_empty());
        assert_eq!(
            fs.list_files(Path::new("/p/nope"), ".st.css").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
        assert_eq!(
            fs.read_to_string(Path::new("/p/secret/x.st.css")).unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
    }
}
