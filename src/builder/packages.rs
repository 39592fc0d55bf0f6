//! Package ownership of registered sources.
//!
//! A source belongs to the nearest enclosing package boundary: the closest
//! ancestor directory a [`PackageLocator`] accepts. With the default
//! [`DescriptorLocator`] that is the closest ancestor holding a
//! `package.json`, which distinguishes the project root from installed
//! dependencies nested below it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::util::fs::FileSystem;

/// Package descriptor file looked for by [`DescriptorLocator`].
pub const PACKAGE_DESCRIPTOR: &str = "package.json";

/// A package that owns one or more sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub root: PathBuf,
}

/// Decides whether a directory is a package boundary.
pub trait PackageLocator {
    /// Name of the package rooted at `dir`, if `dir` is a package root.
    fn package_name(&self, dir: &Path) -> Option<String>;
}

impl<F> PackageLocator for F
where
    F: Fn(&Path) -> Option<String>,
{
    fn package_name(&self, dir: &Path) -> Option<String> {
        self(dir)
    }
}

/// Nearest package enclosing `path`.
pub fn nearest_package(locator: &dyn PackageLocator, path: &Path) -> Option<PackageRecord> {
    path.ancestors().skip(1).find_map(|dir| {
        locator.package_name(dir).map(|name| PackageRecord {
            name,
            root: dir.to_path_buf(),
        })
    })
}

#[derive(Deserialize)]
struct PackageDescriptor {
    name: Option<String>,
}

/// Locates packages by their `package.json`.
///
/// The descriptor's `name` is the package name; a descriptor without one
/// (or one that does not parse) names the package after its directory.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorLocator<F> {
    fs: F,
}

impl<F: FileSystem> DescriptorLocator<F> {
    pub fn new(fs: F) -> Self {
        DescriptorLocator { fs }
    }
}

impl<F: FileSystem> PackageLocator for DescriptorLocator<F> {
    fn package_name(&self, dir: &Path) -> Option<String> {
        let descriptor = dir.join(PACKAGE_DESCRIPTOR);
        if !self.fs.is_file(&descriptor) {
            return None;
        }

        let declared = self
            .fs
            .read_to_string(&descriptor)
            .ok()
            .and_then(|contents| serde_json::from_str::<PackageDescriptor>(&contents).ok())
            .and_then(|d| d.name);

        match declared {
            Some(name) => Some(name),
            None => {
                tracing::debug!("{} has no package name", descriptor.display());
                dir.file_name().map(|n| n.to_string_lossy().into_owned())
            }
        }
    }
}

/// Memoizing lookup of package ownership, one ancestor walk per directory.
pub(crate) struct PackageIndex<'l> {
    locator: &'l dyn PackageLocator,
    by_dir: HashMap<PathBuf, Option<PackageRecord>>,
}

impl<'l> PackageIndex<'l> {
    pub(crate) fn new(locator: &'l dyn PackageLocator) -> Self {
        PackageIndex {
            locator,
            by_dir: HashMap::new(),
        }
    }

    pub(crate) fn owner_of(&mut self, path: &Path) -> Option<PackageRecord> {
        let dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
        if let Some(cached) = self.by_dir.get(&dir) {
            return cached.clone();
        }
        let found = nearest_package(self.locator, path);
        self.by_dir.insert(dir, found.clone());
        found
    }
}
