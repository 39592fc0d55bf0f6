//! Metadata manifest builder.
//!
//! The builder accumulates source, component, and variant records for one
//! pass. Records are keyed (sources by path, components by id) so writes
//! may arrive in any order. [`MetadataBuilder::create_index`] finalizes the
//! package map; [`MetadataBuilder::build`] hands out the manifest.
//!
//! Paths in the manifest are portable: every source, stylesheet and package
//! root is written as `/{name}/{path relative to the context}`, so the same
//! project built from two checkouts yields the same manifest.

pub mod encode;
pub mod errors;
pub mod packages;
pub mod variants;

pub use encode::{emit, MetadataAsset, OutputMode};
pub use errors::MetadataError;
pub use packages::{DescriptorLocator, PackageLocator, PackageRecord};
pub use variants::{scan_variants, VariantSource};

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::core::component::ComponentConfig;
use crate::core::manifest::{ComponentRecord, Manifest, SourceMeta, SourceRecord};
use crate::util::fs::{normalize_lexically, path_key, relative_path};

use self::packages::PackageIndex;

/// Accumulates records for one manifest.
pub struct MetadataBuilder<'a> {
    /// Project root of the build
    context: PathBuf,
    name: String,
    version: String,
    /// Keyed by absolute path until the manifest is built
    sources: BTreeMap<PathBuf, SourceRecord>,
    components: BTreeMap<String, ComponentRecord>,
    /// Component id -> stylesheet that declared it
    component_owners: HashMap<String, PathBuf>,
    packages: BTreeMap<String, String>,
    locator: Box<dyn PackageLocator + 'a>,
}

impl<'a> MetadataBuilder<'a> {
    pub fn new(
        context: impl Into<PathBuf>,
        name: impl Into<String>,
        version: impl Into<String>,
        locator: impl PackageLocator + 'a,
    ) -> Self {
        MetadataBuilder {
            context: context.into(),
            name: name.into(),
            version: version.into(),
            sources: BTreeMap::new(),
            components: BTreeMap::new(),
            component_owners: HashMap::new(),
            packages: BTreeMap::new(),
            locator: Box::new(locator),
        }
    }

    pub fn context(&self) -> &Path {
        &self.context
    }

    /// Manifest key of `path`.
    pub fn portable_key(&self, path: &Path) -> String {
        let relative = Path::new(&self.name).join(relative_path(&self.context, path));
        let key = path_key(&normalize_lexically(&relative));
        format!("/{}", key.trim_start_matches('/'))
    }

    /// Register a source. A later registration of the same path wins.
    pub fn add_source(&mut self, path: &Path, content: Option<String>, meta: SourceMeta) {
        tracing::debug!("source {} ({})", path.display(), meta.namespace);
        let record = SourceRecord::new(meta, content);
        if self.sources.insert(path.to_path_buf(), record).is_some() {
            tracing::warn!("source {} registered twice; keeping the last", path.display());
        }
    }

    /// Register a component declared by the stylesheet at `path`.
    ///
    /// Registering the same stylesheet again replaces its record; a second
    /// stylesheet claiming the same id is an error.
    pub fn add_component(
        &mut self,
        path: &Path,
        config: ComponentConfig,
        namespace: &str,
    ) -> Result<(), MetadataError> {
        if let Some(first) = self.component_owners.get(&config.id) {
            if first != path {
                return Err(MetadataError::DuplicateComponent {
                    id: config.id,
                    first: first.clone(),
                    second: path.to_path_buf(),
                });
            }
        }

        tracing::debug!("component {} at {}", config.id, path.display());
        self.component_owners
            .insert(config.id.clone(), path.to_path_buf());
        let stylesheet_path = self.portable_key(path);
        self.components.insert(
            config.id.clone(),
            ComponentRecord::new(config, namespace, stylesheet_path),
        );
        Ok(())
    }

    /// Append a rendered snapshot to a registered component.
    pub fn add_component_snapshot(
        &mut self,
        id: &str,
        rendered: impl Into<String>,
    ) -> Result<(), MetadataError> {
        let component = self
            .components
            .get_mut(id)
            .ok_or_else(|| MetadataError::UnknownComponent { id: id.to_string() })?;
        component.snapshots.push(rendered.into());
        Ok(())
    }

    /// Whether any registered source is owned by a discoverable package.
    ///
    /// Sources outside every package fall back to the build context and do
    /// not count.
    pub fn has_packages(&self) -> bool {
        self.sources
            .keys()
            .any(|path| packages::nearest_package(&*self.locator, path).is_some())
    }

    /// Group every registered source under its owning package.
    pub fn create_index(&mut self) {
        let mut index = PackageIndex::new(&*self.locator);
        let mut packages = BTreeMap::new();

        for path in self.sources.keys() {
            let record = index.owner_of(path).unwrap_or_else(|| PackageRecord {
                name: self.name.clone(),
                root: self.context.clone(),
            });

            let root = self.portable_key(&record.root);
            match packages.get(&record.name) {
                Some(existing) if *existing != root => {
                    tracing::warn!(
                        "package `{}` found at both {} and {}; keeping the first",
                        record.name,
                        existing,
                        root
                    );
                }
                Some(_) => {}
                None => {
                    packages.insert(record.name, root);
                }
            }
        }

        self.packages = packages;
    }

    /// The manifest as accumulated so far.
    pub fn build(&self) -> Manifest {
        Manifest {
            version: self.version.clone(),
            name: self.name.clone(),
            sources: self
                .sources
                .iter()
                .map(|(path, record)| (self.portable_key(path), record.clone()))
                .collect(),
            components: self.components.clone(),
            packages: self.packages.clone(),
        }
    }
}
