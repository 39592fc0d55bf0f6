//! Implementation of the metadata pass.
//!
//! The host drives the pass through two ports: every compiled module it
//! discovers goes to [`MetadataPass::on_module_discovered`], and
//! [`MetadataPass::on_build_finalize`] runs the pass once all modules are
//! known and hands back the encoded manifest.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::builder::encode::{emit, MetadataAsset, OutputMode, DEFAULT_CONTENT_HASH_LENGTH};
use crate::builder::errors::MetadataError;
use crate::builder::packages::{DescriptorLocator, PackageLocator};
use crate::builder::variants::scan_variants;
use crate::builder::MetadataBuilder;
use crate::core::component::{load_component_config, ComponentConfig, DEFAULT_DESCRIPTOR_EXTENSION};
use crate::core::inventory::HostModule;
use crate::core::manifest::SourceMeta;
use crate::resolver::{collect_into, DependencyGraph, ImportResolver, DEFAULT_STYLE_SUFFIX};
use crate::util::fs::FileSystem;

/// Options for the metadata pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataOptions {
    /// Manifest name, also the asset file name prefix
    pub name: String,

    /// Manifest version
    pub version: String,

    /// Insert a content hash into the asset file name
    pub use_content_hash_file_name: bool,

    /// Length of the content hash
    pub content_hash_length: usize,

    /// Suffix replacing a code module's extension to find its descriptor
    pub config_extension: String,

    /// Project root; overrides the one the host passes in
    pub context: Option<PathBuf>,

    /// Only record sources reachable from a component
    pub only_include_editable_components: bool,

    /// Output encoding
    pub mode: OutputMode,

    /// Suffix of variant stylesheets
    pub variant_suffix: String,
}

impl MetadataOptions {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        MetadataOptions {
            name: name.into(),
            version: version.into(),
            ..MetadataOptions::default()
        }
    }

    /// Hash length to use in the file name, if hashing is enabled.
    pub fn hash_length(&self) -> Option<usize> {
        self.use_content_hash_file_name
            .then_some(self.content_hash_length)
    }
}

impl Default for MetadataOptions {
    fn default() -> Self {
        MetadataOptions {
            name: "metadata".to_string(),
            version: "0.0.0".to_string(),
            use_content_hash_file_name: false,
            content_hash_length: DEFAULT_CONTENT_HASH_LENGTH,
            config_extension: DEFAULT_DESCRIPTOR_EXTENSION.to_string(),
            context: None,
            only_include_editable_components: false,
            mode: OutputMode::Json,
            variant_suffix: DEFAULT_STYLE_SUFFIX.to_string(),
        }
    }
}

/// Renders a visual snapshot of a component.
///
/// `module` is the component's code module.
pub trait SnapshotRenderer {
    fn render(&self, component: &ComponentConfig, module: &Path) -> Result<String>;
}

impl<F> SnapshotRenderer for F
where
    F: Fn(&ComponentConfig, &Path) -> Result<String>,
{
    fn render(&self, component: &ComponentConfig, module: &Path) -> Result<String> {
        self(component, module)
    }
}

/// A source waiting for its content.
#[derive(Debug, Clone)]
struct PlannedSource {
    path: PathBuf,
    meta: SourceMeta,
}

/// One metadata pass over a host build.
pub struct MetadataPass<'a, R, F> {
    options: MetadataOptions,
    resolver: R,
    fs: F,
    context: PathBuf,
    locator: Option<Box<dyn PackageLocator + 'a>>,
    renderer: Option<Box<dyn SnapshotRenderer + 'a>>,
    discovered: Vec<HostModule>,
    index: HashMap<PathBuf, usize>,
}

impl<'a, R, F> MetadataPass<'a, R, F>
where
    R: ImportResolver,
    F: FileSystem,
{
    /// Create a pass. `context` is the host's project root, used unless
    /// the options name one.
    pub fn new(options: MetadataOptions, resolver: R, fs: F, context: impl Into<PathBuf>) -> Self {
        let context = options.context.clone().unwrap_or_else(|| context.into());

        MetadataPass {
            options,
            resolver,
            fs,
            context,
            locator: None,
            renderer: None,
            discovered: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Use a custom package boundary rule instead of `package.json` lookup.
    pub fn with_locator(mut self, locator: impl PackageLocator + 'a) -> Self {
        self.locator = Some(Box::new(locator));
        self
    }

    /// Render a snapshot of every component.
    pub fn with_renderer(mut self, renderer: impl SnapshotRenderer + 'a) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn options(&self) -> &MetadataOptions {
        &self.options
    }

    /// Record a compiled module. Rediscovering a path replaces the earlier
    /// module but keeps its position.
    pub fn on_module_discovered(&mut self, module: HostModule) {
        let path = module.source_path().to_path_buf();
        tracing::trace!("discovered {}", path.display());

        match self.index.get(&path) {
            Some(&idx) => self.discovered[idx] = module,
            None => {
                self.index.insert(path, self.discovered.len());
                self.discovered.push(module);
            }
        }
    }

    /// Run the pass over every discovered module.
    ///
    /// Returns `None` when no source belongs to a package, in which case
    /// there is nothing worth emitting.
    pub fn on_build_finalize(self) -> Result<Option<MetadataAsset>> {
        tracing::info!(
            "building metadata `{}` from {} modules",
            self.options.name,
            self.discovered.len()
        );

        let fallback = DescriptorLocator::new(&self.fs);
        let custom = self.locator.as_deref();
        let locate = |dir: &Path| match custom {
            Some(locator) => locator.package_name(dir),
            None => fallback.package_name(dir),
        };

        let mut builder = MetadataBuilder::new(
            &self.context,
            &self.options.name,
            &self.options.version,
            locate,
        );

        let plan = self.plan(&mut builder)?;
        self.write_sources(&mut builder, plan)?;

        if !builder.has_packages() {
            tracing::debug!("no source belongs to a package; skipping metadata asset");
            return Ok(None);
        }

        builder.create_index();
        let manifest = builder.build();

        let asset = emit(&manifest, self.options.mode, self.options.hash_length())?;
        tracing::info!(
            "metadata `{}`: {} sources, {} components, {} packages",
            asset.file_name,
            manifest.sources.len(),
            manifest.components.len(),
            manifest.packages.len()
        );

        Ok(Some(asset))
    }

    /// Register components and decide which sources to record.
    fn plan(&self, builder: &mut MetadataBuilder<'_>) -> Result<Vec<PlannedSource>> {
        let editable_only = self.options.only_include_editable_components;
        let mut plan = Vec::new();
        let mut graph = DependencyGraph::new();
        let mut reachable = HashSet::new();

        for host in &self.discovered {
            if !editable_only {
                plan.push(PlannedSource {
                    path: host.source_path().to_path_buf(),
                    meta: SourceMeta::new(host.namespace(), host.depth),
                });
            }

            let Some(code) = &host.component else {
                continue;
            };
            let Some(config) =
                load_component_config(&self.fs, code, &self.options.config_extension)?
            else {
                continue;
            };

            builder.add_component(host.source_path(), config.clone(), host.namespace())?;

            if editable_only {
                collect_into(&self.resolver, &host.module, &mut graph);

                for module in graph.modules() {
                    let path = module.source_path();
                    if !reachable.insert(path.to_path_buf()) {
                        continue;
                    }
                    let used = self.find(path).ok_or_else(|| MetadataError::ModuleNotFound {
                        path: path.to_path_buf(),
                    })?;
                    plan.push(PlannedSource {
                        path: path.to_path_buf(),
                        meta: SourceMeta::new(used.namespace(), used.depth),
                    });
                }
            }

            if let Some(variants_path) = &config.variants_path {
                let base_dir = host.source_path().parent().unwrap_or(Path::new(""));
                let variants = scan_variants(
                    &self.fs,
                    base_dir,
                    variants_path,
                    &self.options.variant_suffix,
                    host.namespace(),
                    host.depth,
                )
                .with_context(|| format!("failed to collect variants of component `{}`", config.id))?;

                plan.extend(variants.into_iter().map(|v| PlannedSource {
                    path: v.path,
                    meta: v.meta,
                }));
            }

            if let Some(renderer) = &self.renderer {
                let snapshot = renderer
                    .render(&config, code)
                    .with_context(|| format!("failed to render snapshot of `{}`", config.id))?;
                builder.add_component_snapshot(&config.id, snapshot)?;
            }
        }

        Ok(plan)
    }

    /// Read every planned source in parallel, then register them in plan
    /// order.
    fn write_sources(
        &self,
        builder: &mut MetadataBuilder<'_>,
        plan: Vec<PlannedSource>,
    ) -> Result<()> {
        let fs = &self.fs;
        let reads: Vec<_> = plan
            .into_par_iter()
            .map(|source| {
                let content = fs.read_to_string(&source.path);
                (source, content)
            })
            .collect();

        for (source, content) in reads {
            let content = match content {
                Ok(content) => content,
                Err(e) if source.meta.variant => {
                    return Err(MetadataError::UnreadableVariant {
                        path: source.path,
                        source: e,
                    }
                    .into());
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("failed to read source: {}", source.path.display())
                    });
                }
            };
            builder.add_source(&source.path, Some(content), source.meta);
        }

        Ok(())
    }

    fn find(&self, path: &Path) -> Option<&HostModule> {
        self.index.get(path).map(|&idx| &self.discovered[idx])
    }
}
