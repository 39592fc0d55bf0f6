//! The host build's inventory of compiled stylesheet modules.
//!
//! Hosts that run the metadata pass out of process describe their compiled
//! modules in a JSON document:
//!
//! ```json
//! {
//!   "context": "/project",
//!   "modules": [
//!     {
//!       "sourcePath": "src/index.st.css",
//!       "namespace": "o0",
//!       "depth": 4,
//!       "component": "src/index.js",
//!       "symbols": ["root"],
//!       "declarations": [
//!         { "request": "./button.st.css", "default": "Button" },
//!         { "request": "lib/index.st.css", "named": { "Gallery": "Gallery" },
//!           "resolved": "node_modules/lib/index.st.css" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Relative paths are taken relative to the inventory file.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::module::{Declaration, ModuleMeta, ModuleRef};
use crate::util::fs::normalize_lexically;

/// Inventory document as written by a host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFile {
    /// Project root of the build
    #[serde(default)]
    pub context: Option<PathBuf>,
    #[serde(default)]
    pub modules: Vec<InventoryModule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryModule {
    pub source_path: PathBuf,
    pub namespace: String,
    #[serde(default)]
    pub depth: u32,
    /// Companion code module, if the stylesheet backs a component
    #[serde(default)]
    pub component: Option<PathBuf>,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub declarations: Vec<InventoryDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDeclaration {
    pub request: String,
    #[serde(default)]
    pub default: Option<String>,
    /// Local name -> imported name
    #[serde(default)]
    pub named: BTreeMap<String, String>,
    /// Target the host already resolved the request to
    #[serde(default)]
    pub resolved: Option<PathBuf>,
}

/// A compiled module as the host sees it.
#[derive(Debug, Clone)]
pub struct HostModule {
    pub module: ModuleRef,
    /// Host-supplied depth, stored but never interpreted
    pub depth: u32,
    pub component: Option<PathBuf>,
}

impl HostModule {
    pub fn new(module: ModuleRef, depth: u32) -> Self {
        HostModule {
            module,
            depth,
            component: None,
        }
    }

    pub fn with_component(mut self, component: impl Into<PathBuf>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn source_path(&self) -> &Path {
        self.module.source_path()
    }

    pub fn namespace(&self) -> &str {
        self.module.namespace()
    }
}

/// Every compiled module of one build, plus the targets the host resolved
/// declarations to.
#[derive(Debug, Clone, Default)]
pub struct ModuleInventory {
    context: PathBuf,
    modules: Vec<HostModule>,
    index: HashMap<PathBuf, usize>,
    targets: HashMap<(PathBuf, String), PathBuf>,
}

impl ModuleInventory {
    pub fn new(context: impl Into<PathBuf>) -> Self {
        ModuleInventory {
            context: context.into(),
            ..ModuleInventory::default()
        }
    }

    /// Load an inventory document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read module inventory: {}", path.display()))?;

        let file: InventoryFile = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse module inventory: {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new("."));
        Ok(Self::from_file(file, base))
    }

    /// Build an inventory, anchoring relative paths at `base`.
    pub fn from_file(file: InventoryFile, base: &Path) -> Self {
        let anchor = |p: &Path| normalize_lexically(&base.join(p));

        let context = file
            .context
            .as_deref()
            .map(anchor)
            .unwrap_or_else(|| normalize_lexically(base));
        let mut inventory = ModuleInventory::new(context);

        for entry in file.modules {
            let source_path = anchor(&entry.source_path);
            let mut meta = ModuleMeta::new(source_path.clone(), entry.namespace);

            for name in entry.symbols {
                meta = meta.with_local(name);
            }

            for decl in entry.declarations {
                let mut declaration = Declaration::new(source_path.clone(), decl.request.clone());
                if let Some(default) = decl.default {
                    declaration = declaration.with_default(default);
                }
                for (local, imported) in decl.named {
                    declaration = declaration.with_named(local, imported);
                }
                meta = meta.with_declaration(declaration);

                if let Some(resolved) = decl.resolved {
                    inventory.add_target(&source_path, &decl.request, anchor(&resolved));
                }
            }

            let mut host = HostModule::new(meta.into_ref(), entry.depth);
            if let Some(component) = entry.component {
                host = host.with_component(anchor(&component));
            }
            inventory.add_module(host);
        }

        inventory
    }

    /// Register a compiled module. A later module with the same path
    /// replaces the earlier one.
    pub fn add_module(&mut self, module: HostModule) {
        let path = module.source_path().to_path_buf();
        match self.index.get(&path) {
            Some(&idx) => self.modules[idx] = module,
            None => {
                self.index.insert(path, self.modules.len());
                self.modules.push(module);
            }
        }
    }

    /// Record that `request`, written in the module at `from`, points at
    /// `target`.
    pub fn add_target(&mut self, from: &Path, request: &str, target: impl Into<PathBuf>) {
        self.targets
            .insert((from.to_path_buf(), request.to_string()), target.into());
    }

    pub fn context(&self) -> &Path {
        &self.context
    }

    pub fn modules(&self) -> &[HostModule] {
        &self.modules
    }

    pub fn find(&self, path: &Path) -> Option<&HostModule> {
        self.index.get(path).map(|&idx| &self.modules[idx])
    }

    /// Target recorded for a declaration, if the host resolved it.
    pub fn target_of(&self, declaration: &Declaration) -> Option<&Path> {
        self.targets
            .get(&(
                declaration.owner().to_path_buf(),
                declaration.request().to_string(),
            ))
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
