//! Import resolution and dependency collection.
//!
//! Resolving a bare specifier is the host's business; this module only
//! defines the [`ImportResolver`] seam and a resolver backed by a
//! [`ModuleInventory`]. [`collect`] walks modules through any resolver.

pub mod collect;

pub use collect::{collect, collect_into, DependencyGraph, Edge};

use std::path::{Path, PathBuf};

use crate::core::inventory::ModuleInventory;
use crate::core::module::{Declaration, Resolution, SymbolDescriptor};
use crate::util::fs::normalize_lexically;

/// Default suffix of compiled stylesheet modules.
pub const DEFAULT_STYLE_SUFFIX: &str = ".st.css";

/// Resolves a declaration, or one of the names it imports.
///
/// `name` is `None` for the declaration's root target. A miss is
/// [`Resolution::Unresolved`], never an error.
pub trait ImportResolver {
    fn resolve(&self, declaration: &Declaration, name: Option<&str>) -> Resolution;
}

impl<T: ImportResolver + ?Sized> ImportResolver for &T {
    fn resolve(&self, declaration: &Declaration, name: Option<&str>) -> Resolution {
        (**self).resolve(declaration, name)
    }
}

/// Resolver over the modules a host already compiled.
///
/// Modules are handed out as shared references, so repeated resolution of
/// the same target never re-reads it.
#[derive(Debug, Clone, Copy)]
pub struct InventoryResolver<'a> {
    inventory: &'a ModuleInventory,
    style_suffix: &'a str,
}

impl<'a> InventoryResolver<'a> {
    pub fn new(inventory: &'a ModuleInventory) -> Self {
        InventoryResolver {
            inventory,
            style_suffix: DEFAULT_STYLE_SUFFIX,
        }
    }

    pub fn with_style_suffix(mut self, suffix: &'a str) -> Self {
        self.style_suffix = suffix;
        self
    }

    /// Where a declaration's request points, before looking it up.
    fn target_path(&self, declaration: &Declaration) -> Option<PathBuf> {
        if let Some(target) = self.inventory.target_of(declaration) {
            return Some(target.to_path_buf());
        }

        let request = declaration.request();
        if request.starts_with("./") || request.starts_with("../") {
            let dir = declaration.owner().parent().unwrap_or(Path::new(""));
            return Some(normalize_lexically(&dir.join(request)));
        }

        None
    }
}

impl ImportResolver for InventoryResolver<'_> {
    fn resolve(&self, declaration: &Declaration, name: Option<&str>) -> Resolution {
        let Some(target) = self.target_path(declaration) else {
            return Resolution::Unresolved;
        };

        let Some(host) = self.inventory.find(&target) else {
            let is_style = target
                .to_str()
                .is_some_and(|t| t.ends_with(self.style_suffix));
            return if is_style {
                Resolution::Unresolved
            } else {
                Resolution::Code {
                    value: target.to_string_lossy().into_owned(),
                }
            };
        };

        let module = host.module.clone();
        let symbol = match name {
            None => SymbolDescriptor::Root,
            Some(name) => {
                if let Some(owning) = module.binding_of(name) {
                    SymbolDescriptor::Alias {
                        owning_declaration: owning.clone(),
                    }
                } else if module.defines(name) {
                    SymbolDescriptor::Local {
                        name: name.to_string(),
                    }
                } else {
                    return Resolution::Unresolved;
                }
            }
        };

        Resolution::Style { module, symbol }
    }
}
