//! Core data structures for stmeta.
//!
//! This module contains the foundational types used throughout stmeta:
//! - Compiled modules, their declarations, and import resolutions
//! - Component descriptors
//! - The host's module inventory
//! - The metadata manifest

pub mod component;
pub mod inventory;
pub mod manifest;
pub mod module;

pub use component::ComponentConfig;
pub use inventory::{HostModule, ModuleInventory};
pub use manifest::{Manifest, SourceMeta};
pub use module::{Declaration, ModuleMeta, ModuleRef, Resolution, SymbolDescriptor};
