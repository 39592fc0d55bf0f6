//! stmeta - dependency graphs and metadata manifests for stylesheet modules
//!
//! This crate provides the core library functionality for stmeta,
//! including re-export-aware dependency collection, component and variant
//! discovery, and manifest encoding.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for stmeta unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory filesystem and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{MetadataAsset, MetadataBuilder, MetadataError, OutputMode};
pub use crate::core::{
    component::ComponentConfig,
    inventory::{HostModule, ModuleInventory},
    manifest::Manifest,
    module::{Declaration, ModuleMeta, Resolution},
};
pub use ops::metadata::{MetadataOptions, MetadataPass};
pub use resolver::{collect, DependencyGraph, ImportResolver, InventoryResolver};
pub use util::context::GlobalContext;
