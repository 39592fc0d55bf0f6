//! The metadata manifest and the records it is made of.
//!
//! Every map is ordered by key so two passes over the same inputs serialize
//! to the same bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::component::ComponentConfig;

/// Per-source facts passed to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMeta {
    pub namespace: String,
    /// Host-supplied distance from a build entry point
    pub depth: u32,
    pub variant: bool,
}

impl SourceMeta {
    pub fn new(namespace: impl Into<String>, depth: u32) -> Self {
        SourceMeta {
            namespace: namespace.into(),
            depth,
            variant: false,
        }
    }

    pub fn variant(mut self) -> Self {
        self.variant = true;
        self
    }
}

/// One registered stylesheet, keyed by path in [`Manifest::sources`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub namespace: String,
    pub depth: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub variant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SourceRecord {
    pub fn new(meta: SourceMeta, content: Option<String>) -> Self {
        SourceRecord {
            namespace: meta.namespace,
            depth: meta.depth,
            variant: meta.variant,
            content,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Component fields computed by the builder; a descriptor cannot set them.
pub const COMPUTED_COMPONENT_FIELDS: [&str; 3] = ["namespace", "stylesheetPath", "snapshots"];

/// One declared component, keyed by id in [`Manifest::components`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    #[serde(flatten)]
    pub config: ComponentConfig,
    pub namespace: String,
    pub stylesheet_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snapshots: Vec<String>,
}

impl ComponentRecord {
    /// Record for `config`. Descriptor fields that collide with computed
    /// ones are dropped so the computed values win.
    pub fn new(
        mut config: ComponentConfig,
        namespace: impl Into<String>,
        stylesheet_path: impl Into<String>,
    ) -> Self {
        for field in COMPUTED_COMPONENT_FIELDS {
            if config.extra.remove(field).is_some() {
                tracing::debug!("component `{}`: descriptor field `{}` overridden", config.id, field);
            }
        }

        ComponentRecord {
            config,
            namespace: namespace.into(),
            stylesheet_path: stylesheet_path.into(),
            snapshots: Vec::new(),
        }
    }
}

/// The aggregated description of one build pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub version: String,
    pub name: String,
    pub sources: BTreeMap<String, SourceRecord>,
    pub components: BTreeMap<String, ComponentRecord>,
    /// Package name -> package root
    pub packages: BTreeMap<String, String>,
}

impl Manifest {
    pub fn source(&self, path: &str) -> Option<&SourceRecord> {
        self.sources.get(path)
    }

    pub fn component(&self, id: &str) -> Option<&ComponentRecord> {
        self.components.get(id)
    }
}
