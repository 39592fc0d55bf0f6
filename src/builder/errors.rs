//! Metadata pass error types and diagnostics.
//!
//! Configuration and host-integration problems abort the current pass.
//! Resolution misses are not errors at all; they surface as unresolved
//! edges in the dependency graph.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Fatal error raised while building a metadata manifest.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum MetadataError {
    #[error("component id `{id}` is declared twice")]
    #[diagnostic(
        code(stmeta::config::duplicate_component),
        help("give every component descriptor a unique `id`")
    )]
    DuplicateComponent {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("malformed component descriptor {}: {source}", path.display())]
    #[diagnostic(code(stmeta::config::malformed_descriptor))]
    MalformedDescriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("variant name or folder cannot contain \"_\" found in: {name}")]
    #[diagnostic(
        code(stmeta::config::reserved_variant_name),
        help("`_` joins nested variant folders into a namespace; rename the file or folder")
    )]
    ReservedVariantName { name: String, path: PathBuf },

    #[error("failed to read variants directory {}", dir.display())]
    #[diagnostic(code(stmeta::config::unreadable_variants))]
    UnreadableVariantDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read variant {}", path.display())]
    #[diagnostic(code(stmeta::config::unreadable_variant))]
    UnreadableVariant {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown component `{id}`")]
    #[diagnostic(code(stmeta::builder::unknown_component))]
    UnknownComponent { id: String },

    #[error("could not find a compiled module for {}", path.display())]
    #[diagnostic(code(stmeta::host::module_not_found))]
    ModuleNotFound { path: PathBuf },
}

impl MetadataError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            MetadataError::DuplicateComponent { id, first, second } => {
                Diagnostic::error(format!("component id `{}` is declared twice", id))
                    .with_context(format!("first declared by {}", first.display()))
                    .with_context(format!("declared again by {}", second.display()))
                    .with_suggestion(suggestions::UNIQUE_COMPONENT_ID)
            }

            MetadataError::MalformedDescriptor { path, source } => {
                Diagnostic::error("malformed component descriptor")
                    .with_location(path)
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::FIX_DESCRIPTOR)
            }

            MetadataError::ReservedVariantName { name, path } => Diagnostic::error(format!(
                "variant name or folder cannot contain \"_\" found in: {}",
                name
            ))
            .with_location(path)
            .with_suggestion(suggestions::RENAME_VARIANT),

            MetadataError::UnreadableVariantDir { dir, source } => {
                Diagnostic::error("failed to read variants directory")
                    .with_location(dir)
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::CHECK_VARIANTS_PATH)
            }

            MetadataError::UnreadableVariant { path, source } => {
                Diagnostic::error("failed to read variant")
                    .with_location(path)
                    .with_context(source.to_string())
            }

            MetadataError::UnknownComponent { id } => {
                Diagnostic::error(format!("unknown component `{}`", id))
                    .with_context("snapshots can only be attached to registered components")
            }

            MetadataError::ModuleNotFound { path } => {
                Diagnostic::error("could not find a compiled module for a dependency")
                    .with_location(path)
                    .with_suggestion(suggestions::MISSING_MODULE)
            }
        }
    }
}
