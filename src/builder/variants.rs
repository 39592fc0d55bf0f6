//! Style variants discovered by directory convention.
//!
//! A component may point at a directory of alternate stylesheets. Each file
//! becomes a variant source whose namespace is synthesized from its path:
//! separators become `_`, the suffix is dropped, and the owning component's
//! namespace is appended (`sub/v1.st.css` under owner `o0` is `sub_v1-o0`).
//! Because `_` joins folders, it may not appear in variant names.

use std::path::{Path, PathBuf};

use crate::builder::errors::MetadataError;
use crate::core::manifest::SourceMeta;
use crate::util::fs::{normalize_lexically, path_key, FileSystem};

/// A discovered variant stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSource {
    pub path: PathBuf,
    pub meta: SourceMeta,
}

/// Namespace for a variant at `relative` (relative to the variants dir).
pub fn variant_namespace(
    relative: &Path,
    suffix: &str,
    owner_namespace: &str,
) -> Result<String, MetadataError> {
    let name = path_key(relative);
    if name.contains('_') {
        return Err(MetadataError::ReservedVariantName {
            name,
            path: relative.to_path_buf(),
        });
    }

    let flattened = name.replace('/', "_");
    let stem = flattened.strip_suffix(suffix).unwrap_or(&flattened);
    Ok(format!("{}-{}", stem, owner_namespace))
}

/// List the variants under `base_dir/variants_path`.
///
/// Variants inherit `depth` from their owning component. Any name containing
/// `_` fails the whole scan.
pub fn scan_variants(
    fs: &dyn FileSystem,
    base_dir: &Path,
    variants_path: &str,
    suffix: &str,
    owner_namespace: &str,
    depth: u32,
) -> Result<Vec<VariantSource>, MetadataError> {
    let dir = normalize_lexically(&base_dir.join(variants_path));

    let entries = fs
        .list_files(&dir, suffix)
        .map_err(|source| MetadataError::UnreadableVariantDir {
            dir: dir.clone(),
            source,
        })?;

    let mut variants = Vec::with_capacity(entries.len());
    for relative in entries {
        let namespace =
            variant_namespace(&relative, suffix, owner_namespace).map_err(|err| match err {
                MetadataError::ReservedVariantName { name, .. } => {
                    MetadataError::ReservedVariantName {
                        name,
                        path: dir.join(&relative),
                    }
                }
                other => other,
            })?;

        tracing::debug!("variant {} -> {}", relative.display(), namespace);
        variants.push(VariantSource {
            path: dir.join(&relative),
            meta: SourceMeta::new(namespace, depth).variant(),
        });
    }

    Ok(variants)
}
