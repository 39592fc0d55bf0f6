//! Component descriptors.
//!
//! A stylesheet that backs a UI component has a JSON descriptor next to the
//! component's code module, found by swapping the module's extension for the
//! descriptor suffix (`button.js` -> `button.component.json`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::errors::MetadataError;
use crate::util::fs::FileSystem;

/// Default descriptor suffix.
pub const DEFAULT_DESCRIPTOR_EXTENSION: &str = ".component.json";

/// Parsed component descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    /// Unique id within one manifest
    pub id: String,

    /// Directory of style variants, relative to the stylesheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants_path: Option<String>,

    /// Any other descriptor fields, carried into the manifest untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ComponentConfig {
    pub fn new(id: impl Into<String>) -> Self {
        ComponentConfig {
            id: id.into(),
            variants_path: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_variants_path(mut self, path: impl Into<String>) -> Self {
        self.variants_path = Some(path.into());
        self
    }
}

/// Path of the descriptor that belongs to `resource`.
///
/// The last extension is replaced; a file without one gets the suffix
/// appended.
pub fn descriptor_path(resource: &Path, extension: &str) -> PathBuf {
    let file_name = resource
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name.as_str(),
    };

    resource.with_file_name(format!("{}{}", stem, extension))
}

/// Load the descriptor for `resource`.
///
/// A missing descriptor is not an error. A descriptor that exists but is not
/// a valid document is fatal and names the path.
pub fn load_component_config(
    fs: &dyn FileSystem,
    resource: &Path,
    extension: &str,
) -> Result<Option<ComponentConfig>, MetadataError> {
    let path = descriptor_path(resource, extension);

    if !fs.is_file(&path) {
        return Ok(None);
    }

    let contents = match fs.read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("skipping unreadable descriptor {}: {}", path.display(), e);
            return Ok(None);
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| MetadataError::MalformedDescriptor { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockFileSystem;

    #[test]
    fn test_descriptor_path() {
        assert_eq!(
            descriptor_path(Path::new("/p/src/index.js"), DEFAULT_DESCRIPTOR_EXTENSION),
            PathBuf::from("/p/src/index.component.json")
        );
        assert_eq!(
            descriptor_path(Path::new("/p/src/index.st.css"), ".meta.json"),
            PathBuf::from("/p/src/index.st.meta.json")
        );
        assert_eq!(
            descriptor_path(Path::new("/p/src/Makefile"), ".component.json"),
            PathBuf::from("/p/src/Makefile.component.json")
        );
    }

    #[test]
    fn test_load_missing_descriptor() {
        let fs = MockFileSystem::new();
        let config =
            load_component_config(&fs, Path::new("/p/index.js"), DEFAULT_DESCRIPTOR_EXTENSION)
                .unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_descriptor_keeps_extra_fields() {
        let mut fs = MockFileSystem::new();
        fs.add_file(
            "/p/index.component.json",
            r#"{ "id": "Index", "variantsPath": "./variants", "label": "Main" }"#,
        );

        let config =
            load_component_config(&fs, Path::new("/p/index.js"), DEFAULT_DESCRIPTOR_EXTENSION)
                .unwrap()
                .unwrap();

        assert_eq!(config.id, "Index");
        assert_eq!(config.variants_path.as_deref(), Some("./variants"));
        assert_eq!(config.extra["label"], serde_json::json!("Main"));
    }

    #[test]
    fn test_malformed_descriptor_names_path() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/p/index.component.json", "{ id: ");

        let err =
            load_component_config(&fs, Path::new("/p/index.js"), DEFAULT_DESCRIPTOR_EXTENSION)
                .unwrap_err();

        assert!(matches!(err, MetadataError::MalformedDescriptor { .. }));
        assert!(err.to_string().contains("/p/index.component.json"));
    }
}
