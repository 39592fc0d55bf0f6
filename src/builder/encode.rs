//! Manifest encoding and asset naming.
//!
//! The manifest is always pretty-printed JSON. Non-plain modes wrap that
//! text so it can be loaded as a module:
//!
//! | mode          | output                                   |
//! |---------------|------------------------------------------|
//! | `json`        | `{ ... }`                                |
//! | `cjs`         | `module.exports = { ... }`               |
//! | `amd:static`  | `define({ ... });`                       |
//! | `amd:factory` | `define(() => { return { ... }; });`     |
//!
//! Assets are named `{name}[.{hash}].metadata.json[.js]`.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::manifest::Manifest;
use crate::util::hash::content_hash;

/// Default length of the content hash in asset names.
pub const DEFAULT_CONTENT_HASH_LENGTH: usize = 20;

/// How the manifest text is wrapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    #[default]
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "cjs")]
    Cjs,
    #[serde(rename = "amd:static")]
    AmdStatic,
    #[serde(rename = "amd:factory")]
    AmdFactory,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Json => "json",
            OutputMode::Cjs => "cjs",
            OutputMode::AmdStatic => "amd:static",
            OutputMode::AmdFactory => "amd:factory",
        }
    }

    /// Whether the output is plain JSON rather than a loadable module.
    pub fn is_plain(&self) -> bool {
        matches!(self, OutputMode::Json)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputMode::Json),
            "cjs" => Ok(OutputMode::Cjs),
            "amd:static" => Ok(OutputMode::AmdStatic),
            "amd:factory" => Ok(OutputMode::AmdFactory),
            other => Err(format!(
                "unknown output mode `{}` (expected json, cjs, amd:static or amd:factory)",
                other
            )),
        }
    }
}

/// An encoded manifest, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataAsset {
    pub file_name: String,
    pub content: String,
}

/// Encode a manifest in the given mode.
pub fn encode_manifest(manifest: &Manifest, mode: OutputMode) -> Result<String> {
    let json = serde_json::to_string_pretty(manifest).context("failed to serialize manifest")?;

    Ok(match mode {
        OutputMode::Json => json,
        OutputMode::Cjs => format!("module.exports = {}", json),
        OutputMode::AmdStatic => format!("define({});", json),
        OutputMode::AmdFactory => format!("define(() => {{ return {}; }});", json),
    })
}

/// Asset file name; `hash` is inserted only when given.
pub fn asset_file_name(name: &str, mode: OutputMode, hash: Option<&str>) -> String {
    let mut file_name = name.to_string();
    if let Some(hash) = hash {
        file_name.push('.');
        file_name.push_str(hash);
    }
    file_name.push_str(".metadata.json");
    if !mode.is_plain() {
        file_name.push_str(".js");
    }
    file_name
}

/// Encode and name a manifest. The hash, when requested, covers the final
/// encoded text.
pub fn emit(manifest: &Manifest, mode: OutputMode, hash_length: Option<usize>) -> Result<MetadataAsset> {
    let content = encode_manifest(manifest, mode)?;
    let hash = hash_length.map(|len| content_hash(&content, len));
    let file_name = asset_file_name(&manifest.name, mode, hash.as_deref());

    Ok(MetadataAsset { file_name, content })
}
