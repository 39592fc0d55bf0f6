//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use stmeta::builder::OutputMode;

/// stmeta - dependency graphs and metadata manifests for stylesheet modules
#[derive(Parser)]
#[command(name = "stmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the metadata manifest for a module inventory
    Build(BuildArgs),

    /// Print the dependency graph of one module
    Deps(DepsArgs),

    /// List the variants of a component and their namespaces
    Variants(VariantsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Module inventory written by the host build
    #[arg(long, value_name = "FILE")]
    pub inventory: PathBuf,

    /// Manifest name, also the asset file name prefix
    #[arg(long)]
    pub name: Option<String>,

    /// Manifest version
    #[arg(long = "version", value_name = "VERSION")]
    pub manifest_version: Option<String>,

    /// Output encoding (json, cjs, amd:static, amd:factory)
    #[arg(long)]
    pub mode: Option<OutputMode>,

    /// Only record sources reachable from a component
    #[arg(long)]
    pub editable_only: bool,

    /// Insert a content hash into the asset file name
    #[arg(long)]
    pub content_hash: bool,

    /// Length of the content hash
    #[arg(long, value_name = "N")]
    pub hash_length: Option<usize>,

    /// Project root recorded for sources outside every package
    #[arg(long, value_name = "DIR")]
    pub context: Option<PathBuf>,

    /// Directory the asset is written to (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Write the manifest to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Module inventory written by the host build
    #[arg(long, value_name = "FILE")]
    pub inventory: PathBuf,

    /// Stylesheet to start from
    pub module: PathBuf,
}

#[derive(Args)]
pub struct VariantsArgs {
    /// Directory of the component's stylesheet
    pub component_dir: PathBuf,

    /// Variants directory, relative to the component directory
    pub variants_path: String,

    /// Namespace of the owning component
    #[arg(long)]
    pub namespace: String,

    /// Depth inherited by every variant
    #[arg(long, default_value_t = 0)]
    pub depth: u32,

    /// Suffix of variant stylesheets
    #[arg(long, default_value = ".st.css")]
    pub suffix: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
