//! High-level operations.
//!
//! This module contains the implementation of stmeta commands.

pub mod metadata;

pub use metadata::{MetadataOptions, MetadataPass, SnapshotRenderer};
