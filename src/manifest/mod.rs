//! package.json reading and editing
//!
//! This module provides:
//! - A parsed, order-preserving in-memory manifest document
//! - Flattening of `dependencies` and `devDependencies`
//! - Peer merges, prefix-preserving version rewrites and write-back

mod reader;
mod writer;

pub use reader::{read_manifest, ManifestDocument};
