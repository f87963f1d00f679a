//! Registry client for fetching the latest published release of a package
//!
//! This module provides:
//! - HTTP client shared foundation with timeout and retry logic
//! - npm Registry adapter

mod client;
mod npm;

pub use client::HttpClient;
pub use npm::NpmRegistry;

use crate::error::CollaboratorError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// The latest published release of a package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRelease {
    /// Published version
    pub version: String,
    /// Peer dependencies declared by this release
    pub peer_dependencies: BTreeMap<String, String>,
    /// Source repository URL, as declared
    pub repository_url: Option<String>,
    /// Subdirectory of the package within a monorepo
    pub repository_directory: Option<String>,
}

/// Trait for registry lookups
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch the latest release of a package
    async fn latest(&self, package: &str) -> Result<PackageRelease, CollaboratorError>;
}
