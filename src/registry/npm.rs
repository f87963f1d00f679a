//! npm Registry adapter
//!
//! Fetches the latest published manifest of a package.
//! API endpoint: https://registry.npmjs.org/{package}/latest

use crate::error::CollaboratorError;
use crate::registry::{HttpClient, PackageRelease, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

/// npm registry base URL
const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm Registry adapter
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
}

/// Subset of the `/latest` document we care about
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NpmLatestResponse {
    version: String,
    #[serde(default)]
    peer_dependencies: Map<String, Value>,
    #[serde(default)]
    repository: Option<NpmRepository>,
}

/// The `repository` field is either a shorthand string or an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NpmRepository {
    Url(String),
    Detailed {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        directory: Option<String>,
    },
}

impl NpmRegistry {
    /// Create a new npm adapter against the public registry
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, NPM_REGISTRY_URL)
    }

    /// Create an adapter against a mirror or private registry
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package's latest release
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/latest", self.base_url, package)
    }
}

impl From<NpmLatestResponse> for PackageRelease {
    fn from(response: NpmLatestResponse) -> Self {
        let peer_dependencies = response
            .peer_dependencies
            .into_iter()
            .filter_map(|(name, spec)| spec.as_str().map(|s| (name, s.to_string())))
            .collect();

        let (repository_url, repository_directory) = match response.repository {
            Some(NpmRepository::Url(url)) => (Some(url), None),
            Some(NpmRepository::Detailed { url, directory }) => (url, directory),
            None => (None, None),
        };

        PackageRelease {
            version: response.version,
            peer_dependencies,
            repository_url,
            repository_directory,
        }
    }
}

#[async_trait]
impl RegistryClient for NpmRegistry {
    fn registry_name(&self) -> &'static str {
        "npm"
    }

    async fn latest(&self, package: &str) -> Result<PackageRelease, CollaboratorError> {
        let url = self.build_url(package);
        let response: NpmLatestResponse = self
            .client
            .get_json(&url, package, self.registry_name(), None)
            .await?;
        Ok(response.into())
    }
}
