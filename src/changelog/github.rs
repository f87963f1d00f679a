//! GitHub changelog source
//!
//! Resolution order:
//! 1. Default branch via `api.github.com/repos/{slug}`
//! 2. Raw changelog files under the package directory, then the repository root
//! 3. Up to 20 release notes concatenated into a synthetic changelog

use crate::changelog::{truncate_chars, ChangelogSource, MAX_CHANGELOG_CHARS};
use crate::registry::{HttpClient, PackageRelease};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";
const SERVICE: &str = "GitHub";

/// Conventional changelog file names, probed in order
const CHANGELOG_FILENAMES: &[&str] = &[
    "CHANGELOG.md",
    "CHANGELOG",
    "changelog.md",
    "History.md",
    "NEWS.md",
];

/// Maximum number of releases folded into a synthetic changelog
const MAX_RELEASES: usize = 20;

static GITHUB_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[/:]([^/\s:]+)/([^/\s#?]+?)(?:\.git)?(?:[/#?].*)?$").unwrap()
});

static SHORTHAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:github:)?([A-Za-z0-9_.\-]+)/([A-Za-z0-9_.\-]+?)(?:\.git)?$").unwrap()
});

/// Extract `owner/repo` from the repository URL forms npm allows
///
/// Returns `None` for non-GitHub hosts.
pub fn parse_github_slug(url: &str) -> Option<String> {
    let url = url.trim();
    let caps = GITHUB_URL_RE
        .captures(url)
        .or_else(|| SHORTHAND_RE.captures(url))?;
    Some(format!("{}/{}", caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// A release entry from the GitHub releases API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubRelease {
    /// Tag name, e.g. `v2.0.0`
    #[serde(default)]
    pub tag_name: Option<String>,
    /// Markdown release notes
    #[serde(default)]
    pub body: Option<String>,
}

/// Concatenate release notes into a changelog; `None` if no release has a body
pub fn synthesize_from_releases(releases: &[GitHubRelease]) -> Option<String> {
    let text: String = releases
        .iter()
        .take(MAX_RELEASES)
        .filter_map(|r| {
            let body = r.body.as_deref().filter(|b| !b.is_empty())?;
            Some(format!(
                "## Version: {}\n\n{}\n\n---\n",
                r.tag_name.as_deref().unwrap_or("N/A"),
                body
            ))
        })
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    default_branch: Option<String>,
}

/// Changelog source backed by GitHub
pub struct GitHubChangelog {
    client: HttpClient,
    token: Option<String>,
}

impl GitHubChangelog {
    /// Create a source; without a token GitHub applies unauthenticated rate limits
    pub fn new(client: HttpClient, token: Option<String>) -> Self {
        Self { client, token }
    }

    fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("token {}", t))
    }

    /// Paths to probe, most specific first
    fn candidate_paths(directory: Option<&str>) -> Vec<String> {
        let mut prefixes = Vec::new();
        if let Some(dir) = directory.map(|d| d.trim_matches('/')) {
            if !dir.is_empty() && dir != "." {
                prefixes.push(format!("{}/", dir));
            }
        }
        prefixes.push(String::new());

        prefixes
            .iter()
            .flat_map(|prefix| {
                CHANGELOG_FILENAMES
                    .iter()
                    .map(move |name| format!("{}{}", prefix, name))
            })
            .collect()
    }

    async fn from_files(&self, slug: &str, directory: Option<&str>) -> Option<String> {
        let auth = self.authorization();
        let repo: RepoResponse = match self
            .client
            .get_json(
                &format!("{}/repos/{}", GITHUB_API_URL, slug),
                slug,
                SERVICE,
                auth.as_deref(),
            )
            .await
        {
            Ok(repo) => repo,
            Err(e) => {
                debug!("could not resolve default branch for {}: {}", slug, e);
                return None;
            }
        };
        let branch = repo.default_branch?;

        for path in Self::candidate_paths(directory) {
            let url = format!("{}/{}/{}/{}", GITHUB_RAW_URL, slug, branch, path);
            match self.client.get_text(&url, &path, SERVICE).await {
                Ok(text) => {
                    debug!("found changelog at {}", url);
                    return Some(truncate_chars(&text, MAX_CHANGELOG_CHARS));
                }
                Err(e) => debug!("no changelog at {}: {}", url, e),
            }
        }
        None
    }

    async fn from_releases(&self, slug: &str) -> Option<String> {
        let auth = self.authorization();
        let releases: Vec<GitHubRelease> = match self
            .client
            .get_json(
                &format!("{}/repos/{}/releases", GITHUB_API_URL, slug),
                slug,
                SERVICE,
                auth.as_deref(),
            )
            .await
        {
            Ok(releases) => releases,
            Err(e) => {
                debug!("could not fetch releases for {}: {}", slug, e);
                return None;
            }
        };
        synthesize_from_releases(&releases)
    }
}

#[async_trait]
impl ChangelogSource for GitHubChangelog {
    async fn changelog(&self, package: &str, release: &PackageRelease) -> Option<String> {
        let Some(slug) = release.repository_url.as_deref().and_then(parse_github_slug) else {
            debug!("{} has no GitHub repository", package);
            return None;
        };

        if let Some(text) = self
            .from_files(&slug, release.repository_directory.as_deref())
            .await
        {
            return Some(text);
        }
        self.from_releases(&slug).await
    }
}
