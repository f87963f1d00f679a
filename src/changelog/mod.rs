//! Changelog retrieval for upgrade classification
//!
//! This module provides:
//! - The `ChangelogSource` seam used by the orchestrator
//! - A GitHub implementation that probes conventional changelog files and
//!   falls back to release notes

mod github;

pub use github::{parse_github_slug, synthesize_from_releases, GitHubChangelog, GitHubRelease};

use crate::registry::PackageRelease;
use async_trait::async_trait;

/// Text handed to the classifier when no changelog could be found
pub const CHANGELOG_UNAVAILABLE: &str = "Could not retrieve changelog.";

/// Maximum number of characters kept from a changelog file
pub const MAX_CHANGELOG_CHARS: usize = 40_000;

/// Trait for best-effort changelog retrieval
///
/// Failures are never errors: a missing changelog is `None`.
#[async_trait]
pub trait ChangelogSource: Send + Sync {
    /// Fetch the change history for the repository a release points at
    async fn changelog(&self, package: &str, release: &PackageRelease) -> Option<String>;
}

/// Truncate to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short() {
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_chars_long() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
