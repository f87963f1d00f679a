//! Upgrade candidates and the file patches attached to them

use super::RiskTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Peer dependencies required by a new release but absent from the manifest
///
/// Maps peer name to the required version spec, e.g. `padder -> ^1.0.0`.
pub type MissingPeers = BTreeMap<String, String>;

/// A proposed rewrite of one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePatch {
    /// Path of the file to rewrite
    pub file_path: PathBuf,
    /// File content at scan time
    pub original_content: String,
    /// Complete replacement content
    pub proposed_content: String,
}

impl FilePatch {
    /// Create a patch; returns `None` when the proposal is identical to the original
    pub fn new(
        file_path: impl Into<PathBuf>,
        original_content: impl Into<String>,
        proposed_content: impl Into<String>,
    ) -> Option<Self> {
        let original_content = original_content.into();
        let proposed_content = proposed_content.into();
        if original_content == proposed_content {
            return None;
        }
        Some(Self {
            file_path: file_path.into(),
            original_content,
            proposed_content,
        })
    }
}

/// An outdated package that has been classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCandidate {
    /// Package name
    pub name: String,
    /// Declared version as written in the manifest (e.g. `^1.2.0`)
    pub declared_version: String,
    /// Normalized numeric current version (e.g. `1.2.0`)
    pub current_version: String,
    /// Latest published version
    pub latest_version: String,
    /// Effective risk tier
    pub risk: RiskTier,
    /// Human-readable summary of the changelog
    pub summary: String,
    /// Peer dependencies the new version needs that the manifest lacks
    pub missing_peers: MissingPeers,
    /// Proposed source rewrites, in scan order
    pub patched_files: Vec<FilePatch>,
}

impl UpgradeCandidate {
    /// Attach generated patches; any patch promotes the tier to `Dangerous`
    pub fn with_patches(mut self, patches: Vec<FilePatch>) -> Self {
        if !patches.is_empty() {
            self.risk = self.risk.promote_to(RiskTier::Dangerous);
        }
        self.patched_files = patches;
        self
    }

    /// Returns true if the upgrade has code patches to review
    pub fn has_patches(&self) -> bool {
        !self.patched_files.is_empty()
    }
}

/// Why a declared dependency did not become a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// Already at the latest version
    UpToDate,
    /// Declared value is not a string or carries no version digits
    NotAVersion,
    /// Declared range cannot be rewritten safely
    UnsupportedRange(String),
    /// Excluded by --exclude
    Excluded,
    /// Not in the --only list
    NotInOnlyList,
    /// Registry lookup produced no data
    RegistryUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UpToDate => write!(f, "up to date"),
            SkipReason::NotAVersion => write!(f, "no version string"),
            SkipReason::UnsupportedRange(raw) => write!(f, "unsupported range '{}'", raw),
            SkipReason::Excluded => write!(f, "excluded"),
            SkipReason::NotInOnlyList => write!(f, "not in --only"),
            SkipReason::RegistryUnavailable(msg) => write!(f, "registry unavailable: {}", msg),
        }
    }
}

/// A dependency that was examined but not turned into a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDependency {
    /// Package name
    pub name: String,
    /// Why it was skipped
    pub reason: SkipReason,
}
