//! Manifest updater: writes approved versions and regenerates the lockfile

use crate::domain::{MissingPeers, UpgradeCandidate};
use crate::error::UpdateError;
use crate::manifest::ManifestDocument;
use crate::package_manager::PackageManagerRunner;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// What was written to the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestChanges {
    /// `(name, new declared value)` for each rewritten package
    pub updated: Vec<(String, String)>,
    /// `(name, spec)` for each peer added to `dependencies`
    pub peers_added: Vec<(String, String)>,
}

/// Rewrites the manifest and runs the install step
pub struct ManifestUpdater<'a> {
    runner: &'a dyn PackageManagerRunner,
}

impl<'a> ManifestUpdater<'a> {
    pub fn new(runner: &'a dyn PackageManagerRunner) -> Self {
        Self { runner }
    }

    /// Merge peers, rewrite approved versions and save the manifest
    ///
    /// Nothing is written if any approved package has an unsupported range.
    pub fn write_manifest(
        &self,
        manifest_path: &Path,
        approved: &[UpgradeCandidate],
        peers: &MissingPeers,
    ) -> Result<ManifestChanges, UpdateError> {
        let mut doc = ManifestDocument::load(manifest_path)?;
        let mut changes = ManifestChanges {
            peers_added: doc.merge_peers(peers),
            ..Default::default()
        };
        for (name, spec) in &changes.peers_added {
            info!("adding peer {}@{} to dependencies", name, spec);
        }

        for candidate in approved {
            let groups = doc.set_version(&candidate.name, &candidate.latest_version)?;
            if groups.is_empty() {
                warn!("{} is no longer declared in {}", candidate.name, manifest_path.display());
                continue;
            }
            for group in &groups {
                debug!("updated {} in {}", candidate.name, group);
            }
            let declared = doc
                .group(groups[0])
                .and_then(|g| g.get(&candidate.name))
                .and_then(|v| v.as_str())
                .unwrap_or(&candidate.latest_version)
                .to_string();
            changes.updated.push((candidate.name.clone(), declared));
        }

        doc.save()?;
        Ok(changes)
    }

    /// Run the package manager install in the manifest's directory
    ///
    /// Returns the command that ran.
    pub fn install(&self, manifest_path: &Path) -> Result<String, UpdateError> {
        let dir = project_dir(manifest_path);
        let result = self.runner.run_install(dir);
        if result.success {
            debug!("'{}' succeeded in {}", result.command, dir.display());
            Ok(result.command)
        } else {
            Err(UpdateError::InstallFailed {
                message: result.failure_message().to_string(),
                command: result.command,
            })
        }
    }
}

/// Directory containing the manifest; `.` for a bare file name
pub fn project_dir(manifest_path: &Path) -> &Path {
    match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
