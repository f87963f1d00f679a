//! Patch review and application
//!
//! Each patch moves `Proposed -> Presented -> {Applied, Skipped}`. Applying
//! renames the original to a `.bak` sibling before writing the new content,
//! so a failed rename leaves the original untouched and a failed write leaves
//! the original recoverable from the backup.
//!
//! A patch only applies while the file still holds the content it was
//! generated from, and an existing backup is never replaced.

use crate::domain::FilePatch;
use crate::error::{PatchError, PromptError};
use crate::patch::diff::write_colored_diff;
use crate::prompt::Prompt;
use colored::Colorize;
use serde::Serialize;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Review state of one patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchState {
    Proposed,
    Presented,
    Applied,
    Skipped,
}

/// Final state of one reviewed patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOutcome {
    pub file_path: PathBuf,
    pub state: PatchState,
    /// Backup created when the patch was applied
    pub backup_path: Option<PathBuf>,
}

/// Result of reviewing all patches of one package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewOutcome {
    pub package: String,
    pub patches: Vec<PatchOutcome>,
    /// The user interrupted the review; later patches were not presented
    pub cancelled: bool,
    /// Backup or write failures
    pub errors: Vec<String>,
}

impl ReviewOutcome {
    /// True only if every patch was applied (vacuously true for no patches)
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.patches.iter().all(|p| p.state == PatchState::Applied)
    }

    pub fn applied_count(&self) -> usize {
        self.patches
            .iter()
            .filter(|p| p.state == PatchState::Applied)
            .count()
    }
}

/// Backup location for a file: the same path with `.bak` appended
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Check that the file on disk is what the patch was generated from and
/// that no backup is in the way; returns the backup location
pub fn check_applicable(patch: &FilePatch) -> Result<PathBuf, PatchError> {
    let path = &patch.file_path;
    let current = std::fs::read_to_string(path).map_err(|source| PatchError::BackupFailed {
        path: path.clone(),
        source,
    })?;
    if current != patch.original_content {
        return Err(PatchError::Stale { path: path.clone() });
    }

    let backup = backup_path(path);
    if backup.exists() {
        return Err(PatchError::BackupExists {
            path: path.clone(),
            backup,
        });
    }
    Ok(backup)
}

/// Rename the original to its backup, then write the new content in its place
pub fn apply_patch(patch: &FilePatch) -> Result<PathBuf, PatchError> {
    let path = &patch.file_path;
    let backup = check_applicable(patch)?;

    std::fs::rename(path, &backup).map_err(|source| PatchError::BackupFailed {
        path: path.clone(),
        source,
    })?;
    debug!("backed up {} to {}", path.display(), backup.display());

    std::fs::write(path, &patch.proposed_content).map_err(|source| PatchError::WriteFailed {
        path: path.clone(),
        backup: backup.clone(),
        source,
    })?;
    Ok(backup)
}

/// Presents patches and applies the approved ones
pub struct PatchReviewer<'a> {
    prompt: &'a dyn Prompt,
}

impl<'a> PatchReviewer<'a> {
    pub fn new(prompt: &'a dyn Prompt) -> Self {
        Self { prompt }
    }

    /// Review every patch of one package in order
    ///
    /// Diffs are written to `out`. A cancelled prompt stops the queue; patches
    /// applied before it stay applied. Patches whose file changed since they
    /// were generated are skipped without asking.
    pub async fn review(
        &self,
        package: &str,
        patches: &[FilePatch],
        out: &mut (dyn Write + Send),
    ) -> io::Result<ReviewOutcome> {
        let mut outcome = ReviewOutcome {
            package: package.to_string(),
            patches: patches
                .iter()
                .map(|p| PatchOutcome {
                    file_path: p.file_path.clone(),
                    state: PatchState::Proposed,
                    backup_path: None,
                })
                .collect(),
            ..Default::default()
        };
        if patches.is_empty() {
            return Ok(outcome);
        }

        writeln!(
            out,
            "\n{}",
            format!("Code patches for '{}' need review.", package)
                .cyan()
                .bold()
        )?;

        for (patch, state) in patches.iter().zip(outcome.patches.iter_mut()) {
            if let Err(e) = check_applicable(patch) {
                warn!("{}", e);
                writeln!(out, "{}", format!("Skipping patch: {}", e).yellow())?;
                state.state = PatchState::Skipped;
                outcome.errors.push(e.to_string());
                continue;
            }

            write_patch(out, patch)?;
            state.state = PatchState::Presented;

            match self.prompt.confirm("Apply this patch?").await {
                Ok(true) => match apply_patch(patch) {
                    Ok(backup) => {
                        writeln!(out, "{}", "Patch applied.".green())?;
                        state.state = PatchState::Applied;
                        state.backup_path = Some(backup);
                    }
                    Err(e) => {
                        warn!("{}", e);
                        state.state = PatchState::Skipped;
                        outcome.errors.push(e.to_string());
                    }
                },
                Ok(false) => {
                    writeln!(out, "{}", "Patch skipped.".yellow())?;
                    state.state = PatchState::Skipped;
                }
                Err(PromptError::Cancelled) => {
                    writeln!(out, "\nPatching cancelled for '{}'.", package)?;
                    outcome.cancelled = true;
                    break;
                }
                Err(e) => {
                    warn!("{}", e);
                    outcome.cancelled = true;
                    break;
                }
            }
        }
        Ok(outcome)
    }
}

fn write_patch(out: &mut (dyn Write + Send), patch: &FilePatch) -> io::Result<()> {
    writeln!(
        out,
        "\n{} {} ---",
        "--- Patch for:".bold(),
        patch.file_path.display().to_string().yellow()
    )?;
    write_colored_diff(out, &patch.original_content, &patch.proposed_content)?;
    out.flush()
}
