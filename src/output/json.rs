//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the run report
//! - Per-package risk, summary, peers and proposed patch paths

use crate::domain::{MissingPeers, RiskTier, UpgradeCandidate};
use crate::orchestrator::{RunReport, UpdatedPackage};
use crate::output::{OutputFormatter, VersionChangeType, Verbosity};
use crate::patch::ReviewOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// When the report was produced
    generated_at: DateTime<Utc>,
    /// Whether this was a dry-run
    dry_run: bool,
    /// Summary statistics
    summary: JsonSummary,
    updated: Vec<JsonUpdated<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    planned: Vec<JsonCandidate<'a>>,
    manual_review: Vec<JsonCandidate<'a>>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    patch_reviews: &'a [ReviewOutcome],
    /// Skipped dependencies (only in verbose mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<JsonSkip<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    install_command: Option<&'a str>,
    /// Errors encountered
    #[serde(skip_serializing_if = "is_empty_slice")]
    errors: &'a [String],
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    updated: usize,
    planned: usize,
    manual_review: usize,
    skipped: usize,
    errors: usize,
}

/// JSON representation of an updated package
#[derive(Serialize)]
struct JsonUpdated<'a> {
    name: &'a str,
    from: &'a str,
    to: &'a str,
    /// New declared value, prefix included
    declared: &'a str,
    change: &'static str,
    risk: RiskTier,
    #[serde(skip_serializing_if = "is_empty_slice")]
    peers_added: &'a [String],
}

/// JSON representation of a classified candidate
#[derive(Serialize)]
struct JsonCandidate<'a> {
    name: &'a str,
    from: &'a str,
    to: &'a str,
    change: &'static str,
    risk: RiskTier,
    summary: &'a str,
    #[serde(skip_serializing_if = "has_no_peers")]
    missing_peers: &'a MissingPeers,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    patched_files: Vec<String>,
}

/// JSON representation of a skip
#[derive(Serialize)]
struct JsonSkip<'a> {
    name: &'a str,
    reason: String,
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

fn has_no_peers(peers: &&MissingPeers) -> bool {
    peers.is_empty()
}

impl<'a> JsonUpdated<'a> {
    fn from_package(package: &'a UpdatedPackage) -> Self {
        Self {
            name: &package.name,
            from: &package.current_version,
            to: &package.latest_version,
            declared: &package.declared_version,
            change: VersionChangeType::from_versions(
                &package.current_version,
                &package.latest_version,
            )
            .label(),
            risk: package.risk,
            peers_added: &package.peers_added,
        }
    }
}

impl<'a> JsonCandidate<'a> {
    fn from_candidate(candidate: &'a UpgradeCandidate) -> Self {
        Self {
            name: &candidate.name,
            from: &candidate.current_version,
            to: &candidate.latest_version,
            change: VersionChangeType::from_versions(
                &candidate.current_version,
                &candidate.latest_version,
            )
            .label(),
            risk: candidate.risk,
            summary: &candidate.summary,
            missing_peers: &candidate.missing_peers,
            patched_files: candidate
                .patched_files
                .iter()
                .map(|p| p.file_path.display().to_string())
                .collect(),
        }
    }
}

impl JsonFormatter {
    fn to_output<'a>(&self, report: &'a RunReport) -> JsonOutput<'a> {
        let skipped = if self.verbosity == Verbosity::Verbose {
            report
                .skipped
                .iter()
                .map(|s| JsonSkip {
                    name: &s.name,
                    reason: s.reason.to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        JsonOutput {
            generated_at: Utc::now(),
            dry_run: report.dry_run,
            summary: JsonSummary {
                updated: report.updated.len(),
                planned: report.planned.len(),
                manual_review: report.manual_review.len(),
                skipped: report.skipped.len(),
                errors: report.errors.len(),
            },
            updated: report.updated.iter().map(JsonUpdated::from_package).collect(),
            planned: report
                .planned
                .iter()
                .map(JsonCandidate::from_candidate)
                .collect(),
            manual_review: report
                .manual_review
                .iter()
                .map(JsonCandidate::from_candidate)
                .collect(),
            patch_reviews: &report.reviews,
            skipped,
            install_command: report.install_command.as_deref(),
            errors: &report.errors,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = self.to_output(report);
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
