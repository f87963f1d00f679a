//! Upgrade orchestrator for coordinating the entire pipeline
//!
//! This module provides:
//! - Workflow coordination: read → fetch → changelog → classify → scan → patch
//! - Partition into auto-action and manual review by risk tier
//! - Batch confirmation, patch review and manifest update
//! - Dry-run mode support and package filters
//! - Error handling with partial continuation

use crate::changelog::{ChangelogSource, GitHubChangelog, CHANGELOG_UNAVAILABLE};
use crate::classify::{LlmSummarizer, RiskClassifier, Summarizer};
use crate::cli::CliArgs;
use crate::config::Config;
use crate::domain::{
    is_outdated, normalize_version, Dependency, DependencySet, MissingPeers, RiskTier,
    SkipReason, SkippedDependency, UpgradeCandidate, VersionSpec,
};
use crate::error::AppError;
use crate::llm::LlmClient;
use crate::manifest::read_manifest;
use crate::package_manager::{PackageManagerRunner, SystemPackageManager};
use crate::patch::{CodeRewriter, LlmRewriter, PatchGenerator, PatchReviewer, ReviewOutcome};
use crate::progress::Progress;
use crate::prompt::{AutoConfirm, Prompt, TerminalPrompt};
use crate::registry::{HttpClient, NpmRegistry, RegistryClient};
use crate::scanner::find_relevant_files;
use crate::updater::ManifestUpdater;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, warn};

/// External services the pipeline calls through
pub struct Collaborators {
    pub registry: Box<dyn RegistryClient>,
    pub changelog: Box<dyn ChangelogSource>,
    pub summarizer: Box<dyn Summarizer>,
    pub rewriter: Box<dyn CodeRewriter>,
    pub prompt: Box<dyn Prompt>,
    pub installer: Box<dyn PackageManagerRunner>,
}

impl Collaborators {
    /// Build the production collaborators from validated configuration
    pub fn from_config(config: &Config, interactive: bool) -> Result<Self, AppError> {
        let http = HttpClient::new()?;
        let prompt: Box<dyn Prompt> = if interactive {
            Box::new(TerminalPrompt::new())
        } else {
            Box::new(AutoConfirm)
        };

        Ok(Self {
            registry: Box::new(NpmRegistry::new(http.clone())),
            changelog: Box::new(GitHubChangelog::new(http, config.github_token.clone())),
            summarizer: Box::new(LlmSummarizer::new(LlmClient::new(&config.llm)?)),
            rewriter: Box::new(LlmRewriter::new(LlmClient::new(&config.llm)?)),
            prompt,
            installer: Box::new(SystemPackageManager::new()),
        })
    }
}

/// A package whose new version was written to the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedPackage {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
    /// New declared value, prefix included
    pub declared_version: String,
    pub risk: RiskTier,
    /// Peers this package brought into `dependencies`
    pub peers_added: Vec<String>,
}

/// Result of one pipeline run
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Whether this was a dry-run
    pub dry_run: bool,
    /// Packages updated in the manifest
    pub updated: Vec<UpdatedPackage>,
    /// Auto-action packages left untouched by a dry-run
    pub planned: Vec<UpgradeCandidate>,
    /// Packages needing a human decision, most severe first
    pub manual_review: Vec<UpgradeCandidate>,
    /// Dependencies that were not candidates
    pub skipped: Vec<SkippedDependency>,
    /// Per-package patch review results
    pub reviews: Vec<ReviewOutcome>,
    /// Install command that regenerated the lockfile
    pub install_command: Option<String>,
    /// Recoverable errors encountered
    pub errors: Vec<String>,
}

impl RunReport {
    /// True when no package needed any action
    pub fn is_up_to_date(&self) -> bool {
        self.updated.is_empty() && self.planned.is_empty() && self.manual_review.is_empty()
    }

    /// Sort manual-review packages by descending severity, keeping analysis order within a tier
    fn sort_manual_review(&mut self) {
        self.manual_review.sort_by_key(|c| c.risk.report_rank());
    }
}

/// Outcome of analyzing one dependency
enum Analysis {
    Candidate(UpgradeCandidate),
    Skipped(SkipReason),
}

/// Check whether a dependency can be analyzed without any network call
fn precheck(args: &CliArgs, dep: &Dependency) -> Option<SkipReason> {
    if !args.only.is_empty() && !args.should_process_package(&dep.name) {
        return Some(SkipReason::NotInOnlyList);
    }
    if !args.should_process_package(&dep.name) {
        return Some(SkipReason::Excluded);
    }
    if !normalize_version(&dep.declared_version)
        .chars()
        .any(|c| c.is_ascii_digit())
    {
        return Some(SkipReason::NotAVersion);
    }
    if VersionSpec::parse(&dep.declared_version).is_none() {
        return Some(SkipReason::UnsupportedRange(dep.declared_version.clone()));
    }
    None
}

/// Orchestrator for coordinating the upgrade workflow
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
    collaborators: Collaborators,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(args: CliArgs, collaborators: Collaborators) -> Self {
        Self {
            args,
            collaborators,
        }
    }

    /// Run the pipeline; interactive text goes to `out`
    ///
    /// Fails only when the manifest is unreadable, the analysis is interrupted
    /// or `out` cannot be written.
    pub async fn run(&self, out: &mut (dyn Write + Send)) -> Result<RunReport, AppError> {
        let show_progress = !self.args.quiet && !self.args.json;
        self.run_with_progress(out, show_progress).await
    }

    /// Run the pipeline with optional progress display
    pub async fn run_with_progress(
        &self,
        out: &mut (dyn Write + Send),
        show_progress: bool,
    ) -> Result<RunReport, AppError> {
        let dependencies = read_manifest(&self.args.manifest)?;
        debug!(
            "{} declares {} dependencies",
            self.args.manifest.display(),
            dependencies.len()
        );

        let mut report = RunReport {
            dry_run: self.args.dry_run,
            ..Default::default()
        };

        let candidates = self
            .analyze_all(&dependencies, &mut report, show_progress)
            .await?;

        let (auto_action, manual): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| self.args.risk.contains(&c.risk));
        report.manual_review = manual;

        if auto_action.is_empty() {
            report.sort_manual_review();
            return Ok(report);
        }

        if self.args.dry_run {
            report.planned = auto_action;
            report.sort_manual_review();
            return Ok(report);
        }

        self.write_preview(out, &auto_action)?;
        let proceed = match self
            .collaborators
            .prompt
            .confirm("Do you want to proceed with this action?")
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                debug!("batch confirmation: {}", e);
                false
            }
        };

        if proceed {
            self.act(out, auto_action, &mut report).await?;
        } else {
            writeln!(out, "Process cancelled. No files were changed.")?;
            report.manual_review.extend(auto_action);
        }

        report.sort_manual_review();
        Ok(report)
    }

    /// Analyze every dependency in manifest order
    async fn analyze_all(
        &self,
        dependencies: &DependencySet,
        report: &mut RunReport,
        show_progress: bool,
    ) -> Result<Vec<UpgradeCandidate>, AppError> {
        let mut progress = Progress::new(show_progress);
        progress.start(dependencies.len() as u64, "Checking dependencies");

        let mut candidates = Vec::new();
        for dep in dependencies {
            progress.set_message(&format!("Checking {}", dep.name));

            let analysis = tokio::select! {
                analysis = self.analyze(dep, dependencies) => analysis,
                _ = tokio::signal::ctrl_c() => {
                    progress.finish_and_clear();
                    return Err(AppError::Interrupted);
                }
            };

            match analysis {
                Analysis::Candidate(candidate) => candidates.push(candidate),
                Analysis::Skipped(reason) => {
                    debug!("skipping {}: {}", dep.name, reason);
                    report.skipped.push(SkippedDependency {
                        name: dep.name.clone(),
                        reason,
                    });
                }
            }
            progress.inc();
        }
        progress.finish_and_clear();
        Ok(candidates)
    }

    /// Fetch, classify and optionally patch one dependency
    async fn analyze(&self, dep: &Dependency, declared: &DependencySet) -> Analysis {
        if let Some(reason) = precheck(&self.args, dep) {
            return Analysis::Skipped(reason);
        }

        let release = match self.collaborators.registry.latest(&dep.name).await {
            Ok(release) => release,
            Err(e) => {
                warn!("{}", e);
                return Analysis::Skipped(SkipReason::RegistryUnavailable(e.to_string()));
            }
        };

        if !is_outdated(&dep.declared_version, &release.version) {
            return Analysis::Skipped(SkipReason::UpToDate);
        }
        let current_version = normalize_version(&dep.declared_version);
        debug!(
            "update found for {}: {} -> {}",
            dep.name, current_version, release.version
        );

        let missing_peers: MissingPeers = release
            .peer_dependencies
            .iter()
            .filter(|(name, _)| !declared.contains(name))
            .map(|(name, spec)| (name.clone(), spec.clone()))
            .collect();
        if !missing_peers.is_empty() {
            let names: Vec<&str> = missing_peers.keys().map(String::as_str).collect();
            warn!(
                "{} {} requires missing peer dependencies: {}",
                dep.name,
                release.version,
                names.join(", ")
            );
        }

        let changelog = self
            .collaborators
            .changelog
            .changelog(&dep.name, &release)
            .await
            .unwrap_or_else(|| CHANGELOG_UNAVAILABLE.to_string());

        let classification = RiskClassifier::new(self.collaborators.summarizer.as_ref())
            .classify(&dep.name, &changelog, &missing_peers)
            .await;

        let candidate = UpgradeCandidate {
            name: dep.name.clone(),
            declared_version: dep.declared_version.clone(),
            current_version,
            latest_version: release.version,
            risk: classification.risk,
            summary: classification.summary,
            missing_peers,
            patched_files: Vec::new(),
        };

        if !candidate.risk.is_at_least(RiskTier::Caution) {
            return Analysis::Candidate(candidate);
        }
        let Some(src) = self.args.src.as_deref() else {
            return Analysis::Candidate(candidate);
        };

        let files = find_relevant_files(Some(src), &dep.name);
        if files.is_empty() {
            return Analysis::Candidate(candidate);
        }
        let patches = PatchGenerator::new(self.collaborators.rewriter.as_ref())
            .generate(&dep.name, &changelog, &files)
            .await;
        if !patches.is_empty() {
            debug!(
                "{} patch(es) for {}; promoting to {}",
                patches.len(),
                dep.name,
                RiskTier::Dangerous
            );
        }
        Analysis::Candidate(candidate.with_patches(patches))
    }

    /// List the auto-action batch before asking to proceed
    fn write_preview(
        &self,
        out: &mut (dyn Write + Send),
        batch: &[UpgradeCandidate],
    ) -> io::Result<()> {
        let tiers: Vec<&str> = self.args.risk.iter().map(RiskTier::as_str).collect();
        writeln!(
            out,
            "\n{}",
            format!(
                "The following packages match your risk level ('{}') and will be processed:",
                tiers.join(",")
            )
            .cyan()
            .bold()
        )?;
        for candidate in batch {
            writeln!(
                out,
                "  - {} ({}): {} -> {}",
                candidate.name, candidate.risk, candidate.current_version, candidate.latest_version
            )?;
            if candidate.has_patches() {
                writeln!(
                    out,
                    "    {}",
                    format!(
                        "({} generated code patch(es) to review)",
                        candidate.patched_files.len()
                    )
                    .yellow()
                )?;
            }
        }
        out.flush()
    }

    /// Apply patches, then update the manifest for an approved batch
    async fn act(
        &self,
        out: &mut (dyn Write + Send),
        approved: Vec<UpgradeCandidate>,
        report: &mut RunReport,
    ) -> Result<(), AppError> {
        if self.args.apply_patches {
            let reviewer = PatchReviewer::new(self.collaborators.prompt.as_ref());
            for candidate in approved.iter().filter(|c| c.has_patches()) {
                let outcome = reviewer
                    .review(&candidate.name, &candidate.patched_files, out)
                    .await?;
                if !outcome.is_success() {
                    report.errors.push(format!(
                        "patches for '{}': {} of {} applied",
                        candidate.name,
                        outcome.applied_count(),
                        outcome.patches.len()
                    ));
                }
                report.reviews.push(outcome);
            }
        }

        let mut peers = MissingPeers::new();
        for candidate in &approved {
            peers.extend(candidate.missing_peers.clone());
        }

        let updater = ManifestUpdater::new(self.collaborators.installer.as_ref());
        let changes = match updater.write_manifest(&self.args.manifest, &approved, &peers) {
            Ok(changes) => changes,
            Err(e) => {
                warn!("update failed: {}", e);
                report.errors.push(e.to_string());
                report.manual_review.extend(approved);
                return Ok(());
            }
        };

        for candidate in approved {
            let Some((_, declared_version)) =
                changes.updated.iter().find(|(name, _)| *name == candidate.name)
            else {
                report.manual_review.push(candidate);
                continue;
            };
            let peers_added = changes
                .peers_added
                .iter()
                .filter(|(name, _)| candidate.missing_peers.contains_key(name))
                .map(|(name, _)| name.clone())
                .collect();
            report.updated.push(UpdatedPackage {
                declared_version: declared_version.clone(),
                name: candidate.name,
                current_version: candidate.current_version,
                latest_version: candidate.latest_version,
                risk: candidate.risk,
                peers_added,
            });
        }

        if self.args.no_install {
            return Ok(());
        }
        writeln!(out, "{}", "Running install to update the lockfile...".cyan())?;
        match updater.install(&self.args.manifest) {
            Ok(command) => report.install_command = Some(command),
            Err(e) => {
                warn!("update failed: {}", e);
                report.errors.push(e.to_string());
            }
        }
        Ok(())
    }
}
