//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Updated packages with the peers they brought in
//! - Manual review list ordered by severity, with summaries and proposed patches
//! - Semantic version change type indication (major/minor/patch)
//! - Skipped package display with reasons (verbose)

use crate::domain::{RiskTier, UpgradeCandidate};
use crate::orchestrator::{RunReport, UpdatedPackage};
use crate::output::{OutputFormatter, Verbosity};
use crate::patch::PatchState;
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &str, new: &str) -> Self {
        let parse = |v: &str| -> Option<(u64, u64)> {
            let v = v.trim_start_matches(['^', '~', 'v', '=']);
            if let Ok(version) = semver::Version::parse(v) {
                return Some((version.major, version.minor));
            }
            let mut parts = v.split(['.', '-']);
            let major = parts.next()?.parse().ok()?;
            let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
            Some((major, minor))
        };

        match (parse(old), parse(new)) {
            (Some((old_major, old_minor)), Some((new_major, new_minor))) => {
                if new_major != old_major {
                    VersionChangeType::Major
                } else if new_minor != old_minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

fn tier_label(tier: RiskTier) -> ColoredString {
    let label = format!("[{}]", tier);
    match tier {
        RiskTier::Dangerous => label.red().bold(),
        RiskTier::Caution => label.yellow().bold(),
        RiskTier::Safe => label.green().bold(),
        RiskTier::Unknown => label.magenta().bold(),
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn version_line(
        &self,
        name: &str,
        from: &str,
        to: &str,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let change = VersionChangeType::from_versions(from, to);
        write!(
            writer,
            "{} {} {} {} [{}]",
            name.bold(),
            from.dimmed(),
            "→".dimmed(),
            to.bright_white().bold(),
            change.colored_label()
        )
    }

    fn format_updated(
        &self,
        updated: &[UpdatedPackage],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", "Packages Updated Successfully".green().bold())?;
        for package in updated {
            write!(writer, "  {} ", "✓".green())?;
            self.version_line(
                &package.name,
                &package.current_version,
                &package.latest_version,
                writer,
            )?;
            writeln!(writer, " {}", tier_label(package.risk))?;
            if !package.peers_added.is_empty() {
                writeln!(
                    writer,
                    "      {} {}",
                    "peers added:".dimmed(),
                    package.peers_added.join(", ")
                )?;
            }
        }
        writeln!(writer)
    }

    fn format_planned(
        &self,
        planned: &[UpgradeCandidate],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(
            writer,
            "{} {}",
            "(dry-run)".cyan(),
            "Would update automatically".bold()
        )?;
        for candidate in planned {
            write!(writer, "  - ")?;
            self.version_line(
                &candidate.name,
                &candidate.current_version,
                &candidate.latest_version,
                writer,
            )?;
            writeln!(writer, " {}", tier_label(candidate.risk))?;
        }
        writeln!(writer)
    }

    fn format_manual(
        &self,
        report: &RunReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", "Manual Review Required".yellow().bold())?;
        for candidate in &report.manual_review {
            write!(writer, "  {} ", tier_label(candidate.risk))?;
            self.version_line(
                &candidate.name,
                &candidate.current_version,
                &candidate.latest_version,
                writer,
            )?;
            writeln!(writer)?;

            for line in candidate.summary.lines().filter(|l| !l.trim().is_empty()) {
                writeln!(writer, "      {}", line.trim())?;
            }
            if !candidate.missing_peers.is_empty() {
                let peers: Vec<String> = candidate
                    .missing_peers
                    .iter()
                    .map(|(name, spec)| format!("{}@{}", name, spec))
                    .collect();
                writeln!(
                    writer,
                    "      {} {}",
                    "missing peers:".dimmed(),
                    peers.join(", ")
                )?;
            }
            if candidate.has_patches() {
                writeln!(writer, "      {}", "proposed patches:".dimmed())?;
                for patch in &candidate.patched_files {
                    writeln!(writer, "        {}", patch.file_path.display())?;
                }
            }
        }
        writeln!(writer)
    }

    fn format_reviews(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if report.reviews.is_empty() {
            return Ok(());
        }
        writeln!(writer, "{}", "Code Patches".bold())?;
        for review in &report.reviews {
            let skipped = review
                .patches
                .iter()
                .filter(|p| p.state != PatchState::Applied)
                .count();
            let status = if review.cancelled {
                " (cancelled)".red().to_string()
            } else {
                String::new()
            };
            writeln!(
                writer,
                "  {}: {} applied, {} skipped{}",
                review.package,
                review.applied_count().to_string().green(),
                skipped,
                status
            )?;
            if self.verbosity == Verbosity::Verbose {
                for patch in &review.patches {
                    let backup = patch
                        .backup_path
                        .as_ref()
                        .map(|b| format!(" (backup: {})", b.display()))
                        .unwrap_or_default();
                    writeln!(
                        writer,
                        "      {} {:?}{}",
                        patch.file_path.display(),
                        patch.state,
                        backup.dimmed()
                    )?;
                }
            }
        }
        writeln!(writer)
    }

    fn format_skipped(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Verbose || report.skipped.is_empty() {
            return Ok(());
        }
        writeln!(writer, "{}", "Skipped:".dimmed())?;
        let width = report
            .skipped
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0)
            .max(20);
        for skipped in &report.skipped {
            let name = format!("{:width$}", skipped.name, width = width);
            writeln!(
                writer,
                "  {} {}",
                name.dimmed(),
                format!("({})", skipped.reason).dimmed()
            )?;
        }
        writeln!(writer)
    }

    fn format_quiet(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = if report.dry_run {
            format!("{} ", "(dry-run)".cyan())
        } else {
            String::new()
        };
        if report.is_up_to_date() {
            return writeln!(writer, "{}{}", prefix, "No updates".dimmed());
        }
        let changed = if report.dry_run {
            report.planned.len()
        } else {
            report.updated.len()
        };
        writeln!(
            writer,
            "{}{} updated, {} need review",
            prefix,
            changed.to_string().green(),
            report.manual_review.len().to_string().yellow()
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return self.format_quiet(report, writer);
        }

        writeln!(writer)?;
        if report.is_up_to_date() && report.errors.is_empty() {
            writeln!(
                writer,
                "{}",
                "All dependencies are already up to date!".green().bold()
            )?;
            return self.format_skipped(report, writer);
        }

        if !report.updated.is_empty() {
            self.format_updated(&report.updated, writer)?;
            if let Some(command) = &report.install_command {
                writeln!(writer, "{} {}\n", "Lockfile updated with".dimmed(), command)?;
            }
        }
        if !report.planned.is_empty() {
            self.format_planned(&report.planned, writer)?;
        }
        self.format_reviews(report, writer)?;
        if !report.manual_review.is_empty() {
            self.format_manual(report, writer)?;
        }
        self.format_skipped(report, writer)?;

        if !report.errors.is_empty() {
            writeln!(writer, "{}:", "Errors".red().bold())?;
            for error in &report.errors {
                writeln!(writer, "  {} {}", "✗".red(), error)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
