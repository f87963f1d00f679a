//! CLI argument parsing module for depwise

use crate::domain::RiskTier;
use crate::error::ConfigError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse one entry of the comma-separated `--risk` list
fn parse_risk_level(s: &str) -> Result<RiskTier, ConfigError> {
    s.parse::<RiskTier>()
        .map_err(|_| ConfigError::InvalidRiskLevel {
            value: s.trim().to_string(),
        })
}

/// Changelog-aware dependency upgrader for JavaScript/TypeScript projects
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depwise",
    version,
    about = "Classify npm upgrade risk from changelogs, patch breaking code, and update package.json"
)]
pub struct CliArgs {
    /// Path to package.json
    #[arg(default_value = "package.json")]
    pub manifest: PathBuf,

    /// Source directory to scan for code affected by risky upgrades
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Review and apply generated code patches for approved upgrades
    #[arg(long)]
    pub apply_patches: bool,

    /// Comma-separated risk tiers to update automatically (e.g. SAFE,CAUTION)
    #[arg(long, value_delimiter = ',', default_value = "SAFE", value_parser = parse_risk_level)]
    pub risk: Vec<RiskTier>,

    /// Skip all confirmation prompts (applies patches without review)
    #[arg(short = 'y', long)]
    pub yes: bool,

    // General options
    /// Analyze and report only; never prompt, patch, write or install
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output the final report in JSON format
    #[arg(long)]
    pub json: bool,

    // Package filters
    /// Exclude specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Check only specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub only: Vec<String>,

    // Services
    /// Chat model used for classification and patches
    #[arg(long)]
    pub model: Option<String>,

    /// Write package.json but do not run the package manager install
    #[arg(long)]
    pub no_install: bool,
}

impl CliArgs {
    /// Check if a package should be processed based on filters
    pub fn should_process_package(&self, name: &str) -> bool {
        // If --only is specified, only process those packages
        if !self.only.is_empty() {
            return self.only.iter().any(|p| p == name);
        }
        !self.exclude.iter().any(|p| p == name)
    }

    /// Default tracing filter directive for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Whether confirmation prompts should be shown
    pub fn interactive(&self) -> bool {
        !self.yes && !self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["depwise"]);
        assert_eq!(args.manifest, PathBuf::from("package.json"));
        assert!(args.src.is_none());
        assert!(!args.apply_patches);
        assert_eq!(args.risk, vec![RiskTier::Safe]);
        assert!(!args.yes);
        assert!(!args.dry_run);
        assert!(!args.json);
        assert!(args.model.is_none());
        assert!(!args.no_install);
        assert_eq!(args.log_level(), "warn");
        assert!(args.interactive());
    }

    #[test]
    fn test_manifest_and_src() {
        let args = CliArgs::parse_from(["depwise", "web/package.json", "--src", "web/src"]);
        assert_eq!(args.manifest, PathBuf::from("web/package.json"));
        assert_eq!(args.src, Some(PathBuf::from("web/src")));
    }

    #[test]
    fn test_risk_list() {
        let args = CliArgs::parse_from(["depwise", "--risk", "safe, CAUTION"]);
        assert_eq!(args.risk, vec![RiskTier::Safe, RiskTier::Caution]);
    }

    #[test]
    fn test_risk_invalid_rejected() {
        let result = CliArgs::try_parse_from(["depwise", "--risk", "SAFE,HIGH"]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("HIGH"));
    }

    #[test]
    fn test_yes_short_flag() {
        let args = CliArgs::parse_from(["depwise", "-y"]);
        assert!(args.yes);
        assert!(!args.interactive());
    }

    #[test]
    fn test_dry_run_is_not_interactive() {
        let args = CliArgs::parse_from(["depwise", "-n"]);
        assert!(args.dry_run);
        assert!(!args.interactive());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(CliArgs::try_parse_from(["depwise", "--verbose", "--quiet"]).is_err());
        assert_eq!(
            CliArgs::parse_from(["depwise", "--verbose"]).log_level(),
            "debug"
        );
        assert_eq!(CliArgs::parse_from(["depwise", "-q"]).log_level(), "error");
    }

    #[test]
    fn test_should_process_package_exclude() {
        let args = CliArgs::parse_from(["depwise", "--exclude", "react", "--exclude", "vue"]);
        assert!(!args.should_process_package("react"));
        assert!(!args.should_process_package("vue"));
        assert!(args.should_process_package("lodash"));
    }

    #[test]
    fn test_should_process_package_only() {
        let args = CliArgs::parse_from(["depwise", "--only", "lodash"]);
        assert!(args.should_process_package("lodash"));
        assert!(!args.should_process_package("react"));
    }

    #[test]
    fn test_model_override() {
        let args = CliArgs::parse_from(["depwise", "--model", "gpt-4o-mini", "--no-install"]);
        assert_eq!(args.model.as_deref(), Some("gpt-4o-mini"));
        assert!(args.no_install);
    }
}
