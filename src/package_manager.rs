//! Package manager integration for regenerating the lockfile after updates
//!
//! This module provides:
//! - Detection of the Node.js package manager from the lockfile present
//! - Execution of its install command in the project directory

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::process::{Command, Output};

/// Node.js package managers, in detection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodePackageManager {
    Pnpm,
    Yarn,
    Bun,
    Npm,
}

impl NodePackageManager {
    /// Lockfile that selects each manager
    fn lockfile(&self) -> &'static str {
        match self {
            NodePackageManager::Pnpm => "pnpm-lock.yaml",
            NodePackageManager::Yarn => "yarn.lock",
            NodePackageManager::Bun => "bun.lockb",
            NodePackageManager::Npm => "package-lock.json",
        }
    }

    /// Detect the package manager for a project directory
    ///
    /// Checks lockfiles in order pnpm, yarn, bun; falls back to npm.
    pub fn detect(working_dir: &Path) -> Self {
        [
            NodePackageManager::Pnpm,
            NodePackageManager::Yarn,
            NodePackageManager::Bun,
        ]
        .into_iter()
        .find(|pm| working_dir.join(pm.lockfile()).exists())
        .unwrap_or(NodePackageManager::Npm)
    }

    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            NodePackageManager::Pnpm => "pnpm",
            NodePackageManager::Yarn => "yarn",
            NodePackageManager::Bun => "bun",
            NodePackageManager::Npm => "npm",
        }
    }

    /// Full install command line
    pub fn install_command(&self) -> [&'static str; 2] {
        [self.program(), "install"]
    }
}

impl fmt::Display for NodePackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Result of a package manager installation
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl InstallResult {
    /// Create a successful install result
    pub fn success(command: String, stdout: String, stderr: String) -> Self {
        Self {
            command,
            success: true,
            stdout,
            stderr,
        }
    }

    /// Create a failed install result
    pub fn failure(command: String, stdout: String, stderr: String) -> Self {
        Self {
            command,
            success: false,
            stdout,
            stderr,
        }
    }

    /// Most useful failure text: stderr, else stdout
    pub fn failure_message(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Trait for running package manager install commands
pub trait PackageManagerRunner: Send + Sync {
    /// Run the install command in the specified directory
    fn run_install(&self, working_dir: &Path) -> InstallResult;
}

/// Default package manager runner that executes real commands
#[derive(Debug, Default)]
pub struct SystemPackageManager;

impl SystemPackageManager {
    /// Create a new system package manager
    pub fn new() -> Self {
        Self
    }

    /// Run a command and capture output
    fn run_command(&self, command: &[&str], working_dir: &Path) -> std::io::Result<Output> {
        let Some((program, args)) = command.split_first() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Empty command",
            ));
        };

        Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .output()
    }
}

impl PackageManagerRunner for SystemPackageManager {
    fn run_install(&self, working_dir: &Path) -> InstallResult {
        let pm = NodePackageManager::detect(working_dir);
        let command_parts = pm.install_command();
        let command_str = command_parts.join(" ");

        match self.run_command(&command_parts, working_dir) {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    InstallResult::success(command_str, stdout, stderr)
                } else {
                    InstallResult::failure(command_str, stdout, stderr)
                }
            }
            Err(e) => InstallResult::failure(
                command_str,
                String::new(),
                format!("Failed to execute command: {}", e),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_result_success() {
        let result = InstallResult::success(
            "npm install".to_string(),
            "done".to_string(),
            String::new(),
        );
        assert!(result.success);
        assert_eq!(result.command, "npm install");
    }

    #[test]
    fn test_install_result_failure_message() {
        let result = InstallResult::failure(
            "yarn install".to_string(),
            "out".to_string(),
            " error \n".to_string(),
        );
        assert!(!result.success);
        assert_eq!(result.failure_message(), "error");

        let quiet = InstallResult::failure("npm install".into(), "only stdout".into(), "".into());
        assert_eq!(quiet.failure_message(), "only stdout");
    }

    #[test]
    fn test_install_command() {
        assert_eq!(NodePackageManager::Npm.install_command(), ["npm", "install"]);
        assert_eq!(NodePackageManager::Yarn.install_command(), ["yarn", "install"]);
        assert_eq!(NodePackageManager::Pnpm.install_command(), ["pnpm", "install"]);
        assert_eq!(NodePackageManager::Bun.install_command(), ["bun", "install"]);
    }

    #[test]
    fn test_detect_npm_lockfile() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("package-lock.json"), "{}").unwrap();
        assert_eq!(
            NodePackageManager::detect(temp_dir.path()),
            NodePackageManager::Npm
        );
    }

    #[test]
    fn test_detect_yarn() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(
            NodePackageManager::detect(temp_dir.path()),
            NodePackageManager::Yarn
        );
    }

    #[test]
    fn test_detect_pnpm_wins_over_yarn() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("yarn.lock"), "").unwrap();
        std::fs::write(temp_dir.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(
            NodePackageManager::detect(temp_dir.path()),
            NodePackageManager::Pnpm
        );
    }

    #[test]
    fn test_detect_bun() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("bun.lockb"), "").unwrap();
        assert_eq!(
            NodePackageManager::detect(temp_dir.path()),
            NodePackageManager::Bun
        );
    }

    #[test]
    fn test_detect_default_npm() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(
            NodePackageManager::detect(temp_dir.path()),
            NodePackageManager::Npm
        );
    }

    #[test]
    fn test_run_command_empty() {
        let pm = SystemPackageManager::new();
        let err = pm.run_command(&[], Path::new(".")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
