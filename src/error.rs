//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: manifest unreadable (fatal) or write/rewrite failures
//! - CollaboratorError: an external service (registry, GitHub, LLM) was unavailable
//! - PatchError: a rewritten file could not be generated, or was stale or unsafe to apply
//! - PromptError: interactive review was cancelled
//! - UpdateError: manifest update or install step failed
//! - ConfigError: missing credentials or invalid configuration

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A collaborator could not be constructed
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Interactive output could not be written
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// The run was interrupted before a report could be produced
    #[error("interrupted")]
    Interrupted,
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// Top-level value is not a JSON object
    #[error("manifest {path} is not a JSON object")]
    NotAnObject { path: PathBuf },

    /// Declared range cannot be rewritten without changing its meaning
    #[error("unsupported version range '{spec}' for '{package}'")]
    UnsupportedRange { package: String, spec: String },
}

/// Errors from external collaborators (registry, source hosting, LLM service)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Resource not found
    #[error("'{resource}' not found on {service}")]
    NotFound { resource: String, service: String },

    /// Network request failed
    #[error("failed to fetch '{resource}' from {service}: {message}")]
    NetworkError {
        resource: String,
        service: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {service}")]
    RateLimitExceeded { service: String },

    /// Invalid response from the service
    #[error("invalid response from {service} for '{resource}': {message}")]
    InvalidResponse {
        resource: String,
        service: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{resource}' from {service}")]
    Timeout { resource: String, service: String },

    /// Service returned an error status with a body
    #[error("{service} API error {status}: {message}")]
    ServiceError {
        service: String,
        status: u16,
        message: String,
    },
}

/// Errors related to generating or applying file patches
#[derive(Error, Debug)]
pub enum PatchError {
    /// Rewriting service failed or returned an unusable answer
    #[error("could not generate patch for {path}: {message}")]
    GenerationFailed { path: PathBuf, message: String },

    /// Backup rename failed; the original file is untouched
    #[error("failed to back up {path}: {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file changed since the patch was generated
    #[error("{path} changed since the patch was generated")]
    Stale { path: PathBuf },

    /// A previous backup would be overwritten
    #[error("backup {backup} already exists; not patching {path}")]
    BackupExists { path: PathBuf, backup: PathBuf },

    /// New content could not be written after the backup was taken
    #[error("failed to write {path} (original kept at {backup}): {source}")]
    WriteFailed {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from interactive prompts
#[derive(Error, Debug)]
pub enum PromptError {
    /// The user interrupted the prompt (Ctrl-C or end of input)
    #[error("cancelled by user")]
    Cancelled,

    /// Terminal IO failed
    #[error("prompt failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the manifest update step
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Manifest could not be re-read, parsed or written
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The package manager install command exited non-zero or could not start
    #[error("'{command}' failed: {message}")]
    InstallFailed { command: String, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A mandatory environment value is absent
    #[error("missing required environment variable {name}: {purpose}")]
    MissingCredential { name: String, purpose: String },

    /// Invalid risk tier list
    #[error("invalid risk level '{value}': expected SAFE, CAUTION, DANGEROUS or UNKNOWN")]
    InvalidRiskLevel { value: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnsupportedRange error
    pub fn unsupported_range(package: impl Into<String>, spec: impl Into<String>) -> Self {
        ManifestError::UnsupportedRange {
            package: package.into(),
            spec: spec.into(),
        }
    }
}

impl CollaboratorError {
    /// Creates a new NotFound error
    pub fn not_found(resource: impl Into<String>, service: impl Into<String>) -> Self {
        CollaboratorError::NotFound {
            resource: resource.into(),
            service: service.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        resource: impl Into<String>,
        service: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CollaboratorError::NetworkError {
            resource: resource.into(),
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        resource: impl Into<String>,
        service: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CollaboratorError::InvalidResponse {
            resource: resource.into(),
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(service: impl Into<String>) -> Self {
        CollaboratorError::RateLimitExceeded {
            service: service.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(resource: impl Into<String>, service: impl Into<String>) -> Self {
        CollaboratorError::Timeout {
            resource: resource.into(),
            service: service.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new MissingCredential error
    pub fn missing_credential(name: impl Into<String>, purpose: impl Into<String>) -> Self {
        ConfigError::MissingCredential {
            name: name.into(),
            purpose: purpose.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/path/to/package.json");
        let msg = format!("{}", err);
        assert!(msg.contains("manifest file not found"));
        assert!(msg.contains("package.json"));
    }

    #[test]
    fn test_manifest_error_json_parse() {
        let err = ManifestError::json_parse_error("/path/to/package.json", "unexpected token");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_manifest_error_unsupported_range() {
        let err = ManifestError::unsupported_range("react", ">=16 <19");
        let msg = format!("{}", err);
        assert!(msg.contains("unsupported version range"));
        assert!(msg.contains(">=16 <19"));
    }

    #[test]
    fn test_collaborator_error_not_found() {
        let err = CollaboratorError::not_found("nonexistent-package", "npm");
        let msg = format!("{}", err);
        assert!(msg.contains("'nonexistent-package' not found"));
        assert!(msg.contains("npm"));
    }

    #[test]
    fn test_collaborator_error_network() {
        let err = CollaboratorError::network_error("lodash", "npm", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_collaborator_error_rate_limit() {
        let err = CollaboratorError::rate_limit_exceeded("GitHub");
        assert!(format!("{}", err).contains("rate limit exceeded for GitHub"));
    }

    #[test]
    fn test_collaborator_error_timeout() {
        let err = CollaboratorError::timeout("react", "npm");
        let msg = format!("{}", err);
        assert!(msg.contains("timeout"));
        assert!(msg.contains("react"));
    }

    #[test]
    fn test_patch_error_write_failed_mentions_backup() {
        let err = PatchError::WriteFailed {
            path: PathBuf::from("src/a.js"),
            backup: PathBuf::from("src/a.js.bak"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(format!("{}", err).contains("src/a.js.bak"));
    }

    #[test]
    fn test_update_error_install_failed() {
        let err = UpdateError::InstallFailed {
            command: "npm install".to_string(),
            message: "exit status 1".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("'npm install' failed"));
    }

    #[test]
    fn test_config_error_missing_credential() {
        let err = ConfigError::missing_credential("OPENAI_API_KEY", "needed for analysis");
        let msg = format!("{}", err);
        assert!(msg.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::not_found("/path").into();
        assert!(format!("{}", app_err).contains("manifest file not found"));
    }

    #[test]
    fn test_patch_error_stale_names_file() {
        let err = PatchError::Stale {
            path: PathBuf::from("src/app.js"),
        };
        assert_eq!(
            err.to_string(),
            "src/app.js changed since the patch was generated"
        );
    }

    #[test]
    fn test_app_error_from_io_error() {
        let app_err: AppError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into();
        assert!(format!("{}", app_err).contains("failed to write output"));
    }

    #[test]
    fn test_prompt_error_cancelled() {
        assert_eq!(PromptError::Cancelled.to_string(), "cancelled by user");
    }
}
