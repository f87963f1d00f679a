//! Declared version specifications from package.json
//!
//! Handles the forms that can be rewritten without changing their meaning:
//! - Exact: `1.2.3`
//! - Caret: `^1.2.3`
//! - Tilde: `~1.2.3`
//!
//! Anything else (`>=1.0.0`, `1.x`, `^1 || ^2`, `1.0.0 - 2.0.0`, tags, URLs)
//! is reported as unsupported instead of being rewritten.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static SIMPLE_SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([~^]?)(\d+(?:\.\d+){0,2}(?:-[0-9A-Za-z.\-]+)?(?:\+[0-9A-Za-z.\-]+)?)$")
        .unwrap()
});

static NON_NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d.]").unwrap());

/// Range prefix carried by a declared version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePrefix {
    /// No prefix, exact version
    None,
    /// `^` - compatible with major version
    Caret,
    /// `~` - compatible with minor version
    Tilde,
}

impl RangePrefix {
    /// The prefix characters as written in the manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            RangePrefix::None => "",
            RangePrefix::Caret => "^",
            RangePrefix::Tilde => "~",
        }
    }

    fn from_capture(s: &str) -> Self {
        match s {
            "^" => RangePrefix::Caret,
            "~" => RangePrefix::Tilde,
            _ => RangePrefix::None,
        }
    }
}

/// A rewritable version specification with its original string representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// The raw version string as it appears in the manifest
    pub raw: String,
    /// The range prefix to preserve during updates
    pub prefix: RangePrefix,
    /// The version number without prefix
    pub version: String,
}

impl VersionSpec {
    /// Parse a declared version; returns `None` for unsupported range syntax
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let caps = SIMPLE_SPEC_RE.captures(trimmed)?;
        Some(Self {
            raw: trimmed.to_string(),
            prefix: RangePrefix::from_capture(caps.get(1).map_or("", |m| m.as_str())),
            version: caps.get(2)?.as_str().to_string(),
        })
    }

    /// Formats a new version while preserving the original prefix
    pub fn format_updated(&self, new_version: &str) -> String {
        format!("{}{}", self.prefix.as_str(), new_version)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Strip everything except digits and dots: `^1.2.0` -> `1.2.0`
///
/// This is the numeric-only form used to decide whether a package is outdated.
pub fn normalize_version(version: &str) -> String {
    NON_NUMERIC_RE.replace_all(version, "").into_owned()
}

/// Returns true if `latest` differs from `current` after normalization
///
/// Both sides are normalized, so prefixes never cause a spurious update.
/// Returns false when either side has no numeric content.
pub fn is_outdated(current: &str, latest: &str) -> bool {
    let current = normalize_version(current);
    let latest = normalize_version(latest);
    !current.is_empty() && !latest.is_empty() && current != latest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_caret() {
        let spec = VersionSpec::parse("^1.2.0").unwrap();
        assert_eq!(spec.prefix, RangePrefix::Caret);
        assert_eq!(spec.version, "1.2.0");
        assert_eq!(spec.raw, "^1.2.0");
    }

    #[test]
    fn test_parse_tilde() {
        let spec = VersionSpec::parse("~4.18.2").unwrap();
        assert_eq!(spec.prefix, RangePrefix::Tilde);
        assert_eq!(spec.version, "4.18.2");
    }

    #[test]
    fn test_parse_exact() {
        let spec = VersionSpec::parse("1.0.0").unwrap();
        assert_eq!(spec.prefix, RangePrefix::None);
        assert_eq!(spec.version, "1.0.0");
    }

    #[test]
    fn test_parse_partial_and_prerelease() {
        assert_eq!(VersionSpec::parse("^18").unwrap().version, "18");
        assert_eq!(VersionSpec::parse("~1.2").unwrap().version, "1.2");
        assert_eq!(
            VersionSpec::parse("^14.0.0-canary.1").unwrap().version,
            "14.0.0-canary.1"
        );
    }

    #[test]
    fn test_parse_rejects_complex_ranges() {
        for raw in [
            ">=1.0.0",
            "<2.0.0",
            ">=1.0.0 <2.0.0",
            "^1.0.0 || ^2.0.0",
            "1.0.0 - 2.0.0",
            "1.x",
            "*",
            "latest",
            "workspace:*",
            "git+https://github.com/a/b.git",
            "",
        ] {
            assert!(VersionSpec::parse(raw).is_none(), "{} should be rejected", raw);
        }
    }

    #[test]
    fn test_format_updated_preserves_prefix() {
        for (raw, expected) in [
            ("^1.2.0", "^2.0.0"),
            ("~1.2.0", "~2.0.0"),
            ("1.2.0", "2.0.0"),
        ] {
            let spec = VersionSpec::parse(raw).unwrap();
            assert_eq!(spec.format_updated("2.0.0"), expected);
        }
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("^1.2.0"), "1.2.0");
        assert_eq!(normalize_version("~0.4"), "0.4");
        assert_eq!(normalize_version("v3.1.0"), "3.1.0");
        assert_eq!(normalize_version("latest"), "");
    }

    #[test]
    fn test_is_outdated() {
        assert!(is_outdated("^1.2.0", "2.0.0"));
        assert!(!is_outdated("^2.0.0", "2.0.0"));
        assert!(!is_outdated("~2.0.0", "2.0.0"));
        assert!(!is_outdated("latest", "2.0.0"));
        assert!(!is_outdated("1.0.0", ""));
    }

    #[test]
    fn test_display_trait() {
        let spec = VersionSpec::parse("^1.2.3").unwrap();
        assert_eq!(format!("{}", spec), "^1.2.3");
    }
}
