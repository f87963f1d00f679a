//! Risk tier classification for package upgrades

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse classification of how likely an upgrade is to break consumer code
///
/// Ordered `Safe < Caution < Dangerous`. `Unknown` is terminal: it is assigned
/// only when classification itself failed and sorts last in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    /// Mostly bug fixes
    Safe,
    /// New features, deprecations, or missing peer dependencies
    Caution,
    /// Definite code-breaking changes
    Dangerous,
    /// Classification failed
    Unknown,
}

impl RiskTier {
    /// All tiers, most severe first
    pub fn all() -> &'static [RiskTier] {
        &[
            RiskTier::Dangerous,
            RiskTier::Caution,
            RiskTier::Safe,
            RiskTier::Unknown,
        ]
    }

    /// Rank used to sort unresolved packages in the final report (0 = most severe)
    pub fn report_rank(&self) -> u8 {
        match self {
            RiskTier::Dangerous => 0,
            RiskTier::Caution => 1,
            RiskTier::Safe => 2,
            RiskTier::Unknown => 3,
        }
    }

    /// Severity on the `Safe < Caution < Dangerous` scale; `None` for `Unknown`
    pub fn severity(&self) -> Option<u8> {
        match self {
            RiskTier::Safe => Some(0),
            RiskTier::Caution => Some(1),
            RiskTier::Dangerous => Some(2),
            RiskTier::Unknown => None,
        }
    }

    /// Returns true if this tier is at least as severe as `other`
    ///
    /// `Unknown` is never at least anything, and nothing is at least `Unknown`.
    pub fn is_at_least(&self, other: RiskTier) -> bool {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => a >= b,
            _ => false,
        }
    }

    /// Returns the more severe of two tiers; never demotes
    pub fn promote_to(self, target: RiskTier) -> RiskTier {
        if target.is_at_least(self) || self == RiskTier::Unknown {
            target
        } else {
            self
        }
    }

    /// Interpret a free-form tier label from the summarization service
    ///
    /// Looks for the keywords in severity order; anything unrecognised is `Safe`.
    pub fn from_label(label: &str) -> RiskTier {
        let upper = label.to_ascii_uppercase();
        if upper.contains("DANGEROUS") {
            RiskTier::Dangerous
        } else if upper.contains("CAUTION") {
            RiskTier::Caution
        } else {
            RiskTier::Safe
        }
    }

    /// Upper-case name as shown to users
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Safe => "SAFE",
            RiskTier::Caution => "CAUTION",
            RiskTier::Dangerous => "DANGEROUS",
            RiskTier::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Ok(RiskTier::Safe),
            "CAUTION" => Ok(RiskTier::Caution),
            "DANGEROUS" => Ok(RiskTier::Dangerous),
            "UNKNOWN" => Ok(RiskTier::Unknown),
            other => Err(format!(
                "invalid risk tier '{}': expected SAFE, CAUTION, DANGEROUS or UNKNOWN",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_keywords() {
        assert_eq!(RiskTier::from_label("RISK: DANGEROUS"), RiskTier::Dangerous);
        assert_eq!(RiskTier::from_label("RISK: CAUTION"), RiskTier::Caution);
        assert_eq!(RiskTier::from_label("RISK: SAFE"), RiskTier::Safe);
        assert_eq!(RiskTier::from_label("caution"), RiskTier::Caution);
    }

    #[test]
    fn test_from_label_unrecognised_defaults_to_safe() {
        assert_eq!(RiskTier::from_label(""), RiskTier::Safe);
        assert_eq!(RiskTier::from_label("RISK: MEDIUM"), RiskTier::Safe);
        assert_eq!(RiskTier::from_label("¯\\_(ツ)_/¯"), RiskTier::Safe);
    }

    #[test]
    fn test_from_label_dangerous_wins() {
        assert_eq!(
            RiskTier::from_label("CAUTION or maybe DANGEROUS"),
            RiskTier::Dangerous
        );
    }

    #[test]
    fn test_report_rank_order() {
        let mut tiers = vec![
            RiskTier::Unknown,
            RiskTier::Safe,
            RiskTier::Dangerous,
            RiskTier::Caution,
        ];
        tiers.sort_by_key(|t| t.report_rank());
        assert_eq!(tiers, RiskTier::all());
    }

    #[test]
    fn test_is_at_least() {
        assert!(RiskTier::Dangerous.is_at_least(RiskTier::Caution));
        assert!(RiskTier::Caution.is_at_least(RiskTier::Caution));
        assert!(!RiskTier::Safe.is_at_least(RiskTier::Caution));
        assert!(!RiskTier::Unknown.is_at_least(RiskTier::Safe));
        assert!(!RiskTier::Dangerous.is_at_least(RiskTier::Unknown));
    }

    #[test]
    fn test_promote_never_demotes() {
        assert_eq!(
            RiskTier::Safe.promote_to(RiskTier::Caution),
            RiskTier::Caution
        );
        assert_eq!(
            RiskTier::Dangerous.promote_to(RiskTier::Caution),
            RiskTier::Dangerous
        );
        assert_eq!(
            RiskTier::Unknown.promote_to(RiskTier::Dangerous),
            RiskTier::Dangerous
        );
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("safe".parse::<RiskTier>().unwrap(), RiskTier::Safe);
        assert_eq!(" Caution ".parse::<RiskTier>().unwrap(), RiskTier::Caution);
        assert!("risky".parse::<RiskTier>().is_err());
    }

    #[test]
    fn test_serde_uppercase() {
        let json = serde_json::to_string(&RiskTier::Dangerous).unwrap();
        assert_eq!(json, "\"DANGEROUS\"");
    }
}
