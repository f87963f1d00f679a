//! Risk classification of package upgrades
//!
//! The judgment itself is delegated to a [`Summarizer`]; this module owns the
//! policy layered on top of the raw answer:
//! - Unrecognised tier labels are `SAFE`
//! - A `SAFE` upgrade with missing peer dependencies is `CAUTION`
//! - A failed summarization is `UNKNOWN` with the error as the summary

use crate::domain::{MissingPeers, RiskTier};
use crate::error::CollaboratorError;
use crate::llm::{strip_code_fence, ChatMessage, LlmClient};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Raw answer from the summarization service, before policy is applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAssessment {
    /// Free-form tier label, e.g. `RISK: CAUTION`
    pub label: String,
    /// Human-readable summary
    pub summary: String,
}

impl RawAssessment {
    /// Parse a line-oriented answer: first line is the tier, the rest is the summary
    pub fn from_lines(text: &str) -> Self {
        let text = text.trim();
        let (label, summary) = text.split_once('\n').unwrap_or((text, ""));
        Self {
            label: label.trim().to_string(),
            summary: summary.trim().to_string(),
        }
    }
}

/// Effective classification of one upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub risk: RiskTier,
    pub summary: String,
}

/// Trait for the natural-language summarization service
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Assess a changelog; `missing_peers` may be empty
    async fn assess(
        &self,
        package: &str,
        changelog: &str,
        missing_peers: &MissingPeers,
    ) -> Result<RawAssessment, CollaboratorError>;
}

/// Apply the tier policy to a raw label
pub fn effective_tier(label: &str, missing_peers: &MissingPeers) -> RiskTier {
    let tier = RiskTier::from_label(label);
    if !missing_peers.is_empty() && tier == RiskTier::Safe {
        RiskTier::Caution
    } else {
        tier
    }
}

/// Classifies upgrades through a summarizer
pub struct RiskClassifier<'a> {
    summarizer: &'a dyn Summarizer,
}

impl<'a> RiskClassifier<'a> {
    pub fn new(summarizer: &'a dyn Summarizer) -> Self {
        Self { summarizer }
    }

    /// Classify one upgrade; never fails
    pub async fn classify(
        &self,
        package: &str,
        changelog: &str,
        missing_peers: &MissingPeers,
    ) -> Classification {
        match self.summarizer.assess(package, changelog, missing_peers).await {
            Ok(raw) => {
                let risk = effective_tier(&raw.label, missing_peers);
                debug!("{}: raw label '{}' -> {}", package, raw.label, risk);
                Classification {
                    risk,
                    summary: raw.summary,
                }
            }
            Err(e) => {
                warn!("classification failed for {}: {}", package, e);
                Classification {
                    risk: RiskTier::Unknown,
                    summary: format!("Classification service error: {}", e),
                }
            }
        }
    }
}

const SYSTEM_PROMPT: &str = "You are an expert software engineer's assistant. Analyze a \
changelog and classify the risk of upgrading to the latest version. \
Respond with a JSON object with two keys: \"risk\" (exactly one of DANGEROUS, CAUTION or SAFE) \
and \"summary\" (a concise summary for a developer). \
DANGEROUS means there are definite code-breaking changes. \
CAUTION means there are new features, deprecations, or potential issues like missing peer dependencies. \
SAFE means it is mostly bug fixes. \
If a list of missing peer dependencies is provided, the risk must be CAUTION or DANGEROUS \
and the summary must mention them.";

#[derive(Debug, Deserialize)]
struct StructuredAssessment {
    risk: String,
    #[serde(default)]
    summary: String,
}

/// Summarizer backed by a chat completions service
pub struct LlmSummarizer {
    client: LlmClient,
}

impl LlmSummarizer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    fn user_prompt(package: &str, changelog: &str, missing_peers: &MissingPeers) -> String {
        let peer_context = if missing_peers.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = missing_peers.keys().map(String::as_str).collect();
            format!(
                "CRITICAL CONTEXT: this update requires peer dependencies missing from the project: {}.\n",
                names.join(", ")
            )
        };
        format!(
            "Analyze the changelog for '{}'.\n{}\nChangelog:\n{}",
            package, peer_context, changelog
        )
    }

    /// Read the structured answer, falling back to the line-oriented form
    fn parse_answer(content: &str) -> RawAssessment {
        match serde_json::from_str::<StructuredAssessment>(strip_code_fence(content)) {
            Ok(parsed) => RawAssessment {
                label: parsed.risk,
                summary: parsed.summary.trim().to_string(),
            },
            Err(_) => RawAssessment::from_lines(content),
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn assess(
        &self,
        package: &str,
        changelog: &str,
        missing_peers: &MissingPeers,
    ) -> Result<RawAssessment, CollaboratorError> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::user_prompt(package, changelog, missing_peers)),
        ];
        let content = self.client.chat(&messages, true).await?;
        Ok(Self::parse_answer(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSummarizer(Result<RawAssessment, CollaboratorError>);

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        async fn assess(
            &self,
            _package: &str,
            _changelog: &str,
            _missing_peers: &MissingPeers,
        ) -> Result<RawAssessment, CollaboratorError> {
            self.0.clone()
        }
    }

    fn peers() -> MissingPeers {
        MissingPeers::from([("padder".to_string(), "^1.0.0".to_string())])
    }

    fn raw(label: &str) -> RawAssessment {
        RawAssessment {
            label: label.to_string(),
            summary: "summary".to_string(),
        }
    }

    #[test]
    fn test_effective_tier_without_peers() {
        let none = MissingPeers::new();
        assert_eq!(effective_tier("SAFE", &none), RiskTier::Safe);
        assert_eq!(effective_tier("RISK: CAUTION", &none), RiskTier::Caution);
        assert_eq!(effective_tier("DANGEROUS", &none), RiskTier::Dangerous);
        assert_eq!(effective_tier("HIGH", &none), RiskTier::Safe);
    }

    #[test]
    fn test_effective_tier_missing_peers_promote_safe() {
        assert_eq!(effective_tier("SAFE", &peers()), RiskTier::Caution);
        assert_eq!(effective_tier("garbled", &peers()), RiskTier::Caution);
    }

    #[test]
    fn test_effective_tier_missing_peers_keep_dangerous() {
        assert_eq!(effective_tier("DANGEROUS", &peers()), RiskTier::Dangerous);
        assert_eq!(effective_tier("CAUTION", &peers()), RiskTier::Caution);
    }

    #[test]
    fn test_from_lines() {
        let parsed = RawAssessment::from_lines("RISK: CAUTION\nDeprecated foo().\nUse bar().");
        assert_eq!(parsed.label, "RISK: CAUTION");
        assert_eq!(parsed.summary, "Deprecated foo().\nUse bar().");

        let single = RawAssessment::from_lines("SAFE");
        assert_eq!(single.label, "SAFE");
        assert_eq!(single.summary, "");
    }

    #[test]
    fn test_parse_answer_structured() {
        let parsed = LlmSummarizer::parse_answer(r#"{"risk": "DANGEROUS", "summary": "Removed x"}"#);
        assert_eq!(parsed.label, "DANGEROUS");
        assert_eq!(parsed.summary, "Removed x");
    }

    #[test]
    fn test_parse_answer_fenced_json() {
        let parsed =
            LlmSummarizer::parse_answer("```json\n{\"risk\": \"SAFE\", \"summary\": \"ok\"}\n```");
        assert_eq!(parsed.label, "SAFE");
    }

    #[test]
    fn test_parse_answer_falls_back_to_lines() {
        let parsed = LlmSummarizer::parse_answer("CAUTION\nNew options");
        assert_eq!(parsed.label, "CAUTION");
        assert_eq!(parsed.summary, "New options");
    }

    #[test]
    fn test_user_prompt_mentions_peers() {
        let prompt = LlmSummarizer::user_prompt("leftpad", "log", &peers());
        assert!(prompt.contains("padder"));
        assert!(prompt.contains("Changelog:\nlog"));
        let plain = LlmSummarizer::user_prompt("leftpad", "log", &MissingPeers::new());
        assert!(!plain.contains("CRITICAL"));
    }

    #[tokio::test]
    async fn test_classify_applies_policy() {
        let summarizer = FixedSummarizer(Ok(raw("SAFE")));
        let classifier = RiskClassifier::new(&summarizer);
        let result = classifier.classify("leftpad", "log", &peers()).await;
        assert_eq!(result.risk, RiskTier::Caution);
        assert_eq!(result.summary, "summary");
    }

    #[tokio::test]
    async fn test_classify_service_error_is_unknown() {
        let summarizer = FixedSummarizer(Err(CollaboratorError::timeout("gpt-4o", "LLM")));
        let classifier = RiskClassifier::new(&summarizer);
        let result = classifier
            .classify("leftpad", "log", &MissingPeers::new())
            .await;
        assert_eq!(result.risk, RiskTier::Unknown);
        assert!(result.summary.contains("timeout"));
    }
}
