//! OpenAI-compatible chat completions client
//!
//! Shared by the changelog summarizer and the code rewriter. Works with any
//! provider exposing `/v1/chat/completions`.

use crate::config::LlmConfig;
use crate::error::CollaboratorError;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "LLM";

/// A message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: Role,
    /// Text content of the message
    pub content: String,
}

impl ChatMessage {
    /// System instructions
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User input
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role in the chat conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Chat completions client
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a client from configuration
    pub fn new(config: &LlmConfig) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                CollaboratorError::network_error(
                    "",
                    SERVICE,
                    format!("failed to create HTTP client: {}", e),
                )
            })?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Model name in use
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }

    /// Send a chat completion request and return the assistant text
    ///
    /// With `json_mode` the service is asked for a JSON object response.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        json_mode: bool,
    ) -> Result<String, CollaboratorError> {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": 0.1,
        });
        if json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::timeout(self.model(), SERVICE)
                } else {
                    CollaboratorError::network_error(self.model(), SERVICE, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::ServiceError {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            CollaboratorError::invalid_response(
                self.model(),
                SERVICE,
                format!("failed to parse response: {}", e),
            )
        })?;

        extract_content(&value).ok_or_else(|| {
            CollaboratorError::invalid_response(
                self.model(),
                SERVICE,
                format!("unexpected response structure: {}", value),
            )
        })
    }
}

/// Pull `choices[0].message.content` out of a completions response
fn extract_content(value: &serde_json::Value) -> Option<String> {
    value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

/// Strip a surrounding Markdown code fence, if any
///
/// Models sometimes wrap JSON or source code in ```` ```lang ```` blocks.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    match body.find('\n') {
        Some(idx) => &body[idx + 1..],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client = LlmClient::new(&LlmConfig::new("key").with_model("gpt-4o-mini")).unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_endpoint() {
        let config = LlmConfig::new("key").with_base_url("http://localhost:11434/");
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_message_serializes() {
        let json = serde_json::to_value(ChatMessage::system("hello")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn test_extract_content() {
        let value = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "SAFE"}}]
        });
        assert_eq!(extract_content(&value).as_deref(), Some("SAFE"));
        assert!(extract_content(&serde_json::json!({"choices": []})).is_none());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```ts\nconst a = 1;\n```"), "const a = 1;\n");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}\n");
        assert_eq!(strip_code_fence("plain"), "plain");
    }
}
