//! Patch generation through a code-rewriting service

use crate::domain::FilePatch;
use crate::error::PatchError;
use crate::llm::{strip_code_fence, ChatMessage, LlmClient};
use crate::scanner::SourceFile;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Trait for the code-rewriting service
#[async_trait]
pub trait CodeRewriter: Send + Sync {
    /// Return the complete replacement content for `file`
    async fn rewrite(
        &self,
        package: &str,
        changelog: &str,
        file: &SourceFile,
    ) -> Result<String, PatchError>;
}

/// Turns rewriter answers into file patches
pub struct PatchGenerator<'a> {
    rewriter: &'a dyn CodeRewriter,
}

impl<'a> PatchGenerator<'a> {
    pub fn new(rewriter: &'a dyn CodeRewriter) -> Self {
        Self { rewriter }
    }

    /// Generate patches for each file, preserving input order
    ///
    /// Identical rewrites are dropped silently. Per-file failures are logged
    /// and skipped.
    pub async fn generate(
        &self,
        package: &str,
        changelog: &str,
        files: &[SourceFile],
    ) -> Vec<FilePatch> {
        let mut patches = Vec::new();
        for file in files {
            debug!("generating patch for {}", file.path.display());
            match self.rewriter.rewrite(package, changelog, file).await {
                Ok(proposed) => match FilePatch::new(&file.path, &file.content, proposed) {
                    Some(patch) => patches.push(patch),
                    None => debug!("{} needs no change", file.path.display()),
                },
                Err(e) => warn!("{}", e),
            }
        }
        patches
    }
}

const SYSTEM_PROMPT: &str = "You are an automated code refactoring tool. You will receive the \
changelog for a library update and a source file that uses the library. Rewrite the entire file \
so it is compatible with the new version, applying any necessary breaking changes from the \
changelog. Do not add any new functionality. Respond with a JSON object containing a single \
key: \"new_content\" (a string with the complete, corrected file content).";

#[derive(Debug, Deserialize)]
struct RewriteAnswer {
    new_content: Option<String>,
}

/// Rewriter backed by a chat completions service
pub struct LlmRewriter {
    client: LlmClient,
}

impl LlmRewriter {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    fn user_prompt(package: &str, changelog: &str, file: &SourceFile) -> String {
        format!(
            "Changelog for {}:\n{}\n\nRewrite the following file to be compatible with the \
             breaking changes described.\nFile path: {}\nOriginal content:\n```\n{}\n```",
            package,
            changelog,
            file.path.display(),
            file.content
        )
    }

    fn parse_answer(file: &SourceFile, content: &str) -> Result<String, PatchError> {
        let answer: RewriteAnswer =
            serde_json::from_str(strip_code_fence(content)).map_err(|e| {
                PatchError::GenerationFailed {
                    path: file.path.clone(),
                    message: format!("malformed response: {}", e),
                }
            })?;
        match answer.new_content {
            Some(text) if !text.is_empty() || file.content.is_empty() => Ok(text),
            _ => Err(PatchError::GenerationFailed {
                path: file.path.clone(),
                message: "response has no new_content".to_string(),
            }),
        }
    }
}

#[async_trait]
impl CodeRewriter for LlmRewriter {
    async fn rewrite(
        &self,
        package: &str,
        changelog: &str,
        file: &SourceFile,
    ) -> Result<String, PatchError> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::user_prompt(package, changelog, file)),
        ];
        let content = self
            .client
            .chat(&messages, true)
            .await
            .map_err(|e| PatchError::GenerationFailed {
                path: file.path.clone(),
                message: e.to_string(),
            })?;
        Self::parse_answer(file, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Returns a canned answer per file name; missing entries fail
    struct MapRewriter(HashMap<PathBuf, String>);

    #[async_trait]
    impl CodeRewriter for MapRewriter {
        async fn rewrite(
            &self,
            _package: &str,
            _changelog: &str,
            file: &SourceFile,
        ) -> Result<String, PatchError> {
            self.0
                .get(&file.path)
                .cloned()
                .ok_or_else(|| PatchError::GenerationFailed {
                    path: file.path.clone(),
                    message: "service error".to_string(),
                })
        }
    }

    fn source(path: &str, content: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_keeps_order_and_drops_identical() {
        let files = vec![
            source("a.js", "pad(1)"),
            source("b.js", "pad(2)"),
            source("c.js", "pad(3)"),
            source("d.js", "pad(4)"),
        ];
        let rewriter = MapRewriter(HashMap::from([
            (PathBuf::from("a.js"), "leftPad(1)".to_string()),
            (PathBuf::from("b.js"), "pad(2)".to_string()),
            (PathBuf::from("d.js"), "leftPad(4)".to_string()),
        ]));

        let patches = PatchGenerator::new(&rewriter)
            .generate("leftpad", "log", &files)
            .await;

        let paths: Vec<_> = patches.iter().map(|p| p.file_path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.js"), PathBuf::from("d.js")]);
        assert_eq!(patches[0].original_content, "pad(1)");
        assert_eq!(patches[0].proposed_content, "leftPad(1)");
    }

    #[tokio::test]
    async fn test_generate_empty_input() {
        let rewriter = MapRewriter(HashMap::new());
        let patches = PatchGenerator::new(&rewriter)
            .generate("leftpad", "log", &[])
            .await;
        assert!(patches.is_empty());
    }

    #[test]
    fn test_parse_answer() {
        let file = source("a.js", "old");
        assert_eq!(
            LlmRewriter::parse_answer(&file, r#"{"new_content": "new"}"#).unwrap(),
            "new"
        );
        assert_eq!(
            LlmRewriter::parse_answer(&file, "```json\n{\"new_content\": \"new\"}\n```").unwrap(),
            "new"
        );
    }

    #[test]
    fn test_parse_answer_malformed() {
        let file = source("a.js", "old");
        assert!(matches!(
            LlmRewriter::parse_answer(&file, "not json"),
            Err(PatchError::GenerationFailed { .. })
        ));
        assert!(LlmRewriter::parse_answer(&file, r#"{"other": 1}"#).is_err());
        assert!(LlmRewriter::parse_answer(&file, r#"{"new_content": ""}"#).is_err());
    }

    #[test]
    fn test_user_prompt_contains_file() {
        let prompt = LlmRewriter::user_prompt("leftpad", "v2: renamed", &source("src/a.js", "x"));
        assert!(prompt.contains("Changelog for leftpad:\nv2: renamed"));
        assert!(prompt.contains("File path: src/a.js"));
    }
}
