//! Bedrock Runtime adapter for `TextGenerator`, plus a mock for tests.
//!
//! The strategy model is invoked with the Anthropic Messages body that
//! Bedrock expects for Claude models.

use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use serde::{Deserialize, Serialize};

use super::{StrategyError, TextGenerator};
use crate::aws::error_parts;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Request body for Anthropic models on Bedrock.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from Anthropic models on Bedrock.
#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Text generator backed by Bedrock `InvokeModel`.
pub struct BedrockTextGenerator {
    client: Client,
    model_id: String,
}

impl BedrockTextGenerator {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self::new(Client::new(sdk_config), model_id)
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl TextGenerator for BedrockTextGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, StrategyError> {
        let body = encode_request(prompt, max_tokens)?;

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|err| {
                let (code, message) = error_parts(&err);
                tracing::warn!(code = %code, model = %self.model_id, "InvokeModel failed");
                StrategyError::Provider { code, message }
            })?;

        decode_response(response.body().as_ref())
    }
}

fn encode_request(prompt: &str, max_tokens: u32) -> Result<Vec<u8>, StrategyError> {
    let request = MessagesRequest {
        anthropic_version: ANTHROPIC_VERSION,
        max_tokens,
        messages: [Message {
            role: "user",
            content: prompt,
        }],
    };
    serde_json::to_vec(&request).map_err(|e| StrategyError::ResponseParsing(e.to_string()))
}

/// Concatenate the text blocks of a Messages response.
fn decode_response(bytes: &[u8]) -> Result<String, StrategyError> {
    let parsed: MessagesResponse = serde_json::from_slice(bytes)
        .map_err(|e| StrategyError::ResponseParsing(e.to_string()))?;

    if parsed.stop_reason.as_deref() == Some("max_tokens") {
        tracing::warn!("Strategy reply hit the token limit and may be truncated");
    }

    let text: String = parsed
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.trim().is_empty() {
        return Err(StrategyError::ResponseParsing(
            "model reply contained no text".into(),
        ));
    }
    Ok(text)
}

// ═══════════════════════════════════════════════════════════
// Mock
// ═══════════════════════════════════════════════════════════

/// Mock text generator that returns a configured reply and records prompts.
pub struct MockTextGenerator {
    reply: String,
    failure: Option<String>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl MockTextGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a provider error carrying `code`.
    pub fn failing(code: &str) -> Self {
        Self {
            failure: Some(code.to_string()),
            ..Self::new("")
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(p, _)| p.clone()).collect())
            .unwrap_or_default()
    }

    pub fn max_tokens_seen(&self) -> Vec<u32> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(_, t)| *t).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, StrategyError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((prompt.to_string(), max_tokens));
        }
        match &self.failure {
            Some(code) => Err(StrategyError::Provider {
                code: code.clone(),
                message: format!("mock failure: {code}"),
            }),
            None => Ok(self.reply.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_messages_format() {
        let bytes = encode_request("hello", 4096).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn response_text_blocks_are_joined() {
        let body = br#"{
            "content": [
                {"type": "text", "text": "{\"scenarios\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "[]}"}
            ],
            "stop_reason": "end_turn"
        }"#;
        assert_eq!(decode_response(body).unwrap(), "{\"scenarios\":[]}");
    }

    #[test]
    fn response_without_text_is_error() {
        let body = br#"{"content": [], "stop_reason": "end_turn"}"#;
        assert!(matches!(
            decode_response(body),
            Err(StrategyError::ResponseParsing(_))
        ));
    }

    #[test]
    fn malformed_response_is_error() {
        assert!(matches!(
            decode_response(b"<html>"),
            Err(StrategyError::ResponseParsing(_))
        ));
    }

    #[tokio::test]
    async fn mock_records_prompt_and_budget() {
        let generator = MockTextGenerator::new("{}");
        assert_eq!(generator.generate("p", 10).await.unwrap(), "{}");
        assert_eq!(generator.prompts(), vec!["p".to_string()]);
        assert_eq!(generator.max_tokens_seen(), vec![10]);
    }
}
