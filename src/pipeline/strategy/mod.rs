//! Strategy generation: analysis report → prompt → model reply → JSON.

pub mod bedrock;
pub mod parser;
pub mod prompt;

pub use bedrock::*;
pub use parser::*;
pub use prompt::*;

use async_trait::async_trait;
use thiserror::Error;

/// Token budget for a strategy reply.
pub const STRATEGY_MAX_TOKENS: u32 = 4096;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("An analysis report is required.")]
    MissingReport,

    #[error("Strategy model error ({code}): {message}")]
    Provider { code: String, message: String },

    #[error("Strategy model reply could not be read: {0}")]
    ResponseParsing(String),

    #[error("Strategy model returned invalid JSON: {0}")]
    JsonParsing(String),
}

/// Generative model abstraction (allows mocking).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a single user prompt and return the model's text reply.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, StrategyError>;
}

/// Build the strategy prompt for `report`, ask the model, parse its reply.
pub async fn generate_strategy(
    generator: &dyn TextGenerator,
    report: &serde_json::Value,
) -> Result<serde_json::Value, StrategyError> {
    if report_is_absent(report) {
        return Err(StrategyError::MissingReport);
    }

    let prompt = build_strategy_prompt(report);
    let reply = generator.generate(&prompt, STRATEGY_MAX_TOKENS).await?;
    let strategy = parse_strategy_reply(&reply)?;

    let missing = missing_sections(&strategy);
    if missing.is_empty() {
        tracing::info!(reply_chars = reply.len(), "Strategy generated");
    } else {
        tracing::warn!(?missing, "Strategy reply lacks expected sections");
    }

    Ok(strategy)
}

/// `null` and `{}` count as no report at all.
pub fn report_is_absent(report: &serde_json::Value) -> bool {
    match report {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
