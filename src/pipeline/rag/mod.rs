pub mod bedrock;
pub mod types;

pub use bedrock::*;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("A 'question' is required.")]
    MissingQuestion,

    #[error("Knowledge base request could not be built: {0}")]
    Request(String),

    #[error("Knowledge base error ({code}): {message}")]
    Provider { code: String, message: String },

    #[error("Knowledge base returned no answer")]
    EmptyResponse,
}

/// Retrieval-and-generation service abstraction (allows mocking).
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn retrieve_and_generate(&self, question: &str) -> Result<RagAnswer, RagError>;
}

/// Validate the question and forward it to the knowledge base.
///
/// A blank question never reaches the service.
pub async fn answer_question(
    kb: &dyn KnowledgeBase,
    question: Option<&str>,
) -> Result<RagAnswer, RagError> {
    let question = question
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(RagError::MissingQuestion)?;

    let answer = kb.retrieve_and_generate(question).await?;

    tracing::info!(
        question_chars = question.chars().count(),
        answer_chars = answer.answer.chars().count(),
        citations = answer.citations.len(),
        "Knowledge base query answered"
    );

    Ok(answer)
}
