//! Knowledge base question endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::rag::{answer_question, QueryRequest, RagAnswer, RagError};

/// `POST /api/query`: `{"question": "..."}` → `{"answer", "citations"}`.
pub async fn ask(
    State(ctx): State<ApiContext>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<RagAnswer>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(RagError::MissingQuestion)?;

    let kb = ctx.core.knowledge_base()?;
    let answer = answer_question(kb, Some(question)).await?;
    Ok(Json(answer))
}
