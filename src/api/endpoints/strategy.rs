//! Strategy generation endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::strategy::{generate_strategy, report_is_absent, StrategyError};

/// `POST /api/generate_strategy`: body is the analysis report; the reply is
/// the model's strategy JSON, returned as parsed.
pub async fn generate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(report) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Strategy request body rejected");
        ApiError::from(StrategyError::MissingReport)
    })?;

    if report_is_absent(&report) {
        return Err(StrategyError::MissingReport.into());
    }

    let generator = ctx.core.strategy_model()?;
    let strategy = generate_strategy(generator, &report).await?;
    Ok(Json(strategy))
}
