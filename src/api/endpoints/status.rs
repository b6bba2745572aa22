//! Analysis status endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::status::{check_status, JobStatus, StatusError};
use crate::storage::normalize_document_id;

/// `GET /api/status/:document_id`: 202 while the job runs, 200 with the
/// result record once it exists.
pub async fn check(
    State(ctx): State<ApiContext>,
    Path(document_id): Path<String>,
) -> Result<(StatusCode, Json<JobStatus>), ApiError> {
    // Request problems are reported before service availability.
    normalize_document_id(&document_id).map_err(StatusError::from)?;

    let store = ctx.core.storage()?;
    let status = check_status(store, &ctx.core.config.results_bucket, &document_id).await?;

    let code = if status.is_complete() {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    };
    Ok((code, Json(status)))
}

/// `GET /api/status` without an id.
pub async fn missing_id() -> ApiError {
    StatusError::MissingDocumentId.into()
}
