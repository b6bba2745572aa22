//! Document upload endpoint.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UploadResponse};
use crate::pipeline::upload::{store_document, validate_document_id, DocumentUpload, UploadError};
use crate::storage::base_filename;

/// Multipart field carrying the file payload.
const FILE_FIELD: &str = "file";
/// Multipart field carrying the client-chosen document id.
const DOCUMENT_ID_FIELD: &str = "documentId";

/// `POST /api/upload`: store a document in the uploads bucket.
///
/// Form fields: `file` (the payload, with a filename) and `documentId`.
/// Writing the object is what starts the external analysis job.
pub async fn upload(
    State(ctx): State<ApiContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let upload = read_upload_form(&mut multipart).await?;

    // Request problems are reported before service availability.
    validate_document_id(&upload.document_id)?;
    if base_filename(&upload.filename).is_none() {
        return Err(UploadError::MissingFilename.into());
    }

    let store = ctx.core.storage()?;
    let stored = store_document(store, &ctx.core.config.uploads_bucket, upload).await?;

    Ok(Json(UploadResponse {
        message: format!("File uploaded as {} and queued for analysis", stored.key),
        document_id: stored.document_id,
    }))
}

/// Collect the `file` and `documentId` fields. Unknown fields are skipped.
async fn read_upload_form(multipart: &mut Multipart) -> Result<DocumentUpload, ApiError> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut document_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, content_type, data.to_vec()));
            }
            DOCUMENT_ID_FIELD => {
                document_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (filename, content_type, body) = file.ok_or(UploadError::MissingFile)?;
    let document_id = document_id.ok_or(UploadError::MissingDocumentId)?;

    Ok(DocumentUpload {
        document_id,
        filename,
        content_type,
        body,
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else if status.is_client_error() {
        ApiError::BadRequest(err.body_text())
    } else {
        UploadError::Read(err.body_text()).into()
    }
}
