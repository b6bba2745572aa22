//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::{CoreError, Service};
use crate::pipeline::rag::RagError;
use crate::pipeline::status::StatusError;
use crate::pipeline::strategy::StrategyError;
use crate::pipeline::upload::UploadError;
use crate::storage::StorageError;

/// Error response body. `error` is always a human-readable string.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("{0} is not available")]
    ServiceUnavailable(Service),
    #[error("{context} ({code}): {message}")]
    Provider {
        context: &'static str,
        code: String,
        message: String,
    },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, provider_code) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail, None),
            ApiError::PayloadTooLarge(detail) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", detail, None)
            }
            ApiError::ServiceUnavailable(service) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                format!("{service} is not available"),
                None,
            ),
            ApiError::Provider {
                context,
                code,
                message,
            } => {
                tracing::error!(
                    context,
                    provider_code = %code,
                    detail = %message,
                    "Provider call failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROVIDER_ERROR",
                    format!("{context} ({code}): {message}"),
                    Some(code),
                )
            }
            ApiError::Parse(detail) => {
                tracing::warn!(detail = %detail, "Provider response could not be parsed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PARSE_ERROR",
                    detail,
                    None,
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: message,
            code,
            provider_code,
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unavailable(service) => ApiError::ServiceUnavailable(service),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile
            | UploadError::MissingFilename
            | UploadError::MissingDocumentId
            | UploadError::InvalidDocumentId(_) => ApiError::BadRequest(err.to_string()),
            UploadError::Read(detail) => ApiError::Internal(detail),
            UploadError::Storage(e) => storage_failure("Error uploading to S3", e),
        }
    }
}

impl From<StatusError> for ApiError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::MissingDocumentId | StatusError::InvalidDocumentId(_) => {
                ApiError::BadRequest(err.to_string())
            }
            StatusError::MalformedResult { .. } => ApiError::Parse(err.to_string()),
            StatusError::Storage(e) => storage_failure("Error checking analysis status", e),
        }
    }
}

fn storage_failure(context: &'static str, err: StorageError) -> ApiError {
    match err {
        StorageError::Provider { code, message } => ApiError::Provider {
            context,
            code,
            message,
        },
        StorageError::Body(_) => ApiError::Provider {
            context,
            code: err.code().to_string(),
            message: err.to_string(),
        },
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::MissingQuestion => ApiError::BadRequest(err.to_string()),
            RagError::Request(detail) => ApiError::Internal(detail),
            RagError::Provider { code, message } => ApiError::Provider {
                context: "Error querying Bedrock",
                code,
                message,
            },
            RagError::EmptyResponse => ApiError::Parse(err.to_string()),
        }
    }
}

impl From<StrategyError> for ApiError {
    fn from(err: StrategyError) -> Self {
        match err {
            StrategyError::MissingReport => ApiError::BadRequest(err.to_string()),
            StrategyError::Provider { code, message } => ApiError::Provider {
                context: "Error invoking strategy model",
                code,
                message,
            },
            StrategyError::ResponseParsing(_) | StrategyError::JsonParsing(_) => {
                ApiError::Parse(format!("Failed to parse strategy from model reply: {err}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400_with_error_string() {
        let response = ApiError::BadRequest("No file part in the request".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No file part in the request");
        assert_eq!(json["code"], "BAD_REQUEST");
        assert!(json.get("provider_code").is_none());
    }

    #[tokio::test]
    async fn unavailable_returns_503() {
        let response = ApiError::from(CoreError::Unavailable(Service::Storage)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Storage service is not available");
    }

    #[tokio::test]
    async fn storage_failure_returns_500_with_provider_code() {
        let err = UploadError::Storage(StorageError::Provider {
            code: "NoSuchBucket".into(),
            message: "The specified bucket does not exist".into(),
        });
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["code"], "PROVIDER_ERROR");
        assert_eq!(json["provider_code"], "NoSuchBucket");
        assert!(json["error"].as_str().unwrap().contains("NoSuchBucket"));
    }

    #[tokio::test]
    async fn strategy_json_error_returns_500_parse_error() {
        let response =
            ApiError::from(StrategyError::JsonParsing("expected value".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["code"], "PARSE_ERROR");
        assert!(json["error"].as_str().unwrap().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("stream reset by peer".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn payload_too_large_returns_413() {
        let response = ApiError::PayloadTooLarge("limit".into()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn client_input_errors_map_to_bad_request() {
        assert!(matches!(
            ApiError::from(UploadError::MissingDocumentId),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(StatusError::MissingDocumentId),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(RagError::MissingQuestion),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(StrategyError::MissingReport),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn malformed_result_maps_to_parse_error() {
        let err = StatusError::MalformedResult {
            key: "final_reports/x_summary.json".into(),
            reason: "EOF".into(),
        };
        assert!(matches!(ApiError::from(err), ApiError::Parse(_)));
    }
}
