//! Analysis job status check.
//!
//! The job behind an upload runs outside this service. Its only observable
//! effect is the result record it writes to
//! `final_reports/{document_id}_summary.json` in the results bucket. Probing
//! reads that key: present means `COMPLETE`, absent means `PROCESSING`.
//! There is no failed state; a stuck job looks like a slow one.
//!
//! The check has no side effects and keeps no state, so it is safe to call
//! repeatedly and concurrently.

use serde::Serialize;
use serde_json::value::RawValue;
use thiserror::Error;

use crate::storage::{normalize_document_id, result_key, DocumentIdError, ObjectStore, StorageError};

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("A 'documentId' is required")]
    MissingDocumentId,

    #[error("Invalid documentId: {0}")]
    InvalidDocumentId(String),

    #[error("Result record {key} is not valid JSON: {reason}")]
    MalformedResult { key: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DocumentIdError> for StatusError {
    fn from(err: DocumentIdError) -> Self {
        match err {
            DocumentIdError::Missing => StatusError::MissingDocumentId,
            other => StatusError::InvalidDocumentId(other.to_string()),
        }
    }
}

/// Observed state of an analysis job.
///
/// Serializes as `{"status":"PROCESSING"}` or
/// `{"status":"COMPLETE","data":{...}}`. The result record is passed through
/// as raw JSON so the client receives it exactly as the job wrote it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Processing,
    Complete(Box<RawValue>),
}

impl JobStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, JobStatus::Complete(_))
    }
}

/// Look for the result record of `document_id` in `results_bucket`.
pub async fn check_status(
    store: &dyn ObjectStore,
    results_bucket: &str,
    document_id: &str,
) -> Result<JobStatus, StatusError> {
    let document_id = normalize_document_id(document_id)?;

    let key = result_key(document_id);
    let Some(bytes) = store.get_object(results_bucket, &key).await? else {
        tracing::debug!(document_id, key = %key, "Result record not present yet");
        return Ok(JobStatus::Processing);
    };

    let record: Box<RawValue> =
        serde_json::from_slice(&bytes).map_err(|e| StatusError::MalformedResult {
            key: key.clone(),
            reason: e.to_string(),
        })?;

    tracing::info!(document_id, key = %key, bytes = bytes.len(), "Result record found");
    Ok(JobStatus::Complete(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryObjectStore;

    const RESULTS: &str = "results";

    #[tokio::test]
    async fn absent_record_is_processing() {
        let store = InMemoryObjectStore::new();
        let status = check_status(&store, RESULTS, "abc123").await.unwrap();
        assert!(!status.is_complete());
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"status":"PROCESSING"}"#
        );
    }

    #[tokio::test]
    async fn present_record_is_complete_with_data() {
        let store = InMemoryObjectStore::new();
        store.insert(RESULTS, "final_reports/abc123_summary.json", br#"{"risk":"high"}"#);

        let status = check_status(&store, RESULTS, "abc123").await.unwrap();
        assert!(status.is_complete());
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"status":"COMPLETE","data":{"risk":"high"}}"#
        );
    }

    #[tokio::test]
    async fn record_key_order_is_preserved() {
        let store = InMemoryObjectStore::new();
        let record = r#"{"zeta":1,"alpha":{"b":2,"a":[3,1]}}"#;
        store.insert(RESULTS, "final_reports/d9_summary.json", record.as_bytes());

        let status = check_status(&store, RESULTS, "d9").await.unwrap();
        let JobStatus::Complete(data) = status else {
            panic!("expected COMPLETE");
        };
        assert_eq!(data.get(), record);
    }

    #[tokio::test]
    async fn malformed_record_is_an_error() {
        let store = InMemoryObjectStore::new();
        store.insert(RESULTS, "final_reports/bad_summary.json", b"{not json");
        let err = check_status(&store, RESULTS, "bad").await.unwrap_err();
        assert!(matches!(err, StatusError::MalformedResult { .. }));
    }

    #[tokio::test]
    async fn other_buckets_are_ignored() {
        let store = InMemoryObjectStore::new();
        store.insert("uploads", "final_reports/abc123_summary.json", b"{}");
        let status = check_status(&store, RESULTS, "abc123").await.unwrap();
        assert!(!status.is_complete());
    }

    #[tokio::test]
    async fn storage_error_propagates() {
        let store = InMemoryObjectStore::new().fail_with("AccessDenied");
        let err = check_status(&store, RESULTS, "abc123").await.unwrap_err();
        match err {
            StatusError::Storage(e) => assert_eq!(e.code(), "AccessDenied"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_id_is_rejected() {
        let store = InMemoryObjectStore::new();
        let err = check_status(&store, RESULTS, " ").await.unwrap_err();
        assert!(matches!(err, StatusError::MissingDocumentId));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn id_that_upload_would_reject_is_rejected() {
        let store = InMemoryObjectStore::new();
        store.insert(RESULTS, "final_reports/a/b_summary.json", b"{}");
        let err = check_status(&store, RESULTS, "a/b").await.unwrap_err();
        assert!(matches!(err, StatusError::InvalidDocumentId(_)));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn repeated_checks_do_not_write() {
        let store = InMemoryObjectStore::new();
        for _ in 0..3 {
            check_status(&store, RESULTS, "abc123").await.unwrap();
        }
        assert!(store.is_empty());
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn status_observes_completion_after_external_write() {
        let store = InMemoryObjectStore::new();
        assert!(!check_status(&store, RESULTS, "abc123").await.unwrap().is_complete());

        store.insert(RESULTS, "final_reports/abc123_summary.json", br#"{"risk":"high"}"#);
        assert!(check_status(&store, RESULTS, "abc123").await.unwrap().is_complete());
    }
}
