//! Document upload: validate the id and filename, then write the payload to
//! the uploads bucket at `{document_id}/{filename}` tagged with the id.
//!
//! Writing the object is what starts the external analysis job; nothing else
//! is triggered from here.

use std::collections::HashMap;

use thiserror::Error;

use crate::storage::{
    base_filename, normalize_document_id, upload_key, DocumentIdError, ObjectStore, PutObject,
    StorageError, DOCUMENT_ID_METADATA_KEY,
};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file part in the request")]
    MissingFile,

    #[error("No file selected")]
    MissingFilename,

    #[error("A 'documentId' is required")]
    MissingDocumentId,

    #[error("Invalid documentId: {0}")]
    InvalidDocumentId(String),

    #[error("Failed to read upload: {0}")]
    Read(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A validated-on-store document upload.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub document_id: String,
    pub filename: String,
    /// Content type declared by the client, if any.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Where an upload was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub document_id: String,
    pub bucket: String,
    pub key: String,
}

/// Normalise and check a client-supplied document id.
pub fn validate_document_id(raw: &str) -> Result<String, UploadError> {
    normalize_document_id(raw)
        .map(str::to_string)
        .map_err(UploadError::from)
}

impl From<DocumentIdError> for UploadError {
    fn from(err: DocumentIdError) -> Self {
        match err {
            DocumentIdError::Missing => UploadError::MissingDocumentId,
            other => UploadError::InvalidDocumentId(other.to_string()),
        }
    }
}

/// Write a document to the uploads bucket.
pub async fn store_document(
    store: &dyn ObjectStore,
    bucket: &str,
    upload: DocumentUpload,
) -> Result<StoredDocument, UploadError> {
    let document_id = validate_document_id(&upload.document_id)?;
    let filename = base_filename(&upload.filename)
        .ok_or(UploadError::MissingFilename)?
        .to_string();

    let content_type = upload
        .content_type
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or_else(|| {
            mime_guess::from_path(&filename)
                .first_raw()
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string()
        });

    let key = upload_key(&document_id, &filename);
    let size = upload.body.len();

    store
        .put_object(PutObject {
            bucket: bucket.to_string(),
            key: key.clone(),
            body: upload.body,
            content_type: content_type.clone(),
            metadata: HashMap::from([(
                DOCUMENT_ID_METADATA_KEY.to_string(),
                document_id.clone(),
            )]),
        })
        .await?;

    tracing::info!(
        document_id = %document_id,
        bucket,
        key = %key,
        content_type = %content_type,
        size,
        "Document uploaded"
    );

    Ok(StoredDocument {
        document_id,
        bucket: bucket.to_string(),
        key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryObjectStore;

    fn upload(id: &str, filename: &str) -> DocumentUpload {
        DocumentUpload {
            document_id: id.into(),
            filename: filename.into(),
            content_type: Some("application/pdf".into()),
            body: b"%PDF-1.4".to_vec(),
        }
    }

    #[tokio::test]
    async fn stores_under_id_and_filename_with_metadata() {
        let store = InMemoryObjectStore::new();
        let stored = store_document(&store, "uploads", upload("abc123", "report.pdf"))
            .await
            .unwrap();

        assert_eq!(stored.key, "abc123/report.pdf");
        let object = store.object("uploads", "abc123/report.pdf").unwrap();
        assert_eq!(object.metadata.get("documentId").map(String::as_str), Some("abc123"));
        assert_eq!(object.content_type, "application/pdf");
        assert_eq!(object.body, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn content_type_is_guessed_when_missing() {
        let store = InMemoryObjectStore::new();
        let mut req = upload("d1", "notes.txt");
        req.content_type = None;
        store_document(&store, "uploads", req).await.unwrap();
        assert_eq!(store.object("uploads", "d1/notes.txt").unwrap().content_type, "text/plain");
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_to_octet_stream() {
        let store = InMemoryObjectStore::new();
        let mut req = upload("d1", "blob.zzzunknown");
        req.content_type = Some("  ".into());
        store_document(&store, "uploads", req).await.unwrap();
        assert_eq!(
            store.object("uploads", "d1/blob.zzzunknown").unwrap().content_type,
            FALLBACK_CONTENT_TYPE
        );
    }

    #[tokio::test]
    async fn directory_components_are_dropped() {
        let store = InMemoryObjectStore::new();
        let stored = store_document(&store, "uploads", upload("d1", "C:\\fakepath\\q3.pdf"))
            .await
            .unwrap();
        assert_eq!(stored.key, "d1/q3.pdf");
    }

    #[tokio::test]
    async fn empty_id_is_rejected_without_writing() {
        let store = InMemoryObjectStore::new();
        let err = store_document(&store, "uploads", upload("   ", "report.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingDocumentId));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_filename_is_rejected() {
        let store = InMemoryObjectStore::new();
        let err = store_document(&store, "uploads", upload("d1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingFilename));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_keeps_provider_code() {
        let store = InMemoryObjectStore::new().fail_with("NoSuchBucket");
        let err = store_document(&store, "uploads", upload("d1", "a.pdf"))
            .await
            .unwrap_err();
        match err {
            UploadError::Storage(e) => assert_eq!(e.code(), "NoSuchBucket"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn same_id_and_filename_overwrites() {
        let store = InMemoryObjectStore::new();
        store_document(&store, "uploads", upload("d1", "a.pdf")).await.unwrap();
        let mut again = upload("d1", "a.pdf");
        again.body = b"v2".to_vec();
        store_document(&store, "uploads", again).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.object("uploads", "d1/a.pdf").unwrap().body, b"v2");
    }

    #[test]
    fn document_id_is_trimmed() {
        assert_eq!(validate_document_id("  abc123 ").unwrap(), "abc123");
    }

    #[test]
    fn document_id_with_separator_is_rejected() {
        assert!(matches!(
            validate_document_id("a/b"),
            Err(UploadError::InvalidDocumentId(_))
        ));
        assert!(matches!(
            validate_document_id("a\\b"),
            Err(UploadError::InvalidDocumentId(_))
        ));
    }

    #[test]
    fn document_id_with_control_char_is_rejected() {
        assert!(matches!(
            validate_document_id("a\nb"),
            Err(UploadError::InvalidDocumentId(_))
        ));
    }
}
