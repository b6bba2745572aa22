//! Deterministic object key layout.
//!
//! Uploads land at `{document_id}/{filename}` in the uploads bucket. The
//! external analysis job writes its result to
//! `final_reports/{document_id}_summary.json` in the results bucket.

use thiserror::Error;

/// Prefix under which the analysis job writes finished reports.
pub const RESULTS_PREFIX: &str = "final_reports";

/// Metadata key carrying the document id on every uploaded object.
pub const DOCUMENT_ID_METADATA_KEY: &str = "documentId";

/// Key of an uploaded document.
pub fn upload_key(document_id: &str, filename: &str) -> String {
    format!("{document_id}/{filename}")
}

/// Key of the result record for a document. Pure function of the id.
pub fn result_key(document_id: &str) -> String {
    format!("{RESULTS_PREFIX}/{document_id}_summary.json")
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentIdError {
    #[error("A 'documentId' is required")]
    Missing,

    #[error("must not contain path separators")]
    PathSeparator,

    #[error("must not contain control characters")]
    ControlCharacter,
}

/// Trim a client-supplied document id and check it can name keys.
///
/// The id is the first segment of the upload key and part of the result
/// key, so both ends of the layout must accept exactly the same ids.
pub fn normalize_document_id(raw: &str) -> Result<&str, DocumentIdError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(DocumentIdError::Missing);
    }
    if id.contains(['/', '\\']) {
        return Err(DocumentIdError::PathSeparator);
    }
    if id.chars().any(char::is_control) {
        return Err(DocumentIdError::ControlCharacter);
    }
    Ok(id)
}

/// Reduce a client-supplied filename to its last path component.
///
/// Browsers on Windows may send `C:\fakepath\report.pdf`; multipart clients
/// may send relative paths. Returns `None` when nothing usable remains.
pub fn base_filename(raw: &str) -> Option<&str> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}
