//! Object storage seam.
//!
//! The gateway only ever needs two operations from the object store: write an
//! object with metadata, and read an object that may not exist yet. Both are
//! expressed through `ObjectStore` so handlers can run against S3 in
//! production and `InMemoryObjectStore` in tests.

pub mod keys;
pub mod memory;
pub mod s3;

pub use keys::*;
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The provider rejected the call. `code` is the provider's error code
    /// (e.g. `NoSuchBucket`, `AccessDenied`).
    #[error("Storage provider error ({code}): {message}")]
    Provider { code: String, message: String },

    #[error("Failed to read object body: {0}")]
    Body(String),
}

impl StorageError {
    pub fn code(&self) -> &str {
        match self {
            StorageError::Provider { code, .. } => code,
            StorageError::Body(_) => "BodyReadError",
        }
    }
}

/// An object to be written to a bucket.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

/// Minimal object-store contract used by the gateway.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (or overwrite) an object.
    async fn put_object(&self, object: PutObject) -> Result<(), StorageError>;

    /// Read an object's bytes. `Ok(None)` when the key does not exist.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
}
