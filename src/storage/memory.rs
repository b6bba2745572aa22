use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{ObjectStore, PutObject, StorageError};

/// In-process object store used by tests and local runs without AWS.
///
/// Objects are keyed by `(bucket, key)`. A failure can be injected so every
/// subsequent call returns a provider error with the given code.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<(String, String), PutObject>>,
    failure: RwLock<Option<String>>,
    calls: AtomicUsize,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with this provider error code.
    pub fn fail_with(self, code: &str) -> Self {
        if let Ok(mut failure) = self.failure.write() {
            *failure = Some(code.to_string());
        }
        self
    }

    /// Store raw bytes directly, as an external writer would.
    pub fn insert(&self, bucket: &str, key: &str, body: &[u8]) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert(
                (bucket.to_string(), key.to_string()),
                PutObject {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    body: body.to_vec(),
                    content_type: "application/json".into(),
                    metadata: HashMap::new(),
                },
            );
        }
    }

    /// Fetch a stored object with its metadata.
    pub fn object(&self, bucket: &str, key: &str) -> Option<PutObject> {
        self.objects
            .read()
            .ok()?
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `put_object` / `get_object` calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn injected_failure(&self) -> Option<StorageError> {
        let failure = self.failure.read().ok()?;
        failure.as_ref().map(|code| StorageError::Provider {
            code: code.clone(),
            message: format!("injected failure: {code}"),
        })
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, object: PutObject) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.injected_failure() {
            return Err(err);
        }
        let mut objects = self.objects.write().map_err(|_| StorageError::Provider {
            code: "LockPoisoned".into(),
            message: "in-memory store lock poisoned".into(),
        })?;
        objects.insert((object.bucket.clone(), object.key.clone()), object);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.injected_failure() {
            return Err(err);
        }
        Ok(self.object(bucket, key).map(|o| o.body))
    }
}
