use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::{ObjectStore, PutObject, StorageError};
use crate::aws::error_parts;

/// S3-backed object store.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, object: PutObject) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .content_type(&object.content_type)
            .body(ByteStream::from(object.body));

        for (name, value) in object.metadata {
            request = request.metadata(name, value);
        }

        request.send().await.map_err(|err| {
            let (code, message) = error_parts(&err);
            StorageError::Provider { code, message }
        })?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_key())
                    || matches!(err.code(), Some("NoSuchKey") | Some("NotFound"));
                if missing {
                    return Ok(None);
                }
                let (code, message) = error_parts(&err);
                return Err(StorageError::Provider { code, message });
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Body(e.to_string()))?
            .into_bytes();

        Ok(Some(bytes.to_vec()))
    }
}
