use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStore;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-memory [`ObjectStore`] with S3 semantics for a single bucket
pub struct InMemoryStore {
    bucket: String,
    bucket_exists: bool,
    deny_writes: bool,
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl InMemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            bucket_exists: true,
            deny_writes: false,
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    /// A store whose bucket does not exist
    pub fn without_bucket(bucket: &str) -> Self {
        Self {
            bucket_exists: false,
            ..Self::new(bucket)
        }
    }

    /// A store that rejects every put and delete
    pub fn read_only(bucket: &str) -> Self {
        Self {
            deny_writes: true,
            ..Self::new(bucket)
        }
    }

    pub fn with_object(self, key: &str, data: &[u8]) -> Self {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: "application/octet-stream".to_string(),
            },
        );
        self
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    fn bucket_name(&self) -> String {
        self.bucket.clone()
    }

    async fn bucket_exists(&self) -> Result<bool> {
        Ok(self.bucket_exists)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn put_stream(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        content_type: &str,
    ) -> Result<u64> {
        if self.deny_writes {
            return Err(AppError::Access(format!(
                "Failed to upload '{}': status 403",
                key
            )));
        }
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let size = data.len() as u64;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(size)
    }

    async fn get_to_writer(
        &self,
        key: &str,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<bool> {
        let data = match self.objects.lock().unwrap().get(key) {
            Some(object) => object.data.clone(),
            None => return Ok(false),
        };
        writer.write_all(&data).await?;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.deny_writes {
            return Err(AppError::Access(format!(
                "Failed to delete '{}': status 403",
                key
            )));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
