use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::core::error::Result;

/// Primitive operations against a single bucket
///
/// Object bodies are streamed, never held in memory whole. Implementations
/// report transport failures as errors; a missing object is `Ok(false)` from
/// [`ObjectStore::get_to_writer`] and deleting one is not an error.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store operates on
    fn bucket_name(&self) -> String;

    /// Whether the bucket exists and is reachable with the configured credentials
    async fn bucket_exists(&self) -> Result<bool>;

    /// Keys of every object whose key starts with `prefix`
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Store everything read from `reader` under `key`, returning the byte count
    async fn put_stream(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        content_type: &str,
    ) -> Result<u64>;

    /// Write the object stored under `key` into `writer`
    ///
    /// Returns `false` when the key does not exist. Bytes written before a
    /// failure or a missing key are not meaningful.
    async fn get_to_writer(
        &self,
        key: &str,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<bool>;

    /// Remove the object stored under `key`
    async fn delete(&self, key: &str) -> Result<()>;
}
