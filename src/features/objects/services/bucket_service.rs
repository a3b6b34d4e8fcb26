use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::config::ConnectionSettings;
use crate::core::error::{AppError, Result};
use crate::modules::storage::{ObjectStore, S3Client};
use crate::shared::constants::DEFAULT_CONTENT_TYPE;
use crate::shared::object_key::{build_object_name, key_basename, normalize_prefix};

/// Service for object operations against the configured bucket
pub struct BucketService {
    store: Arc<dyn ObjectStore>,
}

impl BucketService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Open an S3 session for the configured bucket
    ///
    /// The bucket name is passed through as given; the service decides
    /// whether it exists.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let client = S3Client::connect(settings)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn bucket_name(&self) -> String {
        self.store.bucket_name()
    }

    /// Make sure the bucket exists and is accessible
    pub async fn get_bucket(&self) -> Result<()> {
        if self.store.bucket_exists().await? {
            debug!("Bucket '{}' is accessible", self.store.bucket_name());
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Bucket '{}' does not exist or is not accessible.",
                self.store.bucket_name()
            )))
        }
    }

    /// Keys under `directory`, or every key when it is empty
    ///
    /// `"dir"` and `"dir/"` list the same objects.
    pub async fn list(&self, directory: &str) -> Result<Vec<String>> {
        self.get_bucket().await?;

        let prefix = normalize_prefix(directory);
        let keys = self.store.list_keys(&prefix).await?;

        info!(
            "Found {} objects with prefix '{}' in bucket '{}'",
            keys.len(),
            prefix,
            self.store.bucket_name()
        );
        Ok(keys)
    }

    /// Upload a local file
    ///
    /// The file is streamed to the store, so its size is not bounded by memory.
    ///
    /// # Arguments
    /// * `file_path` - Local file to upload
    /// * `object_name` - Explicit key; defaults to `{date}/{hostname}/{file name}`
    ///
    /// # Returns
    /// The key the file was stored under
    pub async fn upload(&self, file_path: &Path, object_name: Option<&str>) -> Result<String> {
        self.get_bucket().await?;

        let key = build_object_name(file_path, object_name)?;

        let mut file = tokio::fs::File::open(file_path).await.map_err(|e| {
            AppError::io(format!("Failed to read '{}'", file_path.display()), e)
        })?;

        let content_type = mime_guess::from_path(file_path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let size = self.store.put_stream(&key, &mut file, &content_type).await?;

        info!(
            "Uploaded '{}' as '{}' to bucket '{}' ({} bytes)",
            file_path.display(),
            key,
            self.store.bucket_name(),
            size
        );
        Ok(key)
    }

    /// Download an object to the local filesystem
    ///
    /// The body is streamed into `{target}.part` and renamed into place once
    /// complete; an existing file at the target is left alone on failure.
    ///
    /// # Arguments
    /// * `key` - Object key to download
    /// * `destination` - Target file or directory; defaults to the current directory
    ///
    /// # Returns
    /// The path the object was written to
    pub async fn download(&self, key: &str, destination: Option<&Path>) -> Result<PathBuf> {
        self.get_bucket().await?;

        let target = resolve_download_path(key, destination)?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::io(format!("Failed to create '{}'", parent.display()), e)
            })?;
        }

        let partial = partial_path(&target);
        let found = match self.fetch_into(key, &partial).await {
            Ok(found) => found,
            Err(e) => {
                discard(&partial).await;
                return Err(e);
            }
        };

        if !found {
            discard(&partial).await;
            return Err(AppError::NotFound(format!(
                "Object '{}' does not exist in bucket '{}'",
                key,
                self.store.bucket_name()
            )));
        }

        tokio::fs::rename(&partial, &target).await.map_err(|e| {
            AppError::io(format!("Failed to write '{}'", target.display()), e)
        })?;

        info!("Downloaded '{}' to '{}'", key, target.display());
        Ok(target)
    }

    async fn fetch_into(&self, key: &str, path: &Path) -> Result<bool> {
        let write_error =
            |e| AppError::io(format!("Failed to write '{}'", path.display()), e);

        let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
        let found = self.store.get_to_writer(key, &mut file).await?;
        file.flush().await.map_err(write_error)?;
        Ok(found)
    }

    /// Delete an object; deleting a key that does not exist succeeds
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.get_bucket().await?;
        self.store.delete(key).await?;

        info!(
            "Deleted '{}' from bucket '{}'",
            key,
            self.store.bucket_name()
        );
        Ok(())
    }
}

/// Local path a downloaded object is written to
///
/// * no destination: `{cwd}/{basename(key)}`
/// * an existing directory, or a path ending in a separator: `{destination}/{basename(key)}`
/// * anything else: the destination itself
pub fn resolve_download_path(key: &str, destination: Option<&Path>) -> Result<PathBuf> {
    let file_name = key_basename(key).ok_or_else(|| {
        AppError::Validation(format!("Object key '{}' does not name a file", key))
    })?;

    match destination {
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| AppError::io("Failed to read the current directory", e))?;
            Ok(cwd.join(file_name))
        }
        Some(dest) if dest.is_dir() || ends_with_separator(dest) => Ok(dest.join(file_name)),
        Some(dest) => Ok(dest.to_path_buf()),
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove '{}': {}", path.display(), e);
        }
    }
}

fn ends_with_separator(path: &Path) -> bool {
    path.to_str()
        .map(|s| s.ends_with('/') || s.ends_with(MAIN_SEPARATOR))
        .unwrap_or(false)
}
