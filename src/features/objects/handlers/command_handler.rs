use std::io::Write;
use std::path::Path;

use crate::core::cli::Action;
use crate::core::error::Result;
use crate::features::objects::services::BucketService;

/// Run one CLI action and report progress to `out`
pub async fn handle_action<W: Write>(
    service: &BucketService,
    action: &Action,
    out: &mut W,
) -> Result<()> {
    match action {
        Action::Upload {
            file_path,
            object_name,
        } => handle_upload(service, file_path, object_name.as_deref(), out).await,
        Action::Ls { directory } => handle_ls(service, directory, out).await,
        Action::Download {
            file_name,
            local_path,
        } => handle_download(service, file_name, local_path.as_deref(), out).await,
        Action::Delete { file_name } => handle_delete(service, file_name, out).await,
    }
}

async fn handle_upload<W: Write>(
    service: &BucketService,
    file_path: &Path,
    object_name: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let key = service.upload(file_path, object_name).await?;
    writeln!(
        out,
        "File '{}' uploaded successfully as '{}' to bucket '{}'.",
        file_path.display(),
        key,
        service.bucket_name()
    )?;
    Ok(())
}

async fn handle_ls<W: Write>(service: &BucketService, directory: &str, out: &mut W) -> Result<()> {
    let shown_prefix = if directory.is_empty() { "/" } else { directory };
    writeln!(
        out,
        "Listing objects in bucket '{}' (prefix: '{}'):",
        service.bucket_name(),
        shown_prefix
    )?;

    let keys = service.list(directory).await?;
    if keys.is_empty() {
        writeln!(out, "No objects found.")?;
    } else {
        for key in keys {
            writeln!(out, "- {}", key)?;
        }
    }
    Ok(())
}

async fn handle_download<W: Write>(
    service: &BucketService,
    key: &str,
    local_path: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let shown_target = local_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "current directory".to_string());
    writeln!(
        out,
        "Attempting to download '{}' from bucket '{}' to '{}'...",
        key,
        service.bucket_name(),
        shown_target
    )?;

    let target = service.download(key, local_path).await?;
    writeln!(out, "Downloaded '{}' to '{}'", key, target.display())?;
    Ok(())
}

async fn handle_delete<W: Write>(service: &BucketService, key: &str, out: &mut W) -> Result<()> {
    let bucket = service.bucket_name();
    writeln!(
        out,
        "Attempting to delete '{}' from bucket '{}'...",
        key, bucket
    )?;

    service.delete(key).await?;
    writeln!(out, "Deleted '{}' from bucket '{}'", key, bucket)?;
    writeln!(
        out,
        "File '{}' deleted successfully from bucket '{}'.",
        key, bucket
    )?;
    Ok(())
}
