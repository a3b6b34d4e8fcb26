//! Object key helpers
//!
//! Keys generated for uploads follow `{YYYY-MM-DD}/{hostname}/{file name}` so
//! that objects from different machines and days never collide.

use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::core::error::{AppError, Result};
use crate::shared::constants::UNKNOWN_HOSTNAME;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build the object key for an upload using today's local date and this host's name
///
/// An explicit, non-empty `object_name` is returned verbatim.
pub fn build_object_name(file_path: &Path, object_name: Option<&str>) -> Result<String> {
    build_object_name_at(
        file_path,
        object_name,
        Local::now().date_naive(),
        &local_hostname(),
    )
}

/// Same as [`build_object_name`] with the date and hostname supplied by the caller
pub fn build_object_name_at(
    file_path: &Path,
    object_name: Option<&str>,
    date: NaiveDate,
    hostname: &str,
) -> Result<String> {
    if let Some(name) = object_name.filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }

    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "'{}' does not name a file",
                file_path.display()
            ))
        })?;

    Ok(format!(
        "{}/{}/{}",
        date.format(DATE_FORMAT),
        hostname,
        file_name
    ))
}

/// Hostname of this machine, or `unknown` if it cannot be determined
pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
}

/// Turn a user supplied directory into a listing prefix
///
/// `"dir"` and `"dir/"` both become `"dir/"`; an empty directory lists everything.
pub fn normalize_prefix(directory: &str) -> String {
    if directory.is_empty() || directory.ends_with('/') {
        directory.to_string()
    } else {
        format!("{}/", directory)
    }
}

/// Last path segment of an object key
///
/// `None` when the key ends with `/` or the segment is `.` or `..`, which
/// would name a directory rather than a file once joined to a local path.
pub fn key_basename(key: &str) -> Option<&str> {
    key.rsplit('/')
        .next()
        .filter(|name| !matches!(*name, "" | "." | ".."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_build_object_name_default_layout() {
        let cases = [
            ("report.pdf", "report.pdf"),
            ("/var/backups/db.sql.gz", "db.sql.gz"),
            ("./relative/dir/notes.txt", "notes.txt"),
            ("no_extension", "no_extension"),
        ];

        for (path, expected_name) in cases {
            let key = build_object_name_at(Path::new(path), None, date(), "host-1").unwrap();
            assert_eq!(key, format!("2024-03-09/host-1/{}", expected_name));
        }
    }

    #[test]
    fn test_build_object_name_explicit_name_is_verbatim() {
        let key = build_object_name_at(
            Path::new("/tmp/report.pdf"),
            Some("archive/2023/report.pdf"),
            date(),
            "host-1",
        )
        .unwrap();
        assert_eq!(key, "archive/2023/report.pdf");
    }

    #[test]
    fn test_build_object_name_empty_name_uses_default() {
        let key =
            build_object_name_at(Path::new("/tmp/a.txt"), Some(""), date(), "host-1").unwrap();
        assert_eq!(key, "2024-03-09/host-1/a.txt");
    }

    #[test]
    fn test_build_object_name_rejects_path_without_file_name() {
        let result = build_object_name_at(Path::new("/"), None, date(), "host-1");
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = build_object_name_at(Path::new("dir/.."), None, date(), "host-1");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_build_object_name_uses_local_host() {
        let key = build_object_name(Path::new("/tmp/data.bin"), None).unwrap();
        let segments: Vec<&str> = key.split('/').collect();

        assert_eq!(segments.len(), 3);
        assert!(NaiveDate::parse_from_str(segments[0], DATE_FORMAT).is_ok());
        assert_eq!(segments[1], local_hostname());
        assert_eq!(segments[2], "data.bin");
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("dir"), "dir/");
        assert_eq!(normalize_prefix("dir/"), "dir/");
        assert_eq!(normalize_prefix("a/b"), "a/b/");
        assert_eq!(normalize_prefix("dir"), normalize_prefix("dir/"));
    }

    #[test]
    fn test_key_basename() {
        assert_eq!(key_basename("2024-03-09/host/file.txt"), Some("file.txt"));
        assert_eq!(key_basename("file.txt"), Some("file.txt"));
        assert_eq!(key_basename("dir/"), None);
        assert_eq!(key_basename(""), None);
        assert_eq!(key_basename("a/.."), None);
        assert_eq!(key_basename("a/."), None);
        assert_eq!(key_basename(".."), None);
        assert_eq!(key_basename("a/..b"), Some("..b"));
    }
}
