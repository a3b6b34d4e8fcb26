use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::shared::constants::DEFAULT_ENV_FILE;

/// bucket - upload, list, download and delete objects in an S3 bucket
#[derive(Parser, Debug)]
#[command(name = "bucket")]
#[command(version)]
#[command(about = "Interact with an S3 bucket.", long_about = None)]
pub struct Cli {
    /// Name of the S3 bucket
    #[arg(long = "bucket_name", global = true)]
    pub bucket_name: Option<String>,

    /// S3 access key
    #[arg(long = "access_key", global = true)]
    pub access_key: Option<String>,

    /// S3 secret key
    #[arg(long = "secret_key", global = true)]
    pub secret_key: Option<String>,

    /// S3 URL endpoint (e.g., http://localhost:9000)
    #[arg(long = "url", global = true)]
    pub url: Option<String>,

    /// Signing region (default: us-east-1)
    #[arg(long = "region", global = true)]
    pub region: Option<String>,

    /// Config file holding KEY=value connection parameters
    #[arg(long = "env_file", global = true, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Action to perform
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Upload a file to S3
    Upload {
        /// Local path to the file to upload
        #[arg(long = "file_path")]
        file_path: PathBuf,

        /// Optional S3 object name (defaults to date/hostname/filename)
        #[arg(long = "object_name")]
        object_name: Option<String>,
    },

    /// List objects in S3 bucket/directory
    Ls {
        /// Optional directory prefix to list
        #[arg(long = "directory", default_value = "")]
        directory: String,
    },

    /// Download a file from S3
    Download {
        /// S3 object key to download
        #[arg(long = "file_name")]
        file_name: String,

        /// Local destination path for download. Defaults to current directory
        #[arg(long = "local_path")]
        local_path: Option<PathBuf>,
    },

    /// Delete a file from S3
    Delete {
        /// S3 object key to delete
        #[arg(long = "file_name")]
        file_name: String,
    },
}

impl Action {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Action::Upload { .. } => "upload",
            Action::Ls { .. } => "ls",
            Action::Download { .. } => "download",
            Action::Delete { .. } => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_upload_with_global_flags() {
        let cli = Cli::try_parse_from([
            "bucket",
            "--bucket_name",
            "backups",
            "--url",
            "http://localhost:9000",
            "upload",
            "--file_path",
            "/tmp/a.txt",
        ])
        .unwrap();

        assert_eq!(cli.bucket_name.as_deref(), Some("backups"));
        assert_eq!(cli.url.as_deref(), Some("http://localhost:9000"));
        assert!(cli.access_key.is_none());
        assert_eq!(cli.env_file, PathBuf::from(DEFAULT_ENV_FILE));
        assert_eq!(
            cli.action,
            Action::Upload {
                file_path: PathBuf::from("/tmp/a.txt"),
                object_name: None,
            }
        );
        assert_eq!(cli.action.name(), "upload");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bucket",
            "delete",
            "--file_name",
            "a/b.txt",
            "--access_key",
            "AK",
        ])
        .unwrap();

        assert_eq!(cli.access_key.as_deref(), Some("AK"));
        assert_eq!(
            cli.action,
            Action::Delete {
                file_name: "a/b.txt".to_string()
            }
        );
    }

    #[test]
    fn test_ls_directory_defaults_to_empty() {
        let cli = Cli::try_parse_from(["bucket", "ls"]).unwrap();
        assert_eq!(
            cli.action,
            Action::Ls {
                directory: String::new()
            }
        );
    }

    #[test]
    fn test_required_subcommand_arguments() {
        assert!(Cli::try_parse_from(["bucket", "upload"]).is_err());
        assert!(Cli::try_parse_from(["bucket", "download"]).is_err());
        assert!(Cli::try_parse_from(["bucket", "delete"]).is_err());
        assert!(Cli::try_parse_from(["bucket"]).is_err());
    }

    #[test]
    fn test_parse_download_with_local_path() {
        let cli = Cli::try_parse_from([
            "bucket",
            "download",
            "--file_name",
            "2024-03-09/host/a.txt",
            "--local_path",
            "out/",
        ])
        .unwrap();

        assert_eq!(
            cli.action,
            Action::Download {
                file_name: "2024-03-09/host/a.txt".to_string(),
                local_path: Some(PathBuf::from("out/")),
            }
        );
    }
}
