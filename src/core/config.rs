//! Connection configuration
//!
//! Parameters are resolved with the precedence CLI flag > environment
//! variable > config file. The config file is a plain `KEY=value` file
//! (`.env` by default) read with `dotenvy` without touching the process
//! environment.

use std::collections::HashMap;
use std::env;
use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::cli::Cli;
use crate::core::error::{AppError, Result};
use crate::shared::constants::{
    ACCESS_KEY, BUCKET_NAME, REGION, REQUIRED_PARAMETERS, SECRET_KEY, URL,
};

/// Connection parameters from a single source, any of which may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket_name: Option<String>,
    pub url: Option<String>,
    pub region: Option<String>,
}

/// Fully resolved connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// S3 endpoint URL
    pub url: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket every operation runs against
    pub bucket_name: String,
    /// Region used for request signing
    pub region: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ConnectionParams {
    /// Values given as command-line flags
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            access_key: non_empty(cli.access_key.clone()),
            secret_key: non_empty(cli.secret_key.clone()),
            bucket_name: non_empty(cli.bucket_name.clone()),
            url: non_empty(cli.url.clone()),
            region: non_empty(cli.region.clone()),
        }
    }

    /// Values from the process environment, falling back to the config file
    ///
    /// A missing or unreadable config file, or a malformed line in it, is
    /// logged and skipped so flags can still supply the values.
    pub fn load(path: &Path) -> Self {
        Self::load_with(path, |key| env::var(key).ok())
    }

    /// Same as [`ConnectionParams::load`] with a custom environment lookup
    pub fn load_with<F>(path: &Path, env_lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_values = read_env_file(path);

        let lookup = |key: &str| {
            non_empty(env_lookup(key)).or_else(|| non_empty(file_values.get(key).cloned()))
        };

        Self {
            access_key: lookup(ACCESS_KEY),
            secret_key: lookup(SECRET_KEY),
            bucket_name: lookup(BUCKET_NAME),
            url: lookup(URL),
            region: lookup(REGION),
        }
    }

    /// Fill every absent value from `fallback`
    pub fn or(self, fallback: &ConnectionParams) -> Self {
        Self {
            access_key: self.access_key.or_else(|| fallback.access_key.clone()),
            secret_key: self.secret_key.or_else(|| fallback.secret_key.clone()),
            bucket_name: self.bucket_name.or_else(|| fallback.bucket_name.clone()),
            url: self.url.or_else(|| fallback.url.clone()),
            region: self.region.or_else(|| fallback.region.clone()),
        }
    }

    /// Keys of the required parameters that are absent, in reporting order
    pub fn missing(&self) -> Vec<&'static str> {
        let values = [
            &self.access_key,
            &self.secret_key,
            &self.bucket_name,
            &self.url,
        ];

        REQUIRED_PARAMETERS
            .into_iter()
            .zip(values)
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key)
            .collect()
    }

    /// Whether any required parameter differs from `other`
    pub fn differs_from(&self, other: &ConnectionParams) -> bool {
        self.access_key != other.access_key
            || self.secret_key != other.secret_key
            || self.bucket_name != other.bucket_name
            || self.url != other.url
    }
}

impl ConnectionSettings {
    pub const DEFAULT_REGION: &'static str = "us-east-1";

    /// Merge CLI flags over stored values and require the four connection parameters
    pub fn resolve(cli: &ConnectionParams, stored: &ConnectionParams) -> Result<Self> {
        let merged = cli.clone().or(stored);

        let missing = merged.missing();

        let ConnectionParams {
            access_key: Some(access_key),
            secret_key: Some(secret_key),
            bucket_name: Some(bucket_name),
            url: Some(url),
            region,
        } = merged
        else {
            return Err(AppError::MissingParameters(missing));
        };

        Ok(Self {
            url,
            access_key,
            secret_key,
            bucket_name,
            region: region.unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
        })
    }

    fn as_params(&self) -> ConnectionParams {
        ConnectionParams {
            access_key: Some(self.access_key.clone()),
            secret_key: Some(self.secret_key.clone()),
            bucket_name: Some(self.bucket_name.clone()),
            url: Some(self.url.clone()),
            region: Some(self.region.clone()),
        }
    }

    /// Whether these settings should be written to `path` for future runs
    ///
    /// Only when the file does not exist yet and the flags changed at least
    /// one of the stored connection parameters.
    pub fn should_persist(&self, path: &Path, stored: &ConnectionParams) -> bool {
        !path.exists() && self.as_params().differs_from(stored)
    }

    /// Config file contents for these settings
    ///
    /// Values are quoted where needed so they read back unchanged.
    pub fn to_env_file(&self) -> String {
        let mut contents = String::new();
        for (key, value) in [
            (ACCESS_KEY, &self.access_key),
            (SECRET_KEY, &self.secret_key),
            (BUCKET_NAME, &self.bucket_name),
            (URL, &self.url),
        ] {
            if !value.is_empty() {
                let _ = writeln!(contents, "{}={}", key, quote_env_value(value));
            }
        }
        contents
    }

    /// Write the connection parameters to `path`
    pub fn persist(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_env_file()).map_err(|e| {
            AppError::io(format!("Failed to write '{}'", path.display()), e)
        })?;
        debug!("Saved connection parameters to '{}'", path.display());
        Ok(())
    }
}

/// Render a value so `dotenvy` parses it back verbatim
///
/// Plain values stay bare. Anything else is double-quoted with `\`, `"`
/// and `$` backslash-escaped.
fn quote_env_value(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.:/@+%,~".contains(c));
    if plain {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                quoted.push('\\');
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn read_env_file(path: &Path) -> HashMap<String, String> {
    let mut values = HashMap::new();

    if !path.exists() {
        debug!("Config file '{}' not found, skipping", path.display());
        return values;
    }

    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Ignoring config file '{}': {}", path.display(), e);
            return values;
        }
    };

    for entry in entries {
        match entry {
            Ok((key, value)) => {
                values.insert(key, value);
            }
            Err(e @ dotenvy::Error::LineParse(..)) => {
                warn!("Skipping invalid entry in '{}': {}", path.display(), e);
            }
            Err(e) => {
                warn!("Stopped reading '{}': {}", path.display(), e);
                break;
            }
        }
    }

    debug!(
        "Loaded {} entries from config file '{}'",
        values.len(),
        path.display()
    );
    values
}
