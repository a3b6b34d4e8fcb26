// =============================================================================
// CONNECTION PARAMETER KEYS
// =============================================================================

/// Environment / config file key for the access key
pub const ACCESS_KEY: &str = "ACCESS_KEY";

/// Environment / config file key for the secret key
pub const SECRET_KEY: &str = "SECRET_KEY";

/// Environment / config file key for the bucket name
pub const BUCKET_NAME: &str = "BUCKET_NAME";

/// Environment / config file key for the endpoint URL
pub const URL: &str = "URL";

/// Environment / config file key for the signing region (optional)
pub const REGION: &str = "REGION";

/// Required connection parameters, in the order they are reported and persisted
pub const REQUIRED_PARAMETERS: [&str; 4] = [ACCESS_KEY, SECRET_KEY, BUCKET_NAME, URL];

// =============================================================================
// DEFAULTS
// =============================================================================

/// Config file looked up in the working directory when `--env_file` is not given
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Host segment used in generated object keys when the hostname cannot be read
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// Content type for uploads whose extension is not recognised
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
