use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access error: {0}")]
    Access(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required S3 connection parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),
}

impl AppError {
    /// Process exit status for this error
    ///
    /// Every failure maps to `1`; there are no finer grained codes.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Wrap an I/O error with the path or operation it happened on
    pub fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        AppError::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", context, err),
        ))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
