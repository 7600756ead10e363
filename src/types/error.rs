use thiserror::Error;

/// caseload error types
#[derive(Error, Debug)]
pub enum CaseloadError {
    /// Trailing-12 view requested without any dated record to anchor on
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Failed to parse JSON or an enum literal
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for caseload
pub type Result<T> = std::result::Result<T, CaseloadError>;
