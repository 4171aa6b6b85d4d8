use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cspguard
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown CSP directive: {0}")]
    UnknownDirective(String),

    #[error("Unsupported hash algorithm: {0}")]
    InvalidHashAlgorithm(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown nonce usage \"{0}\", use \"script\" or \"style\"")]
    InvalidNonceUsage(String),

    #[error("No report data sent")]
    NoData,

    #[error("Invalid JSON data supplied: {0}")]
    InvalidPayload(String),

    #[error("Missing csp-report key in report payload")]
    MissingReportKey,

    #[error("Invalid custom noise rule: {0}")]
    InvalidCustomRule(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_custom_rule(msg: impl Into<String>) -> Self {
        Self::InvalidCustomRule(msg.into())
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UnknownDirective(_) => "E_UNKNOWN_DIRECTIVE",
            Error::InvalidHashAlgorithm(_) => "E_HASH_ALGORITHM",
            Error::InvalidInput(_) => "E_INVALID_INPUT",
            Error::InvalidNonceUsage(_) => "E_NONCE_USAGE",
            Error::NoData => "E_NO_DATA",
            Error::InvalidPayload(_) => "E_INVALID_PAYLOAD",
            Error::MissingReportKey => "E_MISSING_REPORT_KEY",
            Error::InvalidCustomRule(_) => "E_CUSTOM_RULE",
            Error::Json(_) => "E_JSON",
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NoData => 411,
            Error::InvalidPayload(_) | Error::MissingReportKey => 400,
            Error::InvalidInput(_) | Error::Json(_) => 400,
            _ => 500,
        }
    }
}
