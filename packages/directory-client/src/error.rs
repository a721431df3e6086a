//! Error types for the directory client.

use thiserror::Error;

/// Result type for directory client operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Directory client errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Network error (connection failed, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Provider asked the caller to wait before retrying
    #[error("flood wait: retry after {seconds}s")]
    FloodWait {
        /// Seconds to wait before retrying the same call.
        seconds: u64,
    },

    /// The verification code was wrong or expired
    #[error("verification code rejected")]
    CodeInvalid,

    /// The second-factor password was wrong
    #[error("password rejected")]
    PasswordInvalid,

    /// No auth token held, or the provider revoked it
    #[error("not authorized")]
    Unauthorized,

    /// Sign-in attempted before a verification code was requested
    #[error("no pending verification code")]
    NoPendingCode,

    /// API error (non-2xx response not covered above)
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or provider message.
        message: String,
    },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("parse error: {0}")]
    Parse(String),
}
