//! Typed errors for the resolution pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Three surfaces:
//! [`ProviderError`] at the directory boundary, [`AuthError`] on the
//! session state machine, [`ResolveError`] on resolver construction.

use std::time::Duration;

use thiserror::Error;

use crate::auth::AuthState;

/// Errors crossing the directory provider boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection to the provider failed or dropped
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider no longer recognizes the session's authorization
    #[error("session not authorized")]
    Unauthorized,

    /// The verification code was wrong or expired
    #[error("verification code rejected")]
    CodeInvalid,

    /// The second-factor password was wrong
    #[error("second-factor password rejected")]
    PasswordInvalid,

    /// The provider demands a wait before the call is retried
    #[error("throttled: retry after {retry_after:?}")]
    Throttled {
        /// Provider-signaled wait before the same call may be retried.
        retry_after: Duration,
    },

    /// Any other provider-side error
    #[error("provider error ({status}): {message}")]
    Api {
        /// HTTP-ish status code reported by the provider.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// The provider response could not be interpreted
    #[error("provider response parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// True for errors that end the session (connection or authorization
    /// loss). Everything else is either recoverable in place or isolated
    /// to one batch.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            ProviderError::Connection(_) | ProviderError::Unauthorized
        )
    }
}

/// Errors surfaced by the authentication state machine.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unrecoverable connection failure; the session is now `Failed`
    #[error("connection error: {0}")]
    Connection(String),

    /// Wrong or expired verification code; state unchanged, caller may retry
    #[error("verification code rejected")]
    CodeRejected,

    /// Wrong second-factor password; state unchanged, caller may retry
    #[error("second-factor password rejected")]
    PasswordRejected,

    /// Provider throttle; state unchanged, caller decides whether to wait
    #[error("rate limited: retry after {retry_after:?}")]
    Throttled {
        /// Provider-signaled wait.
        retry_after: Duration,
    },

    /// Resend requested before any code was ever requested
    #[error("no verification code has been requested")]
    CodeNotRequested,

    /// The action is not valid in the session's current state
    #[error("cannot {action} while session is {state:?}")]
    InvalidAction {
        /// Current session state.
        state: AuthState,
        /// The attempted action.
        action: &'static str,
    },
}

/// Errors surfaced when assembling a resolution run.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The supplied session has not reached `Authenticated`
    #[error("session is not authenticated (state: {state:?})")]
    NotAuthenticated {
        /// The session's actual state.
        state: AuthState,
    },

    /// Batch size of zero makes no progress
    #[error("batch size must be at least 1")]
    InvalidBatchSize,
}
