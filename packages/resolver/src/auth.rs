//! Session authentication state machine.
//!
//! One [`AuthSession`] owns one provider handle and walks it from `Start`
//! to `Authenticated` through externally supplied credentials. The state
//! enum is explicit and the session object is passed around; nothing
//! hides in process-wide mutable state.
//!
//! ```text
//! Start ──connect()──► CodeSent ──submit_code()──► Authenticated
//!   │                      │                            ▲
//!   │                      └──────► PasswordRequired ───┘
//!   │                                 (submit_password)
//!   └──connect()── already authorized ──────────────────┘
//! ```
//!
//! `Failed` is reachable from any non-terminal state on unrecoverable
//! error. `Authenticated` and `Failed` are terminal for a session
//! instance; retrying from `Start` means constructing a fresh session.

use tracing::{debug, info, warn};

use crate::error::{AuthError, ProviderError};
use crate::traits::directory::{ConnectOutcome, DirectoryProvider, SignInOutcome};
use crate::types::credentials::{ApiIdentity, SecondFactorSecret, VerificationCode};
use crate::types::phone::PhoneNumber;

/// States of the authentication machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Fresh session, no connection opened.
    Start,
    /// A verification code has been dispatched; waiting for the caller.
    CodeSent,
    /// The account has a second factor; waiting for the password.
    PasswordRequired,
    /// Fully authorized; the session can drive a resolution run.
    Authenticated,
    /// Unrecoverable error; the session must be reconstructed.
    Failed,
}

impl AuthState {
    /// True for states no transition leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthState::Authenticated | AuthState::Failed)
    }
}

/// One authenticated connection to the directory provider.
///
/// The session is the sole owner of its provider handle; no other
/// component touches the handle directly.
#[derive(Debug)]
pub struct AuthSession<P: DirectoryProvider> {
    provider: P,
    identity: ApiIdentity,
    phone: PhoneNumber,
    state: AuthState,
    code_requested: bool,
}

impl<P: DirectoryProvider> AuthSession<P> {
    /// Create a session in `Start` for the given identity and phone.
    pub fn new(provider: P, identity: ApiIdentity, phone: PhoneNumber) -> Self {
        Self {
            provider,
            identity,
            phone,
            state: AuthState::Start,
            code_requested: false,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Read access to the provider handle, mainly for inspection in tests.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub(crate) fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Open the connection: `Start → CodeSent | Authenticated`.
    ///
    /// Goes straight to `Authenticated` when the provider reports the
    /// phone already authorized. A throttle leaves the session in `Start`
    /// for the caller to retry; any other failure is terminal.
    pub async fn connect(&mut self) -> Result<AuthState, AuthError> {
        if self.state != AuthState::Start {
            return Err(AuthError::InvalidAction {
                state: self.state,
                action: "connect",
            });
        }

        match self.provider.connect(&self.identity, &self.phone).await {
            Ok(ConnectOutcome::AlreadyAuthorized) => {
                self.state = AuthState::Authenticated;
                info!(phone = %self.phone, "session already authorized");
            }
            Ok(ConnectOutcome::CodeSent) => {
                self.state = AuthState::CodeSent;
                self.code_requested = true;
                info!(phone = %self.phone, "verification code requested");
            }
            Err(ProviderError::Throttled { retry_after }) => {
                warn!(?retry_after, "connect throttled");
                return Err(AuthError::Throttled { retry_after });
            }
            Err(e) => {
                self.state = AuthState::Failed;
                warn!(error = %e, "connect failed, session terminal");
                return Err(AuthError::Connection(e.to_string()));
            }
        }
        Ok(self.state)
    }

    /// Attempt sign-in with a verification code:
    /// `CodeSent → Authenticated | PasswordRequired | CodeSent`.
    ///
    /// A wrong or expired code keeps the session in `CodeSent`; the
    /// caller may retry or resend.
    pub async fn submit_code(
        &mut self,
        code: &VerificationCode,
    ) -> Result<AuthState, AuthError> {
        if self.state != AuthState::CodeSent {
            return Err(AuthError::InvalidAction {
                state: self.state,
                action: "submit a verification code",
            });
        }

        match self.provider.verify_code(&self.phone, code).await {
            Ok(SignInOutcome::Authorized) => {
                self.state = AuthState::Authenticated;
                info!("sign-in complete");
            }
            Ok(SignInOutcome::PasswordRequired) => {
                self.state = AuthState::PasswordRequired;
                info!("second factor required");
            }
            Err(ProviderError::CodeInvalid) => {
                debug!("verification code rejected");
                return Err(AuthError::CodeRejected);
            }
            Err(ProviderError::Throttled { retry_after }) => {
                warn!(?retry_after, "sign-in throttled");
                return Err(AuthError::Throttled { retry_after });
            }
            Err(e) => {
                self.state = AuthState::Failed;
                warn!(error = %e, "sign-in failed, session terminal");
                return Err(AuthError::Connection(e.to_string()));
            }
        }
        Ok(self.state)
    }

    /// Re-request a verification code. Never changes state; rejected when
    /// no code was ever requested.
    pub async fn resend_code(&mut self) -> Result<(), AuthError> {
        if self.state != AuthState::CodeSent {
            return if self.code_requested {
                Err(AuthError::InvalidAction {
                    state: self.state,
                    action: "resend a verification code",
                })
            } else {
                Err(AuthError::CodeNotRequested)
            };
        }

        match self.provider.request_code(&self.phone).await {
            Ok(()) => {
                info!("verification code re-requested");
                Ok(())
            }
            Err(ProviderError::Throttled { retry_after }) => {
                warn!(?retry_after, "code resend throttled");
                Err(AuthError::Throttled { retry_after })
            }
            Err(e) => {
                self.state = AuthState::Failed;
                warn!(error = %e, "code resend failed, session terminal");
                Err(AuthError::Connection(e.to_string()))
            }
        }
    }

    /// Verify the second-factor password:
    /// `PasswordRequired → Authenticated | PasswordRequired`.
    ///
    /// A wrong password keeps state; the session enforces no retry cap
    /// (retry policy belongs to the caller).
    pub async fn submit_password(
        &mut self,
        secret: &SecondFactorSecret,
    ) -> Result<AuthState, AuthError> {
        if self.state != AuthState::PasswordRequired {
            return Err(AuthError::InvalidAction {
                state: self.state,
                action: "submit a password",
            });
        }

        match self.provider.verify_password(secret).await {
            Ok(()) => {
                self.state = AuthState::Authenticated;
                info!("second factor accepted");
            }
            Err(ProviderError::PasswordInvalid) => {
                debug!("second-factor password rejected");
                return Err(AuthError::PasswordRejected);
            }
            Err(ProviderError::Throttled { retry_after }) => {
                warn!(?retry_after, "password verification throttled");
                return Err(AuthError::Throttled { retry_after });
            }
            Err(e) => {
                self.state = AuthState::Failed;
                warn!(error = %e, "password verification failed, session terminal");
                return Err(AuthError::Connection(e.to_string()));
            }
        }
        Ok(self.state)
    }

    /// Release the connection. Consumes the session; end-of-life rather
    /// than a state.
    pub async fn disconnect(mut self) -> Result<(), AuthError> {
        self.provider
            .disconnect()
            .await
            .map_err(|e| AuthError::Connection(e.to_string()))?;
        info!("session disconnected");
        Ok(())
    }
}
