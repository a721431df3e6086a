//! The directory provider boundary.
//!
//! The remote messaging platform is an external collaborator; everything
//! the pipeline needs from it goes through [`DirectoryProvider`]. Real
//! deployments use the HTTP implementation in
//! [`providers::http`](crate::providers::http); tests use the scripted
//! mock in [`testing`](crate::testing).

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::credentials::{ApiIdentity, SecondFactorSecret, VerificationCode};
use crate::types::phone::PhoneNumber;

/// Result of opening a connection for an identity and phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The provider recognizes a prior authorization for this phone.
    AlreadyAuthorized,
    /// A verification code was dispatched to the account's devices.
    CodeSent,
}

/// Result of a sign-in attempt with a verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Sign-in complete.
    Authorized,
    /// The account has a second factor; password verification required.
    PasswordRequired,
}

/// One contact submitted to the bulk import call.
#[derive(Debug, Clone)]
pub struct ContactEntry {
    /// Caller-assigned correlation id, unique within one request.
    pub client_id: i64,
    /// Canonical phone number.
    pub phone: PhoneNumber,
    /// Synthetic display name (required by the provider, never shown).
    pub first_name: String,
    pub last_name: String,
}

/// A registered account the provider matched to a submitted contact.
#[derive(Debug, Clone)]
pub struct MatchedAccount {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: String,
}

/// The directory provider's connection/auth and contact-import surface.
///
/// Methods take `&mut self`: the handle is stateful (held tokens, open
/// connection) and exclusively owned by one session at a time.
#[async_trait]
pub trait DirectoryProvider: Send {
    /// Open the connection. Either reports an existing authorization or
    /// dispatches a verification code.
    async fn connect(
        &mut self,
        identity: &ApiIdentity,
        phone: &PhoneNumber,
    ) -> Result<ConnectOutcome, ProviderError>;

    /// Re-request a verification code for the phone under authentication.
    async fn request_code(&mut self, phone: &PhoneNumber) -> Result<(), ProviderError>;

    /// Attempt sign-in with a verification code.
    async fn verify_code(
        &mut self,
        phone: &PhoneNumber,
        code: &VerificationCode,
    ) -> Result<SignInOutcome, ProviderError>;

    /// Verify the second-factor password for the pending sign-in.
    async fn verify_password(
        &mut self,
        secret: &SecondFactorSecret,
    ) -> Result<(), ProviderError>;

    /// Submit one batch of contacts; returns matched accounts in the
    /// provider's order. An empty result is a normal outcome.
    async fn import_contacts(
        &mut self,
        entries: &[ContactEntry],
    ) -> Result<Vec<MatchedAccount>, ProviderError>;

    /// Release the connection and any held authorization.
    async fn disconnect(&mut self) -> Result<(), ProviderError>;
}
