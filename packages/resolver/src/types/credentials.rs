//! Credential material supplied by the caller.
//!
//! None of these values are persisted by the core; they live for at most
//! one [`AuthSession`](crate::auth::AuthSession). Secrets get redacting
//! `Debug` impls so they never reach logs or error chains verbatim.

use std::fmt;

/// API identity used to open a provider connection.
#[derive(Clone)]
pub struct ApiIdentity {
    /// Numeric application id issued by the provider.
    pub api_id: i64,
    /// Application secret hash issued by the provider.
    pub api_hash: String,
}

impl ApiIdentity {
    pub fn new(api_id: i64, api_hash: impl Into<String>) -> Self {
        Self {
            api_id,
            api_hash: api_hash.into(),
        }
    }
}

impl fmt::Debug for ApiIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiIdentity")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .finish()
    }
}

/// Short numeric verification code delivered to the account's devices.
#[derive(Debug, Clone)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Second-factor password for accounts with enhanced security enabled.
#[derive(Clone)]
pub struct SecondFactorSecret(String);

impl SecondFactorSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecondFactorSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecondFactorSecret(<redacted>)")
    }
}
