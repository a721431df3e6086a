//! [`DirectoryProvider`] over the REST wire client.
//!
//! Wraps a [`DirectoryClient`] and translates wire-level errors into the
//! pipeline's [`ProviderError`] taxonomy.

use std::time::Duration;

use async_trait::async_trait;

use directory_client::{AuthStatus, ContactItem, DirectoryClient, DirectoryError};

use crate::error::ProviderError;
use crate::traits::directory::{
    ConnectOutcome, ContactEntry, DirectoryProvider, MatchedAccount, SignInOutcome,
};
use crate::types::credentials::{ApiIdentity, SecondFactorSecret, VerificationCode};
use crate::types::phone::PhoneNumber;

/// HTTP-backed directory provider.
pub struct HttpDirectory {
    client: DirectoryClient,
}

impl HttpDirectory {
    /// Provider against the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: DirectoryClient::new(base_url),
        }
    }

    /// Wrap an existing wire client.
    pub fn from_client(client: DirectoryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DirectoryProvider for HttpDirectory {
    async fn connect(
        &mut self,
        identity: &ApiIdentity,
        phone: &PhoneNumber,
    ) -> Result<ConnectOutcome, ProviderError> {
        let status = self
            .client
            .connect(identity.api_id, &identity.api_hash, phone.as_str())
            .await
            .map_err(map_error)?;
        match status {
            AuthStatus::Authorized => Ok(ConnectOutcome::AlreadyAuthorized),
            AuthStatus::CodeSent => Ok(ConnectOutcome::CodeSent),
            AuthStatus::PasswordRequired => Err(ProviderError::Parse(
                "unexpected password_required on connect".to_string(),
            )),
        }
    }

    async fn request_code(&mut self, phone: &PhoneNumber) -> Result<(), ProviderError> {
        self.client
            .resend_code(phone.as_str())
            .await
            .map_err(map_error)
    }

    async fn verify_code(
        &mut self,
        phone: &PhoneNumber,
        code: &VerificationCode,
    ) -> Result<SignInOutcome, ProviderError> {
        let status = self
            .client
            .sign_in(phone.as_str(), code.as_str())
            .await
            .map_err(map_error)?;
        match status {
            AuthStatus::Authorized => Ok(SignInOutcome::Authorized),
            AuthStatus::PasswordRequired => Ok(SignInOutcome::PasswordRequired),
            AuthStatus::CodeSent => Err(ProviderError::Parse(
                "unexpected code_sent on sign-in".to_string(),
            )),
        }
    }

    async fn verify_password(
        &mut self,
        secret: &SecondFactorSecret,
    ) -> Result<(), ProviderError> {
        let status = self
            .client
            .verify_password(secret.as_str())
            .await
            .map_err(map_error)?;
        match status {
            AuthStatus::Authorized => Ok(()),
            other => Err(ProviderError::Parse(format!(
                "unexpected status after password verification: {other:?}"
            ))),
        }
    }

    async fn import_contacts(
        &mut self,
        entries: &[ContactEntry],
    ) -> Result<Vec<MatchedAccount>, ProviderError> {
        let contacts: Vec<ContactItem> = entries
            .iter()
            .map(|entry| ContactItem {
                client_id: entry.client_id,
                phone: entry.phone.as_str().to_string(),
                first_name: entry.first_name.clone(),
                last_name: entry.last_name.clone(),
            })
            .collect();

        let users = self
            .client
            .import_contacts(&contacts)
            .await
            .map_err(map_error)?;

        Ok(users
            .into_iter()
            .map(|user| MatchedAccount {
                first_name: user.first_name,
                last_name: user.last_name,
                username: user.username,
                phone: user.phone,
            })
            .collect())
    }

    async fn disconnect(&mut self) -> Result<(), ProviderError> {
        self.client.logout().await.map_err(map_error)
    }
}

/// Wire errors onto the pipeline taxonomy.
fn map_error(error: DirectoryError) -> ProviderError {
    match error {
        DirectoryError::Network(msg) => ProviderError::Connection(msg),
        DirectoryError::FloodWait { seconds } => ProviderError::Throttled {
            retry_after: Duration::from_secs(seconds),
        },
        DirectoryError::CodeInvalid => ProviderError::CodeInvalid,
        DirectoryError::PasswordInvalid => ProviderError::PasswordInvalid,
        DirectoryError::Unauthorized => ProviderError::Unauthorized,
        DirectoryError::NoPendingCode => ProviderError::Api {
            status: 400,
            message: "no pending verification code".to_string(),
        },
        DirectoryError::Api { status, message } => ProviderError::Api { status, message },
        DirectoryError::Parse(msg) => ProviderError::Parse(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flood_wait_maps_to_throttle() {
        let err = map_error(DirectoryError::FloodWait { seconds: 5 });
        match err {
            ProviderError::Throttled { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(5));
            }
            other => panic!("expected Throttled, got {other:?}"),
        }
    }

    #[test]
    fn test_credential_errors_map() {
        assert!(matches!(
            map_error(DirectoryError::CodeInvalid),
            ProviderError::CodeInvalid
        ));
        assert!(matches!(
            map_error(DirectoryError::PasswordInvalid),
            ProviderError::PasswordInvalid
        ));
        assert!(matches!(
            map_error(DirectoryError::Unauthorized),
            ProviderError::Unauthorized
        ));
    }

    #[test]
    fn test_network_error_is_session_fatal() {
        let err = map_error(DirectoryError::Network("reset by peer".to_string()));
        assert!(err.is_session_fatal());
    }
}
