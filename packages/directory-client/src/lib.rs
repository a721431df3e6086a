//! Pure REST client for the directory provider API.
//!
//! A minimal client for the messaging platform's directory endpoints:
//! session authentication (code and optional second-factor password) and
//! bulk contact import. No domain logic lives here.
//!
//! # Example
//!
//! ```rust,ignore
//! use directory_client::DirectoryClient;
//!
//! let mut client = DirectoryClient::new("https://directory.example.com/v1");
//!
//! let outcome = client.connect(12345, "api-hash", "+911234567890").await?;
//! // ... drive sign-in, then:
//! let users = client.import_contacts(&contacts).await?;
//! ```
//!
//! The client is stateful: it holds the code token returned by `connect`
//! (echoed back on `sign_in`) and the auth token returned by a successful
//! sign-in (sent as a bearer header on `import_contacts`).

pub mod error;
pub mod types;

pub use error::{DirectoryError, Result};
pub use types::{
    ApiErrorBody, AuthStatus, ConnectResponse, ContactItem, DirectoryUser,
    ImportContactsResponse, SignInResponse,
};

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use types::{ConnectRequest, ImportContactsRequest, PasswordRequest, ResendRequest, SignInRequest};

/// Fallback wait when a 429 carries no usable retry-after value.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Stateful client for the directory provider's auth and import endpoints.
pub struct DirectoryClient {
    http_client: Client,
    base_url: String,
    code_token: Option<String>,
    auth_token: Option<String>,
}

impl DirectoryClient {
    /// Create a new client against the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
            code_token: None,
            auth_token: None,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True once a sign-in has produced an auth token.
    pub fn is_authorized(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Open a session for the given identity and phone.
    ///
    /// Returns `Authorized` when the provider recognizes a prior
    /// authorization, otherwise `CodeSent` after dispatching a verification
    /// code. The code token is retained for the subsequent `sign_in`.
    pub async fn connect(
        &mut self,
        api_id: i64,
        api_hash: &str,
        phone: &str,
    ) -> Result<AuthStatus> {
        let request = ConnectRequest {
            api_id,
            api_hash: api_hash.to_string(),
            phone: phone.to_string(),
        };

        let response: ConnectResponse = self.post("auth/connect", &request).await?;

        debug!(status = ?response.status, "directory connect");
        self.code_token = response.code_token;
        if let Some(token) = response.auth_token {
            self.auth_token = Some(token);
        }
        Ok(response.status)
    }

    /// Re-request a verification code for the phone under authentication.
    pub async fn resend_code(&mut self, phone: &str) -> Result<()> {
        let request = ResendRequest {
            phone: phone.to_string(),
        };

        let response: ConnectResponse = self.post("auth/resend", &request).await?;
        self.code_token = response.code_token;
        Ok(())
    }

    /// Attempt sign-in with a verification code.
    ///
    /// Returns `Authorized` on success or `PasswordRequired` when the
    /// account has a second factor configured. A wrong or expired code is
    /// surfaced as [`DirectoryError::CodeInvalid`].
    pub async fn sign_in(&mut self, phone: &str, code: &str) -> Result<AuthStatus> {
        let code_token = self
            .code_token
            .clone()
            .ok_or(DirectoryError::NoPendingCode)?;

        let request = SignInRequest {
            phone: phone.to_string(),
            code: code.to_string(),
            code_token,
        };

        let response: SignInResponse = self.post("auth/sign-in", &request).await?;

        debug!(status = ?response.status, "directory sign-in");
        if let Some(token) = response.auth_token {
            self.auth_token = Some(token);
        }
        Ok(response.status)
    }

    /// Verify the second-factor password for the pending sign-in.
    pub async fn verify_password(&mut self, password: &str) -> Result<AuthStatus> {
        let request = PasswordRequest {
            password: password.to_string(),
        };

        let response: SignInResponse = self.post("auth/password", &request).await?;

        if let Some(token) = response.auth_token {
            self.auth_token = Some(token);
        }
        Ok(response.status)
    }

    /// Submit one batch of contacts and return the matched accounts.
    ///
    /// Requires a prior successful sign-in. An empty `users` list is a
    /// normal response, not an error.
    pub async fn import_contacts(
        &mut self,
        contacts: &[ContactItem],
    ) -> Result<Vec<DirectoryUser>> {
        let auth_token = self
            .auth_token
            .clone()
            .ok_or(DirectoryError::Unauthorized)?;

        let request = ImportContactsRequest {
            contacts: contacts.to_vec(),
        };

        let response = self
            .http_client
            .post(format!("{}/contacts/import", self.base_url))
            .bearer_auth(auth_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "contact import request failed");
                DirectoryError::Network(e.to_string())
            })?;

        let response = Self::check_status(response).await?;
        let parsed: ImportContactsResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Parse(e.to_string()))?;

        debug!(
            submitted = contacts.len(),
            matched = parsed.users.len(),
            "contact import"
        );
        Ok(parsed.users)
    }

    /// Release the session on the provider side and drop held tokens.
    pub async fn logout(&mut self) -> Result<()> {
        self.code_token = None;

        if let Some(token) = self.auth_token.take() {
            let response = self
                .http_client
                .post(format!("{}/auth/logout", self.base_url))
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| DirectoryError::Network(e.to_string()))?;
            Self::check_status(response).await?;
        }
        Ok(())
    }

    /// POST a JSON body and parse a JSON response, with shared error mapping.
    async fn post<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(path, error = %e, "directory request failed");
                DirectoryError::Network(e.to_string())
            })?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| DirectoryError::Parse(e.to_string()))
    }

    /// Map non-2xx responses onto structured errors.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let header_retry = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "directory API error");
        Err(classify_error(status, &body, header_retry))
    }
}

/// Turn an HTTP status plus error body into a [`DirectoryError`].
///
/// The provider signals throttling with 429 and a `retry_after` value in
/// the body or the `Retry-After` header. Credential rejections carry a
/// machine-readable `error` code.
fn classify_error(status: StatusCode, body: &str, header_retry: Option<u64>) -> DirectoryError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let seconds = parsed
            .retry_after
            .or(header_retry)
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return DirectoryError::FloodWait { seconds };
    }

    match parsed.error.as_deref() {
        Some("code_invalid") | Some("code_expired") => DirectoryError::CodeInvalid,
        Some("password_invalid") => DirectoryError::PasswordInvalid,
        Some("unauthorized") => DirectoryError::Unauthorized,
        _ if status == StatusCode::UNAUTHORIZED => DirectoryError::Unauthorized,
        _ => DirectoryError::Api {
            status: status.as_u16(),
            message: parsed
                .message
                .unwrap_or_else(|| body.trim().to_string()),
        },
    }
}
