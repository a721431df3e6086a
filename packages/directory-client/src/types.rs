//! Wire types for the directory provider API.

use serde::{Deserialize, Serialize};

/// Authentication status reported by the auth endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// The session is fully authorized.
    Authorized,
    /// A verification code was sent to the account's devices.
    CodeSent,
    /// Second-factor password verification is required.
    PasswordRequired,
}

/// Body for `POST /auth/connect`.
#[derive(Debug, Serialize)]
pub struct ConnectRequest {
    pub api_id: i64,
    pub api_hash: String,
    pub phone: String,
}

/// Response from `POST /auth/connect` and `POST /auth/resend`.
///
/// `code_token` correlates a later sign-in with the code request. It is
/// absent when the session is already authorized.
#[derive(Debug, Deserialize)]
pub struct ConnectResponse {
    pub status: AuthStatus,
    #[serde(default)]
    pub code_token: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Body for `POST /auth/resend`.
#[derive(Debug, Serialize)]
pub struct ResendRequest {
    pub phone: String,
}

/// Body for `POST /auth/sign-in`.
#[derive(Debug, Serialize)]
pub struct SignInRequest {
    pub phone: String,
    pub code: String,
    pub code_token: String,
}

/// Body for `POST /auth/password`.
#[derive(Debug, Serialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// Response from sign-in and password verification.
#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub status: AuthStatus,
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// One contact in a bulk import request.
///
/// `client_id` is the caller-assigned correlation id, unique within one
/// request. The display name fields are synthetic; the provider only needs
/// them to be present.
#[derive(Debug, Clone, Serialize)]
pub struct ContactItem {
    pub client_id: i64,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body for `POST /contacts/import`.
#[derive(Debug, Serialize)]
pub struct ImportContactsRequest {
    pub contacts: Vec<ContactItem>,
}

/// A registered account matched by a contact import.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub phone: String,
}

/// Response from `POST /contacts/import`.
#[derive(Debug, Deserialize)]
pub struct ImportContactsResponse {
    pub users: Vec<DirectoryUser>,
}

/// Error body the provider attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub retry_after: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_status_snake_case() {
        let status: AuthStatus = serde_json::from_str("\"code_sent\"").unwrap();
        assert_eq!(status, AuthStatus::CodeSent);
        let status: AuthStatus = serde_json::from_str("\"password_required\"").unwrap();
        assert_eq!(status, AuthStatus::PasswordRequired);
    }

    #[test]
    fn test_error_body_tolerates_missing_fields() {
        let body: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.error.is_none());
        assert!(body.retry_after.is_none());

        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":"flood_wait","retry_after":42}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("flood_wait"));
        assert_eq!(body.retry_after, Some(42));
    }

    #[test]
    fn test_directory_user_optional_fields() {
        let user: DirectoryUser =
            serde_json::from_str(r#"{"phone":"+911234567890"}"#).unwrap();
        assert!(user.first_name.is_none());
        assert!(user.username.is_none());
        assert_eq!(user.phone, "+911234567890");
    }
}
