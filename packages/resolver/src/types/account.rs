//! Resolved account results.

use serde::{Deserialize, Serialize};

use crate::traits::directory::MatchedAccount;

/// A registered account matched to one of the submitted phone numbers.
///
/// Produced only by the batch resolver, appended to the report exactly
/// once per distinct match the provider returned for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAccount {
    /// First name as exposed by the account (empty when hidden).
    #[serde(default)]
    pub first_name: String,
    /// Last name as exposed by the account (empty when hidden).
    #[serde(default)]
    pub last_name: String,
    /// Public handle, if the account has one.
    #[serde(default)]
    pub username: Option<String>,
    /// Canonical phone number the account is registered under.
    pub phone: String,
}

impl ResolvedAccount {
    /// Build from a provider match, defaulting hidden name fields to empty
    /// and canonicalizing the phone to its `+`-prefixed form.
    pub fn from_match(account: MatchedAccount) -> Self {
        let phone = if account.phone.starts_with('+') {
            account.phone
        } else {
            format!("+{}", account.phone)
        };
        Self {
            first_name: account.first_name.unwrap_or_default(),
            last_name: account.last_name.unwrap_or_default(),
            username: account.username,
            phone,
        }
    }

    /// Display name: `first last`, trimmed when either part is empty.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_match_defaults_and_phone_prefix() {
        let account = ResolvedAccount::from_match(MatchedAccount {
            first_name: None,
            last_name: None,
            username: Some("someone".to_string()),
            phone: "919876543210".to_string(),
        });
        assert_eq!(account.first_name, "");
        assert_eq!(account.last_name, "");
        assert_eq!(account.phone, "+919876543210");
    }

    #[test]
    fn test_display_name_trims_empty_parts() {
        let account = ResolvedAccount {
            first_name: "Asha".to_string(),
            last_name: String::new(),
            username: None,
            phone: "+919876543210".to_string(),
        };
        assert_eq!(account.display_name(), "Asha");
    }
}
