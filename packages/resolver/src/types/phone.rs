//! Phone number normalization.
//!
//! Raw input (spreadsheet cells, form fields) arrives with arbitrary
//! formatting noise: spaces, dashes, parentheses, stray country prefixes.
//! [`NumberingPlan::normalize`] reduces every variant to exactly one
//! canonical dialable form, or rejects the input.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum significant digits for a valid subscriber number.
pub const MIN_SIGNIFICANT_DIGITS: usize = 10;

/// A canonical dialable phone number: `+<countrycode><subscriber>`.
///
/// Immutable once constructed; only [`NumberingPlan::normalize`] produces
/// values of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accept input that is already in canonical form: a leading `+`
    /// followed by at least [`MIN_SIGNIFICANT_DIGITS`] digits and nothing
    /// else. For noisy input, use [`NumberingPlan::normalize`].
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix('+')?;
        if digits.len() < MIN_SIGNIFICANT_DIGITS
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalization rules for one deployment's numbering plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberingPlan {
    /// Country-code prefix prepended to the subscriber digits,
    /// including the leading `+`.
    pub country_prefix: String,
}

impl Default for NumberingPlan {
    fn default() -> Self {
        Self {
            country_prefix: "+91".to_string(),
        }
    }
}

impl NumberingPlan {
    /// Create a plan with the given country prefix (e.g. `"+91"`).
    pub fn new(country_prefix: impl Into<String>) -> Self {
        Self {
            country_prefix: country_prefix.into(),
        }
    }

    /// Normalize raw text to a canonical phone number.
    ///
    /// Strips every non-digit character, rejects inputs with fewer than
    /// [`MIN_SIGNIFICANT_DIGITS`] digits, keeps the trailing subscriber
    /// digits and prepends the configured prefix. Pure and idempotent:
    /// normalizing an already-canonical number returns it unchanged.
    pub fn normalize(&self, raw: &str) -> Option<PhoneNumber> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() < MIN_SIGNIFICANT_DIGITS {
            return None;
        }
        let subscriber = &digits[digits.len() - MIN_SIGNIFICANT_DIGITS..];
        Some(PhoneNumber(format!("{}{}", self.country_prefix, subscriber)))
    }

    /// Normalize a sequence of raw inputs, dropping invalid entries
    /// silently (malformed phones are not a run failure).
    pub fn normalize_all<'a, I>(&self, raws: I) -> Vec<PhoneNumber>
    where
        I: IntoIterator<Item = &'a str>,
    {
        raws.into_iter()
            .filter_map(|raw| self.normalize(raw))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_inputs() {
        let plan = NumberingPlan::default();
        assert!(plan.normalize("").is_none());
        assert!(plan.normalize("12345").is_none());
        assert!(plan.normalize("123-456-789").is_none()); // 9 digits
        assert!(plan.normalize("no digits at all").is_none());
    }

    #[test]
    fn test_strips_formatting_noise() {
        let plan = NumberingPlan::default();
        let canonical = plan.normalize("9876543210").unwrap();
        assert_eq!(plan.normalize("(987) 654-3210").unwrap(), canonical);
        assert_eq!(plan.normalize("987 654 3210").unwrap(), canonical);
        assert_eq!(plan.normalize("987-654-3210").unwrap(), canonical);
        assert_eq!(canonical.as_str(), "+919876543210");
    }

    #[test]
    fn test_keeps_last_ten_digits() {
        let plan = NumberingPlan::default();
        // Leading trunk/country digits are dropped in favor of the
        // trailing subscriber number.
        assert_eq!(
            plan.normalize("09876543210").unwrap().as_str(),
            "+919876543210"
        );
        assert_eq!(
            plan.normalize("91 98765 43210").unwrap().as_str(),
            "+919876543210"
        );
    }

    #[test]
    fn test_idempotent_on_canonical_form() {
        let plan = NumberingPlan::default();
        let first = plan.normalize("+91 98765-43210").unwrap();
        let second = plan.normalize(first.as_str()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_configurable_prefix() {
        let plan = NumberingPlan::new("+1");
        assert_eq!(
            plan.normalize("555 867 5309 x").unwrap().as_str(),
            "+15558675309"
        );
        // Still idempotent under a different plan.
        let canonical = plan.normalize("5558675309").unwrap();
        assert_eq!(plan.normalize(canonical.as_str()).unwrap(), canonical);
    }

    #[test]
    fn test_parse_accepts_only_canonical_form() {
        assert!(PhoneNumber::parse("+919876543210").is_some());
        assert!(PhoneNumber::parse("919876543210").is_none());
        assert!(PhoneNumber::parse("+91 98765 43210").is_none());
        assert!(PhoneNumber::parse("+12345").is_none());
    }

    #[test]
    fn test_normalize_all_drops_invalid() {
        let plan = NumberingPlan::default();
        let numbers = plan.normalize_all(vec!["9876543210", "bogus", "123", "9000000001"]);
        assert_eq!(numbers.len(), 2);
        assert_eq!(numbers[0].as_str(), "+919876543210");
        assert_eq!(numbers[1].as_str(), "+919000000001");
    }
}
