//! Environment configuration for the scout binary.

use anyhow::{Context, Result};
use std::env;

/// Credentials and provider endpoint, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_id: i64,
    pub api_hash: String,
    /// The operator's own phone, canonical `+<cc><subscriber>` form.
    pub account_phone: String,
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables. `.env` files are
    /// honored in development.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_id: env::var("SCOUT_API_ID")
                .context("SCOUT_API_ID must be set")?
                .parse()
                .context("SCOUT_API_ID must be a number")?,
            api_hash: env::var("SCOUT_API_HASH").context("SCOUT_API_HASH must be set")?,
            account_phone: env::var("SCOUT_ACCOUNT_PHONE")
                .context("SCOUT_ACCOUNT_PHONE must be set")?,
            base_url: env::var("SCOUT_DIRECTORY_URL")
                .context("SCOUT_DIRECTORY_URL must be set")?,
        })
    }
}
