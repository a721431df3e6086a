//! Phone number resolution pipeline.
//!
//! Resolves a list of phone numbers against a social-messaging platform's
//! directory, reporting which numbers belong to registered accounts and
//! what public profile data (name, handle) those accounts expose.
//!
//! # Architecture
//!
//! ```text
//! raw numbers ──► NumberingPlan::normalize ──► Vec<PhoneNumber>
//!                                                   │
//! ApiIdentity ──► AuthSession (state machine)       │
//!                      │ Authenticated              ▼
//!                      └──────────────► BatchResolver::run
//!                                            │  batches, throttle retry,
//!                                            │  pacing, cancellation
//!                                            ▼
//!                                      ResultAggregator ──► ResolutionReport
//! ```
//!
//! The run is strictly sequential batch by batch; progress flows out as
//! [`ResolveEvent`]s over a channel, never as shared mutable state.
//!
//! # Usage
//!
//! ```rust,ignore
//! use resolver_core::{
//!     AuthSession, BatchResolver, HttpDirectory, NumberingPlan, ResolveConfig,
//! };
//!
//! let plan = NumberingPlan::default();
//! let numbers = plan.normalize_all(raw_lines.iter().map(String::as_str));
//!
//! let provider = HttpDirectory::new("https://directory.example.com/v1");
//! let mut session = AuthSession::new(provider, identity, own_phone);
//! session.connect().await?;
//! // ... drive submit_code / submit_password until authenticated ...
//!
//! let mut resolver = BatchResolver::new(session, ResolveConfig::default())?;
//! let report = resolver.run(&numbers).await;
//! println!("matched {} of {}", report.matched(), report.total_submitted);
//! ```
//!
//! # Modules
//!
//! - [`auth`] - Session authentication state machine
//! - [`pipeline`] - Batch resolver and result aggregation
//! - [`traits`] - The directory provider boundary
//! - [`providers`] - HTTP-backed provider implementation
//! - [`types`] - Value types, config, events, report
//! - [`testing`] - Scripted mock provider for tests

pub mod auth;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use auth::{AuthSession, AuthState};
pub use error::{AuthError, ProviderError, ResolveError};
pub use pipeline::{BatchResolver, ResultAggregator};
pub use providers::HttpDirectory;
pub use traits::directory::{
    ConnectOutcome, ContactEntry, DirectoryProvider, MatchedAccount, SignInOutcome,
};
pub use types::{
    account::ResolvedAccount,
    batch::{partition, BatchOutcome, BatchStatus, ResolutionBatch},
    config::ResolveConfig,
    credentials::{ApiIdentity, SecondFactorSecret, VerificationCode},
    events::ResolveEvent,
    phone::{NumberingPlan, PhoneNumber, MIN_SIGNIFICANT_DIGITS},
    report::{BatchSummary, ResolutionReport},
};
