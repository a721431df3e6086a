//! Mock implementations for testing.
//!
//! [`MockDirectory`] is a scripted [`DirectoryProvider`]: each call pops
//! the next queued outcome (or falls back to a benign default) and records
//! what it was asked, so tests can assert on submission order, retries,
//! and correlation ids without a network.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::traits::directory::{
    ConnectOutcome, ContactEntry, DirectoryProvider, MatchedAccount, SignInOutcome,
};
use crate::types::credentials::{ApiIdentity, SecondFactorSecret, VerificationCode};
use crate::types::phone::{NumberingPlan, PhoneNumber};

/// Scripted outcome for `connect`. Default when unqueued: `CodeSent`.
#[derive(Debug, Clone)]
pub enum ConnectScript {
    AlreadyAuthorized,
    CodeSent,
    Throttle(u64),
    ConnectionError(String),
}

/// Scripted outcome for `verify_code`. Default when unqueued: `Authorized`.
#[derive(Debug, Clone)]
pub enum SignInScript {
    Authorized,
    PasswordRequired,
    CodeInvalid,
    Throttle(u64),
    ConnectionError(String),
}

/// Scripted outcome for `verify_password`. Default when unqueued: `Authorized`.
#[derive(Debug, Clone)]
pub enum PasswordScript {
    Authorized,
    PasswordInvalid,
}

/// Scripted outcome for `import_contacts`. Default when unqueued: `NoMatches`.
#[derive(Debug, Clone)]
pub enum ImportScript {
    /// Return these accounts.
    Matches(Vec<MatchedAccount>),
    /// Return an empty match list (a normal outcome).
    NoMatches,
    /// Throttle with the given retry-after seconds.
    Throttle(u64),
    /// Fail the batch with an API error.
    Fail(String),
    /// Drop the connection (session-fatal).
    ConnectionLost,
}

/// A scripted directory provider for tests.
#[derive(Debug, Default)]
pub struct MockDirectory {
    connect_script: VecDeque<ConnectScript>,
    sign_in_script: VecDeque<SignInScript>,
    password_script: VecDeque<PasswordScript>,
    import_script: VecDeque<ImportScript>,
    code_requests: usize,
    import_calls: Vec<Vec<ContactEntry>>,
    disconnected: bool,
}

impl MockDirectory {
    /// Provider that walks the code flow with benign defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose `connect` reports an existing authorization.
    pub fn already_authorized() -> Self {
        Self::new().with_connect(ConnectScript::AlreadyAuthorized)
    }

    /// Queue a `connect` outcome.
    pub fn with_connect(mut self, script: ConnectScript) -> Self {
        self.connect_script.push_back(script);
        self
    }

    /// Queue a `verify_code` outcome.
    pub fn with_sign_in(mut self, script: SignInScript) -> Self {
        self.sign_in_script.push_back(script);
        self
    }

    /// Queue a `verify_password` outcome.
    pub fn with_password(mut self, script: PasswordScript) -> Self {
        self.password_script.push_back(script);
        self
    }

    /// Queue an `import_contacts` outcome. Queue one per expected call;
    /// a throttled batch consumes one outcome per submission attempt.
    pub fn with_import(mut self, script: ImportScript) -> Self {
        self.import_script.push_back(script);
        self
    }

    /// A match whose account mirrors the given entry's phone.
    pub fn match_for(entry_phone: &PhoneNumber, first_name: &str) -> MatchedAccount {
        MatchedAccount {
            first_name: Some(first_name.to_string()),
            last_name: None,
            username: Some(format!("user_{}", first_name.to_lowercase())),
            phone: entry_phone.as_str().trim_start_matches('+').to_string(),
        }
    }

    /// How many times a code was (re-)requested via `request_code`.
    pub fn code_request_count(&self) -> usize {
        self.code_requests
    }

    /// Every batch submitted to `import_contacts`, in call order,
    /// including resubmissions after throttling.
    pub fn import_batches(&self) -> &[Vec<ContactEntry>] {
        &self.import_calls
    }

    pub fn import_call_count(&self) -> usize {
        self.import_calls.len()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

#[async_trait]
impl DirectoryProvider for MockDirectory {
    async fn connect(
        &mut self,
        _identity: &ApiIdentity,
        _phone: &PhoneNumber,
    ) -> Result<ConnectOutcome, ProviderError> {
        match self.connect_script.pop_front() {
            Some(ConnectScript::AlreadyAuthorized) => Ok(ConnectOutcome::AlreadyAuthorized),
            Some(ConnectScript::CodeSent) | None => Ok(ConnectOutcome::CodeSent),
            Some(ConnectScript::Throttle(secs)) => Err(ProviderError::Throttled {
                retry_after: Duration::from_secs(secs),
            }),
            Some(ConnectScript::ConnectionError(msg)) => Err(ProviderError::Connection(msg)),
        }
    }

    async fn request_code(&mut self, _phone: &PhoneNumber) -> Result<(), ProviderError> {
        self.code_requests += 1;
        Ok(())
    }

    async fn verify_code(
        &mut self,
        _phone: &PhoneNumber,
        _code: &VerificationCode,
    ) -> Result<SignInOutcome, ProviderError> {
        match self.sign_in_script.pop_front() {
            Some(SignInScript::Authorized) | None => Ok(SignInOutcome::Authorized),
            Some(SignInScript::PasswordRequired) => Ok(SignInOutcome::PasswordRequired),
            Some(SignInScript::CodeInvalid) => Err(ProviderError::CodeInvalid),
            Some(SignInScript::Throttle(secs)) => Err(ProviderError::Throttled {
                retry_after: Duration::from_secs(secs),
            }),
            Some(SignInScript::ConnectionError(msg)) => Err(ProviderError::Connection(msg)),
        }
    }

    async fn verify_password(
        &mut self,
        _secret: &SecondFactorSecret,
    ) -> Result<(), ProviderError> {
        match self.password_script.pop_front() {
            Some(PasswordScript::Authorized) | None => Ok(()),
            Some(PasswordScript::PasswordInvalid) => Err(ProviderError::PasswordInvalid),
        }
    }

    async fn import_contacts(
        &mut self,
        entries: &[ContactEntry],
    ) -> Result<Vec<MatchedAccount>, ProviderError> {
        self.import_calls.push(entries.to_vec());
        match self.import_script.pop_front() {
            Some(ImportScript::Matches(accounts)) => Ok(accounts),
            Some(ImportScript::NoMatches) | None => Ok(Vec::new()),
            Some(ImportScript::Throttle(secs)) => Err(ProviderError::Throttled {
                retry_after: Duration::from_secs(secs),
            }),
            Some(ImportScript::Fail(msg)) => Err(ProviderError::Api {
                status: 500,
                message: msg,
            }),
            Some(ImportScript::ConnectionLost) => {
                Err(ProviderError::Connection("connection lost".to_string()))
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), ProviderError> {
        self.disconnected = true;
        Ok(())
    }
}

/// Identity used across tests.
pub fn test_identity() -> ApiIdentity {
    ApiIdentity::new(12345, "test-hash")
}

/// A deterministic canonical phone number, distinct per `n` (0..=99).
pub fn test_phone(n: usize) -> PhoneNumber {
    NumberingPlan::default()
        .normalize(&format!("98765432{n:02}"))
        .expect("test phone is valid")
}

/// `count` deterministic canonical numbers in order.
pub fn test_numbers(count: usize) -> Vec<PhoneNumber> {
    (0..count).map(test_phone).collect()
}
