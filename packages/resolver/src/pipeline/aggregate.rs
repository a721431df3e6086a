//! Result aggregation across batches.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::account::ResolvedAccount;
use crate::types::batch::BatchOutcome;
use crate::types::report::{BatchSummary, ResolutionReport};

/// Accumulates batch outcomes into the final [`ResolutionReport`].
///
/// Append-only; idempotent per batch index, so replaying an outcome
/// cannot double-count accounts. The submitted-numbers denominator is
/// captured at construction, which keeps the success rate correct even
/// when batches fail before contributing results.
pub struct ResultAggregator {
    total_submitted: usize,
    started_at: DateTime<Utc>,
    accounts: Vec<ResolvedAccount>,
    batches: Vec<BatchSummary>,
    seen: HashSet<usize>,
    cancelled: bool,
}

impl ResultAggregator {
    /// Start aggregating a run over `total_submitted` numbers.
    pub fn new(total_submitted: usize) -> Self {
        Self {
            total_submitted,
            started_at: Utc::now(),
            accounts: Vec::new(),
            batches: Vec::new(),
            seen: HashSet::new(),
            cancelled: false,
        }
    }

    /// Fold one terminal batch outcome into the report. Outcomes for an
    /// already-seen batch index are ignored.
    pub fn append(&mut self, outcome: &BatchOutcome) {
        if !self.seen.insert(outcome.index) {
            return;
        }
        self.accounts.extend(outcome.accounts.iter().cloned());
        self.batches.push(BatchSummary {
            index: outcome.index,
            size: outcome.size,
            status: outcome.status(),
            accounts_found: outcome.accounts.len(),
            error: outcome.error.clone(),
            throttle_waits: outcome.throttle_waits,
        });
    }

    /// Record that the run stopped on caller cancellation.
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Accounts matched so far (partial results stay retrievable).
    pub fn matched(&self) -> usize {
        self.accounts.len()
    }

    /// Produce the terminal report.
    pub fn finalize(self, run_id: Uuid) -> ResolutionReport {
        ResolutionReport {
            run_id,
            total_submitted: self.total_submitted,
            accounts: self.accounts,
            batches: self.batches,
            cancelled: self.cancelled,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
