//! The final resolution report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::account::ResolvedAccount;
use crate::types::batch::BatchStatus;

/// Per-batch detail carried in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Zero-based batch index.
    pub index: usize,
    /// Numbers submitted in this batch.
    pub size: usize,
    /// Terminal status.
    pub status: BatchStatus,
    /// Accounts the provider matched.
    pub accounts_found: usize,
    /// Error recorded when the batch failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Throttle waits absorbed before the terminal outcome.
    pub throttle_waits: u32,
}

/// Terminal artifact of a resolution run.
///
/// Account order is batch submission order, then provider return order
/// within each batch. A run always finalizes into a report, even when
/// every batch failed or the run was cancelled partway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Identity of this run.
    pub run_id: Uuid,
    /// Numbers submitted, captured at run start (not re-derived from
    /// batch sizes, so it stays correct when batches fail).
    pub total_submitted: usize,
    /// Matched accounts in insertion order.
    pub accounts: Vec<ResolvedAccount>,
    /// Per-batch detail in batch order.
    pub batches: Vec<BatchSummary>,
    /// True when the run stopped on caller cancellation.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ResolutionReport {
    /// Number of matched accounts.
    pub fn matched(&self) -> usize {
        self.accounts.len()
    }

    /// Matched / submitted, as a fraction in `[0, 1]`. Zero when nothing
    /// was submitted.
    pub fn success_rate(&self) -> f64 {
        if self.total_submitted == 0 {
            0.0
        } else {
            self.accounts.len() as f64 / self.total_submitted as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(total: usize, matched: usize) -> ResolutionReport {
        let account = ResolvedAccount {
            first_name: "A".to_string(),
            last_name: String::new(),
            username: None,
            phone: "+919876543210".to_string(),
        };
        ResolutionReport {
            run_id: Uuid::new_v4(),
            total_submitted: total,
            accounts: vec![account; matched],
            batches: Vec::new(),
            cancelled: false,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(report(0, 0).success_rate(), 0.0);
        assert_eq!(report(10, 5).success_rate(), 0.5);
        assert_eq!(report(4, 4).success_rate(), 1.0);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_string(&report(2, 1)).unwrap();
        assert!(json.contains("total_submitted"));
        assert!(json.contains("+919876543210"));
    }
}
