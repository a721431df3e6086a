//! Batch partitioning and per-batch outcomes.

use serde::{Deserialize, Serialize};

use crate::traits::directory::ContactEntry;
use crate::types::account::ResolvedAccount;
use crate::types::phone::PhoneNumber;

/// Synthetic display name attached to imported contacts. The provider
/// requires one but never surfaces it back to the matched account.
pub(crate) const SYNTHETIC_FIRST_NAME: &str = "A";

/// Lifecycle of one batch within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Not yet submitted.
    Pending,
    /// Submitted, awaiting the provider's response.
    Submitted,
    /// Provider responded; matches (possibly zero) collected.
    Succeeded,
    /// Provider throttled the submission; will be resubmitted.
    Throttled,
    /// Provider rejected the batch with a non-throttle error.
    Failed,
}

/// One ordered group of phone numbers submitted together.
#[derive(Debug, Clone)]
pub struct ResolutionBatch {
    /// Zero-based position within the run.
    pub index: usize,
    /// Numbers in original input order.
    pub numbers: Vec<PhoneNumber>,
    /// Current lifecycle status.
    pub status: BatchStatus,
}

impl ResolutionBatch {
    /// Contact-import entries for this batch. Correlation ids restart at
    /// 0 for each batch, as the provider's bulk call requires.
    pub fn contact_entries(&self) -> Vec<ContactEntry> {
        self.numbers
            .iter()
            .enumerate()
            .map(|(client_id, phone)| ContactEntry {
                client_id: client_id as i64,
                phone: phone.clone(),
                first_name: SYNTHETIC_FIRST_NAME.to_string(),
                last_name: String::new(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

/// Partition numbers into contiguous batches of at most `batch_size`,
/// preserving input order. Batch count is `ceil(total / batch_size)`.
pub fn partition(numbers: &[PhoneNumber], batch_size: usize) -> Vec<ResolutionBatch> {
    assert!(batch_size >= 1, "batch_size must be at least 1");
    numbers
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| ResolutionBatch {
            index,
            numbers: chunk.to_vec(),
            status: BatchStatus::Pending,
        })
        .collect()
}

/// Terminal outcome of one batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Zero-based batch index.
    pub index: usize,
    /// Numbers submitted in this batch.
    pub size: usize,
    /// Accounts the provider matched, in provider return order.
    pub accounts: Vec<ResolvedAccount>,
    /// Error recorded when the batch failed.
    pub error: Option<String>,
    /// How many throttle waits preceded the terminal outcome.
    pub throttle_waits: u32,
}

impl BatchOutcome {
    pub fn succeeded(
        index: usize,
        size: usize,
        accounts: Vec<ResolvedAccount>,
        throttle_waits: u32,
    ) -> Self {
        Self {
            index,
            size,
            accounts,
            error: None,
            throttle_waits,
        }
    }

    pub fn failed(index: usize, size: usize, error: String, throttle_waits: u32) -> Self {
        Self {
            index,
            size,
            accounts: Vec::new(),
            error: Some(error),
            throttle_waits,
        }
    }

    pub fn status(&self) -> BatchStatus {
        if self.error.is_some() {
            BatchStatus::Failed
        } else {
            BatchStatus::Succeeded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::phone::NumberingPlan;

    fn numbers(n: usize) -> Vec<PhoneNumber> {
        let plan = NumberingPlan::default();
        (0..n)
            .map(|i| plan.normalize(&format!("98765432{i:02}")).unwrap())
            .collect()
    }

    #[test]
    fn test_partition_preserves_order_and_sizes() {
        let input = numbers(25);
        let batches = partition(&input, 10);

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 10);
        assert_eq!(batches[1].len(), 10);
        assert_eq!(batches[2].len(), 5);
        assert_eq!(batches[0].numbers[0], input[0]);
        assert_eq!(batches[2].numbers[4], input[24]);
        assert!(batches.iter().all(|b| b.status == BatchStatus::Pending));
    }

    #[test]
    fn test_partition_exact_multiple() {
        let batches = partition(&numbers(20), 10);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 10));
    }

    #[test]
    fn test_partition_empty_input() {
        let batches = partition(&[], 10);
        assert!(batches.is_empty());
    }

    #[test]
    fn test_correlation_ids_restart_per_batch() {
        let batches = partition(&numbers(12), 5);
        for batch in &batches {
            let entries = batch.contact_entries();
            let ids: Vec<i64> = entries.iter().map(|e| e.client_id).collect();
            let expected: Vec<i64> = (0..batch.len() as i64).collect();
            assert_eq!(ids, expected);
        }
    }
}
