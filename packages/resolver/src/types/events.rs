//! Progress events emitted during a resolution run.
//!
//! Events flow one way, resolver to subscriber, over an unbounded channel.
//! The run never blocks on a slow or absent consumer.

use uuid::Uuid;

/// Progress events for a resolution run.
#[derive(Debug, Clone)]
pub enum ResolveEvent {
    /// The run has partitioned its input and is about to submit.
    RunStarted {
        run_id: Uuid,
        total_numbers: usize,
        total_batches: usize,
    },
    /// A batch is being submitted.
    BatchStarted {
        index: usize,
        total_batches: usize,
        size: usize,
    },
    /// A batch completed; zero matches is a normal outcome.
    BatchSucceeded {
        index: usize,
        total_batches: usize,
        accounts_found: usize,
    },
    /// A batch failed with a non-throttle error and was recorded as such.
    BatchFailed {
        index: usize,
        total_batches: usize,
        error: String,
    },
    /// The provider throttled a batch; it will be resubmitted after the wait.
    Throttled { index: usize, wait_secs: u64 },
    /// Countdown tick during the inter-batch wait.
    Waiting { remaining_secs: u64 },
    /// The run was cancelled; the report keeps completed batches.
    Cancelled,
    /// All batches reached a terminal outcome (or the run stopped early).
    RunCompleted {
        matched: usize,
        total_numbers: usize,
    },
}
