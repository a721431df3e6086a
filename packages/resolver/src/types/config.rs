//! Configuration for a resolution run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the batch resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Numbers per contact-import request.
    ///
    /// Smaller batches reduce the blast radius of one failed request;
    /// larger batches finish sooner. Must be at least 1. Default: 10.
    pub batch_size: usize,

    /// Wait between successful batches.
    ///
    /// Paces submissions to preempt provider throttling rather than
    /// merely reacting to it. The original deployment settled on 211
    /// seconds; that remains the default.
    pub inter_batch_delay: Duration,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            inter_batch_delay: Duration::from_secs(211),
        }
    }
}

impl ResolveConfig {
    /// Config with no inter-batch pacing, for small runs and tests.
    pub fn without_delay(batch_size: usize) -> Self {
        Self {
            batch_size,
            inter_batch_delay: Duration::ZERO,
        }
    }
}
