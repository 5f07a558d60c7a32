// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

/// The default deadline for a single round trip to the store.
pub const DEFAULT_ROUND_TRIP_TIMEOUT: Duration = Duration::from_secs(5);

/// The default maximum number of keys per fetch and rows per batched write.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 256;

#[derive(Clone, Debug)]
pub struct DirectoryConfig {
    /// Deadline for every single round trip to the store.
    ///
    /// A round trip exceeding it fails with a timeout storage error. Operations issuing several
    /// round trips (for example expanding a deep group hierarchy) can take longer than this in
    /// total.
    pub round_trip_timeout: Duration,

    /// Maximum number of keys requested in one multi-key fetch and maximum number of rows written
    /// in one batch.
    ///
    /// Larger requests are split into chunks of this size. A single index row is never split.
    pub max_batch_size: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            round_trip_timeout: DEFAULT_ROUND_TRIP_TIMEOUT,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}
