//! Upload engine configuration.

use serde::{Deserialize, Serialize};

/// Upload limits and conflict-retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum upload size in bytes (default 100 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// How many times a lost version race is retried before surfacing.
    #[serde(default = "default_max_retries")]
    pub max_conflict_retries: u32,
    /// Base backoff between retries; attempt `n` waits `n * base`.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: default_max_upload(),
            max_conflict_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_max_upload() -> u64 {
    100 * 1024 * 1024
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_backoff() -> u64 {
    10
}
