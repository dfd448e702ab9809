use std::time::Duration;

const DEFAULT_REMOTE_TTL_SECS: u64 = 60;
const DEFAULT_LOCAL_TTL_SECS: u64 = 60;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 250;
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 5;

/// Timing knobs of the listing cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Expiry attached to remote entries.
    pub remote_ttl: Duration,
    /// Freshness window of the local slot.
    pub local_ttl: Duration,
    /// Upper bound for any single remote operation.
    pub operation_timeout: Duration,
    /// Minimum spacing between availability probes while the remote is down.
    pub probe_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            remote_ttl: Duration::from_secs(DEFAULT_REMOTE_TTL_SECS),
            local_ttl: Duration::from_secs(DEFAULT_LOCAL_TTL_SECS),
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
            probe_interval: Duration::from_secs(DEFAULT_PROBE_INTERVAL_SECS),
        }
    }
}
