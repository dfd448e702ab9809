//! Two-tier listing cache with lazy availability tracking.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use metrics::counter;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

use super::config::CacheConfig;
use super::error::CacheError;
use super::lock::mutex_lock;
use super::remote::RemoteCache;
use super::store::{ListingSnapshot, LocalSnapshotStore};

/// Remote key of the unfiltered listing snapshot.
pub const LISTING_KEY: &str = "prompts";

const SOURCE: &str = "cache::layer";
const METRIC_HIT: &str = "promptdeck_cache_hit_total";
const METRIC_MISS: &str = "promptdeck_cache_miss_total";
const METRIC_DEGRADED: &str = "promptdeck_cache_degraded_total";
const METRIC_INVALIDATE: &str = "promptdeck_cache_invalidate_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Remote,
    Local,
}

impl CacheTier {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheTier::Remote => "remote",
            CacheTier::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRead {
    Hit {
        tier: CacheTier,
        snapshot: ListingSnapshot,
    },
    Miss,
}

struct RemoteTier {
    client: Arc<dyn RemoteCache>,
    available: AtomicBool,
    probing: AtomicBool,
    last_probe: Mutex<Option<Instant>>,
}

impl RemoteTier {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn mark_ready(&self) {
        if !self.available.swap(true, Ordering::SeqCst) {
            info!(target: "promptdeck::cache", "remote listing cache ready");
        }
    }

    fn degrade(&self, op: &'static str, err: &CacheError) {
        counter!(METRIC_DEGRADED, "op" => op).increment(1);
        if self.available.swap(false, Ordering::SeqCst) {
            warn!(
                target: "promptdeck::cache",
                op,
                error = %err,
                "remote listing cache unavailable; serving from the local tier"
            );
        } else {
            debug!(target: "promptdeck::cache", op, error = %err, "remote listing cache still unavailable");
        }
    }

    /// Reserve the right to run a probe. At most one probe runs at a time
    /// and probes start at least `interval` apart.
    fn claim_probe(&self, interval: Duration) -> bool {
        let mut last = mutex_lock(&self.last_probe, SOURCE, "claim_probe");
        if self.probing.load(Ordering::SeqCst) {
            return false;
        }
        if last.is_some_and(|at| at.elapsed() < interval) {
            return false;
        }
        *last = Some(Instant::now());
        self.probing.store(true, Ordering::SeqCst);
        true
    }

    async fn probe(&self, limit: Duration) -> bool {
        let result = async {
            bounded(limit, self.client.ping()).await?;
            // A snapshot written before the outage can predate later mutations.
            bounded(limit, self.client.delete(LISTING_KEY)).await
        }
        .await;

        match result {
            Ok(()) => {
                self.mark_ready();
                true
            }
            Err(err) => {
                debug!(target: "promptdeck::cache", error = %err, "remote listing cache probe failed");
                false
            }
        }
    }
}

/// Cache for the unfiltered listing body.
///
/// Constructed once per process and shared by the handlers. The remote tier
/// starts out unavailable; [`ListingCache::probe`] (run at startup) or a
/// lazily scheduled background probe flips it to ready.
pub struct ListingCache {
    config: CacheConfig,
    remote: Option<Arc<RemoteTier>>,
    local: LocalSnapshotStore,
}

impl ListingCache {
    pub fn new(config: CacheConfig, remote: Option<Arc<dyn RemoteCache>>) -> Self {
        let remote = remote.map(|client| {
            Arc::new(RemoteTier {
                client,
                available: AtomicBool::new(false),
                probing: AtomicBool::new(false),
                last_probe: Mutex::new(None),
            })
        });
        Self {
            config,
            remote,
            local: LocalSnapshotStore::new(),
        }
    }

    pub fn local_only(config: CacheConfig) -> Self {
        Self::new(config, None)
    }

    pub fn remote_available(&self) -> bool {
        self.remote
            .as_ref()
            .is_some_and(|remote| remote.is_available())
    }

    /// The explicit ready signal: the remote tier is usable from now on.
    pub fn mark_ready(&self) {
        if let Some(remote) = self.remote.as_ref() {
            remote.mark_ready();
        }
    }

    /// Check the remote tier now and mark it ready on success.
    pub async fn probe(&self) -> bool {
        match self.remote.as_ref() {
            Some(remote) => remote.probe(self.config.operation_timeout).await,
            None => false,
        }
    }

    pub async fn get(&self) -> CacheRead {
        if let Some(remote) = self.usable_remote() {
            match bounded(
                self.config.operation_timeout,
                remote.client.get(LISTING_KEY),
            )
            .await
            {
                Ok(Some(body)) => return hit(CacheTier::Remote, ListingSnapshot::new(body)),
                Ok(None) => return miss(),
                Err(err) => remote.degrade("get", &err),
            }
        }

        match self.local.get_fresh(self.config.local_ttl) {
            Some(snapshot) => hit(CacheTier::Local, snapshot),
            None => miss(),
        }
    }

    /// Store `snapshot` in the remote tier when it is usable, otherwise in
    /// the local slot. A failed remote write degrades the tier and the
    /// snapshot is dropped for this round.
    pub async fn set(&self, snapshot: ListingSnapshot) {
        if let Some(remote) = self.usable_remote() {
            let write = remote.client.set(
                LISTING_KEY,
                snapshot.into_bytes(),
                self.config.remote_ttl,
            );
            if let Err(err) = bounded(self.config.operation_timeout, write).await {
                remote.degrade("set", &err);
            }
            return;
        }

        self.local.put(snapshot);
    }

    /// Clear both tiers. The remote delete is attempted whatever the
    /// availability flag says; its failure is logged and swallowed.
    pub async fn invalidate(&self) {
        counter!(METRIC_INVALIDATE).increment(1);
        self.local.clear();

        let Some(remote) = self.remote.as_ref() else {
            return;
        };
        let delete = remote.client.delete(LISTING_KEY);
        if let Err(err) = bounded(self.config.operation_timeout, delete).await {
            warn!(
                target: "promptdeck::cache",
                error = %err,
                "failed to clear remote listing cache after a write"
            );
            remote.degrade("invalidate", &err);
        }
    }

    /// The remote tier if it is marked available. When it exists but is
    /// down, a background probe may be scheduled instead.
    fn usable_remote(&self) -> Option<&Arc<RemoteTier>> {
        let remote = self.remote.as_ref()?;
        if remote.is_available() {
            return Some(remote);
        }
        self.schedule_probe(remote);
        None
    }

    fn schedule_probe(&self, remote: &Arc<RemoteTier>) {
        if !remote.claim_probe(self.config.probe_interval) {
            return;
        }
        let remote = Arc::clone(remote);
        let limit = self.config.operation_timeout;
        tokio::spawn(async move {
            remote.probe(limit).await;
            remote.probing.store(false, Ordering::SeqCst);
        });
    }
}

async fn bounded<T>(
    limit: Duration,
    op: impl Future<Output = Result<T, CacheError>>,
) -> Result<T, CacheError> {
    timeout(limit, op)
        .await
        .unwrap_or_else(|_| Err(CacheError::Timeout))
}

fn hit(tier: CacheTier, snapshot: ListingSnapshot) -> CacheRead {
    counter!(METRIC_HIT, "tier" => tier.as_str()).increment(1);
    CacheRead::Hit { tier, snapshot }
}

fn miss() -> CacheRead {
    counter!(METRIC_MISS).increment(1);
    CacheRead::Miss
}
