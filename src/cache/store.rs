//! Process-local snapshot slot.

use std::sync::RwLock;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// The serialized listing body exactly as it is sent to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSnapshot(Bytes);

impl ListingSnapshot {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self(body.into())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

#[derive(Debug)]
struct Entry {
    snapshot: ListingSnapshot,
    stored_at: Instant,
}

/// A single slot holding at most one snapshot and the time it was written.
#[derive(Debug, Default)]
pub struct LocalSnapshotStore {
    slot: RwLock<Option<Entry>>,
}

impl LocalSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored snapshot if it is younger than `max_age`.
    pub fn get_fresh(&self, max_age: Duration) -> Option<ListingSnapshot> {
        let slot = rw_read(&self.slot, SOURCE, "get_fresh");
        slot.as_ref()
            .filter(|entry| entry.stored_at.elapsed() < max_age)
            .map(|entry| entry.snapshot.clone())
    }

    pub fn put(&self, snapshot: ListingSnapshot) {
        *rw_write(&self.slot, SOURCE, "put") = Some(Entry {
            snapshot,
            stored_at: Instant::now(),
        });
    }

    pub fn clear(&self) {
        *rw_write(&self.slot, SOURCE, "clear") = None;
    }

    pub fn is_empty(&self) -> bool {
        rw_read(&self.slot, SOURCE, "is_empty").is_none()
    }
}
