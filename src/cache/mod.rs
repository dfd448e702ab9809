//! Listing cache.
//!
//! The unfiltered prompt listing is cached as its serialized JSON body in two
//! tiers:
//!
//! - **remote**: a shared store (Redis in production) behind [`RemoteCache`],
//!   entries expire after `remote_ttl`.
//! - **local**: a single in-process slot, fresh for `local_ttl`, used only
//!   while the remote tier is absent or marked unavailable.
//!
//! [`ListingCache`] never surfaces cache failures to callers: every remote
//! error downgrades the availability flag and the request carries on against
//! the local tier or the store.

mod config;
mod error;
mod layer;
mod lock;
mod remote;
mod store;

pub use config::CacheConfig;
pub use error::CacheError;
pub use layer::{CacheRead, CacheTier, LISTING_KEY, ListingCache};
pub use remote::RemoteCache;
pub use store::{ListingSnapshot, LocalSnapshotStore};
