//! Client side of promptdeck: a typed HTTP client, the per-device vote
//! ledger and [`PromptFeed`], the reactive listing state used by front ends.

mod client;
mod error;
pub mod feed;
pub mod ledger;

pub use client::{ApiClient, DEFAULT_API_URL, DEFAULT_TIMEOUT, PromptSource};
pub use error::ClientError;
pub use feed::{FeedOptions, FeedState, FeedStats, PromptFeed, VoteOutcome};
pub use ledger::VoteLedger;
