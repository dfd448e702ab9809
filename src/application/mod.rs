//! Application services: listing, prompt mutations and the repository seams.

pub mod error;
pub mod listing;
pub mod prompts;
pub mod query;
pub mod repos;
