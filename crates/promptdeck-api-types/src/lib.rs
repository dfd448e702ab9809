//! Shared request/response types for the promptdeck HTTP API.
//!
//! The server serializes these, the client deserializes them; both sides use
//! [`ListingFilter`] so the offline fallback filters exactly like the server.

mod filter;
mod prompt;
pub mod samples;

pub use filter::ListingFilter;
pub use prompt::{
    CategoryParseError, CreatePromptRequest, ErrorBody, HealthResponse, Prompt, PromptCategory,
    VoteDirection, VoteRequest,
};
