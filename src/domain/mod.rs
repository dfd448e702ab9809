//! Domain layer types and invariants.

pub mod entities;
pub mod error;
pub mod prompts;

pub use promptdeck_api_types::PromptCategory;
