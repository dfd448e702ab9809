//! Bundled sample catalogue.
//!
//! The server seeds an empty store from it and the client falls back to it
//! when the listing endpoint cannot be reached.

use crate::Prompt;

const SAMPLE_PROMPTS_JSON: &str = include_str!("../data/sample_prompts.json");

pub fn sample_prompts() -> Result<Vec<Prompt>, serde_json::Error> {
    serde_json::from_str(SAMPLE_PROMPTS_JSON)
}
