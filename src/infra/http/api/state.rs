use std::sync::Arc;

use crate::application::listing::ListingService;
use crate::application::prompts::PromptService;
use crate::cache::ListingCache;

#[derive(Clone)]
pub struct ApiState {
    pub listing: Arc<ListingService>,
    pub prompts: Arc<PromptService>,
    pub cache: Arc<ListingCache>,
}
