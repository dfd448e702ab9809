use crate::Prompt;

/// Search term plus tag filter of a listing request.
///
/// An empty (or whitespace-only) search and an empty tag list both mean
/// "no filter"; [`ListingFilter::is_unfiltered`] is the cache-eligibility test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    search: Option<String>,
    tags: Vec<String>,
}

impl ListingFilter {
    pub fn new<I, S>(search: Option<&str>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let search = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string);

        let mut normalized: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if !tag.is_empty() && !normalized.iter().any(|existing| existing == tag) {
                normalized.push(tag.to_string());
            }
        }

        Self {
            search,
            tags: normalized,
        }
    }

    /// Build from raw query parameters; `tags` is comma-separated and empty
    /// entries are dropped.
    pub fn from_query(search: Option<&str>, tags: Option<&str>) -> Self {
        Self::new(search, tags.unwrap_or_default().split(','))
    }

    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search.is_none() && self.tags.is_empty()
    }

    /// OR semantics: at least one requested tag is present.
    pub fn matches_tags(&self, tags: &[String]) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|wanted| tags.contains(wanted))
    }

    /// Case-insensitive substring match over title, description and tags.
    pub fn matches_search(&self, title: &str, description: &str, tags: &[String]) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let needle = term.to_lowercase();
        title.to_lowercase().contains(&needle)
            || description.to_lowercase().contains(&needle)
            || tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
    }

    pub fn matches(&self, title: &str, description: &str, tags: &[String]) -> bool {
        self.matches_tags(tags) && self.matches_search(title, description, tags)
    }

    pub fn matches_prompt(&self, prompt: &Prompt) -> bool {
        self.matches(&prompt.title, &prompt.description, &prompt.tags)
    }

    /// Narrow `prompts` in place; the relative order is preserved.
    pub fn apply(&self, prompts: &mut Vec<Prompt>) {
        if self.is_unfiltered() {
            return;
        }
        prompts.retain(|prompt| self.matches_prompt(prompt));
    }

    /// Query pairs for `GET /api/prompts`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_ref() {
            pairs.push(("search", search.clone()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        pairs
    }
}
