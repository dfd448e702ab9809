//! Reactive listing state for front ends.
//!
//! [`PromptFeed`] owns a driver task that turns filter changes into listing
//! fetches and publishes every change as a [`FeedState`] snapshot on a
//! `watch` channel. Search changes are debounced; tag changes fetch at once;
//! the category filter never touches the network.
//!
//! Fetches are independent tasks and whichever finishes last wins, so an
//! older response can overwrite a newer one when they complete out of order.

use std::sync::Arc;
use std::time::Duration;

use promptdeck_api_types::{ListingFilter, Prompt, PromptCategory, VoteDirection, samples};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::client::PromptSource;
use crate::ledger::VoteLedger;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const OFFLINE_NOTICE: &str = "Using offline sample data. Connect the API for live data.";

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub prompts: Vec<Prompt>,
    pub search: String,
    pub selected_tags: Vec<String>,
    pub category: Option<PromptCategory>,
    pub loading: bool,
    pub offline: bool,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub total: usize,
    pub trending: usize,
    pub total_votes: i64,
    pub categories: usize,
}

impl FeedState {
    /// Filter sent to the server for the current search and tags.
    pub fn filter(&self) -> ListingFilter {
        ListingFilter::new(Some(self.search.as_str()), &self.selected_tags)
    }

    /// Prompts to display. The category always narrows client-side; search
    /// and tags are re-applied locally only while showing offline samples.
    pub fn visible(&self) -> Vec<Prompt> {
        let filter = self.offline.then(|| self.filter());
        self.prompts
            .iter()
            .filter(|prompt| self.category.is_none_or(|category| prompt.category == category))
            .filter(|prompt| filter.as_ref().is_none_or(|f| f.matches_prompt(prompt)))
            .cloned()
            .collect()
    }

    pub fn is_searching(&self) -> bool {
        !self.search.trim().is_empty()
    }

    pub fn has_active_filters(&self) -> bool {
        self.is_searching() || !self.selected_tags.is_empty() || self.category.is_some()
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats {
            total: self.prompts.len(),
            trending: self
                .prompts
                .iter()
                .filter(|prompt| prompt.is_trending == Some(true))
                .count(),
            total_votes: self.prompts.iter().map(|prompt| prompt.votes).sum(),
            categories: PromptCategory::ALL.len(),
        }
    }

    fn adjust_votes(&mut self, id: &str, delta: i64) {
        if let Some(prompt) = self.prompts.iter_mut().find(|prompt| prompt.id == id) {
            prompt.votes += delta;
        }
    }

    fn reconcile(&mut self, updated: &Prompt) {
        if let Some(prompt) = self.prompts.iter_mut().find(|prompt| prompt.id == updated.id) {
            prompt.votes = updated.votes;
        }
    }

    fn toggle_tag(&mut self, tag: String) {
        let tag = tag.trim().to_string();
        if tag.is_empty() {
            return;
        }
        if let Some(index) = self.selected_tags.iter().position(|t| *t == tag) {
            self.selected_tags.remove(index);
        } else {
            self.selected_tags.push(tag);
        }
    }
}

/// Initial filters for a new feed.
#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    pub search: String,
    pub tags: Vec<String>,
    pub category: Option<PromptCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    /// The server accepted the vote; carries the stored prompt.
    Applied(Prompt),
    /// This client already voted on the prompt; nothing was sent.
    AlreadyVoted(VoteDirection),
    /// The server call failed and the optimistic change was undone.
    Reverted,
}

#[derive(Debug)]
enum FeedCommand {
    SetSearch(String),
    ToggleTag(String),
    SetCategory(Option<PromptCategory>),
    ClearFilters,
    Refresh,
}

struct Shared {
    source: Arc<dyn PromptSource>,
    ledger: Arc<VoteLedger>,
    state: watch::Sender<FeedState>,
    fallback: Vec<Prompt>,
}

pub struct PromptFeed {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<FeedCommand>,
    state: watch::Receiver<FeedState>,
}

impl PromptFeed {
    /// Start the driver and issue the initial fetch. Must be called inside a
    /// tokio runtime.
    pub fn start(source: Arc<dyn PromptSource>, ledger: Arc<VoteLedger>) -> Self {
        Self::start_with(source, ledger, FeedOptions::default())
    }

    pub fn start_with(
        source: Arc<dyn PromptSource>,
        ledger: Arc<VoteLedger>,
        options: FeedOptions,
    ) -> Self {
        let fallback = samples::sample_prompts().unwrap_or_else(|err| {
            warn!(target: "promptdeck_client::feed", error = %err, "bundled samples failed to parse");
            Vec::new()
        });

        let mut initial = FeedState {
            search: options.search,
            category: options.category,
            loading: true,
            ..FeedState::default()
        };
        for tag in options.tags {
            initial.toggle_tag(tag);
        }

        let (state_tx, state_rx) = watch::channel(initial);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            source,
            ledger,
            state: state_tx,
            fallback,
        });

        tokio::spawn(drive(Arc::clone(&shared), commands_rx));

        Self {
            shared,
            commands: commands_tx,
            state: state_rx,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.shared.ledger
    }

    /// Wait until no fetch is in flight and return the state at that point.
    pub async fn settled(&self) -> FeedState {
        let mut state = self.state.clone();
        match state.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.send(FeedCommand::SetSearch(search.into()));
    }

    pub fn toggle_tag(&self, tag: impl Into<String>) {
        self.send(FeedCommand::ToggleTag(tag.into()));
    }

    pub fn set_category(&self, category: Option<PromptCategory>) {
        self.send(FeedCommand::SetCategory(category));
    }

    pub fn clear_filters(&self) {
        self.send(FeedCommand::ClearFilters);
    }

    pub fn refresh(&self) {
        self.send(FeedCommand::Refresh);
    }

    /// Vote with an optimistic local update. A prompt this client already
    /// voted on is left untouched.
    pub async fn vote(&self, id: &str, direction: VoteDirection) -> VoteOutcome {
        if !self.shared.ledger.record_vote(id, direction) {
            let previous = self.shared.ledger.get_vote(id).unwrap_or(direction);
            return VoteOutcome::AlreadyVoted(previous);
        }

        let delta = direction.delta();
        self.shared
            .state
            .send_modify(|state| state.adjust_votes(id, delta));

        match self.shared.source.vote(id, direction).await {
            Ok(updated) => {
                self.shared
                    .state
                    .send_modify(|state| state.reconcile(&updated));
                VoteOutcome::Applied(updated)
            }
            Err(err) => {
                warn!(
                    target: "promptdeck_client::feed",
                    prompt = id,
                    error = %err,
                    "vote failed; reverting"
                );
                self.shared
                    .state
                    .send_modify(|state| state.adjust_votes(id, -delta));
                VoteOutcome::Reverted
            }
        }
    }

    fn send(&self, command: FeedCommand) {
        if self.commands.send(command).is_err() {
            debug!(target: "promptdeck_client::feed", "feed driver has stopped");
        }
    }
}

async fn drive(shared: Arc<Shared>, mut commands: mpsc::UnboundedReceiver<FeedCommand>) {
    spawn_fetch(&shared);

    let debounce = sleep(Duration::ZERO);
    tokio::pin!(debounce);
    let mut armed = false;

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    FeedCommand::SetSearch(search) => {
                        shared.state.send_modify(|state| state.search = search);
                        debounce.as_mut().reset(Instant::now() + SEARCH_DEBOUNCE);
                        armed = true;
                    }
                    FeedCommand::ToggleTag(tag) => {
                        shared.state.send_modify(|state| state.toggle_tag(tag));
                        armed = false;
                        spawn_fetch(&shared);
                    }
                    FeedCommand::SetCategory(category) => {
                        shared.state.send_modify(|state| state.category = category);
                    }
                    FeedCommand::ClearFilters => {
                        shared.state.send_modify(|state| {
                            state.search.clear();
                            state.selected_tags.clear();
                            state.category = None;
                        });
                        armed = false;
                        spawn_fetch(&shared);
                    }
                    FeedCommand::Refresh => {
                        armed = false;
                        spawn_fetch(&shared);
                    }
                }
            }
            () = &mut debounce, if armed => {
                armed = false;
                spawn_fetch(&shared);
            }
        }
    }
}

fn spawn_fetch(shared: &Arc<Shared>) {
    let filter = shared.state.borrow().filter();
    shared.state.send_modify(|state| state.loading = true);

    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        match shared.source.list_prompts(&filter).await {
            Ok(prompts) => shared.state.send_modify(|state| {
                state.prompts = prompts;
                state.loading = false;
                state.offline = false;
                state.notice = None;
            }),
            Err(err) => {
                warn!(
                    target: "promptdeck_client::feed",
                    error = %err,
                    "listing fetch failed; showing sample prompts"
                );
                let fallback = shared.fallback.clone();
                shared.state.send_modify(|state| {
                    state.prompts = fallback;
                    state.loading = false;
                    state.offline = true;
                    state.notice = Some(OFFLINE_NOTICE.to_string());
                });
            }
        }
    });
}
