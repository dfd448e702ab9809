use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use promptdeck_api_types::{CreatePromptRequest, VoteDirection};
use promptdeck_client::{ApiClient, ClientError, FeedOptions, PromptFeed, VoteLedger, VoteOutcome};

use crate::args::{ListArgs, SubmitArgs};
use crate::print::{print_json, print_prompt, print_stats, print_table};

pub async fn list(
    client: ApiClient,
    ledger: Arc<VoteLedger>,
    args: ListArgs,
) -> Result<(), ClientError> {
    let options = FeedOptions {
        search: args.search.unwrap_or_default(),
        tags: args.tags,
        category: args.category.map(Into::into),
    };
    let feed = PromptFeed::start_with(Arc::new(client), ledger, options);
    let state = feed.settled().await;

    if let Some(notice) = state.notice.as_deref() {
        eprintln!("{notice}");
    }

    let visible = state.visible();
    if args.json {
        return print_json(&visible);
    }
    print_table(&visible);
    if !state.has_active_filters() {
        print_stats(&state.stats());
    }
    Ok(())
}

pub async fn show(client: &ApiClient, ledger: &VoteLedger, id: &str) -> Result<(), ClientError> {
    let prompt = client.get_prompt(id).await?;
    print_prompt(&prompt);
    if let Some(direction) = ledger.get_vote(&prompt.id) {
        println!("you voted {direction}");
    }
    Ok(())
}

pub async fn submit(client: &ApiClient, args: SubmitArgs) -> Result<(), ClientError> {
    let content = read_content(args.content, args.content_file)?;
    let request = CreatePromptRequest {
        title: Some(args.title),
        description: Some(args.description),
        content: Some(content),
        category: args.category.map(Into::into),
        tags: Some(args.tags),
        author: args.author,
    };
    let created = client.create_prompt(&request).await?;
    println!("created {}", created.id);
    Ok(())
}

pub async fn vote(
    client: &ApiClient,
    ledger: &VoteLedger,
    id: &str,
    direction: VoteDirection,
) -> Result<VoteOutcome, ClientError> {
    if let Some(previous) = ledger.get_vote(id) {
        return Ok(VoteOutcome::AlreadyVoted(previous));
    }
    let updated = client.vote_prompt(id, direction).await?;
    ledger.record_vote(&updated.id, direction);
    Ok(VoteOutcome::Applied(updated))
}

pub async fn health(client: &ApiClient) -> Result<(), ClientError> {
    let health = client.health().await?;
    let redis = if health.redis { "connected" } else { "unavailable" };
    println!("status: {}  cache: {redis}", health.status);
    Ok(())
}

fn read_content(inline: Option<String>, file: Option<PathBuf>) -> Result<String, ClientError> {
    if let Some(path) = file {
        return fs::read_to_string(&path).map_err(|err| {
            ClientError::InvalidInput(format!("failed to read {}: {err}", path.display()))
        });
    }
    inline.ok_or_else(|| {
        ClientError::InvalidInput("either --content or --content-file is required".into())
    })
}
