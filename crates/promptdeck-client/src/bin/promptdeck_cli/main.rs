//! promptdeck-cli: terminal client for the promptdeck API.

mod args;
mod handlers;
mod print;


use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use promptdeck_client::{ApiClient, ClientError, VoteLedger, VoteOutcome};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url, Duration::from_secs(cli.timeout_secs.max(1)))?;
    let ledger = Arc::new(VoteLedger::open(&cli.ledger));

    match cli.command {
        Commands::List(args) => handlers::list(client, ledger, args).await?,
        Commands::Show { id } => handlers::show(&client, &ledger, &id).await?,
        Commands::Submit(args) => handlers::submit(&client, args).await?,
        Commands::Vote { id, direction } => {
            match handlers::vote(&client, &ledger, &id, direction.into()).await? {
                VoteOutcome::Applied(prompt) => {
                    println!("{} now has {} votes", prompt.title, prompt.votes);
                }
                VoteOutcome::AlreadyVoted(previous) => {
                    println!("already voted {previous} on {id}");
                }
                VoteOutcome::Reverted => {}
            }
        }
        Commands::Health => handlers::health(&client).await?,
    }

    Ok(())
}
