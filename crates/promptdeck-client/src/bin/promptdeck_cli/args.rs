//! Command-line surface for `promptdeck-cli`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use promptdeck_api_types::{PromptCategory, VoteDirection};
use promptdeck_client::{DEFAULT_API_URL, ledger::DEFAULT_LEDGER_FILE};

#[derive(Parser, Debug)]
#[command(name = "promptdeck-cli", version, about = "Browse, submit and vote on promptdeck prompts", long_about = None)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "PROMPTDECK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// File that remembers which prompts you voted on
    #[arg(long, env = "PROMPTDECK_LEDGER", default_value = DEFAULT_LEDGER_FILE)]
    pub ledger: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List prompts, newest first
    List(ListArgs),
    /// Show a single prompt with its full text
    Show {
        id: String,
    },
    /// Submit a new prompt
    Submit(SubmitArgs),
    /// Vote a prompt up or down (once per prompt)
    Vote {
        id: String,
        #[arg(value_enum)]
        direction: DirectionArg,
    },
    /// Check API and cache health
    Health,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive text search over title, description and tags
    #[arg(long)]
    pub search: Option<String>,

    /// Only prompts carrying this tag (repeatable; any tag matches)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Narrow to one category
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Print raw JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: String,

    /// Prompt text; use --content-file for longer prompts
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    #[arg(long, value_name = "PATH")]
    pub content_file: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Tag (repeatable, at least one)
    #[arg(long = "tag", value_name = "TAG", required = true)]
    pub tags: Vec<String>,

    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CategoryArg {
    Image,
    Video,
    Text,
    Code,
    Automation,
}

impl From<CategoryArg> for PromptCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Image => PromptCategory::Image,
            CategoryArg::Video => PromptCategory::Video,
            CategoryArg::Text => PromptCategory::Text,
            CategoryArg::Code => PromptCategory::Code,
            CategoryArg::Automation => PromptCategory::Automation,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for VoteDirection {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Up => VoteDirection::Up,
            DirectionArg::Down => VoteDirection::Down,
        }
    }
}
