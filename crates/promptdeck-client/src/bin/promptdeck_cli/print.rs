use promptdeck_api_types::Prompt;
use promptdeck_client::{ClientError, FeedStats};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), ClientError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Decode(format!("failed to render output: {e}")))?;
    println!("{out}");
    Ok(())
}

pub fn print_table(prompts: &[Prompt]) {
    if prompts.is_empty() {
        println!("No prompts found.");
        return;
    }
    for prompt in prompts {
        let trending = if prompt.is_trending == Some(true) { " *" } else { "" };
        let tags: Vec<String> = prompt.tags.iter().map(|tag| format!("#{tag}")).collect();
        println!(
            "{votes:>6}  {title}{trending}  [{category}]  {tags}",
            votes = prompt.votes,
            title = prompt.title,
            category = prompt.category,
            tags = tags.join(" ")
        );
        println!("        id: {}  by {}", prompt.id, prompt.author);
    }
}

pub fn print_prompt(prompt: &Prompt) {
    println!("{}  [{}]", prompt.title, prompt.category);
    println!("by {}  ·  {} votes", prompt.author, prompt.votes);
    println!("{}", prompt.description);
    println!();
    println!("{}", prompt.content);
    println!();
    println!("tags: {}", prompt.tags.join(", "));
    println!("id:   {}", prompt.id);
}

pub fn print_stats(stats: &FeedStats) {
    println!(
        "{} prompts, {} trending, {} votes, {} categories",
        stats.total, stats.trending, stats.total_votes, stats.categories
    );
}
