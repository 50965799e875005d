//! `sqview activity` - condensed GitHub event feed.

use anyhow::{Context, Result};
use comfy_table::Table;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use sqview_core::activity;
use sqview_core::config::Config;

pub async fn run(user: Option<&str>, limit: usize, config: &Config) -> Result<()> {
    let user = user
        .map(str::to_owned)
        .or_else(|| config.github_user.clone())
        .context("no GitHub user given; pass --user or set github_user in the config")?;
    let events = activity::fetch_events(&user).await?;

    println!("Recently active repositories for {user}:");
    for repo in activity::recent_repos(&events) {
        println!("  {repo}");
    }
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["Repo", "Type", "Summary"]);
    for event in events.iter().take(limit) {
        table.add_row([
            event.repo.as_str(),
            event.kind.as_str(),
            event.summary.as_str(),
        ]);
    }
    println!("{table}");
    Ok(())
}
