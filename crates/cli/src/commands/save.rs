use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use pocketsync_core::router::{Payload, Request};

use crate::auth::UnavailableAuthFlow;
use crate::commands::build_router;
use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct SaveArgs {
    /// URL to save
    url: String,

    /// Title to store with a newly created item
    #[arg(long)]
    title: Option<String>,

    /// Tag to apply; repeatable. The full list replaces any existing tags
    /// on an already-saved item.
    #[arg(short, long = "tag")]
    tags: Vec<String>,
}

pub async fn run(args: SaveArgs) -> Result<()> {
    let config = AppConfig::load()?;
    let (router, _state) = build_router(&config, Arc::new(UnavailableAuthFlow))?;

    let spinner = progress::create_spinner("Saving...");
    let response = router
        .handle(Request::SaveUrl {
            url: args.url.clone(),
            title: args.title,
            tags: args.tags,
        })
        .await;
    spinner.finish_and_clear();

    match response.payload {
        Some(Payload::Saved { item_id, created }) => {
            if created {
                println!("Saved {} (item {item_id}).", args.url);
            } else {
                println!("Updated tags on item {item_id}.");
            }
            Ok(())
        }
        _ => anyhow::bail!(
            response
                .error
                .unwrap_or_else(|| "save failed".to_string())
        ),
    }
}
