use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use pocketsync_core::router::{Payload, Request};

use crate::auth::UnavailableAuthFlow;
use crate::commands::build_router;
use crate::config::AppConfig;

#[derive(Args)]
pub struct StatusArgs {
    /// URL to look up
    url: String,

    /// Drop the cached entry for this URL instead of querying
    #[arg(long)]
    forget: bool,
}

pub async fn run(args: StatusArgs) -> Result<()> {
    let config = AppConfig::load()?;
    let (router, _state) = build_router(&config, Arc::new(UnavailableAuthFlow))?;

    if args.forget {
        router.cache().remove(&args.url).await?;
        println!("Dropped cached status for {}.", args.url);
        return Ok(());
    }

    let response = router
        .handle(Request::CheckUrlStatus {
            url: args.url.clone(),
        })
        .await;

    match response.payload {
        Some(Payload::UrlStatus { status }) => {
            match status {
                Some(status) if status.exists => {
                    println!(
                        "Saved (item {}).",
                        status.item_id.as_deref().unwrap_or("unknown")
                    );
                    if let Some(title) = &status.title {
                        println!("  title: {title}");
                    }
                    if !status.tags.is_empty() {
                        println!("  tags:  {}", status.tags.join(", "));
                    }
                }
                Some(_) => println!("Not saved."),
                None => println!("No status recorded."),
            }
            Ok(())
        }
        _ => anyhow::bail!(
            response
                .error
                .unwrap_or_else(|| "status check failed".to_string())
        ),
    }
}
