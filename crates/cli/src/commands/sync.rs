use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use pocketsync_core::router::{Payload, Request};

use crate::auth::UnavailableAuthFlow;
use crate::commands::build_router;
use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct SyncArgs {}

pub async fn run(_args: SyncArgs) -> Result<()> {
    let config = AppConfig::load()?;
    let (router, _state) = build_router(&config, Arc::new(UnavailableAuthFlow))?;

    let spinner = progress::create_spinner("Syncing tags...");
    let response = router.handle(Request::RequestTagSync).await;
    spinner.finish_and_clear();

    match response.payload {
        Some(Payload::Synced { tags }) => {
            println!("Vocabulary up to date: {tags} tags.");
            Ok(())
        }
        // An aborted run keeps its partial progress and resumes next time;
        // the message already says so.
        _ => anyhow::bail!(
            response
                .error
                .unwrap_or_else(|| "sync failed".to_string())
        ),
    }
}
