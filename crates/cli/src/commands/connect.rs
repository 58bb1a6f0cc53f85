use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use pocketsync_core::router::{Payload, Request};

use crate::auth::TerminalAuthFlow;
use crate::commands::build_router;
use crate::config::AppConfig;

#[derive(Args)]
pub struct ConnectArgs {}

pub async fn run(_args: ConnectArgs) -> Result<()> {
    let config = AppConfig::load()?;
    let (router, state) = build_router(&config, Arc::new(TerminalAuthFlow))?;

    if state.access_token().await?.is_some() {
        let who = state
            .username()
            .await?
            .unwrap_or_else(|| "an account".to_string());
        println!("Already connected to {who}; continuing will replace the stored token.");
    }

    let response = router.handle(Request::Authenticate).await;
    match response.payload {
        Some(Payload::Authenticated { username }) => {
            match username {
                Some(username) => println!("Connected as {username}."),
                None => println!("Connected."),
            }
            Ok(())
        }
        _ => anyhow::bail!(
            response
                .error
                .unwrap_or_else(|| "authentication failed".to_string())
        ),
    }
}
