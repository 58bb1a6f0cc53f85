pub mod connect;
pub mod daemon;
pub mod init;
pub mod save;
pub mod settings;
pub mod status;
pub mod sync;
pub mod tags;

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;

use pocketsync_core::router::{AuthFlow, Router};
use pocketsync_core::state::StateStore;
use pocketsync_core::sync::Syncer;

use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum Command {
    /// Write a starter configuration
    Init(init::InitArgs),
    /// Connect a Pocket account (OAuth)
    Connect(connect::ConnectArgs),
    /// Save a URL, or update the tags on an already-saved one
    Save(save::SaveArgs),
    /// Show the cached or live save status of a URL
    Status(status::StatusArgs),
    /// Fetch the full tag vocabulary now
    Sync(sync::SyncArgs),
    /// List known tags, or autocomplete a prefix
    Tags(tags::TagsArgs),
    /// Read or change persisted settings
    Settings(settings::SettingsArgs),
    /// Run the background process (periodic sync, cache sweep, socket API)
    Daemon(daemon::DaemonArgs),
}

/// Wire the shared context every surface talks through.
pub(crate) fn build_router(
    config: &AppConfig,
    auth: Arc<dyn AuthFlow>,
) -> Result<(Router, StateStore)> {
    let state = config.open_state()?;
    let router = Router::new(
        Arc::new(config.client()),
        state.clone(),
        Arc::new(config.rate_limiter()),
        Arc::new(Syncer::new(config.sync_options())),
        auth,
        config.router_options(),
    );
    Ok((router, state))
}
