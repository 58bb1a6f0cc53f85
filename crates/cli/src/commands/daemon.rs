use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use pocketsync_core::router::{Request, Response, Router};

use crate::auth::UnavailableAuthFlow;
use crate::commands::build_router;
use crate::config::AppConfig;

#[derive(Args)]
pub struct DaemonArgs {}

/// Long-running background process: periodic tag sync (with a staleness
/// check), periodic cache sweep, and a Unix-socket JSON-lines server for
/// the message protocol. Periodic failures are logged and swallowed; the
/// next tick retries. Socket requests report their own errors back.
pub async fn run(_args: DaemonArgs) -> Result<()> {
    let config = AppConfig::load()?;
    let (router, state) = build_router(&config, Arc::new(UnavailableAuthFlow))?;
    let router = Arc::new(router);

    let socket_path = config.socket_path();
    if let Some(parent) = socket_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    // A previous run may have left its socket behind.
    let _ = tokio::fs::remove_file(&socket_path).await;
    let listener = UnixListener::bind(&socket_path)
        .with_context(|| format!("failed to bind {}", socket_path.display()))?;
    info!(socket = %socket_path.display(), "daemon listening");

    let cache_ttl = config.cache_ttl();
    let tag_ttl = config.tag_ttl();
    let mut sync_check =
        tokio::time::interval(Duration::from_secs(config.sync.check_interval_secs));
    let mut sweep =
        tokio::time::interval(Duration::from_secs(config.cache.ttl_hours as u64 * 3600));

    loop {
        tokio::select! {
            _ = sync_check.tick() => {
                let settings = state.settings().await.unwrap_or_default();
                if !settings.tag_suggestions_enabled {
                    debug!("tag suggestions disabled, skipping sync check");
                    continue;
                }
                match state.vocabulary().await {
                    Ok(vocab) if vocab.is_stale(chrono::Utc::now(), tag_ttl) => {
                        let response = router.handle(Request::RequestTagSync).await;
                        if let Some(error) = &response.error {
                            warn!(%error, "periodic tag sync failed");
                        }
                    }
                    Ok(_) => debug!("vocabulary fresh, skipping sync"),
                    Err(err) => warn!(error = %err, "could not read vocabulary"),
                }
            }
            _ = sweep.tick() => {
                match router.cache().sweep_expired(cache_ttl).await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "cache sweep done"),
                    Err(err) => warn!(error = %err, "cache sweep failed"),
                }
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        tokio::spawn(handle_client(stream, Arc::clone(&router)));
                    }
                    Err(err) => warn!(error = %err, "accept failed"),
                }
            }
        }
    }
}

/// One JSON request per line in, one JSON response per line out.
async fn handle_client(stream: UnixStream, router: Arc<Router>) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => router.handle(request).await,
            Err(err) => Response::failure(format!("invalid request: {err}")),
        };
        let mut payload = serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"success":false,"error":"response serialization failed"}"#.to_string()
        });
        payload.push('\n');
        if writer.write_all(payload.as_bytes()).await.is_err() {
            break;
        }
    }
    debug!("client disconnected");
}
