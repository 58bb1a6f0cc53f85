use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{RemoteError, SyncError};
use crate::ratelimit::RateLimiter;
use crate::remote::{Detail, ItemQuery, Remote};
use crate::state::StateStore;
use crate::vocab::{SyncCursor, TagVocabulary};

/// Tunables for a vocabulary sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub page_size: u64,
    /// Pacing delay between successful pages, to stay polite even when
    /// under quota.
    pub page_pause: Duration,
    /// Backoff before retrying a failed page.
    pub error_pause: Duration,
    pub max_consecutive_errors: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            page_pause: Duration::from_secs(2),
            error_pause: Duration::from_secs(30),
            max_consecutive_errors: 3,
        }
    }
}

/// Fetch the complete tag vocabulary, resuming from any persisted cursor.
///
/// Progress is durable: the vocabulary and cursor are persisted after every
/// successful page, so a killed process picks up where it left off. Pages
/// are fetched in strictly increasing offset order, one at a time.
pub async fn sync_all_tags(
    remote: &dyn Remote,
    state: &StateStore,
    access_token: &str,
    opts: &SyncOptions,
) -> Result<TagVocabulary, SyncError> {
    // The running set always seeds from what is already persisted, so a
    // partial run can only ever add tags, never drop them.
    let mut vocab = state.vocabulary().await?;

    let mut offset = match state.sync_cursor().await? {
        Some(cursor) if cursor.offset > 0 => {
            info!(offset = cursor.offset, tags = vocab.len(), "resuming interrupted sync");
            cursor.offset
        }
        _ => 0,
    };

    let mut consecutive_errors = 0u32;

    loop {
        let query = ItemQuery {
            offset,
            count: opts.page_size,
            detail: Detail::Complete,
            ..Default::default()
        };

        let page = match remote.get_items(access_token, &query).await {
            Ok(page) => page,
            Err(RemoteError::RateLimited) => {
                // Back off and retry the same offset. Rate limiting does
                // not count toward the consecutive-error budget.
                warn!(offset, pause_secs = opts.error_pause.as_secs(), "rate limited, backing off");
                tokio::time::sleep(opts.error_pause).await;
                continue;
            }
            Err(err) => {
                consecutive_errors += 1;
                warn!(offset, consecutive_errors, error = %err, "page fetch failed");
                if consecutive_errors >= opts.max_consecutive_errors {
                    // Keep everything fetched so far; the cursor stays in
                    // place so the next invocation resumes here.
                    state.store_vocabulary(&vocab).await?;
                    state.set_sync_cursor(SyncCursor { offset }).await?;
                    return Err(SyncError::Aborted {
                        consecutive: consecutive_errors,
                        source: err,
                    });
                }
                tokio::time::sleep(opts.error_pause).await;
                continue;
            }
        };

        consecutive_errors = 0;
        let fetched = page.items.len() as u64;
        vocab.merge(page.items.into_iter().flat_map(|item| item.tags));

        state.store_vocabulary(&vocab).await?;
        state
            .set_sync_cursor(SyncCursor {
                offset: offset + opts.page_size,
            })
            .await?;
        debug!(offset, fetched, tags = vocab.len(), "page persisted");

        // A page shorter than requested is treated as the last one. The
        // remote API offers no total count to cross-check against.
        if fetched < opts.page_size {
            break;
        }
        offset += opts.page_size;
        tokio::time::sleep(opts.page_pause).await;
    }

    vocab.last_fetched_at = Some(Utc::now());
    state.store_vocabulary(&vocab).await?;
    state.clear_sync_cursor().await?;
    info!(tags = vocab.len(), "tag sync complete");
    Ok(vocab)
}

/// Serializes sync runs: only one may be in flight process-wide.
pub struct Syncer {
    lock: Mutex<()>,
    opts: SyncOptions,
}

impl Syncer {
    pub fn new(opts: SyncOptions) -> Self {
        Self {
            lock: Mutex::new(()),
            opts,
        }
    }

    /// Entry gates (mutual exclusion, feature toggle, auth, rate limit)
    /// around [`sync_all_tags`]. Dropping the guard clears the in-progress
    /// state no matter how the run ends.
    pub async fn run(
        &self,
        remote: &dyn Remote,
        state: &StateStore,
        limiter: &RateLimiter,
    ) -> Result<TagVocabulary, SyncError> {
        let Ok(_guard) = self.lock.try_lock() else {
            return Err(SyncError::AlreadyRunning);
        };

        if !state.settings().await?.tag_suggestions_enabled {
            return Err(SyncError::Disabled);
        }
        let Some(token) = state.access_token().await? else {
            return Err(SyncError::NotAuthenticated);
        };
        if !limiter.try_acquire() {
            return Err(SyncError::RateLimited);
        }
        limiter.record();

        sync_all_tags(remote, state, &token, &self.opts).await
    }
}
