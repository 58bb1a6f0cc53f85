use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::cache::{SaveStatus, TabCache};
use crate::error::SaveError;
use crate::ratelimit::RateLimiter;
use crate::remote::Remote;
use crate::state::StateStore;

/// A user-submitted save.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub url: String,
    pub title: Option<String>,
    /// The full desired tag list. Existing items get exactly this set;
    /// the remote replace overwrites, it does not merge.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub item_id: String,
    /// False when an existing item had its tags replaced instead.
    pub created: bool,
    pub status: SaveStatus,
}

/// Create the item remotely, or replace the tags on the one that already
/// exists. The cache answers the existence question when it can; every
/// remote call is gated by the advisory limiter, and a refused gate aborts
/// immediately (no queueing).
pub async fn save_or_update(
    remote: &dyn Remote,
    state: &StateStore,
    cache: &TabCache,
    limiter: &RateLimiter,
    cache_ttl: Duration,
    req: &SaveRequest,
) -> Result<SaveOutcome, SaveError> {
    let Some(token) = state.access_token().await? else {
        return Err(SaveError::NotAuthenticated);
    };

    // A fresh cache hit that knows the item exists skips the remote status
    // check entirely. Anything else (missing, stale, or known-absent) gets
    // a live check.
    let now = Utc::now();
    let cached = cache.lookup(&req.url).await?;
    let cached_existing = cached
        .as_ref()
        .filter(|entry| !entry.is_stale(now, cache_ttl))
        .and_then(|entry| entry.save_status.as_ref())
        .filter(|status| status.exists)
        .and_then(|status| {
            status
                .item_id
                .clone()
                .map(|item_id| (item_id, status.title.clone()))
        });

    let existing = match cached_existing {
        Some((item_id, title)) => {
            debug!(url = %req.url, %item_id, "item known from cache, skipping status check");
            Some((item_id, title))
        }
        None => {
            if !limiter.try_acquire() {
                return Err(SaveError::RateLimitExceeded);
            }
            let found = remote.find_item(&token, &req.url).await;
            limiter.record();
            found?.map(|item| (item.item_id.clone(), item.title().map(str::to_string)))
        }
    };

    let outcome = match existing {
        Some((item_id, title)) => {
            if !limiter.try_acquire() {
                return Err(SaveError::RateLimitExceeded);
            }
            let result = remote.replace_tags(&token, &item_id, &req.tags).await;
            limiter.record();
            result?;
            info!(url = %req.url, %item_id, "replaced tags on existing item");

            let status = SaveStatus {
                exists: true,
                item_id: Some(item_id.clone()),
                tags: req.tags.clone(),
                title: title.or_else(|| req.title.clone()),
                observed_at: Utc::now(),
            };
            SaveOutcome {
                item_id,
                created: false,
                status,
            }
        }
        None => {
            if !limiter.try_acquire() {
                return Err(SaveError::RateLimitExceeded);
            }
            let result = remote
                .add_item(&token, &req.url, req.title.as_deref(), &req.tags)
                .await;
            limiter.record();
            let item = result?;
            info!(url = %req.url, item_id = %item.item_id, "saved new item");

            let status = SaveStatus {
                exists: true,
                item_id: Some(item.item_id.clone()),
                tags: req.tags.clone(),
                title: item.title().map(str::to_string).or_else(|| req.title.clone()),
                observed_at: Utc::now(),
            };
            SaveOutcome {
                item_id: item.item_id,
                created: true,
                status,
            }
        }
    };

    // The cache mirrors the last known-good remote state; failures above
    // return before reaching this write.
    cache
        .observe(&req.url, outcome.status.title.clone(), Some(outcome.status.clone()))
        .await?;

    Ok(outcome)
}
