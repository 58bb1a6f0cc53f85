use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::remote::RemoteItem;
use crate::state::StateStore;

/// Default time-to-live for cached save status: 5 hours.
pub const CACHE_TTL_SECS: i64 = 5 * 60 * 60;

pub fn cache_ttl() -> Duration {
    Duration::seconds(CACHE_TTL_SECS)
}

/// Last-known remote save status for one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveStatus {
    pub exists: bool,
    pub item_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl SaveStatus {
    /// The URL is not saved remotely. `exists == false` carries no item id
    /// and no tags.
    pub fn absent(now: DateTime<Utc>) -> Self {
        Self {
            exists: false,
            item_id: None,
            tags: Vec::new(),
            title: None,
            observed_at: now,
        }
    }

    pub fn from_item(item: &RemoteItem, now: DateTime<Utc>) -> Self {
        Self {
            exists: true,
            item_id: Some(item.item_id.clone()),
            tags: item.tags.clone(),
            title: item.title().map(str::to_string),
            observed_at: now,
        }
    }
}

/// Cached observation of one URL, keyed by the verbatim URL string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub title: Option<String>,
    pub save_status: Option<SaveStatus>,
    pub captured_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Stale only strictly past the TTL; an entry exactly `ttl` old still
    /// counts as fresh.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.captured_at > ttl
    }
}

pub type CacheMap = HashMap<String, CacheEntry>;

/// Exact-key cache of per-URL save status over the persistent store.
///
/// Entries are replaced wholesale (last-writer-wins) through a whole-blob
/// read-modify-write; interleaved async writers can race and the later
/// write wins. Normalized URL matching happens only against the remote
/// service, never here.
pub struct TabCache {
    state: StateStore,
}

impl TabCache {
    pub fn new(state: StateStore) -> Self {
        Self { state }
    }

    async fn enabled(&self) -> Result<bool> {
        Ok(self.state.settings().await?.tab_cache_enabled)
    }

    /// Returns `None` when the URL is unknown or the cache feature is off.
    /// Never mutates; staleness is the caller's check via
    /// [`CacheEntry::is_stale`].
    pub async fn lookup(&self, url: &str) -> Result<Option<CacheEntry>> {
        if !self.enabled().await? {
            return Ok(None);
        }
        Ok(self.state.tab_cache().await?.remove(url))
    }

    /// Replace the entry for the URL wholesale; no field-level merge.
    pub async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        if !self.enabled().await? {
            return Ok(());
        }
        let mut cache = self.state.tab_cache().await?;
        cache.insert(entry.url.clone(), entry);
        self.state.store_tab_cache(&cache).await
    }

    /// Record a page observation (navigation-complete event or on-demand
    /// lookup).
    pub async fn observe(
        &self,
        url: &str,
        title: Option<String>,
        status: Option<SaveStatus>,
    ) -> Result<()> {
        self.upsert(CacheEntry {
            url: url.to_string(),
            title,
            save_status: status,
            captured_at: Utc::now(),
        })
        .await
    }

    /// Drop the entry for a closed page.
    pub async fn remove(&self, url: &str) -> Result<()> {
        if !self.enabled().await? {
            return Ok(());
        }
        let mut cache = self.state.tab_cache().await?;
        if cache.remove(url).is_some() {
            self.state.store_tab_cache(&cache).await?;
        }
        Ok(())
    }

    /// Drop every entry strictly older than `ttl`. Single pass over the
    /// whole cache; persists once at the end, and only if something was
    /// removed.
    pub async fn sweep_expired(&self, ttl: Duration) -> Result<usize> {
        if !self.enabled().await? {
            return Ok(0);
        }
        let now = Utc::now();
        let mut cache = self.state.tab_cache().await?;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(now, ttl));
        let removed = before - cache.len();
        if removed > 0 {
            self.state.store_tab_cache(&cache).await?;
            debug!(removed, remaining = cache.len(), "swept expired cache entries");
        }
        Ok(removed)
    }
}
