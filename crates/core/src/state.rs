use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::CacheMap;
use crate::settings::Settings;
use crate::store::Store;
use crate::vocab::{SyncCursor, TagVocabulary};

mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REQUEST_TOKEN: &str = "request_token";
    pub const USERNAME: &str = "username";
    pub const TAGS: &str = "tags";
    pub const SYNC_CURSOR: &str = "sync_cursor";
    pub const TAB_CACHE: &str = "tab_cache";
    pub const SETTINGS: &str = "settings";
}

/// Typed accessors over the raw key-value store, one method pair per
/// persisted key, with defaults where absence is a normal state.
#[derive(Clone)]
pub struct StateStore {
    store: Arc<dyn Store>,
}

impl StateStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(
                serde_json::from_slice(&raw)
                    .with_context(|| format!("corrupt state under key '{key}'"))?,
            )),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.set(key, &serde_json::to_vec(value)?).await
    }

    // -- Credentials --------------------------------------------------------

    pub async fn access_token(&self) -> Result<Option<String>> {
        self.get_json(keys::ACCESS_TOKEN).await
    }

    pub async fn set_access_token(&self, token: &str) -> Result<()> {
        self.set_json(keys::ACCESS_TOKEN, &token).await
    }

    pub async fn clear_access_token(&self) -> Result<()> {
        self.store.remove(keys::ACCESS_TOKEN).await
    }

    /// Transient: held only between requesting a token and completing (or
    /// terminally failing) the exchange.
    pub async fn request_token(&self) -> Result<Option<String>> {
        self.get_json(keys::REQUEST_TOKEN).await
    }

    pub async fn set_request_token(&self, token: &str) -> Result<()> {
        self.set_json(keys::REQUEST_TOKEN, &token).await
    }

    pub async fn clear_request_token(&self) -> Result<()> {
        self.store.remove(keys::REQUEST_TOKEN).await
    }

    pub async fn username(&self) -> Result<Option<String>> {
        self.get_json(keys::USERNAME).await
    }

    pub async fn set_username(&self, username: &str) -> Result<()> {
        self.set_json(keys::USERNAME, &username).await
    }

    // -- Tag vocabulary -----------------------------------------------------

    pub async fn vocabulary(&self) -> Result<TagVocabulary> {
        Ok(self.get_json(keys::TAGS).await?.unwrap_or_default())
    }

    pub async fn store_vocabulary(&self, vocab: &TagVocabulary) -> Result<()> {
        self.set_json(keys::TAGS, vocab).await
    }

    // -- Sync cursor --------------------------------------------------------

    pub async fn sync_cursor(&self) -> Result<Option<SyncCursor>> {
        self.get_json(keys::SYNC_CURSOR).await
    }

    pub async fn set_sync_cursor(&self, cursor: SyncCursor) -> Result<()> {
        self.set_json(keys::SYNC_CURSOR, &cursor).await
    }

    pub async fn clear_sync_cursor(&self) -> Result<()> {
        self.store.remove(keys::SYNC_CURSOR).await
    }

    // -- Tab cache ----------------------------------------------------------

    pub async fn tab_cache(&self) -> Result<CacheMap> {
        Ok(self.get_json(keys::TAB_CACHE).await?.unwrap_or_default())
    }

    pub async fn store_tab_cache(&self, cache: &CacheMap) -> Result<()> {
        self.set_json(keys::TAB_CACHE, cache).await
    }

    // -- Settings -----------------------------------------------------------

    pub async fn settings(&self) -> Result<Settings> {
        Ok(self.get_json(keys::SETTINGS).await?.unwrap_or_default())
    }

    pub async fn store_settings(&self, settings: &Settings) -> Result<()> {
        self.set_json(keys::SETTINGS, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn state() -> StateStore {
        StateStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn tokens_roundtrip() {
        let state = state();
        assert!(state.access_token().await.unwrap().is_none());

        state.set_access_token("tok-123").await.unwrap();
        assert_eq!(state.access_token().await.unwrap().unwrap(), "tok-123");

        state.set_request_token("req-1").await.unwrap();
        state.clear_request_token().await.unwrap();
        assert!(state.request_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn vocabulary_defaults_to_empty() {
        let state = state();
        let vocab = state.vocabulary().await.unwrap();
        assert!(vocab.is_empty());
        assert!(vocab.last_fetched_at.is_none());
    }

    #[tokio::test]
    async fn cursor_lifecycle() {
        let state = state();
        assert!(state.sync_cursor().await.unwrap().is_none());

        state
            .set_sync_cursor(SyncCursor { offset: 200 })
            .await
            .unwrap();
        assert_eq!(state.sync_cursor().await.unwrap().unwrap().offset, 200);

        state.clear_sync_cursor().await.unwrap();
        assert!(state.sync_cursor().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn settings_default_when_absent() {
        let state = state();
        let settings = state.settings().await.unwrap();
        assert!(settings.tab_cache_enabled);
    }
}
