use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{SaveStatus, TabCache, cache_ttl};
use crate::error::{AuthFlowError, SaveError, SyncError};
use crate::ratelimit::RateLimiter;
use crate::remote::Remote;
use crate::save::{SaveRequest, save_or_update};
use crate::state::StateStore;
use crate::sync::Syncer;

/// Opaque browser-consent capability: given the authorization URL, yields
/// the redirect URL once the user approves. Implementations without a
/// capturable redirect (a terminal prompt, say) may return an empty
/// string; the token exchange does not depend on it.
#[async_trait]
pub trait AuthFlow: Send + Sync {
    async fn authorize(&self, authorize_url: &str) -> Result<String, AuthFlowError>;
}

/// Requests a UI surface can send to the background process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Authenticate,
    CheckUrlStatus {
        url: String,
    },
    SaveUrl {
        url: String,
        title: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    AddTags {
        item_id: String,
        tags: Vec<String>,
    },
    RequestTagSync,
    SavePage {
        url: String,
        title: Option<String>,
    },
}

/// Success payloads, flattened into the reply next to `success: true`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Authenticated { username: Option<String> },
    UrlStatus { status: Option<SaveStatus> },
    Saved { item_id: String, created: bool },
    TagsUpdated { tags: usize },
    Synced { tags: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(flatten)]
    pub payload: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(payload: Payload) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub redirect_uri: String,
    pub cache_ttl: chrono::Duration,
    /// Wall-clock bound on user-facing saves.
    pub save_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            redirect_uri: "pocketsync:authorization-finished".to_string(),
            cache_ttl: cache_ttl(),
            save_timeout: Duration::from_secs(10),
        }
    }
}

/// Owns the shared context and dispatches protocol requests to typed
/// handlers. One router per background process.
pub struct Router {
    remote: Arc<dyn Remote>,
    state: StateStore,
    cache: TabCache,
    limiter: Arc<RateLimiter>,
    syncer: Arc<Syncer>,
    auth: Arc<dyn AuthFlow>,
    opts: RouterOptions,
}

impl Router {
    pub fn new(
        remote: Arc<dyn Remote>,
        state: StateStore,
        limiter: Arc<RateLimiter>,
        syncer: Arc<Syncer>,
        auth: Arc<dyn AuthFlow>,
        opts: RouterOptions,
    ) -> Self {
        let cache = TabCache::new(state.clone());
        Self {
            remote,
            state,
            cache,
            limiter,
            syncer,
            auth,
            opts,
        }
    }

    pub fn cache(&self) -> &TabCache {
        &self.cache
    }

    /// Dispatch one request; every failure becomes `{success: false, error}`.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Authenticate => respond(self.authenticate().await),
            Request::CheckUrlStatus { url } => respond(self.check_url(&url).await),
            Request::SaveUrl { url, title, tags } => {
                respond(self.save(SaveRequest { url, title, tags }).await)
            }
            Request::AddTags { item_id, tags } => respond(self.add_tags(&item_id, tags).await),
            Request::RequestTagSync => respond(self.sync().await),
            Request::SavePage { url, title } => {
                respond(
                    self.save(SaveRequest {
                        url,
                        title,
                        tags: Vec::new(),
                    })
                    .await,
                )
            }
        }
    }

    /// Full OAuth round trip. The request token is transient: it is
    /// cleared once the exchange completes, and on terminal failure.
    async fn authenticate(&self) -> anyhow::Result<Payload> {
        let code = self.remote.request_token(&self.opts.redirect_uri).await?;
        self.state.set_request_token(&code).await?;

        let authorize_url = self.remote.authorize_url(&code, &self.opts.redirect_uri);
        let consent = self.auth.authorize(&authorize_url).await;
        if consent.is_err() {
            self.state.clear_request_token().await?;
        }
        let _redirect = consent?;

        let authorization = match self.remote.exchange_token(&code).await {
            Ok(authorization) => authorization,
            Err(err) => {
                self.state.clear_request_token().await?;
                return Err(err.into());
            }
        };

        self.state
            .set_access_token(&authorization.access_token)
            .await?;
        if let Some(username) = &authorization.username {
            self.state.set_username(username).await?;
        }
        self.state.clear_request_token().await?;

        info!(username = authorization.username.as_deref().unwrap_or("<unknown>"), "authenticated");
        Ok(Payload::Authenticated {
            username: authorization.username,
        })
    }

    /// Cached answer when fresh; otherwise a limiter-gated live check that
    /// repopulates the cache.
    async fn check_url(&self, url: &str) -> Result<Payload, SaveError> {
        let now = Utc::now();
        if let Some(entry) = self.cache.lookup(url).await? {
            if !entry.is_stale(now, self.opts.cache_ttl) {
                return Ok(Payload::UrlStatus {
                    status: entry.save_status,
                });
            }
        }

        let Some(token) = self.state.access_token().await? else {
            return Err(SaveError::NotAuthenticated);
        };
        if !self.limiter.try_acquire() {
            return Err(SaveError::RateLimitExceeded);
        }
        let found = self.remote.find_item(&token, url).await;
        self.limiter.record();

        let status = match found? {
            Some(item) => SaveStatus::from_item(&item, Utc::now()),
            None => SaveStatus::absent(Utc::now()),
        };
        self.cache
            .observe(url, status.title.clone(), Some(status.clone()))
            .await?;
        Ok(Payload::UrlStatus {
            status: Some(status),
        })
    }

    async fn save(&self, req: SaveRequest) -> Result<Payload, SaveError> {
        let work = save_or_update(
            self.remote.as_ref(),
            &self.state,
            &self.cache,
            &self.limiter,
            self.opts.cache_ttl,
            &req,
        );
        match tokio::time::timeout(self.opts.save_timeout, work).await {
            Ok(outcome) => {
                let outcome = outcome?;
                Ok(Payload::Saved {
                    item_id: outcome.item_id,
                    created: outcome.created,
                })
            }
            Err(_) => Err(SaveError::Timeout),
        }
    }

    /// Replace an item's tags directly, then fold the new tags into the
    /// local vocabulary so autocomplete picks them up immediately.
    async fn add_tags(&self, item_id: &str, tags: Vec<String>) -> Result<Payload, SaveError> {
        let Some(token) = self.state.access_token().await? else {
            return Err(SaveError::NotAuthenticated);
        };
        if !self.limiter.try_acquire() {
            return Err(SaveError::RateLimitExceeded);
        }
        let result = self.remote.replace_tags(&token, item_id, &tags).await;
        self.limiter.record();
        result?;

        let mut vocab = self.state.vocabulary().await?;
        vocab.merge(tags.iter().cloned());
        self.state.store_vocabulary(&vocab).await?;

        Ok(Payload::TagsUpdated { tags: tags.len() })
    }

    async fn sync(&self) -> Result<Payload, SyncError> {
        let vocab = self
            .syncer
            .run(self.remote.as_ref(), &self.state, &self.limiter)
            .await?;
        Ok(Payload::Synced { tags: vocab.len() })
    }
}

fn respond<E: Display>(result: Result<Payload, E>) -> Response {
    match result {
        Ok(payload) => Response::ok(payload),
        Err(err) => Response::failure(err),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::sync::SyncOptions;
    use crate::testutil::{FakeAuthFlow, FakeRemote, item};

    fn fast_sync_opts() -> SyncOptions {
        SyncOptions {
            page_pause: StdDuration::ZERO,
            error_pause: StdDuration::ZERO,
            ..SyncOptions::default()
        }
    }

    fn router_with(remote: FakeRemote, cancel_auth: bool) -> (Router, StateStore) {
        let state = StateStore::new(Arc::new(MemoryStore::new()));
        let router = Router::new(
            Arc::new(remote),
            state.clone(),
            Arc::new(RateLimiter::per_hour(320)),
            Arc::new(Syncer::new(fast_sync_opts())),
            Arc::new(FakeAuthFlow { cancel: cancel_auth }),
            RouterOptions::default(),
        );
        (router, state)
    }

    #[tokio::test]
    async fn authenticate_stores_credentials_and_clears_request_token() {
        let (router, state) = router_with(FakeRemote::default(), false);

        let response = router.handle(Request::Authenticate).await;
        assert!(response.success);

        assert_eq!(
            state.access_token().await.unwrap().as_deref(),
            Some("fake-access-token")
        );
        assert_eq!(state.username().await.unwrap().as_deref(), Some("tester"));
        assert!(state.request_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cancelled_consent_clears_the_request_token() {
        let (router, state) = router_with(FakeRemote::default(), true);

        let response = router.handle(Request::Authenticate).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("cancelled"));
        assert!(state.request_token().await.unwrap().is_none());
        assert!(state.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn check_url_answers_from_fresh_cache_without_network() {
        let url = "https://example.com/cached";
        let (router, state) = router_with(FakeRemote::default(), false);
        state.set_access_token("tok").await.unwrap();

        router
            .cache()
            .observe(
                url,
                None,
                Some(SaveStatus {
                    exists: true,
                    item_id: Some("7".to_string()),
                    tags: vec![],
                    title: None,
                    observed_at: Utc::now(),
                }),
            )
            .await
            .unwrap();

        let response = router
            .handle(Request::CheckUrlStatus { url: url.to_string() })
            .await;
        assert!(response.success);
        match response.payload {
            Some(Payload::UrlStatus { status: Some(status) }) => {
                assert!(status.exists);
                assert_eq!(status.item_id.as_deref(), Some("7"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_url_misses_hit_the_remote_and_repopulate() {
        let url = "https://example.com/live";
        let remote = FakeRemote::with_items(vec![item("31", url, &["keep"])]);
        let (router, state) = router_with(remote, false);
        state.set_access_token("tok").await.unwrap();

        let response = router
            .handle(Request::CheckUrlStatus { url: url.to_string() })
            .await;
        assert!(response.success);

        let entry = router.cache().lookup(url).await.unwrap().unwrap();
        assert!(entry.save_status.unwrap().exists);
    }

    #[tokio::test]
    async fn save_url_reports_item_and_updates_nothing_on_missing_auth() {
        let (router, _state) = router_with(FakeRemote::default(), false);

        let response = router
            .handle(Request::SaveUrl {
                url: "https://example.com".to_string(),
                title: None,
                tags: vec![],
            })
            .await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("not authenticated"));
    }

    #[tokio::test]
    async fn save_url_roundtrip() {
        let (router, state) = router_with(FakeRemote::default(), false);
        state.set_access_token("tok").await.unwrap();

        let response = router
            .handle(Request::SaveUrl {
                url: "https://example.com/page".to_string(),
                title: Some("Page".to_string()),
                tags: vec!["rust".to_string()],
            })
            .await;
        assert!(response.success);
        match response.payload {
            Some(Payload::Saved { created, .. }) => assert!(created),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn add_tags_grows_the_vocabulary() {
        let (router, state) = router_with(FakeRemote::default(), false);
        state.set_access_token("tok").await.unwrap();

        let response = router
            .handle(Request::AddTags {
                item_id: "9".to_string(),
                tags: vec!["fresh".to_string()],
            })
            .await;
        assert!(response.success);
        assert!(state.vocabulary().await.unwrap().tags.contains("fresh"));
    }

    #[tokio::test]
    async fn tag_sync_over_the_protocol() {
        let remote = FakeRemote::with_items(vec![
            item("1", "https://a.test", &["one"]),
            item("2", "https://b.test", &["two"]),
        ]);
        let (router, state) = router_with(remote, false);
        state.set_access_token("tok").await.unwrap();

        let response = router.handle(Request::RequestTagSync).await;
        assert!(response.success);
        assert_eq!(state.vocabulary().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn slow_saves_report_a_timeout() {
        use crate::testutil::Gate;

        let mut remote = FakeRemote::default();
        let gate = Gate::new();
        remote.gate = Some(gate.clone());

        let state = StateStore::new(Arc::new(MemoryStore::new()));
        state.set_access_token("tok").await.unwrap();
        let router = Router::new(
            Arc::new(remote),
            state.clone(),
            Arc::new(RateLimiter::per_hour(320)),
            Arc::new(Syncer::new(fast_sync_opts())),
            Arc::new(FakeAuthFlow { cancel: false }),
            RouterOptions {
                save_timeout: StdDuration::from_millis(50),
                ..RouterOptions::default()
            },
        );

        // The status check never returns; the save must still come back.
        let response = router
            .handle(Request::SaveUrl {
                url: "https://example.com/slow".to_string(),
                title: None,
                tags: vec![],
            })
            .await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("timed out"));

        // Nothing was cached for the timed-out save.
        assert!(
            router
                .cache()
                .lookup("https://example.com/slow")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn requests_parse_from_tagged_json() {
        let request: Request =
            serde_json::from_str(r#"{"type":"save_url","url":"https://e.test","tags":["a"]}"#)
                .unwrap();
        assert!(matches!(request, Request::SaveUrl { .. }));

        let request: Request = serde_json::from_str(r#"{"type":"request_tag_sync"}"#).unwrap();
        assert!(matches!(request, Request::RequestTagSync));

        assert!(serde_json::from_str::<Request>(r#"{"type":"unknown"}"#).is_err());
    }

    #[test]
    fn responses_flatten_payload_next_to_success() {
        let response = Response::ok(Payload::Saved {
            item_id: "5".to_string(),
            created: true,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["item_id"], "5");
        assert_eq!(json["created"], true);

        let failure = Response::failure("boom");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
    }
}
