//! Scripted fakes for the trait seams, shared across the crate's tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{AuthFlowError, RemoteError};
use crate::remote::{Authorization, ItemPage, ItemQuery, Remote, RemoteItem};
use crate::router::AuthFlow;

pub fn item(id: &str, url: &str, tags: &[&str]) -> RemoteItem {
    RemoteItem {
        item_id: id.to_string(),
        given_url: Some(url.to_string()),
        resolved_url: Some(url.to_string()),
        given_title: Some(format!("Title of {id}")),
        resolved_title: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Scripted stand-in for the remote service. `get_items` slices a fixture
/// item list by offset/count; failures queued for an offset are consumed
/// first, in order.
#[derive(Default)]
pub struct FakeRemote {
    pub items: Vec<RemoteItem>,
    pub get_failures: Mutex<HashMap<u64, VecDeque<RemoteError>>>,
    pub exchange_failures: Mutex<VecDeque<RemoteError>>,
    pub add_failures: Mutex<VecDeque<RemoteError>>,
    /// Log of (offset, count) per get_items call.
    pub get_calls: Mutex<Vec<(u64, u64)>>,
    /// Log of (url, tags) per add_item call.
    pub added: Mutex<Vec<(String, Vec<String>)>>,
    /// Log of (item_id, tags) per replace_tags call.
    pub replaced: Mutex<Vec<(String, Vec<String>)>>,
    next_item_id: Mutex<u64>,
    /// When set, every get_items call signals `entered` and then waits for
    /// `release`.
    pub gate: Option<Gate>,
}

#[derive(Clone)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

impl FakeRemote {
    pub fn with_items(items: Vec<RemoteItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Queue errors for get_items calls at the given offset.
    pub fn fail_at(&self, offset: u64, errors: impl IntoIterator<Item = RemoteError>) {
        self.get_failures
            .lock()
            .unwrap()
            .entry(offset)
            .or_default()
            .extend(errors);
    }
}

#[async_trait]
impl Remote for FakeRemote {
    async fn request_token(&self, _redirect_uri: &str) -> Result<String, RemoteError> {
        Ok("fake-request-token".to_string())
    }

    async fn exchange_token(&self, _request_token: &str) -> Result<Authorization, RemoteError> {
        if let Some(err) = self.exchange_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(Authorization {
            access_token: "fake-access-token".to_string(),
            username: Some("tester".to_string()),
        })
    }

    fn authorize_url(&self, request_token: &str, _redirect_uri: &str) -> String {
        format!("https://remote.test/auth?request_token={request_token}")
    }

    async fn get_items(
        &self,
        _access_token: &str,
        query: &ItemQuery,
    ) -> Result<ItemPage, RemoteError> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.get_calls
            .lock()
            .unwrap()
            .push((query.offset, query.count));
        let failure = {
            let mut failures = self.get_failures.lock().unwrap();
            failures
                .get_mut(&query.offset)
                .and_then(|queue| queue.pop_front())
        };
        if let Some(err) = failure {
            return Err(err);
        }

        let start = query.offset as usize;
        let items = if start >= self.items.len() {
            Vec::new()
        } else {
            let end = (start + query.count as usize).min(self.items.len());
            self.items[start..end].to_vec()
        };
        Ok(ItemPage { items })
    }

    async fn add_item(
        &self,
        _access_token: &str,
        url: &str,
        title: Option<&str>,
        tags: &[String],
    ) -> Result<RemoteItem, RemoteError> {
        if let Some(err) = self.add_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let mut next = self.next_item_id.lock().unwrap();
        *next += 1;
        let id = format!("item-{next}");
        self.added
            .lock()
            .unwrap()
            .push((url.to_string(), tags.to_vec()));
        Ok(RemoteItem {
            item_id: id,
            given_url: Some(url.to_string()),
            resolved_url: Some(url.to_string()),
            given_title: title.map(str::to_string),
            resolved_title: None,
            tags: tags.to_vec(),
        })
    }

    async fn replace_tags(
        &self,
        _access_token: &str,
        item_id: &str,
        tags: &[String],
    ) -> Result<(), RemoteError> {
        self.replaced
            .lock()
            .unwrap()
            .push((item_id.to_string(), tags.to_vec()));
        Ok(())
    }
}

/// Consent step that succeeds or cancels without a browser.
pub struct FakeAuthFlow {
    pub cancel: bool,
}

#[async_trait]
impl AuthFlow for FakeAuthFlow {
    async fn authorize(&self, _authorize_url: &str) -> Result<String, AuthFlowError> {
        if self.cancel {
            Err(AuthFlowError::Cancelled)
        } else {
            Ok("https://redirect.test/done".to_string())
        }
    }
}
