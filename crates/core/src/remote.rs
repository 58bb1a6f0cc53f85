use async_trait::async_trait;

use crate::error::RemoteError;
use crate::urlnorm;

/// Item detail level for fetches. Tag extraction needs `Complete`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Detail {
    #[default]
    Simple,
    Complete,
}

impl Detail {
    pub fn as_str(self) -> &'static str {
        match self {
            Detail::Simple => "simple",
            Detail::Complete => "complete",
        }
    }
}

/// Parameters for one page of an item fetch.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub offset: u64,
    pub count: u64,
    pub detail: Detail,
    /// Include archived items, not just unread ones.
    pub all_states: bool,
    /// Match a specific URL.
    pub url: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
}

/// A bookmarked item as reported by the remote service.
#[derive(Debug, Clone, Default)]
pub struct RemoteItem {
    pub item_id: String,
    pub given_url: Option<String>,
    pub resolved_url: Option<String>,
    pub given_title: Option<String>,
    pub resolved_title: Option<String>,
    pub tags: Vec<String>,
}

impl RemoteItem {
    pub fn url(&self) -> Option<&str> {
        self.resolved_url.as_deref().or(self.given_url.as_deref())
    }

    pub fn title(&self) -> Option<&str> {
        self.resolved_title
            .as_deref()
            .or(self.given_title.as_deref())
    }
}

/// One page of a paginated item fetch. Pages shorter than the requested
/// count signal the end of the collection.
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub items: Vec<RemoteItem>,
}

/// Result of the OAuth token exchange.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub access_token: String,
    pub username: Option<String>,
}

/// The remote bookmarking service, reduced to the five operations the
/// rest of the system is written against.
#[async_trait]
pub trait Remote: Send + Sync {
    async fn request_token(&self, redirect_uri: &str) -> Result<String, RemoteError>;

    async fn exchange_token(&self, request_token: &str) -> Result<Authorization, RemoteError>;

    /// Browser consent page for a pending request token.
    fn authorize_url(&self, request_token: &str, redirect_uri: &str) -> String;

    async fn get_items(
        &self,
        access_token: &str,
        query: &ItemQuery,
    ) -> Result<ItemPage, RemoteError>;

    async fn add_item(
        &self,
        access_token: &str,
        url: &str,
        title: Option<&str>,
        tags: &[String],
    ) -> Result<RemoteItem, RemoteError>;

    /// Overwrites the item's tags with exactly this list (no merge).
    async fn replace_tags(
        &self,
        access_token: &str,
        item_id: &str,
        tags: &[String],
    ) -> Result<(), RemoteError>;

    /// Locate the saved item for `url`, if any. Candidates come from a
    /// search on the scheme-stripped URL; the match itself runs over the
    /// normalized comparison key, so trivial URL variation still hits.
    async fn find_item(
        &self,
        access_token: &str,
        url: &str,
    ) -> Result<Option<RemoteItem>, RemoteError> {
        let query = ItemQuery {
            count: 100,
            detail: Detail::Complete,
            all_states: true,
            search: Some(urlnorm::search_form(url)),
            ..Default::default()
        };
        let page = self.get_items(access_token, &query).await?;

        let key = urlnorm::comparison_key(url);
        let matches = |candidate: Option<&str>| {
            candidate.is_some_and(|u| urlnorm::comparison_key(u) == key)
        };
        Ok(page.items.into_iter().find(|item| {
            matches(item.resolved_url.as_deref()) || matches(item.given_url.as_deref())
        }))
    }
}
