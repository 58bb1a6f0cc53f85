pub mod client;
pub mod endpoints;
pub mod types;

pub use client::PocketClient;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use pocketsync_core::error::RemoteError;
use pocketsync_core::remote::{Authorization, ItemPage, ItemQuery, Remote, RemoteItem};

#[async_trait]
impl Remote for PocketClient {
    async fn request_token(&self, redirect_uri: &str) -> Result<String, RemoteError> {
        let body = json!({
            "consumer_key": self.consumer_key(),
            "redirect_uri": redirect_uri,
        });
        let resp: types::RequestTokenResponse =
            self.post_json(endpoints::OAUTH_REQUEST, &body).await?;
        Ok(resp.code)
    }

    async fn exchange_token(&self, request_token: &str) -> Result<Authorization, RemoteError> {
        let body = json!({
            "consumer_key": self.consumer_key(),
            "code": request_token,
        });
        let resp: types::AuthorizeResponse =
            self.post_json(endpoints::OAUTH_AUTHORIZE, &body).await?;
        Ok(Authorization {
            access_token: resp.access_token,
            username: resp.username,
        })
    }

    fn authorize_url(&self, request_token: &str, redirect_uri: &str) -> String {
        endpoints::authorize_url(request_token, redirect_uri)
    }

    async fn get_items(
        &self,
        access_token: &str,
        query: &ItemQuery,
    ) -> Result<ItemPage, RemoteError> {
        let mut body = Map::new();
        body.insert("consumer_key".into(), json!(self.consumer_key()));
        body.insert("access_token".into(), json!(access_token));
        body.insert("offset".into(), json!(query.offset));
        body.insert("count".into(), json!(query.count));
        body.insert("detailType".into(), json!(query.detail.as_str()));
        if query.all_states {
            body.insert("state".into(), json!("all"));
        }
        if let Some(url) = &query.url {
            body.insert("url".into(), json!(url));
        }
        if let Some(search) = &query.search {
            body.insert("search".into(), json!(search));
        }

        let resp: types::GetResponse = self
            .post_json(endpoints::GET, &Value::Object(body))
            .await?;
        Ok(ItemPage {
            items: resp.list.into_values().map(RemoteItem::from).collect(),
        })
    }

    async fn add_item(
        &self,
        access_token: &str,
        url: &str,
        title: Option<&str>,
        tags: &[String],
    ) -> Result<RemoteItem, RemoteError> {
        let mut body = Map::new();
        body.insert("consumer_key".into(), json!(self.consumer_key()));
        body.insert("access_token".into(), json!(access_token));
        body.insert("url".into(), json!(url));
        if let Some(title) = title {
            body.insert("title".into(), json!(title));
        }
        if !tags.is_empty() {
            body.insert("tags".into(), json!(tags.join(",")));
        }

        let resp: types::AddResponse = self
            .post_json(endpoints::ADD, &Value::Object(body))
            .await?;
        Ok(RemoteItem {
            item_id: resp.item.item_id,
            given_url: resp.item.given_url,
            resolved_url: resp.item.resolved_url,
            given_title: resp.item.given_title,
            resolved_title: resp.item.title,
            tags: tags.to_vec(),
        })
    }

    async fn replace_tags(
        &self,
        access_token: &str,
        item_id: &str,
        tags: &[String],
    ) -> Result<(), RemoteError> {
        let body = json!({
            "consumer_key": self.consumer_key(),
            "access_token": access_token,
            "actions": [{
                "action": "tags_replace",
                "item_id": item_id,
                "tags": tags.join(","),
            }],
        });
        let _resp: types::SendResponse = self.post_json(endpoints::SEND, &body).await?;
        Ok(())
    }
}
