//! Wire types for the Pocket v3 API.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use pocketsync_core::remote::RemoteItem;

#[derive(Debug, Deserialize)]
pub struct RequestTokenResponse {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeResponse {
    pub access_token: String,
    pub username: Option<String>,
}

/// One saved item as returned by `/v3/get` (`detailType: complete`).
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub given_url: Option<String>,
    pub resolved_url: Option<String>,
    pub given_title: Option<String>,
    pub resolved_title: Option<String>,
    /// Keyed by tag name; the values carry nothing we use.
    #[serde(default)]
    pub tags: Option<HashMap<String, TagEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagEntry {
    pub item_id: Option<String>,
    pub tag: Option<String>,
}

impl Item {
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .as_ref()
            .map(|tags| tags.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl From<Item> for RemoteItem {
    fn from(item: Item) -> Self {
        let tags = item.tag_names();
        RemoteItem {
            item_id: item.item_id,
            given_url: item.given_url,
            resolved_url: item.resolved_url,
            given_title: item.given_title,
            resolved_title: item.resolved_title,
            tags,
        }
    }
}

/// `/v3/get` response. With no results the service serializes `list` as an
/// empty array instead of an object, so the field needs a tolerant
/// deserializer.
#[derive(Debug, Deserialize)]
pub struct GetResponse {
    #[serde(default, deserialize_with = "list_or_empty")]
    pub list: HashMap<String, Item>,
    pub status: Option<i64>,
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<HashMap<String, Item>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrSeq {
        Map(HashMap<String, Item>),
        Seq(Vec<serde::de::IgnoredAny>),
    }

    Ok(match MapOrSeq::deserialize(deserializer)? {
        MapOrSeq::Map(map) => map,
        MapOrSeq::Seq(_) => HashMap::new(),
    })
}

/// `/v3/add` response.
#[derive(Debug, Deserialize)]
pub struct AddResponse {
    pub item: AddedItem,
    pub status: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddedItem {
    pub item_id: String,
    pub given_url: Option<String>,
    pub resolved_url: Option<String>,
    pub given_title: Option<String>,
    /// The add endpoint reports the resolved title under `title`.
    pub title: Option<String>,
}

/// `/v3/send` response.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub action_results: Vec<serde_json::Value>,
    pub status: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_item_with_tags() {
        let json = r#"{
            "item_id": "229279689",
            "given_url": "https://www.example.com/article",
            "resolved_url": "https://example.com/article",
            "given_title": "Example",
            "resolved_title": "An Example Article",
            "tags": {
                "rust": {"item_id": "229279689", "tag": "rust"},
                "async": {"item_id": "229279689", "tag": "async"}
            }
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_id, "229279689");
        let mut tags = item.tag_names();
        tags.sort();
        assert_eq!(tags, vec!["async", "rust"]);
    }

    #[test]
    fn deserialize_item_without_tags() {
        let json = r#"{"item_id":"1","given_url":"https://e.test"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.tag_names().is_empty());
    }

    #[test]
    fn deserialize_get_response_with_list_object() {
        let json = r#"{
            "status": 1,
            "list": {
                "1": {"item_id":"1","given_url":"https://a.test"},
                "2": {"item_id":"2","given_url":"https://b.test"}
            }
        }"#;
        let resp: GetResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.list.len(), 2);
        assert_eq!(resp.status, Some(1));
    }

    #[test]
    fn deserialize_get_response_with_empty_array_list() {
        let json = r#"{"status":2,"list":[]}"#;
        let resp: GetResponse = serde_json::from_str(json).unwrap();
        assert!(resp.list.is_empty());
    }

    #[test]
    fn deserialize_get_response_without_list() {
        let json = r#"{"status":2}"#;
        let resp: GetResponse = serde_json::from_str(json).unwrap();
        assert!(resp.list.is_empty());
    }

    #[test]
    fn deserialize_add_response() {
        let json = r#"{
            "item": {
                "item_id": "1340050",
                "given_url": "https://example.com/",
                "title": "Example Domain"
            },
            "status": 1
        }"#;
        let resp: AddResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.item.item_id, "1340050");
        assert_eq!(resp.item.title.as_deref(), Some("Example Domain"));
    }

    #[test]
    fn deserialize_send_response() {
        let json = r#"{"action_results":[true],"status":1}"#;
        let resp: SendResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.action_results.len(), 1);
    }

    #[test]
    fn item_converts_to_remote_item() {
        let item = Item {
            item_id: "5".to_string(),
            given_url: Some("https://a.test".to_string()),
            resolved_url: None,
            given_title: Some("A".to_string()),
            resolved_title: None,
            tags: None,
        };
        let remote: RemoteItem = item.into();
        assert_eq!(remote.item_id, "5");
        assert_eq!(remote.url(), Some("https://a.test"));
    }
}
