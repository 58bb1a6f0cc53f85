use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Every tag the user has ever applied, plus when the last full sync
/// finished. Grows monotonically: partial syncs only ever add.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagVocabulary {
    pub tags: BTreeSet<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl TagVocabulary {
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Additive union with another batch of tags.
    pub fn merge<I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.tags.extend(tags);
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Case-insensitive prefix matches for autocomplete, at most `limit`.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<&str> {
        let needle = prefix.to_lowercase();
        self.tags
            .iter()
            .filter(|tag| tag.to_lowercase().starts_with(&needle))
            .take(limit)
            .map(String::as_str)
            .collect()
    }

    /// True when the vocabulary has never been fetched or is older than
    /// `ttl`.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.last_fetched_at {
            Some(at) => now - at > ttl,
            None => true,
        }
    }
}

/// Persisted pagination offset. Present only while a sync is in progress;
/// cleared as the terminal step of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    pub offset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(tags: &[&str]) -> TagVocabulary {
        let mut v = TagVocabulary::default();
        v.merge(tags.iter().map(|t| t.to_string()));
        v
    }

    #[test]
    fn merge_is_additive_and_dedups() {
        let mut v = vocab(&["rust", "async"]);
        v.merge(["rust".to_string(), "http".to_string()]);
        assert_eq!(v.len(), 3);
        assert!(v.tags.contains("http"));
    }

    #[test]
    fn suggest_matches_prefix_case_insensitively() {
        let v = vocab(&["Rust", "rust-lang", "python", "reading"]);
        assert_eq!(v.suggest("ru", 5), vec!["Rust", "rust-lang"]);
        assert_eq!(v.suggest("RU", 1), vec!["Rust"]);
        assert!(v.suggest("zz", 5).is_empty());
    }

    #[test]
    fn staleness() {
        let now = Utc::now();
        let ttl = Duration::hours(24);

        let mut v = TagVocabulary::default();
        assert!(v.is_stale(now, ttl));

        v.last_fetched_at = Some(now - Duration::hours(1));
        assert!(!v.is_stale(now, ttl));

        v.last_fetched_at = Some(now - Duration::hours(25));
        assert!(v.is_stale(now, ttl));
    }
}
