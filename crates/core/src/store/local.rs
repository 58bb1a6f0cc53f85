use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::Store;

/// File-per-key store rooted at a directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root: path.as_ref().to_path_buf(),
        }
    }

    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create directory: {}", root.display()))?;
        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let full = self.key_path(key);
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read: {}", full.display()))
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let full = self.key_path(key);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, value)
            .await
            .with_context(|| format!("failed to write: {}", full.display()))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let full = self.key_path(key);
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove: {}", full.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::init(dir.path()).unwrap();

        assert!(store.get("access_token").await.unwrap().is_none());

        store.set("access_token", b"\"tok\"").await.unwrap();
        assert_eq!(
            store.get("access_token").await.unwrap().unwrap(),
            b"\"tok\""
        );

        store.remove("access_token").await.unwrap();
        assert!(store.get("access_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn removing_a_missing_key_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::init(dir.path()).unwrap();
        store.remove("never_set").await.unwrap();
    }
}
