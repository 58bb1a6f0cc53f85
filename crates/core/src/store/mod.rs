pub mod local;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Uniform async key-value persistence for all cross-invocation state.
///
/// The background process can be stopped at any idle point, so everything
/// that must survive a restart goes through this interface.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}
