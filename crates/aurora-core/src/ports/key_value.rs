//! Durable key-value port
//!
//! This port defines the contract for the handful of session fields the
//! client keeps between runs. Implementations are provided by the
//! infrastructure layer (e.g., file-based storage).

use async_trait::async_trait;

#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    /// Read a value; absent keys are `Ok(None)`.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Remove a value; removing an absent key is not an error.
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}
