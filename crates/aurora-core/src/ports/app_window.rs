use anyhow::Result;

/// Opens or focuses the client at a given root.
#[async_trait::async_trait]
pub trait AppWindowPort: Send + Sync {
    async fn open_or_focus(&self, url: &str) -> Result<()>;
}
