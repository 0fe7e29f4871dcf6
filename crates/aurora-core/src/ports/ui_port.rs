use anyhow::Result;

use crate::view::{Screen, Toast};

#[async_trait::async_trait]
pub trait UiPort: Send + Sync {
    /// Replace whatever is visible with `screen`.
    async fn render(&self, screen: &Screen) -> Result<()>;

    async fn show_toast(&self, toast: &Toast) -> Result<()>;
}
