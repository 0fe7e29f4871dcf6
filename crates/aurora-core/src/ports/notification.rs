use anyhow::Result;
use async_trait::async_trait;

use crate::notification::{DisplayNotification, PermissionState};

/// Platform notification permission prompt.
#[async_trait]
pub trait NotificationPermissionPort: Send + Sync {
    /// Ask the user. The platform caches the answer.
    async fn request_permission(&self) -> PermissionState;

    /// Current answer without prompting.
    fn current_permission(&self) -> PermissionState;
}

/// Platform push-token issuance.
#[async_trait]
pub trait PushTokenPort: Send + Sync {
    /// `false` when no push capability is registered on this host.
    fn is_available(&self) -> bool;

    /// Issue a delivery token. May hang; callers bound it.
    async fn issue_token(&self, vapid_public_key: &str) -> Result<String>;
}

/// Shows and closes platform notifications.
#[async_trait]
pub trait NotificationDisplayPort: Send + Sync {
    async fn show(&self, notification: &DisplayNotification) -> Result<()>;

    async fn close(&self, tag: &str) -> Result<()>;
}
