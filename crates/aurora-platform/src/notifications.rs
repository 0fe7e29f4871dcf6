//! Notification permission and push-token adapters.

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::info;

use aurora_core::notification::PermissionState;
use aurora_core::ports::{NotificationPermissionPort, PushTokenPort};

/// Answers the permission prompt with a configured state.
pub struct ConfiguredPermission {
    answer: PermissionState,
}

impl ConfiguredPermission {
    pub fn new(answer: PermissionState) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl NotificationPermissionPort for ConfiguredPermission {
    async fn request_permission(&self) -> PermissionState {
        info!(answer = ?self.answer, "notification permission prompt answered from configuration");
        self.answer
    }

    fn current_permission(&self) -> PermissionState {
        self.answer
    }
}

/// Push-token source. Unavailable unless a token is configured.
pub struct ConfiguredPushToken {
    token: Option<String>,
}

impl ConfiguredPushToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }
}

#[async_trait]
impl PushTokenPort for ConfiguredPushToken {
    fn is_available(&self) -> bool {
        self.token.is_some()
    }

    async fn issue_token(&self, vapid_public_key: &str) -> Result<String> {
        if vapid_public_key.is_empty() {
            bail!("no VAPID public key configured");
        }
        match &self.token {
            Some(token) => Ok(token.clone()),
            None => bail!("no push service registered on this host"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn permission_answer_is_fixed() {
        let adapter = ConfiguredPermission::new(PermissionState::Denied);
        assert_eq!(adapter.request_permission().await, PermissionState::Denied);
        assert_eq!(adapter.current_permission(), PermissionState::Denied);
    }

    #[tokio::test]
    async fn blank_token_means_unavailable() {
        let adapter = ConfiguredPushToken::new(Some("  ".into()));
        assert!(!adapter.is_available());
        assert!(adapter.issue_token("key").await.is_err());
    }

    #[tokio::test]
    async fn configured_token_is_issued() {
        let adapter = ConfiguredPushToken::new(Some("fcm-token".into()));
        assert!(adapter.is_available());
        assert_eq!(adapter.issue_token("key").await.unwrap(), "fcm-token");
    }

    #[tokio::test]
    async fn missing_vapid_key_fails_issuance() {
        let adapter = ConfiguredPushToken::new(Some("fcm-token".into()));
        assert!(adapter.issue_token("").await.is_err());
    }
}
