//! Notification permission and delivery-token acquisition.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, info_span, warn, Instrument};

use aurora_core::notification::{PermissionError, PermissionGranted, PermissionState};
use aurora_core::ports::{ClockPort, NotificationPermissionPort, PushTokenPort};
use aurora_core::NotificationToken;

/// Use case for enabling notifications.
///
/// Once permission is granted a token is always produced: the platform token
/// when it arrives in time, otherwise a degraded local placeholder.
pub struct ProvisionNotifications {
    permission: Arc<dyn NotificationPermissionPort>,
    push_token: Arc<dyn PushTokenPort>,
    clock: Arc<dyn ClockPort>,
    vapid_public_key: String,
    token_timeout: Duration,
}

impl ProvisionNotifications {
    pub fn new(
        permission: Arc<dyn NotificationPermissionPort>,
        push_token: Arc<dyn PushTokenPort>,
        clock: Arc<dyn ClockPort>,
        vapid_public_key: impl Into<String>,
        token_timeout: Duration,
    ) -> Self {
        Self {
            permission,
            push_token,
            clock,
            vapid_public_key: vapid_public_key.into(),
            token_timeout,
        }
    }

    /// Ask for permission, then acquire a token.
    pub async fn execute(&self) -> Result<NotificationToken, PermissionError> {
        let span = info_span!("usecase.provision_notifications.execute");
        async {
            let granted = self.request_permission().await?;
            Ok(self.acquire_token(granted).await)
        }
        .instrument(span)
        .await
    }

    pub async fn request_permission(&self) -> Result<PermissionGranted, PermissionError> {
        let answer = self.permission.request_permission().await;
        info!(permission = ?answer, "notification permission answered");
        match answer {
            PermissionState::Granted => Ok(PermissionGranted),
            // A dismissed prompt is not a grant.
            PermissionState::Denied | PermissionState::Prompt => Err(PermissionError::Denied),
            PermissionState::Unsupported => Err(PermissionError::Unsupported),
        }
    }

    /// Current answer without prompting.
    pub fn current_permission(&self) -> PermissionState {
        self.permission.current_permission()
    }

    /// Never fails; falls back to a degraded token no later than the timeout.
    pub async fn acquire_token(&self, _granted: PermissionGranted) -> NotificationToken {
        if !self.push_token.is_available() {
            return self.degraded("push capability unavailable");
        }

        let issue = self.push_token.issue_token(&self.vapid_public_key);
        match timeout(self.token_timeout, issue).await {
            Ok(Ok(token)) if !token.trim().is_empty() => {
                info!("push token issued");
                NotificationToken::delivered(token)
            }
            Ok(Ok(_)) => self.degraded("push platform returned an empty token"),
            Ok(Err(err)) => {
                warn!(error = %err, "push token request failed");
                self.degraded("push platform error")
            }
            Err(_) => self.degraded("push token request timed out"),
        }
    }

    fn degraded(&self, reason: &'static str) -> NotificationToken {
        let token = NotificationToken::degraded_at(self.clock.now_ms());
        warn!(reason, token = %token, "using degraded local notification token");
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedClock, MockPermission, MockPushToken};
    use aurora_core::TokenProvenance;

    fn use_case(permission: MockPermission, push_token: MockPushToken) -> ProvisionNotifications {
        ProvisionNotifications::new(
            Arc::new(permission),
            Arc::new(push_token),
            Arc::new(FixedClock(1_700_000_000_000)),
            "vapid-key",
            Duration::from_secs(5),
        )
    }

    fn granting() -> MockPermission {
        let mut permission = MockPermission::new();
        permission
            .expect_request_permission()
            .returning(|| PermissionState::Granted);
        permission
    }

    #[tokio::test]
    async fn platform_token_is_delivered() {
        let mut push = MockPushToken::new();
        push.expect_is_available().return_const(true);
        push.expect_issue_token()
            .withf(|key| key == "vapid-key")
            .returning(|_| Ok("fcm-token".to_string()));

        let token = use_case(granting(), push).execute().await.unwrap();

        assert_eq!(token, NotificationToken::delivered("fcm-token"));
    }

    #[tokio::test]
    async fn unavailable_capability_degrades_without_asking_platform() {
        let mut push = MockPushToken::new();
        push.expect_is_available().return_const(false);
        push.expect_issue_token().never();

        let token = use_case(granting(), push).execute().await.unwrap();

        assert_eq!(token.as_str(), "browser_notification_1700000000000");
        assert_eq!(token.provenance(), TokenProvenance::Degraded);
    }

    #[tokio::test]
    async fn platform_error_degrades() {
        let mut push = MockPushToken::new();
        push.expect_is_available().return_const(true);
        push.expect_issue_token()
            .returning(|_| Err(anyhow::anyhow!("messaging/permission-blocked")));

        let token = use_case(granting(), push).execute().await.unwrap();

        assert!(token.is_degraded());
    }

    #[tokio::test]
    async fn empty_platform_token_degrades() {
        let mut push = MockPushToken::new();
        push.expect_is_available().return_const(true);
        push.expect_issue_token().returning(|_| Ok(String::new()));

        let token = use_case(granting(), push).execute().await.unwrap();

        assert!(token.is_degraded());
    }

    #[tokio::test]
    async fn denied_and_dismissed_prompts_are_denied() {
        for answer in [PermissionState::Denied, PermissionState::Prompt] {
            let mut permission = MockPermission::new();
            permission.expect_request_permission().return_const(answer);

            let err = use_case(permission, MockPushToken::new())
                .execute()
                .await
                .unwrap_err();

            assert_eq!(err, PermissionError::Denied);
        }
    }

    #[tokio::test]
    async fn unsupported_platform_is_reported() {
        let mut permission = MockPermission::new();
        permission
            .expect_request_permission()
            .return_const(PermissionState::Unsupported);

        let err = use_case(permission, MockPushToken::new())
            .request_permission()
            .await
            .unwrap_err();

        assert_eq!(err, PermissionError::Unsupported);
    }

    struct HangingPushToken;

    #[async_trait::async_trait]
    impl PushTokenPort for HangingPushToken {
        fn is_available(&self) -> bool {
            true
        }

        async fn issue_token(&self, _vapid_public_key: &str) -> anyhow::Result<String> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_platform_falls_back_within_timeout() {
        let use_case = ProvisionNotifications::new(
            Arc::new(granting()),
            Arc::new(HangingPushToken),
            Arc::new(FixedClock(42)),
            "vapid-key",
            Duration::from_secs(5),
        );

        let started = tokio::time::Instant::now();
        let token = use_case.acquire_token(PermissionGranted).await;

        assert_eq!(token, NotificationToken::degraded_at(42));
        assert!(started.elapsed() <= Duration::from_secs(5));
    }
}
