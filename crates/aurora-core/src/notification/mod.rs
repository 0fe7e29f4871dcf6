//! Notification permission and delivery-token domain types.

pub mod push;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use push::{DisplayNotification, NotificationAction, PushMessage, PushNotificationBody};

/// Prefix of locally synthesized tokens. The suffix is a unix timestamp in
/// milliseconds.
pub const DEGRADED_TOKEN_PREFIX: &str = "browser_notification_";

/// Where a notification token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenProvenance {
    /// Issued by the platform push service.
    Delivered,
    /// Local placeholder; the backend cannot route pushes to it.
    Degraded,
}

/// Credential the push platform uses to route messages to this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationToken {
    Delivered(String),
    Degraded(String),
}

impl NotificationToken {
    pub fn delivered(token: impl Into<String>) -> Self {
        Self::Delivered(token.into())
    }

    /// Placeholder stamped with the given unix time in milliseconds.
    pub fn degraded_at(now_ms: i64) -> Self {
        Self::Degraded(format!("{DEGRADED_TOKEN_PREFIX}{now_ms}"))
    }

    /// Rebuild a token from its persisted string form.
    ///
    /// Empty strings are treated as absent.
    pub fn from_persisted(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        if raw.starts_with(DEGRADED_TOKEN_PREFIX) {
            Some(Self::Degraded(raw))
        } else {
            Some(Self::Delivered(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Delivered(token) | Self::Degraded(token) => token,
        }
    }

    pub fn provenance(&self) -> TokenProvenance {
        match self {
            Self::Delivered(_) => TokenProvenance::Delivered,
            Self::Degraded(_) => TokenProvenance::Degraded,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

impl std::fmt::Display for NotificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform answer to a notification permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Granted,
    Denied,
    /// The user dismissed the prompt without choosing.
    #[default]
    Prompt,
    /// The platform has no notification capability.
    Unsupported,
}

/// Marker returned once notification permission is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGranted;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("notification permission denied")]
    Denied,
    #[error("notifications are not supported on this platform")]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_token_is_timestamped() {
        let token = NotificationToken::degraded_at(1_700_000_000_123);
        assert_eq!(token.as_str(), "browser_notification_1700000000123");
        assert_eq!(token.provenance(), TokenProvenance::Degraded);
    }

    #[test]
    fn from_persisted_recovers_provenance() {
        let degraded = NotificationToken::from_persisted("browser_notification_42").unwrap();
        assert!(degraded.is_degraded());

        let delivered = NotificationToken::from_persisted("fcm:abc123").unwrap();
        assert_eq!(delivered, NotificationToken::delivered("fcm:abc123"));
    }

    #[test]
    fn from_persisted_treats_blank_as_absent() {
        assert_eq!(NotificationToken::from_persisted(""), None);
        assert_eq!(NotificationToken::from_persisted("   "), None);
    }

    #[test]
    fn permission_state_parses_snake_case() {
        let state: PermissionState = serde_json::from_str(r#""unsupported""#).unwrap();
        assert_eq!(state, PermissionState::Unsupported);
    }
}
