//! Inbound push payloads and the notifications rendered from them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ALERT_TAG: &str = "aurora-alert";
pub const DEFAULT_ALERT_TITLE: &str = "Aurora Alert!";
pub const DEFAULT_ALERT_BODY: &str = "Aurora activity detected in your area!";

pub const TEST_TAG: &str = "aurora-test";
pub const TEST_TITLE: &str = "Aurora Alert Test";
pub const TEST_BODY: &str = "This is how you'll receive aurora notifications! 🌌";

/// Message delivered by the push platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(default)]
    pub notification: Option<PushNotificationBody>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotificationBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Buttons attached to a rendered alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    /// Close the notification and open or focus the app root.
    View,
    /// Close only.
    Dismiss,
}

impl NotificationAction {
    pub fn id(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Dismiss => "dismiss",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::View => "View Details",
            Self::Dismiss => "Dismiss",
        }
    }
}

impl FromStr for NotificationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "dismiss" => Ok(Self::Dismiss),
            other => Err(format!("unknown notification action: {other}")),
        }
    }
}

/// A notification ready for the platform to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNotification {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
    pub data: Map<String, Value>,
}

impl DisplayNotification {
    /// Render an inbound push message, defaulting missing fields.
    pub fn from_push(message: PushMessage) -> Self {
        let body = message.notification.unwrap_or_default();
        Self {
            title: non_blank(body.title).unwrap_or_else(|| DEFAULT_ALERT_TITLE.to_string()),
            body: non_blank(body.body).unwrap_or_else(|| DEFAULT_ALERT_BODY.to_string()),
            tag: ALERT_TAG.to_string(),
            require_interaction: true,
            actions: vec![NotificationAction::View, NotificationAction::Dismiss],
            data: message.data.unwrap_or_default(),
        }
    }

    /// Local notification used to preview how alerts look.
    pub fn test_alert() -> Self {
        Self {
            title: TEST_TITLE.to_string(),
            body: TEST_BODY.to_string(),
            tag: TEST_TAG.to_string(),
            require_interaction: false,
            actions: Vec::new(),
            data: Map::new(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
