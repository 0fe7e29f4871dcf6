//! Wire schemas for the subscription REST API.
//!
//! Every optional field is explicit and defaulted at the boundary so that a
//! partial response decodes instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::session::SubscriberId;

/// `POST /subscribe` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: u32,
    pub threshold: u32,
    pub token: String,
}

/// `POST /subscribe` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscribeResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_user_id")]
    pub user_id: Option<String>,
}

impl SubscribeResponse {
    /// Subscriber id when the server reported success and returned one.
    pub fn subscriber_id(&self) -> Option<SubscriberId> {
        if !self.success {
            return None;
        }
        self.user_id.clone().and_then(SubscriberId::new)
    }
}

fn default_success() -> bool {
    true
}

/// The backend has shipped both string and integer user ids.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

/// `DELETE /unsubscribe` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeRequest {
    pub token: String,
}

/// `PATCH /prefs?token=..` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePreferencesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
}

/// `GET /status` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub active_users: Option<u64>,
}

impl StatusReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    /// Flatten `detail` to text; validation errors arrive as arrays.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiClientError {
    #[error("API error: {status} - {detail}")]
    Api { status: u16, detail: String },
    #[error("network failure: {0}")]
    Network(String),
}
