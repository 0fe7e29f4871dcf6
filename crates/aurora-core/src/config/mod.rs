//! # Application configuration DTOs
//!
//! Static configuration read once at start-up. Nothing here is negotiated at
//! runtime. Each section carries the defaults the client ships with, so a
//! missing file or a missing section is a valid configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::location::{Coordinates, PositionRequest};
use crate::notification::PermissionState;
use crate::session::{DEFAULT_RADIUS_KM, DEFAULT_THRESHOLD_PERCENT};

/// Application configuration DTO
/// 应用配置 DTO
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub push: PushConfig,
    pub geocoding: GeocodingConfig,
    pub location: LocationConfig,
    pub notifications: NotificationConfig,
    pub platform: PlatformConfig,
    pub storage: StorageConfig,
    pub preferences: PreferenceDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Push-service project credentials and the public key used for token
/// issuance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub api_key: String,
    pub project_id: String,
    pub sender_id: String,
    pub app_id: String,
    pub vapid_public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bigdatacloud.net/data/reverse-geocode-client".to_string(),
            timeout_secs: 10,
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub high_accuracy: bool,
    pub timeout_secs: u64,
    pub maximum_age_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        let request = PositionRequest::default();
        Self {
            high_accuracy: request.high_accuracy,
            timeout_secs: request.timeout.as_secs(),
            maximum_age_secs: request.maximum_age.as_secs(),
        }
    }
}

impl LocationConfig {
    pub fn position_request(&self) -> PositionRequest {
        PositionRequest {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_secs(self.timeout_secs),
            maximum_age: Duration::from_secs(self.maximum_age_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Bound on the platform token path before a degraded token is used.
    pub token_timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            token_timeout_secs: 5,
        }
    }
}

impl NotificationConfig {
    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_secs)
    }
}

/// Answers the host platform gives in place of interactive prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notification_permission: PermissionState,
    /// Token handed out by the push platform, if this host has one.
    pub push_token: Option<String>,
    /// Root opened when the user chooses "view" on an alert.
    pub app_root: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            notification_permission: PermissionState::Granted,
            push_token: None,
            app_root: "/".to_string(),
        }
    }
}

impl PlatformConfig {
    pub fn position(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Session store file; defaults under the application data directory.
    pub session_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceDefaults {
    pub radius_km: u32,
    pub threshold: u32,
}

impl Default for PreferenceDefaults {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            threshold: DEFAULT_THRESHOLD_PERCENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.notifications.token_timeout(), Duration::from_secs(5));
        assert_eq!(config.preferences.radius_km, 250);
        assert_eq!(config.preferences.threshold, 15);
    }

    #[test]
    fn platform_position_needs_both_coordinates() {
        let mut platform = PlatformConfig::default();
        assert_eq!(platform.position(), None);

        platform.latitude = Some(69.6);
        assert_eq!(platform.position(), None);

        platform.longitude = Some(18.9);
        assert_eq!(platform.position(), Some(Coordinates::new(69.6, 18.9)));
    }
}
