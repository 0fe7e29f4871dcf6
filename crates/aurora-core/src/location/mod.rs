//! Geographic position types shared by the geolocation and geocoding ports.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A resolved device position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Fixed-precision `"lat, lon"` label used when no place name is known.
    pub fn display_label(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Options for a single position fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequest {
    pub high_accuracy: bool,
    /// Upper bound on the wait for a fix.
    pub timeout: Duration,
    /// Oldest cached fix the platform may return instead of a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionRequest {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("geolocation is not supported on this platform")]
    Unsupported,
    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// Place returned by a reverse-geocoding lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedPlace {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
}

impl GeocodedPlace {
    /// `"<city>, <country>"`, falling back to the locality. `None` when the
    /// lookup did not name a place.
    pub fn label(&self) -> Option<String> {
        let country = non_empty(&self.country_name)?;
        let place = non_empty(&self.city).or_else(|| non_empty(&self.locality))?;
        Some(format!("{place}, {country}"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
