//! The client-side session: who we are subscribed as and what we asked for.

use serde::{Deserialize, Serialize};

use crate::location::Coordinates;
use crate::notification::NotificationToken;

pub const DEFAULT_RADIUS_KM: u32 = 250;
pub const DEFAULT_THRESHOLD_PERCENT: u32 = 15;

/// Opaque identifier returned by the backend after a successful subscribe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(String);

impl SubscriberId {
    /// Returns `None` for an empty or blank id.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partially known position; both halves arrive together from the location
/// provider but are stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }

    pub fn is_complete(&self) -> bool {
        self.coordinates().is_some()
    }
}

/// Last-submitted preferences, in the persisted JSON shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: u32,
    pub threshold: u32,
}

impl Preferences {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// In-memory session owned by the session controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub subscriber_id: Option<SubscriberId>,
    pub notification_token: Option<NotificationToken>,
    pub location: Location,
    pub radius_km: u32,
    pub threshold_percent: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            subscriber_id: None,
            notification_token: None,
            location: Location::default(),
            radius_km: DEFAULT_RADIUS_KM,
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
        }
    }
}

impl Session {
    /// Session with custom preference defaults.
    pub fn with_defaults(radius_km: u32, threshold_percent: u32) -> Self {
        Self {
            radius_km,
            threshold_percent,
            ..Self::default()
        }
    }

    /// Submission readiness: full location and some token.
    pub fn is_ready_to_submit(&self) -> bool {
        self.location.is_complete() && self.notification_token.is_some()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriber_id.is_some()
    }

    /// Preferences as they would be persisted; `None` until the location is known.
    pub fn preferences(&self) -> Option<Preferences> {
        let coordinates = self.location.coordinates()?;
        Some(Preferences {
            lat: coordinates.latitude,
            lon: coordinates.longitude,
            radius_km: self.radius_km,
            threshold: self.threshold_percent,
        })
    }

    pub fn apply_preferences(&mut self, preferences: &Preferences) {
        self.location = Location::from_coordinates(preferences.coordinates());
        self.radius_km = preferences.radius_km;
        self.threshold_percent = preferences.threshold;
    }

    /// Drop every field, keeping the given preference defaults.
    pub fn reset(&mut self, radius_km: u32, threshold_percent: u32) {
        *self = Self::with_defaults(radius_km, threshold_percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(location: Location, token: Option<NotificationToken>) -> Session {
        Session {
            location,
            notification_token: token,
            ..Session::default()
        }
    }

    #[test]
    fn readiness_requires_location_and_token() {
        let full = Location::from_coordinates(Coordinates::new(40.0, -105.0));
        let token = Some(NotificationToken::delivered("t"));

        assert!(session(full, token.clone()).is_ready_to_submit());
        assert!(!session(full, None).is_ready_to_submit());
        assert!(!session(Location::default(), token).is_ready_to_submit());
        assert!(!session(Location::default(), None).is_ready_to_submit());
    }

    #[test]
    fn readiness_requires_both_coordinates() {
        let half = Location {
            latitude: Some(40.0),
            longitude: None,
        };
        let s = session(half, Some(NotificationToken::degraded_at(1)));
        assert!(!s.is_ready_to_submit());
    }

    #[test]
    fn zero_coordinates_count_as_present() {
        let equator = Location::from_coordinates(Coordinates::new(0.0, 0.0));
        let s = session(equator, Some(NotificationToken::delivered("t")));
        assert!(s.is_ready_to_submit());
    }

    #[test]
    fn subscriber_id_rejects_blank() {
        assert!(SubscriberId::new("").is_none());
        assert!(SubscriberId::new("  ").is_none());
        assert_eq!(SubscriberId::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn preferences_round_trip_through_session() {
        let prefs = Preferences {
            lat: 64.8,
            lon: -147.7,
            radius_km: 500,
            threshold: 30,
        };
        let mut s = Session::default();
        s.apply_preferences(&prefs);

        assert_eq!(s.preferences(), Some(prefs));
    }

    #[test]
    fn preferences_serialize_in_persisted_shape() {
        let prefs = Preferences {
            lat: 40.0,
            lon: -105.0,
            radius_km: 250,
            threshold: 15,
        };
        let json = serde_json::to_value(prefs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"lat": 40.0, "lon": -105.0, "radius_km": 250, "threshold": 15})
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = Session {
            subscriber_id: SubscriberId::new("abc"),
            notification_token: Some(NotificationToken::delivered("t")),
            location: Location::from_coordinates(Coordinates::new(1.0, 2.0)),
            radius_km: 900,
            threshold_percent: 80,
        };
        s.reset(DEFAULT_RADIUS_KM, DEFAULT_THRESHOLD_PERCENT);
        assert_eq!(s, Session::default());
    }
}
