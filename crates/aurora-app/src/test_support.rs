//! Mock and in-memory implementations of the ports for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mockall::mock;

use aurora_core::api::{
    ApiClientError, StatusReport, SubscribeRequest, UnsubscribeRequest, UpdatePreferencesRequest,
};
use aurora_core::location::{Coordinates, GeocodedPlace, LocationError, PositionRequest};
use aurora_core::notification::{DisplayNotification, PermissionState};
use aurora_core::ports::{
    AppWindowPort, ClockPort, GeolocationPort, KeyValueStorePort, NotificationDisplayPort,
    NotificationPermissionPort, PushTokenPort, ReverseGeocoderPort, SubscriptionApiPort, UiPort,
};
use aurora_core::view::{Screen, Toast};
use aurora_core::SubscriberId;

mock! {
    pub Geolocation {}

    #[async_trait]
    impl GeolocationPort for Geolocation {
        async fn current_position(&self, request: &PositionRequest)
            -> Result<Coordinates, LocationError>;
    }
}

mock! {
    pub Geocoder {}

    #[async_trait]
    impl ReverseGeocoderPort for Geocoder {
        async fn reverse_geocode(&self, coordinates: Coordinates) -> anyhow::Result<GeocodedPlace>;
    }
}

mock! {
    pub Permission {}

    #[async_trait]
    impl NotificationPermissionPort for Permission {
        async fn request_permission(&self) -> PermissionState;
        fn current_permission(&self) -> PermissionState;
    }
}

mock! {
    pub PushToken {}

    #[async_trait]
    impl PushTokenPort for PushToken {
        fn is_available(&self) -> bool;
        async fn issue_token(&self, vapid_public_key: &str) -> anyhow::Result<String>;
    }
}

mock! {
    pub Display {}

    #[async_trait]
    impl NotificationDisplayPort for Display {
        async fn show(&self, notification: &DisplayNotification) -> anyhow::Result<()>;
        async fn close(&self, tag: &str) -> anyhow::Result<()>;
    }
}

mock! {
    pub Window {}

    #[async_trait]
    impl AppWindowPort for Window {
        async fn open_or_focus(&self, url: &str) -> anyhow::Result<()>;
    }
}

mock! {
    pub Api {}

    #[async_trait]
    impl SubscriptionApiPort for Api {
        async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscriberId, ApiClientError>;
        async fn unsubscribe(&self, request: &UnsubscribeRequest) -> Result<(), ApiClientError>;
        async fn status(&self) -> Result<StatusReport, ApiClientError>;
        async fn update_preferences(
            &self,
            token: &str,
            request: &UpdatePreferencesRequest,
        ) -> Result<(), ApiClientError>;
    }
}

/// Clock frozen at a fixed instant.
pub struct FixedClock(pub i64);

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// In-memory key-value store.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: bool,
}

impl MemoryStore {
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl KeyValueStorePort for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail_reads {
            anyhow::bail!("store offline");
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// UI that records every screen and toast.
#[derive(Default)]
pub struct RecordingUi {
    pub screens: Mutex<Vec<Screen>>,
    pub toasts: Mutex<Vec<Toast>>,
}

impl RecordingUi {
    pub fn last_screen(&self) -> Option<Screen> {
        self.screens.lock().unwrap().last().cloned()
    }

    pub fn toast_messages(&self) -> Vec<String> {
        self.toasts
            .lock()
            .unwrap()
            .iter()
            .map(|toast| toast.message.clone())
            .collect()
    }
}

#[async_trait]
impl UiPort for RecordingUi {
    async fn render(&self, screen: &Screen) -> anyhow::Result<()> {
        self.screens.lock().unwrap().push(screen.clone());
        Ok(())
    }

    async fn show_toast(&self, toast: &Toast) -> anyhow::Result<()> {
        self.toasts.lock().unwrap().push(toast.clone());
        Ok(())
    }
}
