//! Session controller.
//!
//! Owns the in-memory session and drives the onboarding state machine. Every
//! operation holds the controller lock from start to finish, so a second
//! submit issued while the first is in flight waits for it instead of
//! interleaving.
//!
//! Transitions are effect-then-move: the side effect runs first and the
//! success event is dispatched only once it has completed.
//!
//! The dashboard refresh (status probe and location label) is the exception:
//! it runs in a background task without the lock, so the dashboard is shown
//! first and a slow backend never blocks other operations.

use std::ops::RangeInclusive;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use aurora_core::api::{SubscribeRequest, UnsubscribeRequest, UpdatePreferencesRequest};
use aurora_core::config::PreferenceDefaults;
use aurora_core::notification::{DisplayNotification, PermissionState};
use aurora_core::ports::{
    ClockPort, GeolocationPort, KeyValueStorePort, NotificationDisplayPort,
    NotificationPermissionPort, PushTokenPort, ReverseGeocoderPort, SubscriptionApiPort, UiPort,
};
use aurora_core::view::{ApiStatus, DashboardView, Screen, SetupView, Toast};
use aurora_core::{
    AlertError, AppConfig, Coordinates, Location, OnboardingAction, OnboardingEvent,
    OnboardingState, OnboardingStateMachine, Session, SubscriberId, TokenProvenance,
};

use crate::session_store::SessionStore;
use crate::usecases::location::{ResolveLocation, ResolvedLocation};
use crate::usecases::notification::ProvisionNotifications;
use crate::usecases::probe_status::{ProbeApiStatus, StatusProbe};

pub const RADIUS_RANGE_KM: RangeInclusive<u32> = 50..=1000;
pub const THRESHOLD_RANGE_PERCENT: RangeInclusive<u32> = 1..=100;

/// Ports the controller is wired from.
#[derive(Clone)]
pub struct ControllerPorts {
    pub store: Arc<dyn KeyValueStorePort>,
    pub api: Arc<dyn SubscriptionApiPort>,
    pub geolocation: Arc<dyn GeolocationPort>,
    pub geocoder: Arc<dyn ReverseGeocoderPort>,
    pub permission: Arc<dyn NotificationPermissionPort>,
    pub push_token: Arc<dyn PushTokenPort>,
    pub display: Arc<dyn NotificationDisplayPort>,
    pub ui: Arc<dyn UiPort>,
    pub clock: Arc<dyn ClockPort>,
}

/// Result of an unsubscribe. Local state is cleared either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsubscribeOutcome {
    /// The backend acknowledged the unsubscribe.
    pub remote_confirmed: bool,
}

struct ControllerState {
    onboarding: OnboardingState,
    session: Session,
    location_label: Option<String>,
    probe: Option<StatusProbe>,
}

pub struct SessionController {
    inner: Arc<Mutex<ControllerState>>,
    store: SessionStore,
    api: Arc<dyn SubscriptionApiPort>,
    location: Arc<ResolveLocation>,
    notifications: ProvisionNotifications,
    refresher: DashboardRefresher,
    display: Arc<dyn NotificationDisplayPort>,
    ui: Arc<dyn UiPort>,
    defaults: PreferenceDefaults,
    pending_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl ControllerState {
    /// Apply a finished refresh. The label is dropped when the location
    /// changed while the refresh was in flight.
    fn apply_refresh(&mut self, refreshed: RefreshedDashboard) {
        self.probe = Some(refreshed.probe);
        if let Some(label) = refreshed.label {
            if self.session.location.coordinates() == refreshed.coordinates {
                self.location_label = Some(label);
            }
        }
    }
}

struct RefreshedDashboard {
    coordinates: Option<Coordinates>,
    label: Option<String>,
    probe: StatusProbe,
}

/// Network half of a dashboard refresh.
#[derive(Clone)]
struct DashboardRefresher {
    location: Arc<ResolveLocation>,
    probe: Arc<ProbeApiStatus>,
}

impl DashboardRefresher {
    async fn fetch(&self, coordinates: Option<Coordinates>) -> RefreshedDashboard {
        let label = async {
            match coordinates {
                Some(coordinates) => Some(self.location.resolve_display_name(coordinates).await),
                None => None,
            }
        };
        let (label, probe) = tokio::join!(label, self.probe.execute());
        RefreshedDashboard {
            coordinates,
            label,
            probe,
        }
    }
}

impl SessionController {
    pub fn new(ports: ControllerPorts, config: &AppConfig) -> Self {
        let defaults = config.preferences.clone();
        let location = Arc::new(ResolveLocation::new(
            ports.geolocation,
            ports.geocoder,
            config.location.position_request(),
            config.geocoding.timeout(),
        ));
        Self {
            inner: Arc::new(Mutex::new(ControllerState {
                onboarding: OnboardingState::default(),
                session: Session::with_defaults(defaults.radius_km, defaults.threshold),
                location_label: None,
                probe: None,
            })),
            store: SessionStore::new(ports.store),
            api: ports.api.clone(),
            location: location.clone(),
            notifications: ProvisionNotifications::new(
                ports.permission,
                ports.push_token,
                ports.clock.clone(),
                config.push.vapid_public_key.clone(),
                config.notifications.token_timeout(),
            ),
            refresher: DashboardRefresher {
                location,
                probe: Arc::new(ProbeApiStatus::new(ports.api, ports.clock)),
            },
            display: ports.display,
            ui: ports.ui,
            defaults,
            pending_refresh: Mutex::new(None),
        }
    }

    /// Restore the persisted session and show the first screen. The status
    /// probe runs in the background; see [`Self::wait_for_refresh`].
    pub async fn start(&self) -> OnboardingState {
        let span = info_span!("usecase.session_controller.start");
        async {
            let mut inner = self.inner.lock().await;
            let persisted = self.store.load().await;
            let has_subscription = persisted.has_subscription();
            info!(has_subscription, "restoring persisted session");

            let state = self
                .dispatch(&mut inner, OnboardingEvent::Restored { has_subscription })
                .await;
            if state != OnboardingState::Dashboard {
                // Dashboard entry already scheduled one.
                self.schedule_refresh(&inner).await;
            }
            self.render(&inner).await;
            state
        }
        .instrument(span)
        .await
    }

    /// Wait for the background dashboard refresh, if one is running.
    pub async fn wait_for_refresh(&self) {
        let task = self.pending_refresh.lock().await.take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    warn!(error = %err, "dashboard refresh task failed");
                }
            }
        }
    }

    pub async fn current_state(&self) -> OnboardingState {
        self.inner.lock().await.onboarding
    }

    pub async fn session(&self) -> Session {
        self.inner.lock().await.session.clone()
    }

    pub async fn screen(&self) -> Screen {
        let inner = self.inner.lock().await;
        Self::build_screen(&inner)
    }

    /// Welcome → Setup.
    pub async fn begin_setup(&self) -> Result<OnboardingState, AlertError> {
        let mut inner = self.inner.lock().await;
        Self::ensure_state(&inner, OnboardingState::Welcome, "begin setup")?;
        let state = self.dispatch(&mut inner, OnboardingEvent::RequestSetup).await;
        self.render(&inner).await;
        Ok(state)
    }

    /// Acquire the device position and name it.
    pub async fn acquire_location(&self) -> Result<ResolvedLocation, AlertError> {
        let span = info_span!("usecase.session_controller.acquire_location");
        async {
            let mut inner = self.inner.lock().await;
            Self::ensure_state(&inner, OnboardingState::Setup, "acquire location")?;

            let resolved = match self.location.execute().await {
                Ok(resolved) => resolved,
                Err(err) => return Err(self.fail(&inner, err.into()).await),
            };
            Self::apply_location(&mut inner, &resolved);
            self.render(&inner).await;
            Ok(resolved)
        }
        .instrument(span)
        .await
    }

    /// Use a position typed in by the user instead of the device fix.
    pub async fn enter_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ResolvedLocation, AlertError> {
        let mut inner = self.inner.lock().await;
        Self::ensure_state(&inner, OnboardingState::Setup, "enter location")?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            let err = AlertError::InvalidPreference(format!(
                "coordinates out of range: {latitude}, {longitude}"
            ));
            return Err(self.fail(&inner, err).await);
        }

        let coordinates = Coordinates::new(latitude, longitude);
        let resolved = ResolvedLocation {
            coordinates,
            label: self.location.resolve_display_name(coordinates).await,
        };
        Self::apply_location(&mut inner, &resolved);
        self.render(&inner).await;
        Ok(resolved)
    }

    /// Alert radius and activity threshold.
    pub async fn set_preferences(
        &self,
        radius_km: u32,
        threshold_percent: u32,
    ) -> Result<(), AlertError> {
        let mut inner = self.inner.lock().await;
        Self::ensure_state(&inner, OnboardingState::Setup, "set preferences")?;

        if !RADIUS_RANGE_KM.contains(&radius_km) {
            let err = AlertError::InvalidPreference(format!(
                "radius must be between {} and {} km",
                RADIUS_RANGE_KM.start(),
                RADIUS_RANGE_KM.end()
            ));
            return Err(self.fail(&inner, err).await);
        }
        if !THRESHOLD_RANGE_PERCENT.contains(&threshold_percent) {
            let err = AlertError::InvalidPreference(format!(
                "threshold must be between {}% and {}%",
                THRESHOLD_RANGE_PERCENT.start(),
                THRESHOLD_RANGE_PERCENT.end()
            ));
            return Err(self.fail(&inner, err).await);
        }

        inner.session.radius_km = radius_km;
        inner.session.threshold_percent = threshold_percent;
        debug!(radius_km, threshold_percent, "preferences updated");
        self.render(&inner).await;
        Ok(())
    }

    /// Request permission and acquire a notification token.
    pub async fn enable_notifications(&self) -> Result<TokenProvenance, AlertError> {
        let span = info_span!("usecase.session_controller.enable_notifications");
        async {
            let mut inner = self.inner.lock().await;
            Self::ensure_state(&inner, OnboardingState::Setup, "enable notifications")?;

            let token = match self.notifications.execute().await {
                Ok(token) => token,
                Err(err) => return Err(self.fail(&inner, err.into()).await),
            };
            let provenance = token.provenance();
            inner.session.notification_token = Some(token);
            self.render(&inner).await;
            Ok(provenance)
        }
        .instrument(span)
        .await
    }

    /// Send the setup form. Subscribes, or updates preferences when only the
    /// radius or threshold changed on an existing subscription.
    pub async fn submit(&self) -> Result<SubscriberId, AlertError> {
        let span = info_span!("usecase.session_controller.submit");
        async {
            let mut inner = self.inner.lock().await;
            Self::ensure_state(&inner, OnboardingState::Setup, "submit")?;

            let (Some(preferences), Some(token)) = (
                inner.session.preferences(),
                inner.session.notification_token.clone(),
            ) else {
                warn!(
                    has_location = inner.session.location.is_complete(),
                    has_token = inner.session.notification_token.is_some(),
                    "submit rejected, session not ready"
                );
                return Err(AlertError::NotReady);
            };

            let persisted = self.store.load().await;
            let unchanged = persisted.token.as_ref() == Some(&token)
                && persisted.preferences.map(|p| p.coordinates())
                    == Some(preferences.coordinates());

            let outcome = match inner.session.subscriber_id.clone() {
                Some(subscriber_id) if unchanged => {
                    info!(subscriber_id = %subscriber_id, "updating preferences of existing subscription");
                    let request = UpdatePreferencesRequest {
                        radius_km: Some(preferences.radius_km),
                        threshold: Some(preferences.threshold),
                    };
                    self.api
                        .update_preferences(token.as_str(), &request)
                        .await
                        .map(|()| subscriber_id)
                }
                previous => {
                    // The backend rejects a second subscription for a token it
                    // already knows, so a moved subscription is removed first.
                    if let (Some(previous), Some(old_token)) = (previous, persisted.token.as_ref()) {
                        info!(subscriber_id = %previous, "replacing existing subscription");
                        let request = UnsubscribeRequest {
                            token: old_token.as_str().to_string(),
                        };
                        if let Err(err) = self.api.unsubscribe(&request).await {
                            return Err(self.fail(&inner, err.into()).await);
                        }
                    }
                    info!(
                        radius_km = preferences.radius_km,
                        threshold = preferences.threshold,
                        provenance = ?token.provenance(),
                        "subscribing"
                    );
                    let request = SubscribeRequest {
                        lat: preferences.lat,
                        lon: preferences.lon,
                        radius_km: preferences.radius_km,
                        threshold: preferences.threshold,
                        token: token.as_str().to_string(),
                    };
                    self.api.subscribe(&request).await
                }
            };

            let subscriber_id = match outcome {
                Ok(subscriber_id) => subscriber_id,
                Err(err) => return Err(self.fail(&inner, err.into()).await),
            };
            if token.is_degraded() {
                warn!("subscribed with a degraded token, pushes will not reach this client");
            }

            if let Err(err) = self
                .store
                .save_subscription(&subscriber_id, &token, &preferences)
                .await
            {
                return Err(self.fail(&inner, err.into()).await);
            }
            inner.session.subscriber_id = Some(subscriber_id.clone());

            self.dispatch(&mut inner, OnboardingEvent::SubmitSucceeded)
                .await;
            self.render(&inner).await;
            Ok(subscriber_id)
        }
        .instrument(span)
        .await
    }

    /// Dashboard → Setup with the persisted values loaded into the form.
    pub async fn edit_settings(&self) -> Result<OnboardingState, AlertError> {
        let mut inner = self.inner.lock().await;
        Self::ensure_state(&inner, OnboardingState::Dashboard, "edit settings")?;
        let state = self.dispatch(&mut inner, OnboardingEvent::EditSettings).await;
        self.render(&inner).await;
        Ok(state)
    }

    /// Leave Setup without submitting.
    pub async fn back(&self) -> Result<OnboardingState, AlertError> {
        let mut inner = self.inner.lock().await;
        Self::ensure_state(&inner, OnboardingState::Setup, "go back")?;
        let has_subscription = inner.session.is_subscribed();
        let state = self
            .dispatch(&mut inner, OnboardingEvent::Back { has_subscription })
            .await;
        self.render(&inner).await;
        Ok(state)
    }

    /// Unsubscribe remotely (best effort) and clear everything local.
    pub async fn unsubscribe(&self) -> Result<UnsubscribeOutcome, AlertError> {
        let span = info_span!("usecase.session_controller.unsubscribe");
        async {
            let mut inner = self.inner.lock().await;
            Self::ensure_state(&inner, OnboardingState::Dashboard, "unsubscribe")?;

            let remote_confirmed = match inner.session.notification_token.clone() {
                Some(token) => {
                    let request = UnsubscribeRequest {
                        token: token.as_str().to_string(),
                    };
                    match self.api.unsubscribe(&request).await {
                        Ok(()) => true,
                        Err(err) => {
                            let err = AlertError::from(err);
                            warn!(error = %err, "remote unsubscribe failed, clearing local state anyway");
                            self.toast(&err).await;
                            false
                        }
                    }
                }
                None => {
                    warn!("no notification token to unsubscribe, clearing local state");
                    false
                }
            };

            if let Err(err) = self.store.clear().await {
                let err = AlertError::from(err);
                error!(error = %err, "failed to clear persisted session");
                self.toast(&err).await;
            }

            self.dispatch(&mut inner, OnboardingEvent::Unsubscribed)
                .await;
            self.render(&inner).await;
            Ok(UnsubscribeOutcome { remote_confirmed })
        }
        .instrument(span)
        .await
    }

    /// Rebuild the dashboard (location label, API status). The lock is not
    /// held while the backend is queried.
    pub async fn refresh_dashboard(&self) -> Result<DashboardView, AlertError> {
        let coordinates = {
            let inner = self.inner.lock().await;
            Self::ensure_state(&inner, OnboardingState::Dashboard, "refresh dashboard")?;
            inner.session.location.coordinates()
        };
        let refreshed = self.refresher.fetch(coordinates).await;

        let mut inner = self.inner.lock().await;
        inner.apply_refresh(refreshed);
        if inner.onboarding == OnboardingState::Dashboard {
            self.render(&inner).await;
        }
        Ok(Self::dashboard_view(&inner))
    }

    /// Show a local preview of an alert.
    pub async fn send_test_notification(&self) -> Result<(), AlertError> {
        let inner = self.inner.lock().await;
        Self::ensure_state(&inner, OnboardingState::Dashboard, "send test notification")?;

        let permission = self.notifications.current_permission();
        if inner.session.notification_token.is_none() || permission != PermissionState::Granted {
            debug!(permission = ?permission, "test notification skipped");
            return Err(self.fail(&inner, AlertError::NotificationsDisabled).await);
        }

        if let Err(err) = self.display.show(&DisplayNotification::test_alert()).await {
            warn!(error = %err, "failed to show test notification");
            return Err(self.fail(&inner, AlertError::Unsupported("notifications")).await);
        }
        info!("test notification shown");
        Ok(())
    }

    async fn dispatch(
        &self,
        inner: &mut ControllerState,
        event: OnboardingEvent,
    ) -> OnboardingState {
        let from = inner.onboarding;
        let (next, actions) = OnboardingStateMachine::transition(from, event);
        info!(from = ?from, to = ?next, event = ?event, "onboarding state transition");
        inner.onboarding = next;
        for action in actions {
            self.execute_action(inner, action).await;
        }
        next
    }

    async fn execute_action(&self, inner: &mut ControllerState, action: OnboardingAction) {
        debug!(?action, "onboarding executing action");
        match action {
            OnboardingAction::LoadPersistedSession => {
                let persisted = self.store.load().await;
                inner.session.subscriber_id = persisted.subscriber_id;
                inner.session.notification_token = persisted.token;
                if let Some(preferences) = persisted.preferences {
                    inner.session.apply_preferences(&preferences);
                }
            }
            OnboardingAction::RefreshDashboard => self.schedule_refresh(inner).await,
            OnboardingAction::ResetSession => {
                inner
                    .session
                    .reset(self.defaults.radius_km, self.defaults.threshold);
                inner.location_label = None;
            }
        }
    }

    /// Start a background refresh, replacing any one still running. The task
    /// re-renders only if the dashboard is still on screen when it finishes.
    async fn schedule_refresh(&self, inner: &ControllerState) {
        let coordinates = inner.session.location.coordinates();
        let refresher = self.refresher.clone();
        let shared = self.inner.clone();
        let ui = self.ui.clone();
        let span = info_span!("usecase.session_controller.refresh_dashboard");
        let task = tokio::spawn(
            async move {
                let refreshed = refresher.fetch(coordinates).await;
                let mut inner = shared.lock().await;
                inner.apply_refresh(refreshed);
                if inner.onboarding == OnboardingState::Dashboard {
                    render_screen(ui.as_ref(), &inner).await;
                }
            }
            .instrument(span),
        );
        if let Some(previous) = self.pending_refresh.lock().await.replace(task) {
            previous.abort();
        }
    }

    fn apply_location(inner: &mut ControllerState, resolved: &ResolvedLocation) {
        inner.session.location = Location::from_coordinates(resolved.coordinates);
        inner.location_label = Some(resolved.label.clone());
    }

    fn ensure_state(
        inner: &ControllerState,
        expected: OnboardingState,
        operation: &'static str,
    ) -> Result<(), AlertError> {
        if inner.onboarding == expected {
            Ok(())
        } else {
            Err(AlertError::InvalidState {
                state: inner.onboarding,
                operation,
            })
        }
    }

    /// Surface `err` and re-render the unchanged screen.
    async fn fail(&self, inner: &ControllerState, err: AlertError) -> AlertError {
        warn!(state = %inner.onboarding, error = %err, "operation failed");
        self.toast(&err).await;
        self.render(inner).await;
        err
    }

    async fn toast(&self, err: &AlertError) {
        if let Err(ui_err) = self.ui.show_toast(&Toast::error(err.to_string())).await {
            warn!(error = %ui_err, "failed to show toast");
        }
    }

    async fn render(&self, inner: &ControllerState) {
        render_screen(self.ui.as_ref(), inner).await;
    }

    fn build_screen(inner: &ControllerState) -> Screen {
        match inner.onboarding {
            OnboardingState::Welcome => Screen::Welcome,
            OnboardingState::Setup => Screen::Setup(SetupView {
                coordinates: inner.session.location.coordinates(),
                location_label: inner.location_label.clone(),
                notifications_enabled: inner.session.notification_token.is_some(),
                radius_km: inner.session.radius_km,
                threshold_percent: inner.session.threshold_percent,
                submit_enabled: inner.session.is_ready_to_submit(),
            }),
            OnboardingState::Dashboard => Screen::Dashboard(Self::dashboard_view(inner)),
        }
    }

    fn dashboard_view(inner: &ControllerState) -> DashboardView {
        DashboardView {
            location_label: inner.location_label.clone(),
            radius_km: inner.session.radius_km,
            threshold_percent: inner.session.threshold_percent,
            api_status: inner
                .probe
                .as_ref()
                .map_or(ApiStatus::Unavailable, |probe| probe.status),
            checked_at: inner.probe.as_ref().map(|probe| probe.checked_at),
            delivery: inner
                .session
                .notification_token
                .as_ref()
                .map(|token| token.provenance()),
        }
    }
}

async fn render_screen(ui: &dyn UiPort, inner: &ControllerState) {
    let screen = SessionController::build_screen(inner);
    if let Err(err) = ui.render(&screen).await {
        warn!(error = %err, screen = %inner.onboarding, "failed to render screen");
    }
}
