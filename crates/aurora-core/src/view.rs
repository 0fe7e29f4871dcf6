//! What the host surface shows for each onboarding screen.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::location::Coordinates;
use crate::notification::TokenProvenance;
use crate::onboarding::OnboardingState;

/// How long an error toast stays up unless dismissed.
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// Dismissible, auto-expiring message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub expires_after: Duration,
}

impl Toast {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expires_after: TOAST_TTL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    /// No probe has answered yet, or the last one failed.
    Unavailable,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupView {
    pub coordinates: Option<Coordinates>,
    pub location_label: Option<String>,
    pub notifications_enabled: bool,
    pub radius_km: u32,
    pub threshold_percent: u32,
    pub submit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub location_label: Option<String>,
    pub radius_km: u32,
    pub threshold_percent: u32,
    pub api_status: ApiStatus,
    pub checked_at: Option<DateTime<Utc>>,
    pub delivery: Option<TokenProvenance>,
}

/// The single visible screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Welcome,
    Setup(SetupView),
    Dashboard(DashboardView),
}

impl Screen {
    pub fn state(&self) -> OnboardingState {
        match self {
            Self::Welcome => OnboardingState::Welcome,
            Self::Setup(_) => OnboardingState::Setup,
            Self::Dashboard(_) => OnboardingState::Dashboard,
        }
    }
}
