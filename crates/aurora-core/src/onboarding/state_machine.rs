//! Onboarding state machine.
//!
//! Defines a pure state transition function for the onboarding flow. Events
//! that report a completed side effect (a subscribe call, an unsubscribe) are
//! only dispatched after that effect has finished, so a failed effect never
//! reaches this function and never moves the flow.

use serde::{Deserialize, Serialize};

/// Onboarding flow state. Exactly one screen is visible at a time.
///
/// 引导流程状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnboardingState {
    /// No session; initial screen.
    ///
    /// 欢迎页。
    Welcome,
    /// Collecting location, preferences and notification permission.
    ///
    /// 设置页。
    Setup,
    /// Subscribed.
    ///
    /// 仪表盘。
    Dashboard,
}

impl OnboardingState {
    pub const ALL: [OnboardingState; 3] = [Self::Welcome, Self::Setup, Self::Dashboard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Setup => "setup",
            Self::Dashboard => "dashboard",
        }
    }
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self::Welcome
    }
}

impl std::fmt::Display for OnboardingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that drive the onboarding flow.
///
/// 驱动引导流程的事件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnboardingEvent {
    /// Start-up inspection of persisted state finished.
    Restored { has_subscription: bool },
    /// User asks to set up alerts.
    RequestSetup,
    /// A subscribe or preference update call succeeded and was persisted.
    SubmitSucceeded,
    /// User asks to edit settings from the dashboard.
    EditSettings,
    /// User leaves the setup form without submitting.
    Back { has_subscription: bool },
    /// Local session state has been cleared after an unsubscribe.
    Unsubscribed,
}

/// Follow-up work produced by a transition.
///
/// 状态迁移产生的后续动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnboardingAction {
    /// Reload the persisted session into the in-memory form.
    LoadPersistedSession,
    /// Rebuild the dashboard view (location label, API status).
    RefreshDashboard,
    /// Drop every in-memory session field.
    ResetSession,
}

/// Pure onboarding state machine.
///
/// 纯状态机：不包含副作用。
pub struct OnboardingStateMachine;

impl OnboardingStateMachine {
    pub fn transition(
        state: OnboardingState,
        event: OnboardingEvent,
    ) -> (OnboardingState, Vec<OnboardingAction>) {
        use OnboardingAction::*;
        use OnboardingState::*;

        match (state, event) {
            (Welcome, OnboardingEvent::Restored { has_subscription }) => {
                if has_subscription {
                    (Dashboard, vec![LoadPersistedSession, RefreshDashboard])
                } else {
                    (Welcome, Vec::new())
                }
            }
            (Welcome, OnboardingEvent::RequestSetup) => (Setup, Vec::new()),
            (Setup, OnboardingEvent::SubmitSucceeded) => (Dashboard, vec![RefreshDashboard]),
            (Setup, OnboardingEvent::Back { has_subscription }) => {
                if has_subscription {
                    (Dashboard, vec![LoadPersistedSession, RefreshDashboard])
                } else {
                    (Welcome, Vec::new())
                }
            }
            (Dashboard, OnboardingEvent::EditSettings) => (Setup, vec![LoadPersistedSession]),
            (Dashboard, OnboardingEvent::Unsubscribed) => (Welcome, vec![ResetSession]),
            (state, _event) => (state, Vec::new()),
        }
    }
}
