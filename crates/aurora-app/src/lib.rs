//! Aurora Alert Application Orchestration Layer
//!
//! This crate contains the onboarding use cases and the session controller
//! that drives them.

pub mod session_store;
pub mod usecases;

pub use session_store::{PersistedSession, SessionStore};
pub use usecases::{
    BackgroundPushHandler, ControllerPorts, ProbeApiStatus, ProvisionNotifications,
    ResolveLocation, ResolvedLocation, SessionController, StatusProbe, UnsubscribeOutcome,
};

#[cfg(test)]
pub(crate) mod test_support;
