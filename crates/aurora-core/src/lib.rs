//! # aurora-core
//!
//! Core domain models and ports for the Aurora Alert client.
//!
//! This crate contains pure domain logic without any infrastructure dependencies:
//! the session model, the onboarding state machine, notification token
//! provenance, the remote API schemas and the ports adapters implement.

pub mod api;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod location;
pub mod notification;
pub mod onboarding;
pub mod ports;
pub mod session;
pub mod view;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use error::AlertError;
pub use location::{Coordinates, LocationError};
pub use notification::{NotificationToken, PermissionState, TokenProvenance};
pub use onboarding::{OnboardingAction, OnboardingEvent, OnboardingState, OnboardingStateMachine};
pub use session::{Location, Preferences, Session, SubscriberId};
