//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure or platform implementations. This follows Hexagonal
//! Architecture principles, allowing the onboarding flow to remain
//! independent of the browser, terminal or HTTP stack it runs against.
//!
//! ## Port Placement Guidelines
//!
//! A port belongs here when it represents a capability the client needs
//! (geolocation, push tokens, persistence, the REST backend) and it is
//! implemented by `aurora-infra` or `aurora-platform`.

pub mod app_dirs;
pub mod app_window;
mod clock;
pub mod errors;
pub mod geocoding;
pub mod geolocation;
pub mod key_value;
pub mod notification;
pub mod subscription_api;
pub mod ui_port;

pub use app_dirs::AppDirsPort;
pub use app_window::AppWindowPort;
pub use clock::*;
pub use errors::AppDirsError;
pub use geocoding::ReverseGeocoderPort;
pub use geolocation::GeolocationPort;
pub use key_value::KeyValueStorePort;
pub use notification::{NotificationDisplayPort, NotificationPermissionPort, PushTokenPort};
pub use subscription_api::SubscriptionApiPort;
pub use ui_port::UiPort;
