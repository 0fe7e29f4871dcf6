//! Business logic use cases
//! 业务用例
//!
//! The session controller is the only orchestrator; the other use cases wrap
//! a single capability each and hold no session state.
//!
// SessionController
//     ├── ResolveLocation        → geolocation + reverse geocoding
//     ├── ProvisionNotifications → permission + push token
//     ├── ProbeApiStatus         → GET /status
//     └── SessionStore           → persisted keys
//
// BackgroundPushHandler          → inbound push messages (independent)

pub mod location;
pub mod notification;
pub mod probe_status;
pub mod push_handler;
pub mod session_controller;

pub use location::{ResolveLocation, ResolvedLocation};
pub use notification::ProvisionNotifications;
pub use probe_status::{ProbeApiStatus, StatusProbe};
pub use push_handler::BackgroundPushHandler;
pub use session_controller::{ControllerPorts, SessionController, UnsubscribeOutcome};
