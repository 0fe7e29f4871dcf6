//! Host platform adapters.
//!
//! The terminal host has no browser capabilities, so geolocation, the
//! notification prompt and push-token issuance answer from configuration,
//! and screens and notifications are written to the terminal.

pub mod app_dirs;
pub mod geolocation;
pub mod notifications;
pub mod terminal;

pub use app_dirs::DirsAppDirsAdapter;
pub use geolocation::FixedGeolocation;
pub use notifications::{ConfiguredPermission, ConfiguredPushToken};
pub use terminal::{TerminalNotificationDisplay, TerminalUi, TerminalWindow};
