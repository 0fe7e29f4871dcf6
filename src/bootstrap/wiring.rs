//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (session store, HTTP clients, clock)
//! - ✅ Create platform implementations (location, notifications, terminal)
//! - ✅ Inject them into the session controller and the push handler
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//!
//! > **This is the only place allowed to depend on aurora-infra + aurora-platform + aurora-app simultaneously.**
//! > **这是唯一允许同时依赖 aurora-infra、aurora-platform 和 aurora-app 的地方。**

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use aurora_app::{BackgroundPushHandler, ControllerPorts, SessionController};
use aurora_core::config::AppConfig;
use aurora_core::ports::{AppDirsPort, AppWindowPort, NotificationDisplayPort, UiPort};
use aurora_infra::{BigDataCloudGeocoder, FileKeyValueStore, HttpSubscriptionApi, SystemClock};
use aurora_platform::{
    ConfiguredPermission, ConfiguredPushToken, DirsAppDirsAdapter, FixedGeolocation,
    TerminalNotificationDisplay, TerminalUi, TerminalWindow,
};

/// Where screens, toasts and notifications are shown.
#[derive(Clone)]
pub struct HostSurface {
    pub ui: Arc<dyn UiPort>,
    pub display: Arc<dyn NotificationDisplayPort>,
    pub window: Arc<dyn AppWindowPort>,
}

impl HostSurface {
    pub fn terminal() -> Self {
        Self {
            ui: Arc::new(TerminalUi::stdout()),
            display: Arc::new(TerminalNotificationDisplay::stdout()),
            window: Arc::new(TerminalWindow),
        }
    }
}

/// Everything the command surface drives.
pub struct AppRuntime {
    pub controller: SessionController,
    pub push_handler: BackgroundPushHandler,
    pub session_path: PathBuf,
}

/// Wire the runtime against the terminal surface.
pub fn wire(config: &AppConfig) -> anyhow::Result<AppRuntime> {
    wire_with_surface(config, HostSurface::terminal())
}

pub fn wire_with_surface(config: &AppConfig, surface: HostSurface) -> anyhow::Result<AppRuntime> {
    let session_path = match &config.storage.session_path {
        Some(path) => path.clone(),
        None => DirsAppDirsAdapter::new()
            .get_app_dirs()
            .context("Failed to resolve application data directory")?
            .session_store_path(),
    };
    info!(
        session_path = %session_path.display(),
        api_base_url = %config.api.base_url,
        "wiring aurora alert runtime"
    );

    let ports = ControllerPorts {
        store: Arc::new(FileKeyValueStore::new(session_path.clone())),
        api: Arc::new(HttpSubscriptionApi::new(config.api.base_url.clone())?),
        geolocation: Arc::new(FixedGeolocation::new(config.platform.position())),
        geocoder: Arc::new(BigDataCloudGeocoder::new(
            config.geocoding.base_url.clone(),
        )?),
        permission: Arc::new(ConfiguredPermission::new(
            config.platform.notification_permission,
        )),
        push_token: Arc::new(ConfiguredPushToken::new(config.platform.push_token.clone())),
        display: surface.display.clone(),
        ui: surface.ui,
        clock: Arc::new(SystemClock),
    };

    Ok(AppRuntime {
        controller: SessionController::new(ports, config),
        push_handler: BackgroundPushHandler::new(
            surface.display,
            surface.window,
            config.platform.app_root.clone(),
        ),
        session_path,
    })
}
