//! Terminal surface: screens, toasts, notifications and the "window".

use std::io::{self, Stdout, Write};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::info;

use aurora_core::notification::DisplayNotification;
use aurora_core::ports::{AppWindowPort, NotificationDisplayPort, UiPort};
use aurora_core::view::{ApiStatus, DashboardView, Screen, SetupView, Toast};
use aurora_core::TokenProvenance;

/// Serialized access to a line-oriented writer.
struct Lines<W: Write + Send + 'static> {
    out: Mutex<W>,
}

impl<W: Write + Send + 'static> Lines<W> {
    fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow!("terminal writer poisoned"))?;
        writeln!(out, "{text}")?;
        out.flush()?;
        Ok(())
    }

    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

pub struct TerminalUi<W: Write + Send + 'static = Stdout> {
    lines: Lines<W>,
}

impl TerminalUi<Stdout> {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write + Send + 'static> TerminalUi<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            lines: Lines::new(out),
        }
    }

    pub fn into_writer(self) -> W {
        self.lines.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send + 'static> UiPort for TerminalUi<W> {
    async fn render(&self, screen: &Screen) -> Result<()> {
        self.lines.write(&render_screen(screen))
    }

    async fn show_toast(&self, toast: &Toast) -> Result<()> {
        self.lines.write(&format!(
            "! {} (dismisses in {}s)",
            toast.message,
            toast.expires_after.as_secs()
        ))
    }
}

fn render_screen(screen: &Screen) -> String {
    match screen {
        Screen::Welcome => [
            "== Aurora Alert ==",
            "Get notified when the aurora may be visible near you.",
            "Run `aurora-alert setup` to get started.",
        ]
        .join("\n"),
        Screen::Setup(view) => render_setup(view),
        Screen::Dashboard(view) => render_dashboard(view),
    }
}

fn render_setup(view: &SetupView) -> String {
    let location = match (&view.location_label, view.coordinates) {
        (Some(label), Some(coordinates)) => {
            format!("{label} ({})", coordinates.display_label())
        }
        (None, Some(coordinates)) => coordinates.display_label(),
        _ => "not set".to_string(),
    };
    let notifications = if view.notifications_enabled {
        "enabled"
    } else {
        "not enabled"
    };
    let submit = if view.submit_enabled {
        "ready"
    } else {
        "waiting for location and notifications"
    };

    [
        "== Set up aurora alerts ==".to_string(),
        format!("Location:       {location}"),
        format!("Notifications:  {notifications}"),
        format!("Radius:         {} km", view.radius_km),
        format!("Threshold:      {}%", view.threshold_percent),
        format!("Submit:         {submit}"),
    ]
    .join("\n")
}

fn render_dashboard(view: &DashboardView) -> String {
    let delivery = match view.delivery {
        Some(TokenProvenance::Delivered) => "push",
        Some(TokenProvenance::Degraded) => "local only (no push token)",
        None => "none",
    };
    let api = match (view.api_status, view.checked_at) {
        (ApiStatus::Connected, Some(at)) => {
            format!("connected (checked {})", at.format("%Y-%m-%d %H:%M:%S UTC"))
        }
        (ApiStatus::Connected, None) => "connected".to_string(),
        (ApiStatus::Unavailable, _) => "unavailable".to_string(),
    };

    [
        "== Aurora Alert dashboard ==".to_string(),
        format!(
            "Location:   {}",
            view.location_label.as_deref().unwrap_or("unknown")
        ),
        format!("Radius:     {} km", view.radius_km),
        format!("Threshold:  {}%", view.threshold_percent),
        format!("Delivery:   {delivery}"),
        format!("API:        {api}"),
    ]
    .join("\n")
}

/// Prints notifications instead of handing them to a desktop shell.
pub struct TerminalNotificationDisplay<W: Write + Send + 'static = Stdout> {
    lines: Lines<W>,
}

impl TerminalNotificationDisplay<Stdout> {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write + Send + 'static> TerminalNotificationDisplay<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            lines: Lines::new(out),
        }
    }

    pub fn into_writer(self) -> W {
        self.lines.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send + 'static> NotificationDisplayPort for TerminalNotificationDisplay<W> {
    async fn show(&self, notification: &DisplayNotification) -> Result<()> {
        let mut text = format!(
            "[{}] {}\n  {}",
            notification.tag, notification.title, notification.body
        );
        if !notification.actions.is_empty() {
            let actions: Vec<String> = notification
                .actions
                .iter()
                .map(|action| format!("{} ({})", action.title(), action.id()))
                .collect();
            text.push_str(&format!("\n  actions: {}", actions.join(", ")));
        }
        self.lines.write(&text)
    }

    async fn close(&self, tag: &str) -> Result<()> {
        self.lines.write(&format!("[{tag}] closed"))
    }
}

/// The terminal has no window to focus; it reports the root it would open.
pub struct TerminalWindow;

#[async_trait]
impl AppWindowPort for TerminalWindow {
    async fn open_or_focus(&self, url: &str) -> Result<()> {
        info!(url, "opening app");
        println!("Opening {url}");
        Ok(())
    }
}
