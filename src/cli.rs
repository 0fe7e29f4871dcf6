//! Command surface standing in for the browser pages.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use aurora_core::notification::push::ALERT_TAG;
use aurora_core::notification::{NotificationAction, PushMessage};
use aurora_core::{OnboardingState, TokenProvenance};

use crate::bootstrap::AppRuntime;

/// aurora-alert - get notified when the aurora may be visible near you
#[derive(Parser, Debug)]
#[command(name = "aurora-alert")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default: ./aurora-alert.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Location and preference values for `setup` and `edit`.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct SetupArgs {
    /// Latitude to use instead of the device position
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude to use instead of the device position
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Alert radius in kilometres
    #[arg(long)]
    pub radius: Option<u32>,

    /// Minimum aurora activity in percent
    #[arg(long)]
    pub threshold: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current screen (dashboard when subscribed)
    Status,

    /// Subscribe: acquire location, enable notifications and submit
    Setup(SetupArgs),

    /// Change location or preferences of the current subscription
    Edit(SetupArgs),

    /// Unsubscribe and clear the local session
    Unsubscribe,

    /// Show a local test notification
    TestNotification,

    /// Handle an inbound push message read from a JSON file
    Push {
        /// Path to the push payload
        payload: PathBuf,
    },

    /// Handle a click on a shown notification
    Click {
        /// Action button (view or dismiss); omit for a click on the body
        action: Option<NotificationAction>,

        /// Tag of the clicked notification
        #[arg(long, default_value = ALERT_TAG)]
        tag: String,
    },

    /// Handle a notification being closed
    Close {
        /// Tag of the closed notification
        #[arg(long, default_value = ALERT_TAG)]
        tag: String,
    },
}

/// Execute one command against the wired runtime.
pub async fn run(command: Commands, runtime: &AppRuntime) -> Result<()> {
    let result = dispatch(command, runtime).await;
    // Let the dashboard refresh finish before the process exits.
    runtime.controller.wait_for_refresh().await;
    result
}

async fn dispatch(command: Commands, runtime: &AppRuntime) -> Result<()> {
    match command {
        Commands::Status => {
            runtime.controller.start().await;
            Ok(())
        }
        Commands::Setup(args) => setup(runtime, &args).await,
        Commands::Edit(args) => edit(runtime, &args).await,
        Commands::Unsubscribe => unsubscribe(runtime).await,
        Commands::TestNotification => {
            let controller = &runtime.controller;
            if controller.start().await != OnboardingState::Dashboard {
                bail!("Not subscribed. Run `aurora-alert setup` first.");
            }
            controller.send_test_notification().await?;
            Ok(())
        }
        Commands::Push { payload } => {
            let content = std::fs::read_to_string(&payload)
                .with_context(|| format!("Failed to read push payload: {}", payload.display()))?;
            let message: PushMessage = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse push payload: {}", payload.display()))?;
            runtime.push_handler.on_message(message).await?;
            Ok(())
        }
        Commands::Click { action, tag } => {
            runtime
                .push_handler
                .on_notification_click(&tag, action)
                .await
        }
        Commands::Close { tag } => {
            runtime.push_handler.on_notification_close(&tag);
            Ok(())
        }
    }
}

async fn setup(runtime: &AppRuntime, args: &SetupArgs) -> Result<()> {
    let controller = &runtime.controller;
    match controller.start().await {
        OnboardingState::Welcome => {
            controller.begin_setup().await?;
        }
        OnboardingState::Dashboard => {
            bail!("Already subscribed. Use `aurora-alert edit` to change settings.");
        }
        OnboardingState::Setup => {}
    }

    let provenance = controller.enable_notifications().await?;
    if provenance == TokenProvenance::Degraded {
        eprintln!("Push delivery is unavailable on this host; alerts will only be recorded locally.");
    }

    fill_form(runtime, args, true).await?;
    let subscriber_id = controller.submit().await?;
    info!(subscriber_id = %subscriber_id, "subscribed");
    Ok(())
}

async fn edit(runtime: &AppRuntime, args: &SetupArgs) -> Result<()> {
    let controller = &runtime.controller;
    if controller.start().await != OnboardingState::Dashboard {
        bail!("Not subscribed. Run `aurora-alert setup` first.");
    }
    controller.edit_settings().await?;

    if let Err(err) = fill_form(runtime, args, false).await {
        controller.back().await?;
        return Err(err);
    }
    controller.submit().await?;
    Ok(())
}

/// Apply location and preference arguments to the setup form. With
/// `require_location` the device position is used when no coordinates are
/// given.
async fn fill_form(runtime: &AppRuntime, args: &SetupArgs, require_location: bool) -> Result<()> {
    let controller = &runtime.controller;
    match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            controller.enter_location(lat, lon).await?;
        }
        _ if require_location => {
            controller.acquire_location().await?;
        }
        _ => {}
    }

    if args.radius.is_some() || args.threshold.is_some() {
        let session = controller.session().await;
        controller
            .set_preferences(
                args.radius.unwrap_or(session.radius_km),
                args.threshold.unwrap_or(session.threshold_percent),
            )
            .await?;
    }
    Ok(())
}

async fn unsubscribe(runtime: &AppRuntime) -> Result<()> {
    let controller = &runtime.controller;
    if controller.start().await != OnboardingState::Dashboard {
        bail!("Not subscribed.");
    }
    let outcome = controller.unsubscribe().await?;
    if !outcome.remote_confirmed {
        eprintln!("The server did not confirm the unsubscribe; the local session was cleared anyway.");
    }
    Ok(())
}
