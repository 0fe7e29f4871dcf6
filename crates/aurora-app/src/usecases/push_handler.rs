//! Background handler for inbound push messages.
//!
//! Runs independently of the session controller and shares nothing with it
//! except the app root opened on "view".

use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};

use aurora_core::notification::{DisplayNotification, NotificationAction, PushMessage};
use aurora_core::ports::{AppWindowPort, NotificationDisplayPort};

pub struct BackgroundPushHandler {
    display: Arc<dyn NotificationDisplayPort>,
    window: Arc<dyn AppWindowPort>,
    app_root: String,
}

impl BackgroundPushHandler {
    pub fn new(
        display: Arc<dyn NotificationDisplayPort>,
        window: Arc<dyn AppWindowPort>,
        app_root: impl Into<String>,
    ) -> Self {
        Self {
            display,
            window,
            app_root: app_root.into(),
        }
    }

    /// Render an inbound message as an alert notification.
    pub async fn on_message(&self, message: PushMessage) -> anyhow::Result<DisplayNotification> {
        let span = info_span!("usecase.push_handler.on_message");
        async {
            info!(payload = ?message, "received background push message");
            let notification = DisplayNotification::from_push(message);
            self.display.show(&notification).await?;
            Ok(notification)
        }
        .instrument(span)
        .await
    }

    /// Every click closes the notification; only "view" opens the app.
    pub async fn on_notification_click(
        &self,
        tag: &str,
        action: Option<NotificationAction>,
    ) -> anyhow::Result<()> {
        let span = info_span!("usecase.push_handler.on_notification_click", tag, action = ?action);
        async {
            info!("notification clicked");
            self.display.close(tag).await?;
            match action {
                Some(NotificationAction::View) => {
                    self.window.open_or_focus(&self.app_root).await?;
                }
                Some(NotificationAction::Dismiss) | None => {
                    debug!("notification closed without opening the app");
                }
            }
            Ok(())
        }
        .instrument(span)
        .await
    }

    pub fn on_notification_close(&self, tag: &str) {
        info!(tag, "notification closed");
    }
}
