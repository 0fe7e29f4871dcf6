//! Liveness probe against the subscription backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info_span, warn, Instrument};

use aurora_core::api::StatusReport;
use aurora_core::ports::{ClockPort, SubscriptionApiPort};
use aurora_core::view::ApiStatus;

/// Outcome of one probe. `report` is `None` when the backend did not answer.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusProbe {
    pub status: ApiStatus,
    pub checked_at: DateTime<Utc>,
    pub report: Option<StatusReport>,
}

/// Use case for `GET /status`. Failures degrade to `Unavailable` and are
/// never returned as errors.
pub struct ProbeApiStatus {
    api: Arc<dyn SubscriptionApiPort>,
    clock: Arc<dyn ClockPort>,
}

impl ProbeApiStatus {
    pub fn new(api: Arc<dyn SubscriptionApiPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self { api, clock }
    }

    pub async fn execute(&self) -> StatusProbe {
        let span = info_span!("usecase.probe_api_status.execute");
        async {
            let result = self.api.status().await;
            let checked_at = self.clock.now();
            match result {
                Ok(report) => {
                    debug!(
                        status = %report.status,
                        active_users = ?report.active_users,
                        "status probe answered"
                    );
                    StatusProbe {
                        status: ApiStatus::Connected,
                        checked_at,
                        report: Some(report),
                    }
                }
                Err(err) => {
                    warn!(error = %err, "status probe failed");
                    StatusProbe {
                        status: ApiStatus::Unavailable,
                        checked_at,
                        report: None,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}
