use thiserror::Error;

use crate::api::ApiClientError;
use crate::location::LocationError;
use crate::notification::PermissionError;
use crate::onboarding::OnboardingState;

/// Errors surfaced by the aurora alert client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("operation timed out")]
    Timeout,

    #[error("API error: {status} - {detail}")]
    ApiError { status: u16, detail: String },

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("location and notifications must both be set up before submitting")]
    NotReady,

    #[error("{operation} is not available on the {state} screen")]
    InvalidState {
        state: OnboardingState,
        operation: &'static str,
    },

    #[error("Notifications not enabled")]
    NotificationsDisabled,

    #[error("invalid preference: {0}")]
    InvalidPreference(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<LocationError> for AlertError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => Self::PermissionDenied,
            LocationError::Unsupported => Self::Unsupported("geolocation"),
            LocationError::Timeout => Self::Timeout,
        }
    }
}

impl From<PermissionError> for AlertError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::Denied => Self::PermissionDenied,
            PermissionError::Unsupported => Self::Unsupported("notifications"),
        }
    }
}

impl From<ApiClientError> for AlertError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Api { status, detail } => Self::ApiError { status, detail },
            ApiClientError::Network(message) => Self::NetworkFailure(message),
        }
    }
}

impl From<anyhow::Error> for AlertError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_errors_map_into_taxonomy() {
        assert_eq!(
            AlertError::from(LocationError::Unsupported),
            AlertError::Unsupported("geolocation")
        );
        assert_eq!(
            AlertError::from(PermissionError::Denied),
            AlertError::PermissionDenied
        );
        assert_eq!(AlertError::from(LocationError::Timeout), AlertError::Timeout);
    }

    #[test]
    fn api_error_keeps_status_and_detail() {
        let err = AlertError::from(ApiClientError::Api {
            status: 500,
            detail: "Internal server error".into(),
        });
        assert_eq!(err.to_string(), "API error: 500 - Internal server error");
    }
}
