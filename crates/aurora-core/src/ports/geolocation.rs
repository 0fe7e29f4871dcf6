use async_trait::async_trait;

use crate::location::{Coordinates, LocationError, PositionRequest};

/// Device geolocation capability.
///
/// Error semantics:
/// - PermissionDenied : the user declined the location prompt
/// - Unsupported      : the platform has no location capability
/// - Timeout          : no fix within `request.timeout`
#[async_trait]
pub trait GeolocationPort: Send + Sync {
    async fn current_position(&self, request: &PositionRequest)
        -> Result<Coordinates, LocationError>;
}
