use async_trait::async_trait;
use tracing::debug;

use aurora_core::location::{Coordinates, LocationError, PositionRequest};
use aurora_core::ports::GeolocationPort;

/// Position taken from configuration. Without one the host has no
/// geolocation capability.
pub struct FixedGeolocation {
    position: Option<Coordinates>,
}

impl FixedGeolocation {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl GeolocationPort for FixedGeolocation {
    async fn current_position(
        &self,
        request: &PositionRequest,
    ) -> Result<Coordinates, LocationError> {
        debug!(high_accuracy = request.high_accuracy, "reading configured position");
        self.position.ok_or(LocationError::Unsupported)
    }
}
