use async_trait::async_trait;

use crate::location::{Coordinates, GeocodedPlace};

/// External reverse-geocoding lookup.
#[async_trait]
pub trait ReverseGeocoderPort: Send + Sync {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> anyhow::Result<GeocodedPlace>;
}
