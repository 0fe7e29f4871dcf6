use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use aurora_core::location::{Coordinates, GeocodedPlace};
use aurora_core::ports::ReverseGeocoderPort;

/// BigDataCloud client-side reverse geocoding endpoint.
pub struct BigDataCloudGeocoder {
    client: Client,
    endpoint: String,
}

impl BigDataCloudGeocoder {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("build geocoder HTTP client failed")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ReverseGeocoderPort for BigDataCloudGeocoder {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<GeocodedPlace> {
        debug!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "reverse geocoding"
        );
        let place = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await
            .context("reverse geocoding request failed")?
            .error_for_status()
            .context("reverse geocoding returned an error status")?
            .json::<GeocodedPlace>()
            .await
            .context("decode reverse geocoding response failed")?;
        Ok(place)
    }
}
