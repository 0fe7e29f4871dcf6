//! Device position plus a human-readable name for it.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info_span, warn, Instrument};

use aurora_core::location::{Coordinates, LocationError, PositionRequest};
use aurora_core::ports::{GeolocationPort, ReverseGeocoderPort};

/// Position and the label shown for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub label: String,
}

/// Use case wrapping geolocation and reverse geocoding.
///
/// ## Behavior / 行为
/// - One position fix, bounded by `PositionRequest::timeout`
/// - Reverse geocoding never fails outward; the coordinate label is the
///   fallback for every lookup failure
pub struct ResolveLocation {
    geolocation: Arc<dyn GeolocationPort>,
    geocoder: Arc<dyn ReverseGeocoderPort>,
    request: PositionRequest,
    geocode_timeout: Duration,
}

impl ResolveLocation {
    pub fn new(
        geolocation: Arc<dyn GeolocationPort>,
        geocoder: Arc<dyn ReverseGeocoderPort>,
        request: PositionRequest,
        geocode_timeout: Duration,
    ) -> Self {
        Self {
            geolocation,
            geocoder,
            request,
            geocode_timeout,
        }
    }

    /// Acquire the current position and name it.
    pub async fn execute(&self) -> Result<ResolvedLocation, LocationError> {
        let span = info_span!("usecase.resolve_location.execute");
        async {
            let coordinates = self.acquire_current_location().await?;
            let label = self.resolve_display_name(coordinates).await;
            Ok(ResolvedLocation { coordinates, label })
        }
        .instrument(span)
        .await
    }

    pub async fn acquire_current_location(&self) -> Result<Coordinates, LocationError> {
        match timeout(
            self.request.timeout,
            self.geolocation.current_position(&self.request),
        )
        .await
        {
            Ok(Ok(coordinates)) => {
                debug!(
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "position acquired"
                );
                Ok(coordinates)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "position request failed");
                Err(err)
            }
            Err(_) => {
                warn!(timeout = ?self.request.timeout, "position request timed out");
                Err(LocationError::Timeout)
            }
        }
    }

    pub async fn resolve_display_name(&self, coordinates: Coordinates) -> String {
        let lookup = timeout(self.geocode_timeout, self.geocoder.reverse_geocode(coordinates));
        let place = match lookup.await {
            Ok(Ok(place)) => place,
            Ok(Err(err)) => {
                warn!(error = %err, "reverse geocoding failed, using coordinates");
                return coordinates.display_label();
            }
            Err(_) => {
                warn!(timeout = ?self.geocode_timeout, "reverse geocoding timed out, using coordinates");
                return coordinates.display_label();
            }
        };

        place.label().unwrap_or_else(|| coordinates.display_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockGeocoder, MockGeolocation};
    use aurora_core::location::GeocodedPlace;

    fn use_case(geolocation: MockGeolocation, geocoder: MockGeocoder) -> ResolveLocation {
        ResolveLocation::new(
            Arc::new(geolocation),
            Arc::new(geocoder),
            PositionRequest::default(),
            Duration::from_secs(10),
        )
    }

    fn boulder() -> Coordinates {
        Coordinates::new(40.0, -105.0)
    }

    #[tokio::test]
    async fn names_position_with_city_and_country() {
        let mut geolocation = MockGeolocation::new();
        geolocation
            .expect_current_position()
            .withf(|request| request.high_accuracy)
            .returning(|_| Ok(boulder()));
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_reverse_geocode().returning(|_| {
            Ok(GeocodedPlace {
                city: Some("Boulder".into()),
                locality: None,
                country_name: Some("United States of America".into()),
            })
        });

        let resolved = use_case(geolocation, geocoder).execute().await.unwrap();

        assert_eq!(resolved.coordinates, boulder());
        assert_eq!(resolved.label, "Boulder, United States of America");
    }

    #[tokio::test]
    async fn geocoding_failure_falls_back_to_coordinates() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_reverse_geocode()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let label = use_case(MockGeolocation::new(), geocoder)
            .resolve_display_name(boulder())
            .await;

        assert_eq!(label, "40.0000, -105.0000");
    }

    #[tokio::test]
    async fn unnamed_place_falls_back_to_coordinates() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_reverse_geocode()
            .returning(|_| Ok(GeocodedPlace::default()));

        let label = use_case(MockGeolocation::new(), geocoder)
            .resolve_display_name(Coordinates::new(64.83778, -147.71639))
            .await;

        assert_eq!(label, "64.8378, -147.7164");
    }

    #[tokio::test]
    async fn capability_errors_pass_through() {
        let mut geolocation = MockGeolocation::new();
        geolocation
            .expect_current_position()
            .returning(|_| Err(LocationError::PermissionDenied));

        let err = use_case(geolocation, MockGeocoder::new())
            .execute()
            .await
            .unwrap_err();

        assert_eq!(err, LocationError::PermissionDenied);
    }

    struct NeverFixes;

    #[async_trait::async_trait]
    impl GeolocationPort for NeverFixes {
        async fn current_position(
            &self,
            _request: &PositionRequest,
        ) -> Result<Coordinates, LocationError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_position_request_times_out() {
        let use_case = ResolveLocation::new(
            Arc::new(NeverFixes),
            Arc::new(MockGeocoder::new()),
            PositionRequest::default(),
            Duration::from_secs(10),
        );

        let err = use_case.acquire_current_location().await.unwrap_err();

        assert_eq!(err, LocationError::Timeout);
    }
}
