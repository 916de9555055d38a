//! Best-effort reverse geocoding for listing locations.
//!
//! Geocoding is cosmetic: it turns coordinates into a readable address for
//! the "near me" display. Every failure path - transport, non-success
//! status, unexpected body - degrades to the raw coordinate label, never to
//! an error the caller has to handle.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::GeocoderConfig;

/// Mean Earth radius in kilometers, for [`haversine_km`].
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Reverse-geocoding client.
#[derive(Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

impl Geocoder {
    /// Create a geocoder for the configured provider.
    #[must_use]
    pub fn new(config: &GeocoderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Reverse-geocode coordinates into a display label.
    ///
    /// Infallible by design: any failure falls back to
    /// [`coordinate_label`].
    #[instrument(skip(self))]
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> String {
        match self.try_reverse(latitude, longitude).await {
            Some(address) => address,
            None => {
                debug!("reverse geocode unavailable, using raw coordinates");
                coordinate_label(latitude, longitude)
            }
        }
    }

    async fn try_reverse(&self, latitude: f64, longitude: f64) -> Option<String> {
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "jsonv2".to_owned()),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let parsed: ReverseResponse = response.json().await.ok()?;
        parsed.display_name.filter(|name| !name.is_empty())
    }
}

/// Fallback display for coordinates when no address is available.
#[must_use]
pub fn coordinate_label(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4}, {longitude:.4}")
}

/// Great-circle distance between two (latitude, longitude) points, in km.
#[must_use]
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_label_rounds_to_four_places() {
        assert_eq!(coordinate_label(48.858_370_1, 2.294_481), "48.8584, 2.2945");
        assert_eq!(coordinate_label(-33.9, 18.4), "-33.9000, 18.4000");
    }

    #[test]
    fn test_haversine_zero_distance() {
        let point = (52.52, 13.405);
        assert!(haversine_km(point, point) < f64::EPSILON);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Paris <-> Berlin is about 878 km.
        let paris = (48.8566, 2.3522);
        let berlin = (52.52, 13.405);
        let distance = haversine_km(paris, berlin);
        assert!((850.0..910.0).contains(&distance), "got {distance}");
    }

    #[test]
    fn test_haversine_symmetry() {
        let a = (40.7128, -74.0060);
        let b = (34.0522, -118.2437);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }
}
