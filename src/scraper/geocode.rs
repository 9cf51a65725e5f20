use reqwest::Client;
use serde::Deserialize;

use super::{ensure_success, ScrapeError};
use crate::models::Coordinates;

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Nominatim address lookup, restricted to UK addresses
#[derive(Clone)]
pub struct Geocoder {
    client: Client,
    endpoint: String,
}

impl Geocoder {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    /// Coordinates of the best match for `address`, if any
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ScrapeError> {
        let query = format!("{}, UK", address);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("format", "json"), ("q", query.as_str()), ("limit", "1")])
            .send()
            .await?;

        let places: Vec<Place> = ensure_success(response)?.json().await?;

        let found = places.first().and_then(|place| {
            let latitude = place.lat.parse::<f64>().ok()?;
            let longitude = place.lon.parse::<f64>().ok()?;
            Some(Coordinates::new(latitude, longitude))
        });

        tracing::debug!("Geocoded '{}': {:?}", query, found);
        Ok(found)
    }
}
