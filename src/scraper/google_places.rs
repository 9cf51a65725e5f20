use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::fallback_data::default_amenities;
use super::{ensure_success, GymSource, ScrapeError, ScrapedGym};

pub const SOURCE_LABEL: &str = "Google Places API";

/// Search centres covering the UK's major cities
pub const UK_CITIES: &[(&str, f64, f64)] = &[
    ("London", 51.5074, -0.1278),
    ("Manchester", 53.4808, -2.2426),
    ("Birmingham", 52.4862, -1.8904),
    ("Leeds", 53.8008, -1.5491),
    ("Glasgow", 55.8642, -4.2518),
    ("Edinburgh", 55.9533, -3.1883),
    ("Liverpool", 53.4084, -2.9916),
    ("Bristol", 51.4545, -2.5879),
    ("Newcastle", 54.9783, -1.6178),
    ("Sheffield", 53.3811, -1.4701),
    ("Cardiff", 51.4816, -3.1791),
    ("Belfast", 54.5973, -5.9301),
];

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<Place>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<Geometry>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Places Nearby Search around each UK city
pub struct GooglePlacesSource {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    brand: String,
    radius_m: u32,
    delay: Duration,
}

impl GooglePlacesSource {
    pub fn new(
        client: Client,
        endpoint: &str,
        api_key: Option<String>,
        brand: &str,
        radius_m: u32,
        delay: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            brand: brand.to_string(),
            radius_m,
            delay,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// One Nearby Search call; returns the provider's status with the places
    async fn search_city(&self, api_key: &str, lat: f64, lng: f64) -> Result<(Option<String>, Vec<ScrapedGym>), ScrapeError> {
        let location = format!("{},{}", lat, lng);
        let radius = self.radius_m.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", self.brand.as_str()),
                ("type", "gym"),
                ("key", api_key),
            ])
            .send()
            .await?;

        let body: NearbySearchResponse = ensure_success(response)?.json().await?;
        let brand = self.brand.to_lowercase();

        let gyms = body
            .results
            .into_iter()
            .filter(|place| place.name.to_lowercase().contains(&brand))
            .filter_map(|place| {
                let Some(geometry) = place.geometry else {
                    tracing::warn!("Skipping {}: no geometry", place.name);
                    return None;
                };
                let address = place
                    .vicinity
                    .or(place.formatted_address)
                    .unwrap_or_else(|| "Address not available".to_string());

                ScrapedGym::new(
                    place.name,
                    address,
                    geometry.location.lat,
                    geometry.location.lng,
                    SOURCE_LABEL,
                )
                .with_amenities(default_amenities())
                .with_phone(place.formatted_phone_number)
                .with_website(place.website)
                .validated()
            })
            .collect();

        Ok((body.status, gyms))
    }
}

#[async_trait]
impl GymSource for GooglePlacesSource {
    fn name(&self) -> &str {
        SOURCE_LABEL
    }

    async fn fetch(&self) -> Result<Vec<ScrapedGym>, ScrapeError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Google Places API key not found, skipping Google Places search");
            return Ok(Vec::new());
        };

        let mut gyms = Vec::new();

        for (city, lat, lng) in UK_CITIES {
            match self.search_city(api_key, *lat, *lng).await {
                Ok((status, found)) => {
                    tracing::debug!("{}: {} gyms (status {:?})", city, found.len(), status);
                    gyms.extend(found);
                }
                Err(e) => tracing::warn!("Error searching {}: {}", city, e),
            }

            tokio::time::sleep(self.delay).await;
        }

        tracing::info!("Found {} gyms via Google Places", gyms.len());
        Ok(gyms)
    }
}
