//! Gym seeding sources
//!
//! Each source turns a third-party feed (the chain's own site, Google Places,
//! OpenStreetMap, a bundled list) into [`ScrapedGym`] records. `chain` decides
//! how sources are combined and `seeder` writes the result to the store.

pub mod chain;
pub mod diagnostics;
pub mod fallback_data;
pub mod finder_api;
pub mod geocode;
pub mod google_places;
pub mod html_pages;
pub mod overpass;
pub mod seeder;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::config::ScraperSettings;
use crate::core::dedup::GeoKeyed;
use crate::models::{Coordinates, OpeningHours, PriceRange};
use crate::services::{GymInsert, PostgresError};

pub use chain::{first_non_empty, merge_all, source_breakdown};
pub use fallback_data::StaticListSource;
pub use finder_api::FinderApiSource;
pub use google_places::GooglePlacesSource;
pub use html_pages::HtmlPagesSource;
pub use overpass::OverpassSource;

/// Errors raised while collecting or storing scraped gyms
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Unexpected response: {0}")]
    ParseError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PostgresError),
}

/// A gym location as collected from one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_position"))]
pub struct ScrapedGym {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[validate(url)]
    pub website: Option<String>,
    pub phone: Option<String>,
    pub hours: Option<OpeningHours>,
    pub amenities: Vec<String>,
    pub price_range: PriceRange,
    /// Label of the source that produced the record
    pub source: String,
}

fn validate_position(gym: &ScrapedGym) -> Result<(), ValidationError> {
    if gym.latitude.is_finite() && gym.longitude.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("coordinates"))
    }
}

impl ScrapedGym {
    pub fn new(name: impl Into<String>, address: impl Into<String>, latitude: f64, longitude: f64, source: &str) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
            website: None,
            phone: None,
            hours: None,
            amenities: Vec::new(),
            price_range: PriceRange::Budget,
            source: source.to_string(),
        }
    }

    pub fn with_amenities(mut self, amenities: Vec<String>) -> Self {
        self.amenities = amenities;
        self
    }

    pub fn with_website(mut self, website: Option<String>) -> Self {
        self.website = website;
        self
    }

    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    /// Keep the record only if it passes validation, logging why not
    pub fn validated(self) -> Option<Self> {
        match self.validate() {
            Ok(()) => Some(self),
            Err(e) => {
                tracing::warn!("Skipping invalid gym '{}' from {}: {}", self.name, self.source, e);
                None
            }
        }
    }

    /// Row to insert; hours default to empty and images are not scraped
    pub fn to_insert(&self) -> GymInsert {
        GymInsert {
            name: self.name.clone(),
            address: self.address.clone(),
            location: Coordinates::new(self.latitude, self.longitude),
            amenities: self.amenities.clone(),
            hours: Some(self.hours.clone().unwrap_or_default()),
            images: Vec::new(),
            rating: None,
            price_range: Some(self.price_range),
        }
    }
}

impl GeoKeyed for ScrapedGym {
    fn name(&self) -> &str {
        &self.name
    }

    fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// One provider of gym locations
#[async_trait]
pub trait GymSource: Send + Sync {
    /// Label recorded on every gym this source yields
    fn name(&self) -> &str;

    /// Collect the source's gyms; individual bad records are skipped, not errors
    async fn fetch(&self) -> Result<Vec<ScrapedGym>, ScrapeError>;
}

/// Shared HTTP client for the scraping sources
pub fn http_client(settings: &ScraperSettings) -> Result<Client, ScrapeError> {
    let client = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()?;
    Ok(client)
}

/// Fail with `ScrapeError::Status` on a non-2xx response
pub(crate) fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ScrapeError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ScrapeError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}
