use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{ensure_success, GymSource, ScrapeError, ScrapedGym};
use crate::models::OpeningHours;

pub const SOURCE_LABEL: &str = "Gym Finder API";

/// Amenities assumed for branches found on the chain's own site
pub fn site_amenities() -> Vec<String> {
    [
        "Weights",
        "Cardio",
        "Functional Training",
        "Free Wi-Fi",
        "24/7 Access",
        "CCTV",
        "Air Conditioning",
    ]
    .iter()
    .map(|a| a.to_string())
    .collect()
}

/// Entry of the gym finder's JSON listing; coordinates may be strings
#[derive(Debug, Deserialize)]
struct FinderEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    latitude: Value,
    #[serde(default)]
    longitude: Value,
    url: Option<String>,
    phone: Option<String>,
    hours: Option<OpeningHours>,
    amenities: Option<Vec<String>>,
}

/// Number or numeric string; anything else is NaN so validation drops it
fn coordinate(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn to_scraped(entry: FinderEntry) -> Option<ScrapedGym> {
    let Some(url) = entry.url else {
        tracing::warn!("Skipping gym '{}' without a page URL", entry.name);
        return None;
    };

    let mut gym = ScrapedGym::new(
        entry.name,
        entry.address,
        coordinate(&entry.latitude),
        coordinate(&entry.longitude),
        SOURCE_LABEL,
    )
    .with_amenities(entry.amenities.unwrap_or_else(site_amenities))
    .with_website(Some(url))
    .with_phone(entry.phone);
    gym.hours = Some(entry.hours.unwrap_or_default());

    gym.validated()
}

/// The chain's public gym finder endpoint (`/api/gyms/all`)
pub struct FinderApiSource {
    client: Client,
    site_url: String,
}

impl FinderApiSource {
    pub fn new(client: Client, site_url: &str) -> Self {
        Self {
            client,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GymSource for FinderApiSource {
    fn name(&self) -> &str {
        SOURCE_LABEL
    }

    async fn fetch(&self) -> Result<Vec<ScrapedGym>, ScrapeError> {
        let url = format!("{}/api/gyms/all", self.site_url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("Referer", format!("{}/gyms/", self.site_url))
            .send()
            .await?;

        let body: Value = ensure_success(response)?.json().await?;

        // Anything other than an array means the endpoint changed shape
        let Value::Array(entries) = body else {
            tracing::warn!("Gym finder did not return a list");
            return Ok(Vec::new());
        };

        let gyms: Vec<ScrapedGym> = entries
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<FinderEntry>(raw) {
                Ok(entry) => to_scraped(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable gym entry: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Gym finder yielded {} valid gyms", gyms.len());
        Ok(gyms)
    }
}
