use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::fallback_data::default_amenities;
use super::{ensure_success, GymSource, ScrapeError, ScrapedGym};

pub const SOURCE_LABEL: &str = "OpenStreetMap";

const ADDRESS_PARTS: [&str; 4] = ["addr:housenumber", "addr:street", "addr:city", "addr:postcode"];

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

/// Overpass QL selecting the brand's gyms in Great Britain
pub fn build_query(brand_pattern: &str) -> String {
    let filter = format!(
        r#"["amenity"="gym"]["name"~"{}"]["addr:country"="GB"]"#,
        brand_pattern.replace('"', "\\\"")
    );
    format!(
        "[out:json][timeout:25];\n(\n  node{f};\n  way{f};\n  relation{f};\n);\nout center;",
        f = filter
    )
}

/// Street address from OSM `addr:*` tags
fn address_from_tags(tags: &HashMap<String, String>) -> String {
    let parts: Vec<&str> = ADDRESS_PARTS
        .iter()
        .filter_map(|key| tags.get(*key).map(String::as_str))
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        "Address not available".to_string()
    } else {
        parts.join(", ")
    }
}

fn to_scraped(element: Element, brand: &str) -> Option<ScrapedGym> {
    let (lat, lon) = match (element.kind.as_str(), element.lat, element.lon, &element.center) {
        ("node", Some(lat), Some(lon), _) => (lat, lon),
        ("way", _, _, Some(center)) => (center.lat, center.lon),
        _ => return None,
    };

    let address = address_from_tags(&element.tags);
    let mut tags = element.tags;
    let name = tags.remove("name").unwrap_or_else(|| brand.to_string());

    ScrapedGym::new(name, address, lat, lon, SOURCE_LABEL)
        .with_amenities(default_amenities())
        .with_phone(tags.remove("phone"))
        .with_website(tags.remove("website"))
        .validated()
}

/// OpenStreetMap data through the Overpass API
pub struct OverpassSource {
    client: Client,
    endpoint: String,
    brand: String,
    brand_pattern: String,
}

impl OverpassSource {
    pub fn new(client: Client, endpoint: &str, brand: &str, brand_pattern: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            brand: brand.to_string(),
            brand_pattern: brand_pattern.to_string(),
        }
    }

    /// The service's status page, next to the interpreter endpoint
    pub fn status_url(&self) -> String {
        match self.endpoint.rsplit_once('/') {
            Some((base, _)) => format!("{}/status", base),
            None => format!("{}/status", self.endpoint),
        }
    }
}

#[async_trait]
impl GymSource for OverpassSource {
    fn name(&self) -> &str {
        SOURCE_LABEL
    }

    async fn fetch(&self) -> Result<Vec<ScrapedGym>, ScrapeError> {
        let query = build_query(&self.brand_pattern);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("data={}", urlencoding::encode(&query)))
            .send()
            .await?;

        let body: OverpassResponse = ensure_success(response)?.json().await?;

        let gyms: Vec<ScrapedGym> = body
            .elements
            .into_iter()
            .filter_map(|element| to_scraped(element, &self.brand))
            .collect();

        tracing::info!("Found {} gyms via OpenStreetMap", gyms.len());
        Ok(gyms)
    }
}
