use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tokio::task::JoinSet;

use super::finder_api::site_amenities;
use super::geocode::Geocoder;
use super::{ensure_success, GymSource, ScrapeError, ScrapedGym};
use crate::models::Coordinates;

pub const SOURCE_LABEL: &str = "HTML Scraping";

static GYM_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="/gyms/([^"]+)""#).unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"<h1[^>]*>([^<]+)</h1>").unwrap());
static ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)address[^>]*>([^<]+)<").unwrap());
static LATITUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)latitude["\s]*:\s*["']?([0-9.-]+)["']?"#).unwrap());
static LONGITUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)longitude["\s]*:\s*["']?([0-9.-]+)["']?"#).unwrap());
static DATA_COORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)data-lat=["']([0-9.-]+)["'][^>]*data-lng=["']([0-9.-]+)["']"#).unwrap()
});

/// Branch page URLs linked from the listing page, first occurrence order
pub fn extract_gym_links(html: &str, site_url: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for captures in GYM_LINK.captures_iter(html) {
        let slug = &captures[1];
        if slug.contains('?') || slug == "find-a-gym" {
            continue;
        }
        let url = format!("{}/gyms/{}", site_url, slug);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    urls
}

/// What a branch page yields before geocoding
#[derive(Debug, Clone, PartialEq)]
pub struct PageDetails {
    pub name: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
}

/// Name, address and (when embedded) coordinates of a branch page
pub fn extract_page_details(html: &str) -> Option<PageDetails> {
    let name = HEADING.captures(html)?[1].trim().to_string();
    let address = ADDRESS.captures(html)?[1].trim().to_string();

    Some(PageDetails {
        name,
        address,
        coordinates: embedded_coordinates(html),
    })
}

fn embedded_coordinates(html: &str) -> Option<Coordinates> {
    let capture = |re: &Regex| -> Option<f64> { re.captures(html)?[1].parse().ok() };

    if let (Some(lat), Some(lng)) = (capture(&LATITUDE), capture(&LONGITUDE)) {
        return Some(Coordinates::new(lat, lng));
    }

    let captures = DATA_COORDS.captures(html)?;
    let lat = captures[1].parse().ok()?;
    let lng = captures[2].parse().ok()?;
    Some(Coordinates::new(lat, lng))
}

/// Scrapes the site's branch listing, then each branch page
pub struct HtmlPagesSource {
    client: Client,
    geocoder: Geocoder,
    site_url: String,
    batch_size: usize,
    batch_delay: Duration,
}

impl HtmlPagesSource {
    pub fn new(
        client: Client,
        geocoder: Geocoder,
        site_url: &str,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            client,
            geocoder,
            site_url: site_url.trim_end_matches('/').to_string(),
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    async fn gym_urls(&self) -> Result<Vec<String>, ScrapeError> {
        let url = format!("{}/gyms/", self.site_url);
        let response = self.client.get(&url).send().await?;
        let html = ensure_success(response)?.text().await?;
        Ok(extract_gym_links(&html, &self.site_url))
    }
}

/// Fetch one branch page; `None` when it cannot be turned into a gym
async fn scrape_page(client: Client, geocoder: Geocoder, url: String) -> Option<ScrapedGym> {
    let html = match client.get(&url).send().await.map_err(ScrapeError::from).and_then(ensure_success) {
        Ok(response) => response.text().await.ok()?,
        Err(e) => {
            tracing::debug!("Skipping {}: {}", url, e);
            return None;
        }
    };

    let Some(details) = extract_page_details(&html) else {
        tracing::warn!("Could not extract basic data from {}", url);
        return None;
    };

    let coordinates = match details.coordinates {
        Some(c) => c,
        None => match geocoder.geocode(&details.address).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                tracing::warn!("Could not get coordinates for {}", details.name);
                return None;
            }
            Err(e) => {
                tracing::warn!("Geocoding failed for {}: {}", details.name, e);
                return None;
            }
        },
    };

    ScrapedGym::new(
        details.name,
        details.address,
        coordinates.latitude,
        coordinates.longitude,
        SOURCE_LABEL,
    )
    .with_amenities(site_amenities())
    .with_website(Some(url))
    .validated()
}

#[async_trait]
impl GymSource for HtmlPagesSource {
    fn name(&self) -> &str {
        SOURCE_LABEL
    }

    async fn fetch(&self) -> Result<Vec<ScrapedGym>, ScrapeError> {
        let urls = self.gym_urls().await?;
        let batches = urls.len().div_ceil(self.batch_size);
        tracing::info!("Found {} gym URLs to process", urls.len());

        let mut gyms = Vec::new();

        for (index, batch) in urls.chunks(self.batch_size).enumerate() {
            let mut join_set = JoinSet::new();

            for (position, url) in batch.iter().enumerate() {
                let client = self.client.clone();
                let geocoder = self.geocoder.clone();
                let url = url.clone();
                join_set.spawn(async move { (position, scrape_page(client, geocoder, url).await) });
            }

            let mut results = Vec::with_capacity(batch.len());
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok(result) => results.push(result),
                    Err(e) => tracing::warn!("Page task failed: {}", e),
                }
            }

            // Keep listing order regardless of completion order
            results.sort_by_key(|(position, _)| *position);
            gyms.extend(results.into_iter().filter_map(|(_, gym)| gym));

            tracing::info!("Processed batch {}/{}", index + 1, batches);

            if index + 1 < batches {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        Ok(gyms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <ul>
          <li><a href="/gyms/leeds-city-centre">Leeds</a></li>
          <li><a href="/gyms/find-a-gym">Find</a></li>
          <li><a href="/gyms/leeds-city-centre">Leeds again</a></li>
          <li><a href="/gyms/bank?utm=nav">Bank</a></li>
          <li><a href="/gyms/london-bank">Bank</a></li>
        </ul>
    "#;

    const PAGE_WITH_SCRIPT: &str = r#"
        <h1 class="title">PureGym Leeds City Centre </h1>
        <div class="address-block">Merrion Centre, Leeds LS2 8NG</div>
        <script>var gym = { "latitude": "53.8059", "longitude": -1.5509 };</script>
    "#;

    const PAGE_WITH_DATA_ATTRS: &str = r#"
        <h1>PureGym London Bank</h1>
        <address>86-90 Cannon Street, London</address>
        <div id="map" data-lat="51.5127" data-lng="-0.0907"></div>
    "#;

    #[test]
    fn test_extract_links() {
        let links = extract_gym_links(LISTING, "https://www.puregym.com");
        assert_eq!(
            links,
            vec![
                "https://www.puregym.com/gyms/leeds-city-centre",
                "https://www.puregym.com/gyms/london-bank",
            ]
        );
    }

    #[test]
    fn test_details_from_script_coordinates() {
        let details = extract_page_details(PAGE_WITH_SCRIPT).unwrap();
        assert_eq!(details.name, "PureGym Leeds City Centre");
        assert_eq!(details.address, "Merrion Centre, Leeds LS2 8NG");
        assert_eq!(details.coordinates, Some(Coordinates::new(53.8059, -1.5509)));
    }

    #[test]
    fn test_details_from_data_attributes() {
        let details = extract_page_details(PAGE_WITH_DATA_ATTRS).unwrap();
        assert_eq!(details.address, "86-90 Cannon Street, London");
        assert_eq!(details.coordinates, Some(Coordinates::new(51.5127, -0.0907)));
    }

    #[test]
    fn test_missing_heading_is_skipped() {
        assert!(extract_page_details("<p>address: nowhere</p>").is_none());
    }

    #[tokio::test]
    async fn test_fetch_geocodes_pages_without_coordinates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gyms/")
            .with_status(200)
            .with_body(r#"<a href="/gyms/bank">Bank</a><a href="/gyms/leeds">Leeds</a><a href="/gyms/gone">Gone</a>"#)
            .create_async()
            .await;
        server
            .mock("GET", "/gyms/bank")
            .with_status(200)
            .with_body("<h1>PureGym Bank</h1><address>Cannon Street, London</address>")
            .create_async()
            .await;
        server
            .mock("GET", "/gyms/leeds")
            .with_status(200)
            .with_body(PAGE_WITH_SCRIPT)
            .create_async()
            .await;
        server.mock("GET", "/gyms/gone").with_status(404).create_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"lat": "51.5115", "lon": "-0.0900"}]"#)
            .create_async()
            .await;

        let client = Client::new();
        let geocoder = Geocoder::new(client.clone(), &format!("{}/search", server.url()));
        let source = HtmlPagesSource::new(client, geocoder, &server.url(), 2, Duration::from_millis(1));

        let gyms = source.fetch().await.unwrap();

        assert_eq!(gyms.len(), 2);
        assert_eq!(gyms[0].name, "PureGym Bank");
        assert_eq!(gyms[0].latitude, 51.5115);
        assert_eq!(gyms[1].name, "PureGym Leeds City Centre");
        assert!(gyms.iter().all(|g| g.source == SOURCE_LABEL));
    }
}
