//! Post-seeding verification and pre-flight connectivity checks

use chrono::{DateTime, NaiveTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::fallback_data::StaticListSource;
use crate::services::{GymDigest, PostgresClient, PostgresError};

const RECENT_LIMIT: i64 = 10;
const BRAND_SAMPLE: usize = 5;

/// What `gym-seeder verify` reports about the gyms table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub total: i64,
    pub recent: Vec<GymDigest>,
    pub brand_entries: Vec<GymDigest>,
    pub created_today: Vec<GymDigest>,
}

impl VerificationReport {
    pub async fn collect(store: &PostgresClient, brand_pattern: &str) -> Result<Self, PostgresError> {
        let fragments: Vec<&str> = brand_fragments(brand_pattern);

        Ok(Self {
            total: store.count_gyms().await?,
            recent: store.recent_gyms(RECENT_LIMIT).await?,
            brand_entries: store.gyms_named_like(&fragments).await?,
            created_today: store.gyms_created_since(start_of_day(Utc::now())).await?,
        })
    }

    /// Log the report the way the seeding scripts print it
    pub fn log(&self) {
        tracing::info!("Total gyms in database: {}", self.total);

        tracing::info!("{} most recent gyms:", self.recent.len());
        for (i, gym) in self.recent.iter().enumerate() {
            tracing::info!("  {}. {} ({})", i + 1, gym.name, gym.address);
        }

        tracing::info!("Brand gyms found: {}", self.brand_entries.len());
        for gym in self.brand_entries.iter().take(BRAND_SAMPLE) {
            tracing::info!("  - {}", gym.name);
        }
        if self.brand_entries.len() > BRAND_SAMPLE {
            tracing::info!("  ... and {} more", self.brand_entries.len() - BRAND_SAMPLE);
        }

        tracing::info!("Gyms created today: {}", self.created_today.len());
    }
}

/// Plain name fragments of an alternation such as `PureGym|Pure Gym`
pub fn brand_fragments(pattern: &str) -> Vec<&str> {
    pattern
        .split('|')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass(String),
    Fail(String),
    Skip(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub outcome: CheckOutcome,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CheckOutcome::Pass(detail) => write!(f, "PASS {}: {}", self.name, detail),
            CheckOutcome::Fail(detail) => write!(f, "FAIL {}: {}", self.name, detail),
            CheckOutcome::Skip(detail) => write!(f, "SKIP {}: {}", self.name, detail),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckSummary {
    pub results: Vec<CheckResult>,
}

impl CheckSummary {
    pub fn push(&mut self, name: &'static str, outcome: CheckOutcome) {
        let result = CheckResult { name, outcome };
        match result.outcome {
            CheckOutcome::Fail(_) => tracing::error!("{}", result),
            _ => tracing::info!("{}", result),
        }
        self.results.push(result);
    }

    fn count(&self, wanted: fn(&CheckOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| wanted(&r.outcome)).count()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Pass(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Fail(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Skip(_)))
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

pub async fn check_database(store: Option<&PostgresClient>) -> CheckOutcome {
    let Some(store) = store else {
        return CheckOutcome::Fail("database is not configured".to_string());
    };

    match store.count_gyms().await {
        Ok(count) => CheckOutcome::Pass(format!("connected, {} gyms stored", count)),
        Err(e) => CheckOutcome::Fail(e.to_string()),
    }
}

pub fn check_fallback_data(fallback: &StaticListSource) -> CheckOutcome {
    if fallback.is_empty() {
        CheckOutcome::Fail("no bundled locations".to_string())
    } else {
        CheckOutcome::Pass(format!("{} bundled locations", fallback.len()))
    }
}

/// Any 2xx from `url` passes
pub async fn check_reachable(client: &Client, url: &str) -> CheckOutcome {
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => {
            CheckOutcome::Pass(format!("{} answered {}", url, response.status()))
        }
        Ok(response) => CheckOutcome::Fail(format!("{} answered {}", url, response.status())),
        Err(e) => CheckOutcome::Fail(e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct PlacesStatus {
    status: String,
    error_message: Option<String>,
}

/// One small Nearby Search around central London
pub async fn check_google_places(client: &Client, endpoint: &str, api_key: Option<&str>, brand: &str) -> CheckOutcome {
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        return CheckOutcome::Skip("GOOGLE_PLACES_API_KEY not set".to_string());
    };

    let request = client.get(endpoint).query(&[
        ("location", "51.5074,-0.1278"),
        ("radius", "1000"),
        ("keyword", brand),
        ("type", "gym"),
        ("key", api_key),
    ]);

    let body: PlacesStatus = match request.send().await {
        Ok(response) => match response.json().await {
            Ok(body) => body,
            Err(e) => return CheckOutcome::Fail(e.to_string()),
        },
        Err(e) => return CheckOutcome::Fail(e.to_string()),
    };

    match body.status.as_str() {
        "OK" | "ZERO_RESULTS" => CheckOutcome::Pass(format!("API status {}", body.status)),
        other => CheckOutcome::Fail(format!(
            "API status {}{}",
            other,
            body.error_message.map(|m| format!(": {}", m)).unwrap_or_default()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_brand_fragments() {
        assert_eq!(brand_fragments("PureGym|Pure Gym"), vec!["PureGym", "Pure Gym"]);
        assert_eq!(brand_fragments("PureGym"), vec!["PureGym"]);
        assert_eq!(brand_fragments(" a || b "), vec!["a", "b"]);
    }

    #[test]
    fn test_start_of_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 17, 45, 12).unwrap();
        assert_eq!(start_of_day(now), Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = CheckSummary::default();
        summary.push("database", CheckOutcome::Pass("ok".into()));
        summary.push("places", CheckOutcome::Skip("no key".into()));
        assert!(summary.all_passed());

        summary.push("network", CheckOutcome::Fail("timeout".into()));
        assert_eq!((summary.passed(), summary.failed(), summary.skipped()), (1, 1, 1));
        assert!(!summary.all_passed());
        assert_eq!(summary.results[2].to_string(), "FAIL network: timeout");
    }

    #[test]
    fn test_fallback_data_present() {
        let fallback = StaticListSource::new("https://www.puregym.com");
        assert!(matches!(check_fallback_data(&fallback), CheckOutcome::Pass(_)));
    }

    #[tokio::test]
    async fn test_database_not_configured() {
        assert!(matches!(check_database(None).await, CheckOutcome::Fail(_)));
    }

    #[tokio::test]
    async fn test_reachable() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/status/200").with_status(200).create_async().await;
        server.mock("GET", "/api/status").with_status(503).create_async().await;

        let client = Client::new();
        let ok = check_reachable(&client, &format!("{}/status/200", server.url())).await;
        let down = check_reachable(&client, &format!("{}/api/status", server.url())).await;

        assert!(matches!(ok, CheckOutcome::Pass(_)));
        assert!(matches!(down, CheckOutcome::Fail(_)));
    }

    #[tokio::test]
    async fn test_google_places_check() {
        let client = Client::new();
        let skipped = check_google_places(&client, "http://127.0.0.1:1/unused", None, "PureGym").await;
        assert!(matches!(skipped, CheckOutcome::Skip(_)));

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/nearbysearch/json")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "bad".into()))
            .with_status(200)
            .with_body(r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "results": []}"#)
            .create_async()
            .await;

        let denied = check_google_places(
            &client,
            &format!("{}/nearbysearch/json", server.url()),
            Some("bad"),
            "PureGym",
        )
        .await;
        assert_eq!(
            denied,
            CheckOutcome::Fail("API status REQUEST_DENIED: The provided API key is invalid.".to_string())
        );
    }
}
