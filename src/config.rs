use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scraper: ScraperSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Hosted auth provider
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    pub service_role_key: Option<String>,
    pub jwt_secret: String,
    pub jwt_audience: String,
    /// Public origin of the web app, used for OAuth and reset redirects
    pub site_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            service_role_key: None,
            jwt_secret: String::new(),
            jwt_audience: "authenticated".to_string(),
            site_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl SupabaseSettings {
    pub fn oauth_redirect(&self) -> String {
        format!("{}/auth/callback", self.site_url.trim_end_matches('/'))
    }

    pub fn reset_redirect(&self) -> String {
        format!("{}/auth/reset-password", self.site_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_entries: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    pub default_limit: u16,
    pub max_limit: u16,
    pub default_radius_km: f64,
    pub weights: WeightsConfig,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            default_radius_km: 10.0,
            weights: WeightsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_workouts_weight")]
    pub workouts: f64,
    #[serde(default = "default_availability_weight")]
    pub availability: f64,
    #[serde(default = "default_fitness_weight")]
    pub fitness: f64,
    #[serde(default = "default_distance_weight")]
    pub distance: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            workouts: default_workouts_weight(),
            availability: default_availability_weight(),
            fitness: default_fitness_weight(),
            distance: default_distance_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        ScoringWeights {
            workouts: config.workouts,
            availability: config.availability,
            fitness: config.fitness,
            distance: config.distance,
        }
    }
}

fn default_workouts_weight() -> f64 { 0.35 }
fn default_availability_weight() -> f64 { 0.30 }
fn default_fitness_weight() -> f64 { 0.15 }
fn default_distance_weight() -> f64 { 0.20 }

/// Gym seeding sources
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    /// Chain the seeding targets
    pub brand: String,
    /// Overpass name regex for the brand
    pub brand_pattern: String,
    pub site_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub html_batch_size: usize,
    pub html_batch_delay_ms: u64,
    pub places_url: String,
    pub places_api_key: Option<String>,
    pub places_radius_m: u32,
    pub places_delay_ms: u64,
    pub overpass_url: String,
    pub nominatim_url: String,
    /// Probed by `gym-seeder check` for outbound connectivity
    pub network_check_url: String,
    pub chain_insert_batch: usize,
    pub merge_insert_batch: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            brand: "PureGym".to_string(),
            brand_pattern: "PureGym|Pure Gym".to_string(),
            site_url: "https://www.puregym.com".to_string(),
            user_agent: "Mozilla/5.0 (compatible; GymBuddySeeder/1.0)".to_string(),
            request_timeout_secs: 30,
            html_batch_size: 5,
            html_batch_delay_ms: 2000,
            places_url: "https://maps.googleapis.com/maps/api/place/nearbysearch/json".to_string(),
            places_api_key: None,
            places_radius_m: 50_000,
            places_delay_ms: 200,
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            network_check_url: "https://httpbin.org/status/200".to_string(),
            chain_insert_batch: 50,
            merge_insert_batch: 25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl LoggingSettings {
    /// Install the global tracing subscriber; `RUST_LOG` wins over `level`
    pub fn init(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.level));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true);

        let result = match self.format.as_str() {
            "pretty" => subscriber.pretty().try_init(),
            "compact" => subscriber.compact().try_init(),
            _ => subscriber.json().try_init(),
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized: {}", e);
        }
    }
}

const ENV_PREFIX: &str = "GYMBUDDY";

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with GYMBUDDY__)
    /// 4. Well-known variables such as DATABASE_URL and SUPABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GYMBUDDY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings, &|key| std::env::var(key).ok())?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings, &|key| std::env::var(key).ok())?.try_deserialize()
    }
}

/// Variables shared with the hosted backend's tooling and their config keys
const WELL_KNOWN_VARS: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("SUPABASE_URL", "supabase.url"),
    ("NEXT_PUBLIC_SUPABASE_URL", "supabase.url"),
    ("SUPABASE_ANON_KEY", "supabase.anon_key"),
    ("NEXT_PUBLIC_SUPABASE_ANON_KEY", "supabase.anon_key"),
    ("SUPABASE_SERVICE_ROLE_KEY", "supabase.service_role_key"),
    ("SUPABASE_JWT_SECRET", "supabase.jwt_secret"),
    ("GOOGLE_PLACES_API_KEY", "scraper.places_api_key"),
];

/// Layer well-known variables over the loaded config; the first variable set
/// for a key wins
fn apply_env_overrides(
    settings: Config,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);
    let mut applied: Vec<&str> = Vec::new();

    for (var, key) in WELL_KNOWN_VARS {
        if applied.contains(key) {
            continue;
        }
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            builder = builder.set_override(*key, value)?;
            applied.push(*key);
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.workouts, 0.35);
        assert_eq!(weights.availability, 0.30);
        assert_eq!(weights.fitness, 0.15);
        assert_eq!(weights.distance, 0.20);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_scraper_defaults() {
        let scraper = ScraperSettings::default();
        assert_eq!(scraper.brand, "PureGym");
        assert_eq!(scraper.html_batch_size, 5);
        assert_eq!(scraper.chain_insert_batch, 50);
        assert_eq!(scraper.merge_insert_batch, 25);
        assert!(scraper.places_api_key.is_none());
    }

    #[test]
    fn test_env_overrides_fill_required_fields() {
        let base = Config::builder().build().unwrap();
        let config = apply_env_overrides(base, &|key| match key {
            "DATABASE_URL" => Some("postgres://db/gyms".to_string()),
            "NEXT_PUBLIC_SUPABASE_URL" => Some("https://proj.supabase.co".to_string()),
            "GOOGLE_PLACES_API_KEY" => Some("places-key".to_string()),
            _ => None,
        })
        .unwrap();

        let settings: Settings = config.try_deserialize().unwrap();
        assert_eq!(settings.database.url, "postgres://db/gyms");
        assert_eq!(settings.supabase.url, "https://proj.supabase.co");
        assert_eq!(settings.scraper.places_api_key.as_deref(), Some("places-key"));
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_redirects() {
        let supabase = SupabaseSettings {
            site_url: "https://gymbuddy.app/".to_string(),
            ..Default::default()
        };
        assert_eq!(supabase.oauth_redirect(), "https://gymbuddy.app/auth/callback");
        assert_eq!(supabase.reset_redirect(), "https://gymbuddy.app/auth/reset-password");
    }
}
