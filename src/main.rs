use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};

use gym_buddy::config::Settings;
use gym_buddy::core::PartnerMatcher;
use gym_buddy::models::ScoringWeights;
use gym_buddy::routes::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use gym_buddy::routes::{self, AppState, AuthRedirects};
use gym_buddy::services::{GymCache, PostgresClient, SupabaseAuthClient, TokenVerifier};

fn startup_error(what: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env.local first; dotenv never overwrites a variable already set
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    settings.logging.init();

    info!("Starting Gym Buddy service...");

    // Initialize PostgreSQL client
    let db = &settings.database;
    let db_max_conn = db.max_connections.unwrap_or(10);

    let store = Arc::new(
        PostgresClient::new(
            &db.url,
            db_max_conn,
            db.min_connections.unwrap_or(1),
            db.acquire_timeout_secs.unwrap_or(5),
            db.idle_timeout_secs.unwrap_or(600),
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    // Auth provider client and local token verification
    let supabase = &settings.supabase;
    if supabase.jwt_secret.is_empty() {
        return Err(startup_error("Missing configuration", "supabase.jwt_secret is empty"));
    }

    let auth = Arc::new(
        SupabaseAuthClient::new(
            supabase.url.clone(),
            supabase.anon_key.clone(),
            supabase.request_timeout_secs,
        )
        .map_err(|e| startup_error("Failed to build auth client", e))?,
    );
    let tokens = Arc::new(TokenVerifier::new(&supabase.jwt_secret, &supabase.jwt_audience));

    info!("Auth client initialized for {}", supabase.url);

    let cache = GymCache::new(settings.cache.max_entries, settings.cache.ttl_secs);
    info!(
        "Gym cache initialized ({} entries, TTL: {}s)",
        settings.cache.max_entries, settings.cache.ttl_secs
    );

    // Initialize matcher with configured weights
    let weights = ScoringWeights::from(&settings.matching.weights);
    let matcher = PartnerMatcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        store,
        auth,
        tokens,
        cache,
        matcher,
        matching: settings.matching.clone(),
        redirects: AuthRedirects {
            oauth_callback: supabase.oauth_redirect(),
            password_reset: supabase.reset_redirect(),
        },
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
