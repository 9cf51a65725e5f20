// Route exports
pub mod auth;
pub mod error;
pub mod extract;
pub mod gyms;
pub mod matches;
pub mod profiles;

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::config::MatchingSettings;
use crate::core::PartnerMatcher;
use crate::models::HealthResponse;
use crate::services::{GymCache, PostgresClient, SupabaseAuthClient, TokenVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PostgresClient>,
    pub auth: Arc<SupabaseAuthClient>,
    pub tokens: Arc<TokenVerifier>,
    pub cache: GymCache,
    pub matcher: PartnerMatcher,
    pub matching: MatchingSettings,
    pub redirects: AuthRedirects,
}

/// Where the auth provider sends the browser back to
#[derive(Debug, Clone)]
pub struct AuthRedirects {
    pub oauth_callback: String,
    pub password_reset: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(auth::configure)
            .configure(gyms::configure)
            .configure(profiles::configure)
            .configure(matches::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
