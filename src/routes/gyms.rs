use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use super::error::ApiError;
use super::extract::AuthenticatedUser;
use super::AppState;
use crate::core::nearby_gyms;
use crate::models::{CreateGymRequest, GymSearchRequest, NearbyGymsQuery, UpdateGymRequest};
use crate::services::GymInsert;

/// Configure all gym directory routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Literal segments first so they are not taken for an id
    cfg.route("/gyms", web::get().to(list_gyms))
        .route("/gyms", web::post().to(create_gym))
        .route("/gyms/nearby", web::get().to(nearby))
        .route("/gyms/search", web::post().to(search_gyms))
        .route("/gyms/{id}", web::get().to(get_gym))
        .route("/gyms/{id}", web::patch().to(update_gym));
}

/// GET /api/v1/gyms
async fn list_gyms(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let gyms = state.cache.all_gyms(&state.store).await?;
    Ok(HttpResponse::Ok().json(gyms.as_ref()))
}

/// GET /api/v1/gyms/nearby?latitude=..&longitude=..&radius=..
///
/// Radius is in kilometres and defaults to the configured search radius.
async fn nearby(
    state: web::Data<AppState>,
    query: web::Query<NearbyGymsQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    let radius = query.radius.unwrap_or(state.matching.default_radius_km);
    let gyms = state.cache.all_gyms(&state.store).await?;
    let nearby = nearby_gyms(gyms.as_ref().clone(), &query.origin(), radius);

    tracing::debug!(
        "{} gyms within {} km of ({}, {})",
        nearby.len(),
        radius,
        query.latitude,
        query.longitude
    );

    Ok(HttpResponse::Ok().json(nearby))
}

/// POST /api/v1/gyms/search
///
/// Request body:
/// ```json
/// {
///   "query": "leeds",
///   "latitude": 53.8,
///   "longitude": -1.55,
///   "radius": 10,
///   "amenities": ["Sauna"],
///   "priceRange": ["$", "$$"]
/// }
/// ```
async fn search_gyms(
    state: web::Data<AppState>,
    req: web::Json<GymSearchRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let gyms = state.store.search_gyms(&req).await?;
    Ok(HttpResponse::Ok().json(gyms))
}

async fn get_gym(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    match state.cache.gym(&state.store, id).await? {
        Some(gym) => Ok(HttpResponse::Ok().json(gym.as_ref())),
        None => Err(ApiError::NotFound(format!("Gym {} not found", id))),
    }
}

async fn create_gym(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateGymRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let gym = state.store.create_gym(&GymInsert::from(req.into_inner())).await?;
    state.cache.invalidate();

    tracing::info!("User {} added gym {} ({})", user.id, gym.id, gym.name);
    Ok(HttpResponse::Created().json(gym))
}

async fn update_gym(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateGymRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let gym = state.store.update_gym(path.into_inner(), &req).await?;
    state.cache.invalidate();

    tracing::info!("User {} updated gym {}", user.id, gym.id);
    Ok(HttpResponse::Ok().json(gym))
}
