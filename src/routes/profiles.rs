use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use super::error::ApiError;
use super::extract::AuthenticatedUser;
use super::AppState;
use crate::models::{
    CreateProfileRequest, FindPartnersQuery, FindPartnersResponse, JoinGymRequest, ProfileListQuery,
    UpdateProfileRequest,
};

/// Configure all profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles", web::get().to(list_profiles))
        .route("/profiles", web::post().to(create_profile))
        .route("/profiles/me", web::get().to(get_own_profile))
        .route("/profiles/me", web::patch().to(update_own_profile))
        .route("/profiles/me/gym", web::put().to(join_gym))
        .route("/profiles/me/partners", web::get().to(find_partners))
        .route("/profiles/{id}", web::get().to(get_profile));
}

/// GET /api/v1/profiles?gymId={gymId}
async fn list_profiles(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query: web::Query<ProfileListQuery>,
) -> Result<HttpResponse, ApiError> {
    let profiles = state.store.list_profiles(query.gym_id).await?;
    Ok(HttpResponse::Ok().json(profiles))
}

/// POST /api/v1/profiles
///
/// Creates the caller's own profile; the id is taken from the token.
async fn create_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let profile = state.store.create_profile(user.id, &req).await?;
    Ok(HttpResponse::Created().json(profile))
}

async fn get_own_profile(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    match state.store.get_profile(user.id).await? {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(ApiError::NotFound("Profile not found".to_string())),
    }
}

async fn update_own_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let profile = state.store.update_profile(user.id, &req).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/v1/profiles/me/gym
async fn join_gym(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<JoinGymRequest>,
) -> Result<HttpResponse, ApiError> {
    if state.cache.gym(&state.store, req.gym_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Gym {} not found", req.gym_id)));
    }

    let profile = state.store.set_profile_gym(user.id, req.gym_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/v1/profiles/me/partners?limit=20
///
/// Ranks the other members of the caller's gym as workout partners.
async fn find_partners(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<FindPartnersQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = partner_limit(query.limit, state.matching.default_limit, state.matching.max_limit);

    let seeker = state
        .store
        .get_profile(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    let gym_id = seeker
        .gym_id()
        .ok_or_else(|| ApiError::BadRequest("Join a gym to find workout partners".to_string()))?;

    let candidates = state.store.search_profiles(gym_id, seeker.id).await?;

    tracing::info!(
        "Finding partners for {} at gym {} ({} members, limit {})",
        seeker.id,
        gym_id,
        candidates.len(),
        limit
    );

    let result = state.matcher.find_partners(&seeker, candidates, limit);

    Ok(HttpResponse::Ok().json(FindPartnersResponse {
        partners: result.partners,
        total_candidates: result.total_candidates,
    }))
}

async fn get_profile(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    match state.store.get_profile(id).await? {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(ApiError::NotFound(format!("Profile {} not found", id))),
    }
}

/// Requested limit, or the default, kept within 1..=max
fn partner_limit(requested: Option<u16>, default: u16, max: u16) -> usize {
    requested.unwrap_or(default).clamp(1, max.max(1)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::unreachable_state;
    use crate::services::token::tests::token_for;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    fn app_config(cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(unreachable_state())).configure(configure);
    }

    #[::core::prelude::v1::test]
    fn test_partner_limit() {
        assert_eq!(partner_limit(None, 20, 100), 20);
        assert_eq!(partner_limit(Some(500), 20, 100), 100);
        assert_eq!(partner_limit(Some(0), 20, 100), 1);
        assert_eq!(partner_limit(Some(7), 20, 100), 7);
    }

    #[actix_web::test]
    async fn test_profiles_require_auth() {
        let app = test::init_service(App::new().configure(app_config)).await;

        for uri in ["/profiles", "/profiles/me", "/profiles/me/partners"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_create_profile_validation() {
        let app = test::init_service(App::new().configure(app_config)).await;
        let token = token_for(Uuid::new_v4(), "authenticated", 3600);

        let req = test::TestRequest::post()
            .uri("/profiles")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "email": "not-an-email", "name": "Ana" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_expired_token_rejected() {
        let app = test::init_service(App::new().configure(app_config)).await;
        let token = token_for(Uuid::new_v4(), "authenticated", -3600);

        let req = test::TestRequest::patch()
            .uri("/profiles/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "name": "Ana" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
