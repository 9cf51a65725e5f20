use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use super::error::ApiError;
use super::extract::AuthenticatedUser;
use super::AppState;
use crate::models::{MatchFilter, MatchRequest, MatchStatusUpdate, UpdateMatchRequest, WorkoutMatch};

/// Configure all match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches", web::get().to(list_matches))
        .route("/matches", web::post().to(create_match))
        .route("/matches/{id}", web::get().to(get_match))
        .route("/matches/{id}", web::patch().to(update_match));
}

/// GET /api/v1/matches?status=pending&gymId=..&dateFrom=..&dateTo=..
async fn list_matches(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    filter: web::Query<MatchFilter>,
) -> Result<HttpResponse, ApiError> {
    filter.validate()?;

    let matches = state.store.list_matches(user.id, &filter).await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// POST /api/v1/matches
///
/// Request body:
/// ```json
/// {
///   "partnerId": "uuid",
///   "gymId": "uuid",
///   "workoutType": "strength",
///   "scheduledAt": "2025-03-14T18:00:00Z",
///   "message": "Leg day?"
/// }
/// ```
async fn create_match(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<MatchRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    if req.partner_id == user.id {
        return Err(ApiError::BadRequest("Cannot request a workout with yourself".to_string()));
    }

    let created = state.store.create_match(user.id, &req).await?;
    Ok(HttpResponse::Created().json(created))
}

async fn get_match(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let found = visible_match(&state, user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(found))
}

async fn update_match(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateMatchRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let existing = visible_match(&state, user.id, path.into_inner()).await?;
    check_update_allowed(&existing, user.id, &req)?;
    let updated = state.store.update_match(existing.id, &req).await?;

    tracing::info!("Match {} updated by {} (status {:?})", updated.id, user.id, updated.status);
    Ok(HttpResponse::Ok().json(updated))
}

/// The match, when `member` takes part in it; other members see a 404
async fn visible_match(state: &AppState, member: Uuid, id: Uuid) -> Result<WorkoutMatch, ApiError> {
    state
        .store
        .get_match(id)
        .await?
        .filter(|found| found.involves(member))
        .ok_or_else(|| ApiError::NotFound(format!("Match {} not found", id)))
}

/// Accepting or declining belongs to the partner, never the requester
fn check_update_allowed(existing: &WorkoutMatch, member: Uuid, update: &UpdateMatchRequest) -> Result<(), ApiError> {
    match update.status {
        Some(MatchStatusUpdate::Accepted | MatchStatusUpdate::Declined) if !existing.can_respond(member) => Err(
            ApiError::Forbidden("Only the invited partner can accept or decline a match".to_string()),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorResponse;
    use crate::routes::error::handle_query_payload_error;
    use crate::routes::test_support::unreachable_state;
    use crate::services::token::tests::token_for;
    use crate::models::MatchStatus;
    use actix_web::{http::StatusCode, test, App};
    use chrono::Utc;
    use serde_json::json;

    fn pending_match(requester: Uuid, partner: Uuid) -> WorkoutMatch {
        WorkoutMatch {
            id: Uuid::new_v4(),
            user_id: requester,
            partner_id: partner,
            gym_id: Uuid::new_v4(),
            status: MatchStatus::Pending,
            scheduled_at: None,
            workout_type: Some("strength".to_string()),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn status_update(status: MatchStatusUpdate) -> UpdateMatchRequest {
        UpdateMatchRequest {
            status: Some(status),
            ..Default::default()
        }
    }

    fn app_config(cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(unreachable_state()))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .configure(configure);
    }

    fn bearer(user: Uuid) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token_for(user, "authenticated", 3600)))
    }

    #[actix_web::test]
    async fn test_self_request_rejected() {
        let app = test::init_service(App::new().configure(app_config)).await;
        let me = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri("/matches")
            .insert_header(bearer(me))
            .set_json(json!({ "partnerId": me, "gymId": Uuid::new_v4() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Cannot request a workout with yourself");
    }

    #[actix_web::test]
    async fn test_pending_is_not_a_valid_update() {
        let app = test::init_service(App::new().configure(app_config)).await;

        let req = test::TestRequest::patch()
            .uri(&format!("/matches/{}", Uuid::new_v4()))
            .insert_header(bearer(Uuid::new_v4()))
            .set_json(json!({ "status": "pending" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_list_rejects_inverted_date_range() {
        let app = test::init_service(App::new().configure(app_config)).await;

        let req = test::TestRequest::get()
            .uri("/matches?dateFrom=2025-03-02T00:00:00Z&dateTo=2025-03-01T00:00:00Z")
            .insert_header(bearer(Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "validation_failed");
    }

    #[::core::prelude::v1::test]
    fn test_requester_cannot_answer_own_request() {
        let (requester, partner) = (Uuid::new_v4(), Uuid::new_v4());
        let pending = pending_match(requester, partner);

        for status in [MatchStatusUpdate::Accepted, MatchStatusUpdate::Declined] {
            let result = check_update_allowed(&pending, requester, &status_update(status));
            assert!(matches!(result, Err(ApiError::Forbidden(_))));
        }
    }

    #[::core::prelude::v1::test]
    fn test_partner_answers_and_either_side_completes() {
        let (requester, partner) = (Uuid::new_v4(), Uuid::new_v4());
        let pending = pending_match(requester, partner);

        assert!(check_update_allowed(&pending, partner, &status_update(MatchStatusUpdate::Accepted)).is_ok());
        assert!(check_update_allowed(&pending, partner, &status_update(MatchStatusUpdate::Declined)).is_ok());
        assert!(check_update_allowed(&pending, requester, &status_update(MatchStatusUpdate::Completed)).is_ok());

        let reschedule = UpdateMatchRequest {
            scheduled_at: Some(Utc::now()),
            ..Default::default()
        };
        assert!(check_update_allowed(&pending, requester, &reschedule).is_ok());
    }
}
