use actix_web::{web, HttpResponse};
use serde_json::json;
use validator::Validate;

use super::error::ApiError;
use super::extract::AuthenticatedUser;
use super::AppState;
use crate::models::{LoginRequest, OAuthUrlResponse, RegisterRequest, ResetPasswordRequest, UpdatePasswordRequest};

/// Configure all auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/sign-in", web::post().to(sign_in))
        .route("/auth/sign-up", web::post().to(sign_up))
        .route("/auth/sign-out", web::post().to(sign_out))
        .route("/auth/google", web::get().to(google_url))
        .route("/auth/user", web::get().to(current_user))
        .route("/auth/reset-password", web::post().to(reset_password))
        .route("/auth/update-password", web::post().to(update_password));
}

/// POST /api/v1/auth/sign-in
async fn sign_in(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let session = state.auth.sign_in_with_password(&req.email, &req.password).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// POST /api/v1/auth/sign-up
///
/// Returns a session straight away unless the provider requires email
/// confirmation, in which case only the user is returned.
async fn sign_up(state: web::Data<AppState>, req: web::Json<RegisterRequest>) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let outcome = state.auth.sign_up(&req.email, &req.password, &req.name).await?;
    Ok(HttpResponse::Created().json(outcome))
}

async fn sign_out(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    state.auth.sign_out(&user.token).await?;
    tracing::info!("User {} signed out", user.id);
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/auth/google
async fn google_url(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(OAuthUrlResponse {
        provider: "google".to_string(),
        url: state.auth.google_authorize_url(&state.redirects.oauth_callback),
    })
}

async fn current_user(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let found = state.auth.get_user(&user.token).await?;
    Ok(HttpResponse::Ok().json(found))
}

async fn reset_password(
    state: web::Data<AppState>,
    req: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    state.auth.reset_password(&req.email, &state.redirects.password_reset).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password reset email sent" })))
}

async fn update_password(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let updated = state.auth.update_password(&user.token, &req.password).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorResponse;
    use crate::routes::error::handle_json_payload_error;
    use crate::routes::test_support::unreachable_state;
    use crate::services::SupabaseAuthClient;
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    fn app_config(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(web::Data::new(state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .configure(configure);
        }
    }

    #[actix_web::test]
    async fn test_sign_up_password_mismatch() {
        let app = test::init_service(App::new().configure(app_config(unreachable_state()))).await;

        let req = test::TestRequest::post()
            .uri("/auth/sign-up")
            .set_json(json!({
                "email": "sam@example.com",
                "password": "secret1",
                "name": "Sam",
                "confirmPassword": "secret2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "validation_failed");
        assert!(body.message.contains("Passwords don't match"));
    }

    #[actix_web::test]
    async fn test_malformed_json() {
        let app = test::init_service(App::new().configure(app_config(unreachable_state()))).await;

        let req = test::TestRequest::post()
            .uri("/auth/sign-in")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "bad_request");
        assert_eq!(body.status_code, 400);
    }

    #[actix_web::test]
    async fn test_current_user_requires_token() {
        let app = test::init_service(App::new().configure(app_config(unreachable_state()))).await;

        let req = test::TestRequest::get().uri("/auth/user").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/auth/user")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_google_url() {
        let app = test::init_service(App::new().configure(app_config(unreachable_state()))).await;

        let req = test::TestRequest::get().uri("/auth/google").to_request();
        let body: OAuthUrlResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.provider, "google");
        assert!(body.url.contains("provider=google"));
        assert!(body.url.contains(&*urlencoding::encode("http://localhost:3000/auth/callback")));
    }

    #[actix_web::test]
    async fn test_sign_in_surfaces_provider_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token?grant_type=password")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#)
            .create_async()
            .await;

        let mut state = unreachable_state();
        state.auth = Arc::new(SupabaseAuthClient::new(server.url(), "anon".to_string(), 5).unwrap());
        let app = test::init_service(App::new().configure(app_config(state))).await;

        let req = test::TestRequest::post()
            .uri("/auth/sign-in")
            .set_json(json!({ "email": "sam@example.com", "password": "wrong-pass" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Invalid login credentials");
    }
}
