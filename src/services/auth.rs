use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when talking to the hosted auth provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The provider rejected the call; `message` is its own wording
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    /// HTTP status the provider answered with, when it answered
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Authenticated user as returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default, alias = "user_metadata")]
    pub user_metadata: Value,
    #[serde(alias = "created_at")]
    pub created_at: Option<String>,
}

/// Access/refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(alias = "access_token")]
    pub access_token: String,
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
    #[serde(alias = "token_type")]
    pub token_type: String,
    #[serde(alias = "expires_in")]
    pub expires_in: u64,
    pub user: AuthUser,
}

/// Sign-up result: a session when confirmation is off, otherwise just the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

/// REST client for the Supabase auth service (GoTrue)
#[derive(Clone)]
pub struct SupabaseAuthClient {
    base_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseAuthClient {
    pub fn new(base_url: String, anon_key: String, timeout_secs: u64) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.anon_key)
    }

    /// Email/password sign-in
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = self.endpoint("token?grant_type=password");

        let response = self
            .request(self.client.post(&url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session: Session = parse(check(response).await?).await?;
        tracing::info!("User {} signed in", session.user.id);
        Ok(session)
    }

    /// Register a user; `name` is stored in the user metadata
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpOutcome, AuthError> {
        let url = self.endpoint("signup");

        let response = self
            .request(self.client.post(&url))
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await?;

        let body: Value = parse(check(response).await?).await?;
        let outcome = sign_up_outcome(body)?;

        tracing::info!(
            "Signed up {} (session issued: {})",
            email,
            outcome.session.is_some()
        );
        Ok(outcome)
    }

    /// Where to send the browser for Google sign-in
    pub fn google_authorize_url(&self, redirect_to: &str) -> String {
        format!(
            "{}?provider=google&redirect_to={}&access_type=offline&prompt=consent",
            self.endpoint("authorize"),
            urlencoding::encode(redirect_to)
        )
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.endpoint("logout");

        let response = self
            .request(self.client.post(&url))
            .bearer_auth(access_token)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// The user an access token belongs to
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let url = self.endpoint("user");

        let response = self
            .request(self.client.get(&url))
            .bearer_auth(access_token)
            .send()
            .await?;

        parse(check(response).await?).await
    }

    /// Send a password-reset email linking back to `redirect_to`
    pub async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let url = format!(
            "{}?redirect_to={}",
            self.endpoint("recover"),
            urlencoding::encode(redirect_to)
        );

        let response = self
            .request(self.client.post(&url))
            .json(&json!({ "email": email }))
            .send()
            .await?;

        check(response).await?;
        tracing::info!("Password reset requested");
        Ok(())
    }

    pub async fn update_password(&self, access_token: &str, password: &str) -> Result<AuthUser, AuthError> {
        let url = self.endpoint("user");

        let response = self
            .request(self.client.put(&url))
            .bearer_auth(access_token)
            .json(&json!({ "password": password }))
            .send()
            .await?;

        let user: AuthUser = parse(check(response).await?).await?;
        tracing::info!("User {} updated their password", user.id);
        Ok(user)
    }
}

/// Turn a non-2xx answer into `AuthError::Provider` with the provider's wording
async fn check(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = provider_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Auth request failed").to_string());

    tracing::warn!("Auth provider returned {}: {}", status, message);
    Err(AuthError::Provider {
        status: status.as_u16(),
        message,
    })
}

async fn parse<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, AuthError> {
    let body: Value = response.json().await?;
    serde_json::from_value(body).map_err(|e| AuthError::InvalidResponse(e.to_string()))
}

/// The provider's error text, from whichever field this endpoint uses
fn provider_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|field| json.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

fn sign_up_outcome(body: Value) -> Result<SignUpOutcome, AuthError> {
    if body.get("access_token").is_some() {
        let session: Session = serde_json::from_value(body)
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        return Ok(SignUpOutcome {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }

    let user_json = body.get("user").cloned().unwrap_or(body);
    let user: AuthUser = serde_json::from_value(user_json)
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    Ok(SignUpOutcome {
        user: Some(user),
        session: None,
    })
}
