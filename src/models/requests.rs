use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::domain::{
    Availability, Coordinates, FitnessLevel, MatchStatus, MatchingPreferences, OpeningHours,
    PriceRange, ProfileLocation,
};
use crate::models::validation::{validate_coordinates, validate_radius, validate_urls};

/// Request to add a gym to the directory
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGymRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(custom(function = "validate_coordinates"))]
    pub location: Coordinates,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub hours: OpeningHours,
    #[serde(default)]
    #[validate(custom(function = "validate_urls"))]
    pub images: Vec<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    pub price_range: Option<PriceRange>,
}

/// Partial gym update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_gym_update"))]
pub struct UpdateGymRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: Option<String>,
    pub location: Option<Coordinates>,
    pub amenities: Option<Vec<String>>,
    pub hours: Option<OpeningHours>,
    pub images: Option<Vec<String>>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    pub price_range: Option<PriceRange>,
}

fn validate_gym_update(update: &UpdateGymRequest) -> Result<(), ValidationError> {
    if let Some(location) = &update.location {
        validate_coordinates(location)?;
    }
    if let Some(images) = &update.images {
        validate_urls(images)?;
    }
    Ok(())
}

/// Gym directory search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_gym_search"))]
pub struct GymSearchRequest {
    pub query: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub price_range: Vec<PriceRange>,
}

impl GymSearchRequest {
    pub fn origin(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Trimmed text query, `None` when blank
    pub fn text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

fn validate_gym_search(search: &GymSearchRequest) -> Result<(), ValidationError> {
    validate_coordinates(&search.origin())?;
    validate_radius(search.radius)
}

/// Query string for `GET /gyms/nearby`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_nearby"))]
pub struct NearbyGymsQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: Option<f64>,
}

impl NearbyGymsQuery {
    pub fn origin(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

fn validate_nearby(query: &NearbyGymsQuery) -> Result<(), ValidationError> {
    validate_coordinates(&query.origin())?;
    match query.radius {
        Some(radius) => validate_radius(radius),
        None => Ok(()),
    }
}

fn default_radius_km() -> f64 {
    10.0
}

/// Profile creation for the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub bio: Option<String>,
    #[validate(range(min = 13, max = 120))]
    pub age: Option<u8>,
    #[serde(default)]
    pub fitness_level: FitnessLevel,
    #[serde(default)]
    pub workout_preferences: Vec<String>,
    #[serde(default)]
    pub availability: Availability,
    #[validate(url)]
    pub profile_image: Option<String>,
    pub location: Option<ProfileLocation>,
    pub gym_id: Option<Uuid>,
    #[serde(default)]
    pub preferences: MatchingPreferences,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    pub bio: Option<String>,
    #[validate(range(min = 13, max = 120))]
    pub age: Option<u8>,
    pub fitness_level: Option<FitnessLevel>,
    pub workout_preferences: Option<Vec<String>>,
    pub availability: Option<Availability>,
    #[validate(url)]
    pub profile_image: Option<String>,
    pub location: Option<ProfileLocation>,
    pub gym_id: Option<Uuid>,
    pub preferences: Option<MatchingPreferences>,
}

/// Link the caller's profile to a gym
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGymRequest {
    pub gym_id: Uuid,
}

/// Query string for `GET /profiles`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileListQuery {
    pub gym_id: Option<Uuid>,
}

/// Query string for `GET /profiles/me/partners`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindPartnersQuery {
    pub limit: Option<u16>,
}

/// Ask another member to work out together
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub partner_id: Uuid,
    pub gym_id: Uuid,
    #[validate(length(min = 1))]
    pub workout_type: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

/// Statuses a match can be moved to once requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatusUpdate {
    Accepted,
    Declined,
    Completed,
}

impl From<MatchStatusUpdate> for MatchStatus {
    fn from(value: MatchStatusUpdate) -> Self {
        match value {
            MatchStatusUpdate::Accepted => MatchStatus::Accepted,
            MatchStatusUpdate::Declined => MatchStatus::Declined,
            MatchStatusUpdate::Completed => MatchStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchRequest {
    pub status: Option<MatchStatusUpdate>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Filters for listing a member's matches
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_match_filter"))]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    pub gym_id: Option<Uuid>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

fn validate_match_filter(filter: &MatchFilter) -> Result<(), ValidationError> {
    match (filter.date_from, filter.date_to) {
        (Some(from), Some(to)) if from > to => {
            let mut err = ValidationError::new("date_range");
            err.message = Some("dateFrom must not be after dateTo".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(must_match(other = "password", message = "Passwords don't match"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}
