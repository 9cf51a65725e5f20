use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{
    Availability, CreateProfileRequest, FitnessLevel, GymSummary, MatchingPreferences, Profile,
    ProfileLocation, UpdateProfileRequest,
};
use crate::services::postgres::{PostgresClient, PostgresError};

/// Profile columns plus the linked gym's summary
const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.email, p.name, p.bio, p.age, p.fitness_level, p.workout_preferences,
           p.availability, p.profile_image, p.location, p.preferences,
           p.created_at, p.updated_at,
           g.id AS gym_id, g.name AS gym_name, g.address AS gym_address
    FROM profiles p
    LEFT JOIN gyms g ON g.id = p.gym_id
"#;

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    name: String,
    bio: Option<String>,
    age: Option<i16>,
    fitness_level: FitnessLevel,
    workout_preferences: Vec<String>,
    availability: Option<Json<Availability>>,
    profile_image: Option<String>,
    location: Option<Json<ProfileLocation>>,
    preferences: Option<Json<MatchingPreferences>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    gym_id: Option<Uuid>,
    gym_name: Option<String>,
    gym_address: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        let gym = match (row.gym_id, row.gym_name, row.gym_address) {
            (Some(id), Some(name), Some(address)) => Some(GymSummary { id, name, address }),
            _ => None,
        };

        Profile {
            id: row.id,
            email: row.email,
            name: row.name,
            bio: row.bio,
            age: row.age.and_then(|a| u8::try_from(a).ok()),
            fitness_level: row.fitness_level,
            workout_preferences: row.workout_preferences,
            availability: row.availability.map(|a| a.0).unwrap_or_default(),
            profile_image: row.profile_image,
            location: row.location.map(|l| l.0),
            gym,
            preferences: row.preferences.map(|p| p.0).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresClient {
    /// Fetch one profile with its gym resolved; a missing id is `Ok(None)`
    pub async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, PostgresError> {
        let query = format!("{} WHERE p.id = $1", PROFILE_SELECT);

        let row: Option<ProfileRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Profile::from))
    }

    /// All profiles, or only the members of `gym_id`
    pub async fn list_profiles(&self, gym_id: Option<Uuid>) -> Result<Vec<Profile>, PostgresError> {
        let query = format!(
            "{} WHERE ($1::uuid IS NULL OR p.gym_id = $1) ORDER BY p.created_at",
            PROFILE_SELECT
        );

        let rows: Vec<ProfileRow> = sqlx::query_as(&query)
            .bind(gym_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    /// Members of `gym_id` other than `exclude_user_id`
    pub async fn search_profiles(
        &self,
        gym_id: Uuid,
        exclude_user_id: Uuid,
    ) -> Result<Vec<Profile>, PostgresError> {
        let query = format!("{} WHERE p.gym_id = $1 AND p.id <> $2", PROFILE_SELECT);

        let rows: Vec<ProfileRow> = sqlx::query_as(&query)
            .bind(gym_id)
            .bind(exclude_user_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Gym {} has {} other members", gym_id, rows.len());
        Ok(rows.into_iter().map(Profile::from).collect())
    }

    /// Create the profile for auth user `id`
    pub async fn create_profile(
        &self,
        id: Uuid,
        input: &CreateProfileRequest,
    ) -> Result<Profile, PostgresError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, name, bio, age, fitness_level, workout_preferences,
                                  availability, profile_image, location, gym_id, preferences)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(id)
        .bind(&input.email)
        .bind(&input.name)
        .bind(input.bio.as_deref())
        .bind(input.age.map(i16::from))
        .bind(input.fitness_level)
        .bind(&input.workout_preferences)
        .bind(Json(input.availability))
        .bind(input.profile_image.as_deref())
        .bind(input.location.clone().map(Json))
        .bind(input.gym_id)
        .bind(Json(input.preferences.clone()))
        .execute(&self.pool)
        .await?;

        tracing::info!("Created profile {}", id);

        self.get_profile(id)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("Profile {} not found", id)))
    }

    /// Apply the supplied fields only
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Profile, PostgresError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                age = COALESCE($4, age),
                fitness_level = COALESCE($5, fitness_level),
                workout_preferences = COALESCE($6, workout_preferences),
                availability = COALESCE($7, availability),
                profile_image = COALESCE($8, profile_image),
                location = COALESCE($9, location),
                gym_id = COALESCE($10, gym_id),
                preferences = COALESCE($11, preferences),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.bio.as_deref())
        .bind(update.age.map(i16::from))
        .bind(update.fitness_level)
        .bind(update.workout_preferences.as_ref())
        .bind(update.availability.map(Json))
        .bind(update.profile_image.as_deref())
        .bind(update.location.clone().map(Json))
        .bind(update.gym_id)
        .bind(update.preferences.clone().map(Json))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PostgresError::NotFound(format!("Profile {} not found", id)));
        }

        self.get_profile(id)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("Profile {} not found", id)))
    }

    /// Link a profile to a gym; an unknown gym is rejected by the foreign key
    pub async fn set_profile_gym(&self, id: Uuid, gym_id: Uuid) -> Result<Profile, PostgresError> {
        let update = UpdateProfileRequest {
            gym_id: Some(gym_id),
            ..Default::default()
        };
        let profile = self.update_profile(id, &update).await?;

        tracing::info!("Profile {} joined gym {}", id, gym_id);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            email: "jo@example.com".to_string(),
            name: "Jo".to_string(),
            bio: None,
            age: Some(34),
            fitness_level: FitnessLevel::Advanced,
            workout_preferences: vec!["cycling".to_string()],
            availability: None,
            profile_image: None,
            location: None,
            preferences: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            gym_id: None,
            gym_name: None,
            gym_address: None,
        }
    }

    #[test]
    fn test_missing_json_columns_use_defaults() {
        let profile = Profile::from(row());
        assert_eq!(profile.preferences, MatchingPreferences::default());
        assert_eq!(profile.availability, Availability::default());
        assert!(profile.gym.is_none());
        assert_eq!(profile.age, Some(34));
    }

    #[test]
    fn test_joined_gym_becomes_summary() {
        let gym_id = Uuid::new_v4();
        let mut r = row();
        r.gym_id = Some(gym_id);
        r.gym_name = Some("PureGym Leeds".to_string());
        r.gym_address = Some("The Headrow".to_string());

        let profile = Profile::from(r);
        assert_eq!(profile.gym_id(), Some(gym_id));
        assert_eq!(profile.gym.map(|g| g.name), Some("PureGym Leeds".to_string()));
    }
}
