use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{MatchFilter, MatchRequest, MatchStatus, UpdateMatchRequest, WorkoutMatch};
use crate::services::postgres::{PostgresClient, PostgresError};

const MATCH_COLUMNS: &str = "id, user_id, partner_id, gym_id, status, scheduled_at, workout_type, \
                             notes, created_at, updated_at";

impl PostgresClient {
    /// Record a pending request from `user_id`; the message is kept as notes
    pub async fn create_match(
        &self,
        user_id: Uuid,
        request: &MatchRequest,
    ) -> Result<WorkoutMatch, PostgresError> {
        if user_id == request.partner_id {
            return Err(PostgresError::InvalidInput(
                "Cannot request a workout with yourself".to_string(),
            ));
        }

        let query = format!(
            r#"
            INSERT INTO matches (user_id, partner_id, gym_id, status, scheduled_at, workout_type, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );

        let created: WorkoutMatch = sqlx::query_as(&query)
            .bind(user_id)
            .bind(request.partner_id)
            .bind(request.gym_id)
            .bind(MatchStatus::Pending)
            .bind(request.scheduled_at)
            .bind(request.workout_type.as_deref())
            .bind(request.message.as_deref())
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            "Match {} requested: {} -> {} at gym {}",
            created.id,
            user_id,
            request.partner_id,
            request.gym_id
        );

        Ok(created)
    }

    pub async fn get_match(&self, id: Uuid) -> Result<Option<WorkoutMatch>, PostgresError> {
        let query = format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS);

        let found = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found)
    }

    /// Apply the supplied fields only
    pub async fn update_match(
        &self,
        id: Uuid,
        update: &UpdateMatchRequest,
    ) -> Result<WorkoutMatch, PostgresError> {
        let query = format!(
            r#"
            UPDATE matches SET
                status = COALESCE($2, status),
                scheduled_at = COALESCE($3, scheduled_at),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );

        let updated: Option<WorkoutMatch> = sqlx::query_as(&query)
            .bind(id)
            .bind(update.status.map(MatchStatus::from))
            .bind(update.scheduled_at)
            .bind(update.notes.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| PostgresError::NotFound(format!("Match {} not found", id)))
    }

    /// Matches where `member` is requester or partner, newest first
    pub async fn list_matches(
        &self,
        member: Uuid,
        filter: &MatchFilter,
    ) -> Result<Vec<WorkoutMatch>, PostgresError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM matches WHERE (user_id = ", MATCH_COLUMNS));
        builder
            .push_bind(member)
            .push(" OR partner_id = ")
            .push_bind(member)
            .push(")");

        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(gym_id) = filter.gym_id {
            builder.push(" AND gym_id = ").push_bind(gym_id);
        }
        if let Some(from) = filter.date_from {
            builder.push(" AND scheduled_at >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            builder.push(" AND scheduled_at <= ").push_bind(to);
        }

        builder.push(" ORDER BY created_at DESC");

        let matches: Vec<WorkoutMatch> = builder.build_query_as().fetch_all(&self.pool).await?;

        tracing::debug!("Member {} has {} matching workouts", member, matches.len());
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_self_request_rejected_before_query() {
        let client = PostgresClient::connect_lazy("postgres://localhost:1/unused").unwrap();
        let me = Uuid::new_v4();
        let request = MatchRequest {
            partner_id: me,
            gym_id: Uuid::new_v4(),
            workout_type: None,
            scheduled_at: None,
            message: None,
        };

        let err = client.create_match(me, &request).await.unwrap_err();
        assert!(matches!(err, PostgresError::InvalidInput(_)));
    }
}
