// ABOUTME: Questionnaire storage layer using SQLite
// ABOUTME: One questionnaire per user, upserted on every submission

use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Questionnaire, QuestionnaireInput};
use lumora_core::{generate_id, ChangeEvent};
use lumora_storage::StorageError;

pub struct QuestionnaireStorage {
    pool: SqlitePool,
}

impl QuestionnaireStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace the user's questionnaire answers.
    ///
    /// Emits `QuestionnaireSaved` so the dispatcher can recompute which
    /// articles the user should now see.
    pub async fn upsert_for_user(
        &self,
        user_id: &str,
        input: QuestionnaireInput,
    ) -> Result<(Questionnaire, ChangeEvent), StorageError> {
        let user_exists = sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .is_some();

        if !user_exists {
            return Err(StorageError::NotFound(format!("User {}", user_id)));
        }

        let existing = sqlx::query("SELECT id FROM questionnaires WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;
        let created = existing.is_none();

        let questionnaire_id = generate_id("qst");
        debug!(
            "Saving questionnaire for user: {} (created: {})",
            user_id, created
        );

        let row = sqlx::query(
            r#"
            INSERT INTO questionnaires (
                id, user_id, age_bracket, gender, skin_goal, feeling,
                taking_pill, menstruating, sleep_hours, stress_level
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                age_bracket = excluded.age_bracket,
                gender = excluded.gender,
                skin_goal = excluded.skin_goal,
                feeling = excluded.feeling,
                taking_pill = excluded.taking_pill,
                menstruating = excluded.menstruating,
                sleep_hours = excluded.sleep_hours,
                stress_level = excluded.stress_level,
                updated_at = datetime('now', 'utc')
            RETURNING *
            "#,
        )
        .bind(&questionnaire_id)
        .bind(user_id)
        .bind(input.age_bracket)
        .bind(input.gender)
        .bind(input.skin_goal)
        .bind(input.feeling)
        .bind(input.taking_pill)
        .bind(input.menstruating)
        .bind(input.sleep_hours)
        .bind(input.stress_level)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let questionnaire = row_to_questionnaire(&row)?;
        let event = ChangeEvent::QuestionnaireSaved {
            user_id: user_id.to_string(),
            created,
        };

        Ok((questionnaire, event))
    }

    pub async fn get_for_user(&self, user_id: &str) -> Result<Option<Questionnaire>, StorageError> {
        let row = sqlx::query("SELECT * FROM questionnaires WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_questionnaire).transpose()
    }

    /// Every stored questionnaire, for full-audience recomputation.
    pub async fn list_all(&self) -> Result<Vec<Questionnaire>, StorageError> {
        let rows = sqlx::query("SELECT * FROM questionnaires")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_questionnaire).collect()
    }
}

fn row_to_questionnaire(row: &sqlx::sqlite::SqliteRow) -> Result<Questionnaire, StorageError> {
    Ok(Questionnaire {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        age_bracket: row.try_get("age_bracket")?,
        gender: row.try_get("gender")?,
        skin_goal: row.try_get("skin_goal")?,
        feeling: row.try_get("feeling")?,
        taking_pill: row.try_get("taking_pill")?,
        menstruating: row.try_get("menstruating")?,
        sleep_hours: row.try_get("sleep_hours")?,
        stress_level: row.try_get("stress_level")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
