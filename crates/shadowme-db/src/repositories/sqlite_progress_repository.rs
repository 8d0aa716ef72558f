//! `SQLite` implementation of the `ProgressRepository` trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use shadowme_core::{DailyProgress, ProgressRepository, RepositoryError};

use super::row_mappers::{format_date, row_to_progress};

const SELECT_COLUMNS: &str = "user_id, date, practice_seconds, lessons_completed, \
     total_sessions, accuracy_scores, average_accuracy, goal_achieved";

/// `SQLite` implementation of the `ProgressRepository` trait.
///
/// One row per `(user_id, date)`; accuracy scores are stored as a JSON array.
pub struct SqliteProgressRepository {
    pool: SqlitePool,
}

impl SqliteProgressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepository for SqliteProgressRepository {
    async fn get(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyProgress>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM daily_progress WHERE user_id = ? AND date = ?"
        ))
        .bind(user_id)
        .bind(format_date(date))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        row.as_ref().map(row_to_progress).transpose()
    }

    async fn upsert(&self, progress: &DailyProgress) -> Result<(), RepositoryError> {
        let scores = serde_json::to_string(&progress.accuracy_scores)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        sqlx::query(
            r#"
            INSERT INTO daily_progress (
                user_id, date, practice_seconds, lessons_completed, total_sessions,
                accuracy_scores, average_accuracy, goal_achieved, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, date) DO UPDATE SET
                practice_seconds = excluded.practice_seconds,
                lessons_completed = excluded.lessons_completed,
                total_sessions = excluded.total_sessions,
                accuracy_scores = excluded.accuracy_scores,
                average_accuracy = excluded.average_accuracy,
                goal_achieved = excluded.goal_achieved,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&progress.user_id)
        .bind(format_date(progress.date))
        .bind(i64::from(progress.practice_seconds))
        .bind(i64::from(progress.lessons_completed))
        .bind(i64::from(progress.total_sessions))
        .bind(&scores)
        .bind(progress.average_accuracy)
        .bind(progress.goal_achieved)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyProgress>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM daily_progress \
             WHERE user_id = ? AND date >= ? AND date <= ? ORDER BY date ASC"
        ))
        .bind(user_id)
        .bind(format_date(from))
        .bind(format_date(to))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_progress).collect()
    }
}
