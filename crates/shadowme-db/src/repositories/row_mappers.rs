//! Row-to-domain conversions.

use chrono::NaiveDate;
use shadowme_core::{DailyProgress, RepositoryError};
use sqlx::Row;

/// Date column format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn storage(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn non_negative(value: i64, column: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Serialization(format!("{column} out of range: {value}")))
}

pub fn row_to_progress(row: &sqlx::sqlite::SqliteRow) -> Result<DailyProgress, RepositoryError> {
    let date: String = row.try_get("date").map_err(storage)?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| RepositoryError::Serialization(format!("invalid date '{date}': {e}")))?;

    let scores: String = row.try_get("accuracy_scores").map_err(storage)?;
    let accuracy_scores: Vec<f64> = serde_json::from_str(&scores)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

    Ok(DailyProgress {
        user_id: row.try_get("user_id").map_err(storage)?,
        date,
        practice_seconds: non_negative(
            row.try_get("practice_seconds").map_err(storage)?,
            "practice_seconds",
        )?,
        lessons_completed: non_negative(
            row.try_get("lessons_completed").map_err(storage)?,
            "lessons_completed",
        )?,
        total_sessions: non_negative(
            row.try_get("total_sessions").map_err(storage)?,
            "total_sessions",
        )?,
        accuracy_scores,
        average_accuracy: row.try_get("average_accuracy").map_err(storage)?,
        goal_achieved: row.try_get("goal_achieved").map_err(storage)?,
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
