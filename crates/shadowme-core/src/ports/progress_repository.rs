//! Progress repository trait definition.
//!
//! This port defines the interface for persisting daily practice progress.
//! Implementations must handle all storage details internally.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::RepositoryError;
use crate::domain::DailyProgress;

/// Repository for per-user, per-day progress records.
///
/// Records are keyed by `(user_id, date)`; at most one exists per key.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Get the record for one day, if any practice was recorded.
    async fn get(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyProgress>, RepositoryError>;

    /// Insert the record, or replace the existing one for the same key.
    async fn upsert(&self, progress: &DailyProgress) -> Result<(), RepositoryError>;

    /// Records in `from..=to`, ordered by date ascending. Days without
    /// practice are omitted.
    async fn range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyProgress>, RepositoryError>;
}
