//! Progress service - daily practice tracking.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};

use crate::domain::{DailyProgress, PracticeRecord};
use crate::ports::{CoreError, ProgressRepository};

/// Days covered by the weekly view, today included.
pub const WEEK_DAYS: u64 = 7;

/// Service for recording and reading practice progress.
pub struct ProgressService {
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self { repo }
    }

    /// Merge one practice session into the user's record for `date`.
    pub async fn record_practice(
        &self,
        user_id: &str,
        date: NaiveDate,
        record: &PracticeRecord,
    ) -> Result<DailyProgress, CoreError> {
        validate_user(user_id)?;
        if !record.accuracy.is_finite() || !(0.0..=100.0).contains(&record.accuracy) {
            return Err(CoreError::Validation(format!(
                "Accuracy must be between 0 and 100, got {}",
                record.accuracy
            )));
        }

        let mut progress = self
            .repo
            .get(user_id, date)
            .await?
            .unwrap_or_else(|| DailyProgress::empty(user_id, date));
        progress.apply(record);
        self.repo.upsert(&progress).await?;
        Ok(progress)
    }

    /// The user's record for `date`, zeroed when nothing was recorded.
    pub async fn daily(&self, user_id: &str, date: NaiveDate) -> Result<DailyProgress, CoreError> {
        validate_user(user_id)?;
        Ok(self
            .repo
            .get(user_id, date)
            .await?
            .unwrap_or_else(|| DailyProgress::empty(user_id, date)))
    }

    /// Seven records ending on `today`, oldest first, gaps zeroed.
    pub async fn weekly(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<DailyProgress>, CoreError> {
        validate_user(user_id)?;
        let from = today
            .checked_sub_days(Days::new(WEEK_DAYS - 1))
            .ok_or_else(|| CoreError::Validation(format!("Date out of range: {today}")))?;

        let mut recorded: HashMap<NaiveDate, DailyProgress> = self
            .repo
            .range(user_id, from, today)
            .await?
            .into_iter()
            .map(|progress| (progress.date, progress))
            .collect();

        Ok(from
            .iter_days()
            .take_while(|date| *date <= today)
            .map(|date| {
                recorded
                    .remove(&date)
                    .unwrap_or_else(|| DailyProgress::empty(user_id, date))
            })
            .collect())
    }
}

fn validate_user(user_id: &str) -> Result<(), CoreError> {
    if user_id.trim().is_empty() {
        return Err(CoreError::Validation("User id is required".to_string()));
    }
    Ok(())
}
