//! Daily practice progress.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Practice time needed for the daily goal (15 minutes).
pub const DAILY_GOAL_SECONDS: u32 = 15 * 60;

/// One completed practice session, as reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    pub practice_seconds: u32,
    #[serde(default = "default_lessons")]
    pub lessons_completed: u32,
    #[serde(default)]
    pub accuracy: f64,
}

const fn default_lessons() -> u32 {
    1
}

/// Aggregated progress for one user on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub user_id: String,
    pub date: NaiveDate,
    pub practice_seconds: u32,
    pub lessons_completed: u32,
    pub total_sessions: u32,
    pub accuracy_scores: Vec<f64>,
    pub average_accuracy: f64,
    pub goal_achieved: bool,
}

impl DailyProgress {
    /// A zeroed record for a day with no practice.
    pub fn empty(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            practice_seconds: 0,
            lessons_completed: 0,
            total_sessions: 0,
            accuracy_scores: Vec::new(),
            average_accuracy: 0.0,
            goal_achieved: false,
        }
    }

    /// Fold one practice session into the day's totals.
    pub fn apply(&mut self, record: &PracticeRecord) {
        self.practice_seconds = self.practice_seconds.saturating_add(record.practice_seconds);
        self.lessons_completed = self.lessons_completed.saturating_add(record.lessons_completed);
        self.total_sessions = self.total_sessions.saturating_add(1);
        self.accuracy_scores.push(record.accuracy);
        self.average_accuracy = round2(mean(&self.accuracy_scores));
        self.goal_achieved = self.practice_seconds >= DAILY_GOAL_SECONDS;
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_empty_record_is_zeroed() {
        let progress = DailyProgress::empty("u1", day());
        assert_eq!(progress.total_sessions, 0);
        assert!(progress.accuracy_scores.is_empty());
        assert!(!progress.goal_achieved);
    }

    #[test]
    fn test_apply_accumulates_and_averages() {
        let mut progress = DailyProgress::empty("u1", day());
        progress.apply(&PracticeRecord {
            practice_seconds: 300,
            lessons_completed: 1,
            accuracy: 80.0,
        });
        progress.apply(&PracticeRecord {
            practice_seconds: 200,
            lessons_completed: 2,
            accuracy: 85.5,
        });

        assert_eq!(progress.practice_seconds, 500);
        assert_eq!(progress.lessons_completed, 3);
        assert_eq!(progress.total_sessions, 2);
        assert_eq!(progress.accuracy_scores, vec![80.0, 85.5]);
        assert!((progress.average_accuracy - 82.75).abs() < f64::EPSILON);
        assert!(!progress.goal_achieved);
    }

    #[test]
    fn test_goal_reached_at_fifteen_minutes() {
        let mut progress = DailyProgress::empty("u1", day());
        progress.apply(&PracticeRecord {
            practice_seconds: DAILY_GOAL_SECONDS,
            lessons_completed: 1,
            accuracy: 90.0,
        });
        assert!(progress.goal_achieved);
    }

    #[test]
    fn test_average_rounds_to_two_decimals() {
        let mut progress = DailyProgress::empty("u1", day());
        for accuracy in [70.0, 80.0, 81.0] {
            progress.apply(&PracticeRecord {
                practice_seconds: 60,
                lessons_completed: 1,
                accuracy,
            });
        }
        assert!((progress.average_accuracy - 77.0).abs() < f64::EPSILON);
    }
}
