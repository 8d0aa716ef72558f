//! Progress handlers - daily practice tracking per user.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::Deserialize;

use shadowme_core::{DailyProgress, PracticeRecord};

use crate::dto::WeeklyProgressResponse;
use crate::error::HttpError;
use crate::state::AppState;

/// Optional `?date=YYYY-MM-DD`; defaults to today (UTC).
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

impl DateQuery {
    fn resolve(&self, state: &AppState) -> NaiveDate {
        self.date.unwrap_or_else(|| state.clock.now().date_naive())
    }
}

/// `POST /api/progress/{user_id}`
pub async fn record(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<DateQuery>,
    Json(req): Json<PracticeRecord>,
) -> Result<Json<DailyProgress>, HttpError> {
    let date = query.resolve(&state);
    Ok(Json(
        state.progress.record_practice(&user_id, date, &req).await?,
    ))
}

/// `GET /api/progress/{user_id}/daily`
pub async fn daily(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailyProgress>, HttpError> {
    let date = query.resolve(&state);
    Ok(Json(state.progress.daily(&user_id, date).await?))
}

/// `GET /api/progress/{user_id}/weekly`
pub async fn weekly(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<WeeklyProgressResponse>, HttpError> {
    let today = state.clock.now().date_naive();
    let days = state.progress.weekly(&user_id, today).await?;
    Ok(Json(WeeklyProgressResponse::new(user_id, days)))
}
