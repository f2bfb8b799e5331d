// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for stored activities and challenge stats.

use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityBatch, ChallengeWindow, Stats, Streak};
use crate::services::StreakAnalyzer;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(get_activities).post(save_activities))
        .route("/api/activities/by-date", get(get_activities_by_date))
        .route("/api/stats", get(get_stats))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Only activities whose name ends with this (e.g. "Reps")
    name_suffix: Option<String>,
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub results: Vec<Activity>,
    pub total: usize,
}

/// List stored activities, newest first.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivitiesQuery>,
) -> Json<ActivitiesResponse> {
    let results = match params.name_suffix.as_deref() {
        Some(suffix) if !suffix.is_empty() => state.db.list_by_name_suffix(suffix),
        _ => state.db.list_activities(),
    };

    tracing::debug!(
        name_suffix = ?params.name_suffix,
        count = results.len(),
        "Listing activities"
    );

    Json(ActivitiesResponse {
        total: results.len(),
        results,
    })
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SaveActivitiesResponse {
    pub saved: usize,
    pub total: usize,
}

/// Insert or update a batch of activities.
async fn save_activities(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<ActivityBatch>,
) -> Result<Json<SaveActivitiesResponse>> {
    if batch.activities.is_empty() {
        return Err(AppError::BadRequest("No activities to save".to_string()));
    }

    let saved = state.db.upsert_activities(&batch.activities);
    tracing::info!(saved, "Activities saved");

    Ok(Json(SaveActivitiesResponse {
        saved,
        total: state.db.count(),
    }))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct WindowQuery {
    /// Window start (YYYY-MM-DD); defaults to the configured challenge
    from: Option<NaiveDate>,
    /// Window end (YYYY-MM-DD); defaults to the configured challenge
    to: Option<NaiveDate>,
}

impl WindowQuery {
    fn window_or(&self, default: ChallengeWindow) -> ChallengeWindow {
        ChallengeWindow {
            from: self.from.unwrap_or(default.from),
            to: self.to.unwrap_or(default.to),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsResponse {
    pub window: ChallengeWindow,
    pub stats: Stats,
    pub streaks: Vec<Streak>,
    /// Distinct active days, oldest first
    #[cfg_attr(feature = "binding-generation", ts(type = "string[]"))]
    pub active_dates: Vec<NaiveDate>,
}

/// Streak statistics over the challenge window, in the server's local zone.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<StatsResponse>> {
    let window = params.window_or(state.config.challenge);
    let activities = state.db.list_activities();

    let report = StreakAnalyzer::new(Local).analyze(&activities, window, &Local::now())?;

    tracing::debug!(
        from = %window.from,
        to = %window.to,
        longest_streak = report.stats.longest_streak,
        skipped_days = report.stats.skipped_days,
        "Computed challenge stats"
    );

    Ok(Json(StatsResponse {
        window: report.window,
        stats: report.stats,
        streaks: report.streaks,
        active_dates: report.active_dates.iter().collect(),
    }))
}

/// Activity count per local day, optionally limited to a date range.
async fn get_activities_by_date(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<BTreeMap<NaiveDate, u32>>> {
    let activities = state.db.list_activities();
    let mut grouped = StreakAnalyzer::new(Local).grouped_by_date(&activities)?;

    if let Some(from) = params.from {
        grouped.retain(|date, _| *date >= from);
    }
    if let Some(to) = params.to {
        grouped.retain(|date, _| *date <= to);
    }

    Ok(Json(grouped))
}
