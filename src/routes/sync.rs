// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync route: pull history from Strava into the activity store.

use crate::error::{AppError, Result};
use crate::services::history::{ProgressEvent, ProgressSink, TracingProgress};
use crate::services::FetchOptions;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/sync", post(sync_activities))
}

/// Optional sync range (epoch seconds) and page size.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    pub after: Option<i64>,
    pub before: Option<i64>,
    pub per_page: Option<u32>,
}

impl From<SyncRequest> for FetchOptions {
    fn from(req: SyncRequest) -> Self {
        FetchOptions {
            after: req.after,
            before: req.before,
            per_page: req.per_page,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncResponse {
    /// Activities returned by Strava
    pub fetched: usize,
    /// Activities in the store after the sync
    pub total: usize,
    /// Chunks requested
    pub chunks: u32,
    pub progress: Vec<ProgressEvent>,
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Fetch the athlete's history from Strava and store it.
///
/// The caller passes their Strava access token as a bearer token. Nothing is
/// stored unless every chunk succeeds.
async fn sync_activities(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<SyncRequest>>,
) -> Result<Json<SyncResponse>> {
    let access_token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    tracing::info!(
        after = ?request.after,
        before = ?request.before,
        per_page = ?request.per_page,
        "Starting Strava sync"
    );

    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut sink = |event: ProgressEvent| {
        TracingProgress.on_progress(event.clone());
        events.push(event);
    };

    let activities = state
        .fetcher
        .fetch_with_progress(access_token, request.into(), &mut sink)
        .await?;

    let saved = state.db.upsert_activities(&activities);
    let chunks = events.last().map(|e| e.total_chunks).unwrap_or(0);

    tracing::info!(fetched = activities.len(), saved, chunks, "Strava sync complete");

    Ok(Json(SyncResponse {
        fetched: activities.len(),
        total: state.db.count(),
        chunks,
        progress: events,
    }))
}
