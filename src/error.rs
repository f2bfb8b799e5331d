// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::history::{FetchError, FetchFailure};
use crate::services::streak::StreakError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Streak(#[from] StreakError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The Strava access token was rejected.
    pub fn is_strava_token_error(&self) -> bool {
        matches!(self, AppError::Fetch(e) if e.is_auth_error())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = Some(self.to_string());
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Streak(StreakError::NoActivities) => {
                (StatusCode::NOT_FOUND, "no_activities", details)
            }
            AppError::Streak(StreakError::InvalidWindow { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_window", details)
            }
            AppError::Streak(StreakError::InvalidActivity { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_activity", details)
            }
            AppError::Fetch(FetchError::InvalidWindow { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_window", details)
            }
            AppError::Fetch(FetchError::Chunk { cause, .. }) => {
                let (status, code) = match cause {
                    FetchFailure::Unauthorized(_) => {
                        (StatusCode::UNAUTHORIZED, "strava_unauthorized")
                    }
                    FetchFailure::RateLimited => {
                        (StatusCode::SERVICE_UNAVAILABLE, "strava_rate_limited")
                    }
                    _ => (StatusCode::BAD_GATEWAY, "strava_error"),
                };
                tracing::warn!(error = %self, "Strava fetch failed");
                (status, code, details)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
