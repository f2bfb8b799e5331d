// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use challenge_tracker::error::AppError;
use challenge_tracker::services::history::{FetchError, FetchFailure};
use challenge_tracker::services::StreakError;
use chrono::NaiveDate;

fn chunk_error(cause: FetchFailure) -> AppError {
    AppError::Fetch(FetchError::Chunk {
        chunk: 2,
        total_chunks: 4,
        cause,
    })
}

#[test]
fn test_is_strava_token_error_matches() {
    assert!(chunk_error(FetchFailure::Unauthorized(401)).is_strava_token_error());
    assert!(chunk_error(FetchFailure::Unauthorized(403)).is_strava_token_error());
}

#[test]
fn test_is_strava_token_error_no_match() {
    assert!(!chunk_error(FetchFailure::RateLimited).is_strava_token_error());
    assert!(!chunk_error(FetchFailure::Server(500)).is_strava_token_error());
    assert!(!AppError::Unauthorized.is_strava_token_error());
    assert!(!AppError::BadRequest("Bad Request".to_string()).is_strava_token_error());
}

#[test]
fn test_status_codes() {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (
            AppError::BadRequest("nope".to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (
            AppError::Streak(StreakError::NoActivities),
            StatusCode::NOT_FOUND,
        ),
        (
            AppError::Streak(StreakError::InvalidWindow { from: day, to: day }),
            StatusCode::BAD_REQUEST,
        ),
        (
            AppError::Streak(StreakError::InvalidActivity {
                id: 1,
                start_date: "bogus".to_string(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (
            AppError::Fetch(FetchError::InvalidWindow {
                after: 10,
                before: 5,
            }),
            StatusCode::BAD_REQUEST,
        ),
        (
            chunk_error(FetchFailure::Unauthorized(401)),
            StatusCode::UNAUTHORIZED,
        ),
        (
            chunk_error(FetchFailure::RateLimited),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (chunk_error(FetchFailure::Server(502)), StatusCode::BAD_GATEWAY),
        (
            chunk_error(FetchFailure::Network("reset".to_string())),
            StatusCode::BAD_GATEWAY,
        ),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        let label = err.to_string();
        assert_eq!(err.into_response().status(), expected, "{}", label);
    }
}

#[test]
fn test_chunk_error_message_names_the_chunk() {
    let err = chunk_error(FetchFailure::RateLimited);
    assert_eq!(
        err.to_string(),
        "Failed to fetch activities (chunk 2 of 4): Rate limit exceeded. Please try again later."
    );
}
