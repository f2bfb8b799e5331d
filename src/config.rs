//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use crate::models::ChallengeWindow;
use crate::services::history::DEFAULT_MAX_RETRIES;
use crate::services::strava::DEFAULT_BASE_URL;
use chrono::{Datelike, Local, NaiveDate};
use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Strava API base URL
    pub strava_api_url: String,
    /// Challenge window reported by `/api/stats` unless overridden
    pub challenge: ChallengeWindow,
    /// Retries per chunk when syncing from Strava
    pub fetch_max_retries: u32,
}

impl Config {
    /// Fixed config for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            strava_api_url: "http://127.0.0.1:9/api/v3".to_string(),
            challenge: ChallengeWindow {
                from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
                to: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            },
            fetch_max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let year = Local::now().year();
        let year_window = ChallengeWindow::for_year(year)
            .ok_or_else(|| ConfigError::Invalid("CHALLENGE_FROM", year.to_string()))?;

        let challenge = ChallengeWindow {
            from: date_var("CHALLENGE_FROM")?.unwrap_or(year_window.from),
            to: date_var("CHALLENGE_TO")?.unwrap_or(year_window.to),
        };
        if !challenge.is_valid() {
            return Err(ConfigError::Invalid(
                "CHALLENGE_TO",
                format!("{} is before {}", challenge.to, challenge.from),
            ));
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            strava_api_url: env::var("STRAVA_API_URL")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            challenge,
            fetch_max_retries: match env::var("FETCH_MAX_RETRIES") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("FETCH_MAX_RETRIES", raw))?,
                Err(_) => DEFAULT_MAX_RETRIES,
            },
        })
    }
}

/// Read an optional `YYYY-MM-DD` variable.
fn date_var(name: &'static str) -> Result<Option<NaiveDate>, ConfigError> {
    match env::var(name) {
        Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
