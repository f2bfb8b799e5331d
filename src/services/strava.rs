// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for listing athlete activities.
//!
//! Handles:
//! - Activity list requests bounded by `after`/`before`
//! - Status and `Retry-After` extraction for the retry layer
//! - Pass-through of fields the tracker does not model

use crate::models::Activity;
use crate::services::history::{PageError, PageRequest, PageTransport};
use reqwest::header::RETRY_AFTER;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.strava.com/api/v3";

/// Strava API client.
#[derive(Debug, Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for StravaClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl StravaClient {
    /// Create a client against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the athlete's activities in `[after, before)`.
    ///
    /// Strava returns each page newest-first.
    pub async fn list_activities(
        &self,
        access_token: &str,
        request: PageRequest,
    ) -> Result<Vec<Activity>, PageError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let mut query = vec![("per_page", request.per_page.to_string())];
        if let Some(before) = request.before {
            query.push(("before", before.to_string()));
        }
        if let Some(after) = request.after {
            query.push(("after", after.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| PageError::Network(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json(
        &self,
        response: reqwest::Response,
    ) -> Result<Vec<Activity>, PageError> {
        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!(retry_after = ?retry_after, "Strava rate limit hit (429)");
            }

            return Err(PageError::Status {
                status: status.as_u16(),
                retry_after,
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PageError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| PageError::Decode(e.to_string()))
    }
}

impl PageTransport for StravaClient {
    async fn fetch_page(
        &self,
        access_token: &str,
        request: PageRequest,
    ) -> Result<Vec<Activity>, PageError> {
        self.list_activities(access_token, request).await
    }
}

/// `Retry-After` as a delay. Only the delta-seconds form is understood.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
