// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chunked, retrying retrieval of a full activity history.
//!
//! Strava caps each list request at 200 activities and rate-limits the
//! number of requests, so a long history is pulled as a series of fixed
//! 90-day windows, oldest first and one at a time. Each window is retried on
//! its own budget; any window that cannot be fetched aborts the whole run.

use crate::models::Activity;
use crate::time_utils::{format_epoch, SECONDS_PER_DAY};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Length of one chunk window in seconds (90 days).
pub const CHUNK_DURATION_SECS: i64 = 90 * SECONDS_PER_DAY;

/// Largest page Strava will return.
pub const MAX_PER_PAGE: u32 = 200;

/// Lookback used when only the end of the window is given.
pub const DEFAULT_LOOKBACK_SECS: i64 = 365 * SECONDS_PER_DAY;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

const COLLECTING_MESSAGE: &str = "Collecting activities from Strava...";

// ─── Transport ───────────────────────────────────────────────────────────────

/// One list request: activities in `[after, before)`, at most `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub after: Option<i64>,
    pub before: Option<i64>,
    pub per_page: u32,
}

/// Failure of a single page request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// Non-2xx response.
    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        retry_after: Option<Duration>,
        body: String,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// 2xx response whose body was not a list of activities.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl PageError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            retry_after: None,
            body: body.into(),
        }
    }
}

/// Source of activity pages.
pub trait PageTransport {
    fn fetch_page(
        &self,
        access_token: &str,
        request: PageRequest,
    ) -> impl Future<Output = Result<Vec<Activity>, PageError>> + Send;
}

// ─── Retry state machine ─────────────────────────────────────────────────────

/// Why a chunk could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    #[error("Authentication failed (HTTP {0}). Please reconnect to Strava.")]
    Unauthorized(u16),

    #[error("Invalid request parameters: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Strava server error (HTTP {0}). Please try again later.")]
    Server(u16),

    #[error("Unexpected response (HTTP {status}): {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Protocol(String),
}

impl FetchFailure {
    /// Credential was rejected; the user has to reconnect.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Failure kind that would have been retried had budget remained.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Server(_) | Self::Network(_))
    }
}

/// What to do after one attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Vec<Activity>),
    Retrying(Duration),
    Failed(FetchFailure),
}

/// Per-chunk retry budget and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; attempts run `0..=max_retries`.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Exponential delay for `attempt`: 1s, 2s, 4s, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_secs(1u64 << attempt.min(16))
    }

    /// Classify the result of attempt number `attempt` (0-based).
    pub fn evaluate(
        &self,
        attempt: u32,
        result: Result<Vec<Activity>, PageError>,
    ) -> AttemptOutcome {
        let can_retry = attempt < self.max_retries;

        let error = match result {
            Ok(page) => return AttemptOutcome::Success(page),
            Err(e) => e,
        };

        match error {
            PageError::Status { status, .. } if status == 401 || status == 403 => {
                AttemptOutcome::Failed(FetchFailure::Unauthorized(status))
            }
            PageError::Status { status: 400, body, .. } => {
                AttemptOutcome::Failed(FetchFailure::BadRequest(body))
            }
            PageError::Status {
                status: 429,
                retry_after,
                ..
            } => {
                if can_retry {
                    AttemptOutcome::Retrying(retry_after.unwrap_or_else(|| self.backoff(attempt)))
                } else {
                    AttemptOutcome::Failed(FetchFailure::RateLimited)
                }
            }
            PageError::Status { status, .. } if status >= 500 => {
                if can_retry {
                    AttemptOutcome::Retrying(self.backoff(attempt))
                } else {
                    AttemptOutcome::Failed(FetchFailure::Server(status))
                }
            }
            PageError::Status { status, body, .. } => {
                AttemptOutcome::Failed(FetchFailure::UnexpectedStatus { status, body })
            }
            PageError::Network(msg) => {
                if can_retry {
                    AttemptOutcome::Retrying(self.backoff(attempt))
                } else {
                    AttemptOutcome::Failed(FetchFailure::Network(msg))
                }
            }
            PageError::Decode(msg) => AttemptOutcome::Failed(FetchFailure::Protocol(msg)),
        }
    }
}

// ─── Chunk planning ──────────────────────────────────────────────────────────

/// A half-open window `[after, before)` in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchChunk {
    pub after: i64,
    pub before: i64,
    pub per_page: u32,
}

impl FetchChunk {
    fn request(&self) -> PageRequest {
        PageRequest {
            after: Some(self.after),
            before: Some(self.before),
            per_page: self.per_page,
        }
    }
}

/// Split `[after, before)` into consecutive chunk windows, oldest first.
pub fn plan_chunks(after: i64, before: i64, per_page: u32) -> Vec<FetchChunk> {
    let mut chunks = Vec::new();
    let mut start = after;
    while start < before {
        let end = start.saturating_add(CHUNK_DURATION_SECS).min(before);
        chunks.push(FetchChunk {
            after: start,
            before: end,
            per_page,
        });
        start = end;
    }
    chunks
}

/// Up-front chunk count estimate: `ceil(duration / chunk duration)`.
pub fn estimate_chunks(after: i64, before: i64) -> u32 {
    let duration = before.saturating_sub(after).max(0);
    (duration.div_euclid(CHUNK_DURATION_SECS)
        + i64::from(duration.rem_euclid(CHUNK_DURATION_SECS) != 0)) as u32
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// Progress report emitted during a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressEvent {
    pub current_chunk: u32,
    pub total_chunks: u32,
    pub activities_fetched: usize,
    pub message: String,
}

/// Receiver for progress events. Purely observational.
pub trait ProgressSink {
    fn on_progress(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that ignores everything.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

/// Sink that writes each event to the log.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_progress(&mut self, event: ProgressEvent) {
        tracing::info!(
            current_chunk = event.current_chunk,
            total_chunks = event.total_chunks,
            activities_fetched = event.activities_fetched,
            "{}",
            event.message
        );
    }
}

// ─── Fetcher ─────────────────────────────────────────────────────────────────

/// Requested range and page size. All fields optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Epoch seconds, inclusive lower bound.
    pub after: Option<i64>,
    /// Epoch seconds, exclusive upper bound.
    pub before: Option<i64>,
    pub per_page: Option<u32>,
}

impl FetchOptions {
    pub fn window(after: i64, before: i64) -> Self {
        Self {
            after: Some(after),
            before: Some(before),
            per_page: None,
        }
    }

    fn page_size(&self) -> u32 {
        self.per_page.unwrap_or(MAX_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Fill in a missing bound: `before` defaults to `now`, `after` to a
    /// year before `before`. `None` when neither bound was given.
    pub fn resolve_window(&self, now: i64) -> Option<(i64, i64)> {
        if self.after.is_none() && self.before.is_none() {
            return None;
        }
        let before = self.before.unwrap_or(now);
        let after = self
            .after
            .unwrap_or_else(|| before.saturating_sub(DEFAULT_LOOKBACK_SECS));
        Some((after, before))
    }
}

/// Errors from a history fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid fetch window: after ({after}) is later than before ({before})")]
    InvalidWindow { after: i64, before: i64 },

    #[error("Failed to fetch activities (chunk {chunk} of {total_chunks}): {cause}")]
    Chunk {
        chunk: u32,
        total_chunks: u32,
        #[source]
        cause: FetchFailure,
    },
}

impl FetchError {
    /// The access token was rejected and retrying cannot help.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Chunk { cause, .. } if cause.is_auth())
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Chunk { cause, .. } => Some(cause),
            Self::InvalidWindow { .. } => None,
        }
    }
}

/// Pulls a complete, newest-first activity history through a transport.
#[derive(Debug, Clone)]
pub struct HistoryFetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: PageTransport + Sync> HistoryFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch without progress reporting.
    pub async fn fetch(
        &self,
        access_token: &str,
        options: FetchOptions,
    ) -> Result<Vec<Activity>, FetchError> {
        self.fetch_with_progress(access_token, options, &mut NoProgress)
            .await
    }

    /// Fetch the requested history, reporting progress to `progress`.
    ///
    /// Returns every activity exactly once, newest first, or the first chunk
    /// failure. Never returns a partial list.
    pub async fn fetch_with_progress<P: ProgressSink + Send>(
        &self,
        access_token: &str,
        options: FetchOptions,
        progress: &mut P,
    ) -> Result<Vec<Activity>, FetchError> {
        let per_page = options.page_size();

        let Some((after, before)) = options.resolve_window(Utc::now().timestamp()) else {
            return self.fetch_single(access_token, per_page, progress).await;
        };

        if after > before {
            return Err(FetchError::InvalidWindow { after, before });
        }

        // Chunks always ask for full pages. The caller's page size only
        // applies to the unbounded request.
        let chunks = plan_chunks(after, before, MAX_PER_PAGE);
        let total_chunks = estimate_chunks(after, before);

        tracing::debug!(
            after = %format_epoch(after),
            before = %format_epoch(before),
            days = (before - after) / SECONDS_PER_DAY,
            total_chunks,
            "Planned chunked activity fetch"
        );

        let mut all: Vec<Activity> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();
        let mut chunks_done = 0u32;

        for (index, chunk) in chunks.iter().enumerate() {
            let chunk_number = index as u32 + 1;

            let page = self
                .fetch_chunk(
                    access_token,
                    chunk.request(),
                    chunk_number,
                    total_chunks,
                    all.len(),
                    progress,
                )
                .await
                .map_err(|cause| FetchError::Chunk {
                    chunk: chunk_number,
                    total_chunks,
                    cause,
                })?;

            tracing::info!(
                chunk = chunk_number,
                total_chunks,
                from = %format_epoch(chunk.after),
                to = %format_epoch(chunk.before),
                returned = page.len(),
                "Fetched activity chunk"
            );
            if page.len() >= chunk.per_page as usize {
                tracing::warn!(
                    chunk = chunk_number,
                    returned = page.len(),
                    per_page = chunk.per_page,
                    "Chunk returned a full page; activities may be missing"
                );
            }

            // Older chunks come first but each page is newest-first, so each
            // new page goes in front of everything gathered so far.
            let mut merged: Vec<Activity> = page
                .into_iter()
                .filter(|a| seen.insert(a.id))
                .collect();
            merged.append(&mut all);
            all = merged;
            chunks_done = chunk_number;
        }

        progress.on_progress(ProgressEvent {
            current_chunk: chunks_done,
            total_chunks: chunks_done,
            activities_fetched: all.len(),
            message: format!("Successfully fetched {} activities!", all.len()),
        });

        Ok(all)
    }

    async fn fetch_single<P: ProgressSink + Send>(
        &self,
        access_token: &str,
        per_page: u32,
        progress: &mut P,
    ) -> Result<Vec<Activity>, FetchError> {
        let request = PageRequest {
            after: None,
            before: None,
            per_page,
        };

        let page = self
            .fetch_chunk(access_token, request, 1, 1, 0, progress)
            .await
            .map_err(|cause| FetchError::Chunk {
                chunk: 1,
                total_chunks: 1,
                cause,
            })?;

        let mut seen: HashSet<u64> = HashSet::new();
        let activities: Vec<Activity> = page
            .into_iter()
            .filter(|a| seen.insert(a.id))
            .collect();

        progress.on_progress(ProgressEvent {
            current_chunk: 1,
            total_chunks: 1,
            activities_fetched: activities.len(),
            message: format!("Successfully fetched {} activities!", activities.len()),
        });

        Ok(activities)
    }

    /// Run the retry loop for one chunk. Every attempt sends the same request.
    async fn fetch_chunk<P: ProgressSink + Send>(
        &self,
        access_token: &str,
        request: PageRequest,
        chunk_number: u32,
        total_chunks: u32,
        fetched_so_far: usize,
        progress: &mut P,
    ) -> Result<Vec<Activity>, FetchFailure> {
        let mut attempt = 0;
        loop {
            progress.on_progress(ProgressEvent {
                current_chunk: chunk_number,
                total_chunks,
                activities_fetched: fetched_so_far,
                message: if attempt == 0 {
                    COLLECTING_MESSAGE.to_string()
                } else {
                    format!(
                        "Retrying (attempt {} of {})...",
                        attempt + 1,
                        self.policy.max_retries + 1
                    )
                },
            });

            let result = self.transport.fetch_page(access_token, request).await;

            match self.policy.evaluate(attempt, result) {
                AttemptOutcome::Success(page) => return Ok(page),
                AttemptOutcome::Retrying(delay) => {
                    tracing::warn!(
                        chunk = chunk_number,
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs_f64(),
                        "Chunk request failed, waiting before retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                AttemptOutcome::Failed(failure) => {
                    tracing::warn!(
                        chunk = chunk_number,
                        attempt = attempt + 1,
                        error = %failure,
                        "Chunk request failed"
                    );
                    return Err(failure);
                }
            }
        }
    }
}
