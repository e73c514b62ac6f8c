//! Retry policy for transient failures.
//!
//! Retries happen on 429, 500, 502, 503, 504 and on transport errors, for
//! GET, POST and PUT only. Delays follow an exponential schedule; a numeric
//! `Retry-After` header overrides the schedule, capped at the maximum interval.

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use std::time::Duration;

/// Statuses that are retried transparently.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry count and exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (`N` retries means up to `N + 1` attempts)
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_interval: Duration,

    /// Growth factor between consecutive delays
    pub multiplier: f64,

    /// Upper bound for any single delay
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            initial_interval: Duration::from_secs(1),
            multiplier: 2.0,
            max_interval: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default schedule with the given retry count.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Never retry.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        RETRYABLE_STATUSES.contains(&status.as_u16())
    }

    pub fn is_retryable_method(method: &Method) -> bool {
        matches!(*method, Method::GET | Method::POST | Method::PUT)
    }

    /// Whether another attempt is allowed after `retries_done` retries.
    pub fn allows_retry(&self, method: &Method, retries_done: u32) -> bool {
        Self::is_retryable_method(method) && retries_done < self.max_retries
    }

    /// A fresh delay schedule for one logical request.
    pub(crate) fn schedule(&self) -> RetrySchedule {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_multiplier(self.multiplier)
            .with_max_interval(self.max_interval)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build();

        RetrySchedule {
            backoff,
            max_interval: self.max_interval,
        }
    }

    /// Server-requested delay from a `Retry-After: <seconds>` header.
    pub(crate) fn retry_after(&self, headers: &HeaderMap) -> Option<Duration> {
        let seconds = headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()?;
        Some(Duration::from_secs(seconds).min(self.max_interval))
    }
}

/// Delay generator for the retries of a single request.
pub(crate) struct RetrySchedule {
    backoff: ExponentialBackoff,
    max_interval: Duration,
}

impl RetrySchedule {
    pub(crate) fn next_delay(&mut self) -> Duration {
        self.backoff.next_backoff().unwrap_or(self.max_interval)
    }
}
