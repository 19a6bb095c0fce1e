//! Bounded-duration retry with classification-driven delays
//!
//! Fixed delays, no jitter, and a wall-clock budget instead of an attempt
//! count. A rate-limited attempt always waits at least the long delay the
//! remote service documents for that condition.

use crate::classify::{ErrorKind, RemoteError};
use crate::error::Error;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Minimum safe interval after HTTP 429, per the remote service's rate-limit guidance
pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(30);

// Floor for every computed delay.
const MIN_DELAY: Duration = Duration::from_millis(1);

/// Which failures a policy retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retryable {
    /// Retry every failure until the budget runs out
    Always,
    /// Single attempt
    Never,
    Kinds(&'static [ErrorKind]),
}

impl Retryable {
    /// Rate limits, propagation conflicts, and 5xx responses
    pub const TRANSIENT: Self = Self::Kinds(&[
        ErrorKind::RateLimited,
        ErrorKind::Conflict,
        ErrorKind::TransientServer,
    ]);

    pub const RATE_LIMITED: Self = Self::Kinds(&[ErrorKind::RateLimited]);

    pub fn allows(&self, kind: ErrorKind) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

/// How the generic delay evolves between attempts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backoff {
    #[default]
    Fixed,
    /// Double the delay after every retry, capped at `max`
    Exponential { max: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wall-clock budget across all attempts
    pub max_duration: Duration,
    pub delay: Duration,
    /// Delay after a rate-limited attempt; never scaled by `backoff`
    pub rate_limit_delay: Duration,
    pub retryable: Retryable,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_duration: Duration) -> Self {
        Self {
            max_duration,
            delay: DEFAULT_DELAY,
            rate_limit_delay: RATE_LIMIT_DELAY,
            retryable: Retryable::Always,
            backoff: Backoff::Fixed,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn once() -> Self {
        Self::new(Duration::ZERO).with_retryable(Retryable::Never)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    pub fn with_retryable(mut self, retryable: Retryable) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay before retry number `retry` (zero-based) after a failure of `kind`.
    pub fn delay_for(&self, kind: ErrorKind, retry_after: Option<Duration>, retry: u32) -> Duration {
        let delay = match kind {
            ErrorKind::RateLimited => match retry_after {
                Some(hint) => hint.max(self.rate_limit_delay),
                None => self.rate_limit_delay,
            },
            _ => match self.backoff {
                Backoff::Fixed => self.delay,
                Backoff::Exponential { max } => self
                    .delay
                    .saturating_mul(2u32.saturating_pow(retry))
                    .min(max.max(self.delay)),
            },
        };
        delay.max(MIN_DELAY)
    }
}

/// Failure types the controller can reason about
pub trait Classified: Display {
    fn kind(&self) -> ErrorKind;

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl Classified for RemoteError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }
}

impl Classified for Error {
    fn kind(&self) -> ErrorKind {
        Error::kind(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        Error::retry_after(self)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the next
/// retry would start after `policy.max_duration` has elapsed.
///
/// The last error is always returned unchanged; nothing is swallowed.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Classified,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let kind = err.kind();
        if !policy.retryable.allows(kind) {
            tracing::debug!(attempt, %kind, error = %err, "Not retrying");
            return Err(err);
        }

        let delay = policy.delay_for(kind, err.retry_after(), attempt - 1);
        let elapsed = start.elapsed();
        // A huge Retry-After hint must not overflow the deadline check.
        if elapsed
            .checked_add(delay)
            .is_none_or(|resume| resume > policy.max_duration)
        {
            tracing::warn!(
                attempt,
                ?elapsed,
                max_duration = ?policy.max_duration,
                error = %err,
                "Giving up: retry budget exhausted"
            );
            return Err(err);
        }

        tracing::debug!(attempt, %kind, ?delay, ?elapsed, "Retrying after delay");
        tokio::time::sleep(delay).await;
    }
}
