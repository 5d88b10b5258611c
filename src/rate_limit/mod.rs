//! Client-side rate limiting learned from `429` responses
//!
//! The service tells the client how long to back off through `Retry-After` (or
//! `X-Retry-After`). The limiter remembers the end of that window so calls made
//! inside it can be rejected without a round trip.
//!
//! The window end only ever moves forward. A `429` that arrives while a window is
//! already open is not a new rate-limit condition, so a burst of concurrent
//! throttled responses cannot stretch the window past what any one of them asked for.

use reqwest::header::HeaderMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use crate::config::FALLBACK_BACKOFF;

/// Status code the service uses to signal throttling
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Retry headers in priority order
const RETRY_HEADERS: [&str; 2] = ["retry-after", "x-retry-after"];

/// Rate-limit window shared by every call of one service instance
#[derive(Debug)]
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    /// Window end in nanoseconds on `clock`; zero means never limited
    limited_until_nanos: AtomicU64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Limiter on the monotonic system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock::new()))
    }

    /// Limiter on a caller-supplied clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            limited_until_nanos: AtomicU64::new(0),
        }
    }

    fn now_nanos(&self) -> u64 {
        duration_to_nanos(self.clock.now())
    }

    fn until_nanos(&self) -> u64 {
        self.limited_until_nanos.load(Ordering::Acquire)
    }

    /// Whether calls should currently be rejected locally
    pub fn is_rate_limited(&self) -> bool {
        self.now_nanos() < self.until_nanos()
    }

    /// Time left in the current window, zero when not limited
    pub fn retry_after(&self) -> Duration {
        let now = self.now_nanos();
        Duration::from_nanos(self.until_nanos().saturating_sub(now))
    }

    /// Whether a response with `status` should open a new window
    pub fn is_rate_limit_condition(&self, status: u16) -> bool {
        status == TOO_MANY_REQUESTS && !self.is_rate_limited()
    }

    /// Open a window from the response headers
    ///
    /// Duration source: `Retry-After`, then `X-Retry-After`, then [`FALLBACK_BACKOFF`].
    /// A header whose value is not a non-negative number of seconds is skipped.
    pub fn record_rate_limit(&self, headers: &HeaderMap) -> Duration {
        let backoff = retry_duration(headers);
        let until = self.now_nanos().saturating_add(duration_to_nanos(backoff));
        let previous = self.limited_until_nanos.fetch_max(until, Ordering::AcqRel);

        if previous > until {
            debug!(
                "Rate-limit window already ends later, keeping it ({} ms remaining)",
                self.retry_after().as_millis()
            );
        } else {
            warn!(
                backoff_ms = backoff.as_millis(),
                "Rate limited by service, rejecting calls locally until the window ends"
            );
        }

        backoff
    }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn retry_duration(headers: &HeaderMap) -> Duration {
    RETRY_HEADERS
        .iter()
        .find_map(|name| {
            let value = headers.get(*name)?.to_str().ok()?;
            parse_retry_seconds(value)
        })
        .unwrap_or(FALLBACK_BACKOFF)
}

fn parse_retry_seconds(value: &str) -> Option<Duration> {
    let seconds = value.trim().parse::<f64>().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}
