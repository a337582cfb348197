//! Shared request quotas for sources that draw on one rate-limited resource.
//!
//! Several [`ThrottledSource`] wrappers can share a [`SharedQuota`] (for
//! example, adapters that go through the same outbound HTTP client). When the
//! quota is spent the wrapper fails fast with `RateLimited`; it never waits
//! or retries.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use tracing::debug;

use crate::data_source::{SourceAdapter, SourceError, SourceFuture};
use crate::Ticker;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Request budget shared by any number of wrapped sources.
#[derive(Clone)]
pub struct SharedQuota {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl SharedQuota {
    /// Allows `quota_limit` requests per `quota_window`, all available as a burst.
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(
                quota_window,
                quota_limit,
            ))),
            clock: DefaultClock::default(),
        }
    }

    /// Takes one request slot, or returns how long until the next one frees up.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}

/// Wraps a source so each fetch first takes a slot from a shared quota.
pub struct ThrottledSource<S> {
    inner: S,
    quota: SharedQuota,
}

impl<S> ThrottledSource<S> {
    pub fn new(inner: S, quota: SharedQuota) -> Self {
        Self { inner, quota }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: SourceAdapter> SourceAdapter for ThrottledSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a> {
        if let Err(wait) = self.quota.try_acquire() {
            let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
            debug!(source = self.inner.name(), wait_ms, "request quota exhausted");
            return Box::pin(async move {
                Err(SourceError::rate_limited(format!(
                    "shared request quota exhausted; next slot in {wait_ms} ms"
                )))
            });
        }
        self.inner.fetch(ticker)
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let burst = NonZeroU32::new(quota_limit.max(1)).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(burst.get())).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
