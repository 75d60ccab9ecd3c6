//! Minimum spacing between external calls.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Hands out one permit at a time; a new permit is only granted once
/// `min_interval` has passed since the previous one was released.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_release: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_release: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub async fn acquire(&mut self) -> Permit<'_> {
        if let Some(last) = self.last_release {
            sleep_until(last + self.min_interval).await;
        }
        Permit { limiter: self }
    }
}

/// Held for the duration of one call.
#[derive(Debug)]
pub struct Permit<'a> {
    limiter: &'a mut RateLimiter,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.limiter.last_release = Some(Instant::now());
    }
}
