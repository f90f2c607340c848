//! Reactive rate limiting for the Postman API
//!
//! The limiter stays dormant until the API answers 429 once. From then on
//! every call waits for a permit, keeping the client under Postman's
//! documented 300 requests per minute.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;

/// 300 requests per minute
pub const REQUESTS_PER_SECOND: u32 = 5;

/// Rate limiter that only gates calls after activation.
pub struct ReactiveLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
}

impl Default for ReactiveLimiter {
    fn default() -> Self {
        Self::new(REQUESTS_PER_SECOND)
    }
}

impl ReactiveLimiter {
    pub fn new(per_second: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::direct(quota),
            active: AtomicBool::new(false),
        }
    }

    /// Start gating calls (called on 429).
    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Rate limiting activated ({} req/s)", REQUESTS_PER_SECOND);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for a permit if rate limiting is active.
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            self.limiter.until_ready().await;
        }
    }
}
