//! Sliding-window rate limits backed by storage.
//!
//! Check and record are two separate calls by contract: a burst of
//! concurrent requests can each pass `allow` before any `record` lands.
//! Accepted race; callers must not merge the two into one step.

use std::time::Duration;

use time::OffsetDateTime;

use crate::error::AppError;
use crate::storage::Kv;
use crate::util::unix_ms;

/// A named limit: at most `max` events per identity inside the trailing
/// `window`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub key_prefix: &'static str,
    pub max: usize,
    pub window: Duration,
    /// Policies that only run with real persistence. On the file backend
    /// they always allow and record nothing.
    pub durable_only: bool,
}

/// Login links: 5 per hour per email, enforced on both backends.
pub const LOGIN: RateLimitPolicy = RateLimitPolicy {
    key_prefix: "login-ratelimit",
    max: 5,
    window: Duration::from_secs(60 * 60),
    durable_only: false,
};

/// Comment posts: 10 per hour per email, durable backend only.
pub const COMMENT: RateLimitPolicy = RateLimitPolicy {
    key_prefix: "comment-ratelimit",
    max: 10,
    window: Duration::from_secs(60 * 60),
    durable_only: true,
};

impl RateLimitPolicy {
    fn key(&self, identity: &str) -> String {
        format!("{}:{}", self.key_prefix, identity)
    }

    fn cutoff(&self, now: OffsetDateTime) -> i64 {
        unix_ms(now) - self.window.as_millis() as i64
    }
}

fn live_count(stamps: &[i64], cutoff: i64) -> usize {
    stamps.iter().filter(|&&t| t > cutoff).count()
}

/// Whether another event for `identity` is still within the limit.
pub async fn allow(
    kv: &Kv,
    policy: &RateLimitPolicy,
    identity: &str,
    now: OffsetDateTime,
) -> Result<bool, AppError> {
    if policy.durable_only && !kv.is_durable() {
        return Ok(true);
    }
    let stamps: Vec<i64> = kv.get_json(&policy.key(identity)).await?.unwrap_or_default();
    Ok(live_count(&stamps, policy.cutoff(now)) < policy.max)
}

/// Record an event: append the timestamp, prune everything outside the
/// window and persist with TTL ≈ window so abandoned identities expire.
pub async fn record(
    kv: &Kv,
    policy: &RateLimitPolicy,
    identity: &str,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    if policy.durable_only && !kv.is_durable() {
        return Ok(());
    }
    let key = policy.key(identity);
    let cutoff = policy.cutoff(now);
    let mut stamps: Vec<i64> = kv.get_json(&key).await?.unwrap_or_default();
    stamps.retain(|&t| t > cutoff);
    stamps.push(unix_ms(now));
    kv.set_json(&key, &stamps, Some(policy.window)).await
}
