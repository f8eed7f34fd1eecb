//! Rate-limit headers of a single response.
//!
//! GitHub reports its quota on every response through `X-RateLimit-*`
//! headers. Only the current response matters: the executor reacts to an
//! exhausted quota and keeps no memory across requests.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, SystemTime};
//! use reqwest::header::HeaderMap;
//! use ghfetch_core::api::rate_limit::{RateLimitState, wait_until_reset};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
//! headers.insert("x-ratelimit-reset", "1700000060".parse().unwrap());
//!
//! let state = RateLimitState::from_headers(&headers);
//! assert!(state.is_exhausted());
//!
//! let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
//! assert_eq!(wait_until_reset(1_700_000_060, now), Some(Duration::from_secs(60)));
//! ```

use std::time::{Duration, SystemTime};

use reqwest::header::HeaderMap;

/// Requests left in the current window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Epoch second at which the window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Window size.
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Requests consumed in the current window.
pub const RATE_LIMIT_USED_HEADER: &str = "x-ratelimit-used";

/// Latest reset accepted, 9999-12-31T23:59:59Z. Anything later cannot be
/// represented as an HTTP date and is treated as unusable.
pub const MAX_RESET_EPOCH: u64 = 253_402_300_799;

/// Quota as reported by one response. Absent or unparseable headers read
/// as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitState {
    /// `X-RateLimit-Remaining`.
    pub remaining: Option<u64>,
    /// `X-RateLimit-Reset`, seconds since the Unix epoch.
    pub reset_epoch: Option<u64>,
    /// `X-RateLimit-Limit`.
    pub limit: Option<u64>,
    /// `X-RateLimit-Used`.
    pub used: Option<u64>,
}

impl RateLimitState {
    /// Reads the rate-limit headers. Lookups are case-insensitive.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: header_u64(headers, RATE_LIMIT_REMAINING_HEADER),
            reset_epoch: header_u64(headers, RATE_LIMIT_RESET_HEADER),
            limit: header_u64(headers, RATE_LIMIT_LIMIT_HEADER),
            used: header_u64(headers, RATE_LIMIT_USED_HEADER),
        }
    }

    /// Whether the server says no requests are left.
    ///
    /// False when the remaining header is absent, so a plain permission
    /// 403 is never mistaken for exhaustion.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Instant the window resets, when known and no later than
    /// [`MAX_RESET_EPOCH`].
    #[must_use]
    pub fn reset_at(&self) -> Option<SystemTime> {
        self.reset_epoch.and_then(epoch_to_system_time)
    }
}

/// How long to wait from `now` until `reset_epoch`; zero if already past.
///
/// Returns `None` when `reset_epoch` is beyond [`MAX_RESET_EPOCH`].
#[must_use]
pub fn wait_until_reset(reset_epoch: u64, now: SystemTime) -> Option<Duration> {
    let reset_at = epoch_to_system_time(reset_epoch)?;
    Some(reset_at.duration_since(now).unwrap_or(Duration::ZERO))
}

fn epoch_to_system_time(secs: u64) -> Option<SystemTime> {
    if secs > MAX_RESET_EPOCH {
        return None;
    }
    SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(secs))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
