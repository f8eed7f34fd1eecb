//! Rate-limit aware request execution.
//!
//! [`RateLimitedExecutor`] sends one logical request, possibly as several
//! physical attempts. It is an explicit state machine:
//!
//! ```text
//! Sending ──2xx──────────────────────────────▶ Done
//!    │  ──403 + X-RateLimit-Remaining: 0 ──▶ WaitingForReset ──sleep──▶ Sending
//!    │  ──any other status─────────────────▶ Failed(Http)
//!    └──transport failure──────────────────▶ Failed(Transport | Timeout)
//! ```
//!
//! Waiting is unbounded in count: each wait ends at the reset instant the
//! server announced, after which the identical request is sent again.
//! Errors other than quota exhaustion are never retried.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, error, info, instrument, warn};

use super::clock::{Clock, SystemClock};
use super::error::{ApiError, body_preview};
use super::rate_limit::{RateLimitState, wait_until_reset};
use super::request::{ApiRequest, ApiResponse};
use super::transport::Transport;

/// Where one logical request currently stands.
#[derive(Debug)]
pub enum ExecutionState {
    /// About to send attempt number `attempt` (1-indexed).
    Sending {
        /// Physical attempt about to be made.
        attempt: u32,
    },
    /// Quota exhausted; suspend for `wait`, then send again.
    WaitingForReset {
        /// Attempt that hit the exhausted quota.
        attempt: u32,
        /// How long to suspend.
        wait: Duration,
        /// Instant the server said the quota resets.
        reset_at: SystemTime,
    },
    /// A 2xx response arrived.
    Done(ApiResponse),
    /// A terminal failure.
    Failed(ApiError),
}

impl ExecutionState {
    /// Whether the machine has stopped.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

/// Wraps a [`Transport`] and absorbs rate-limit exhaustion.
///
/// Holds no per-request state, so one executor can be shared by any number
/// of concurrent callers; each call waits out exhaustion on its own.
#[derive(Clone)]
pub struct RateLimitedExecutor {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RateLimitedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedExecutor").finish_non_exhaustive()
    }
}

impl RateLimitedExecutor {
    /// Creates an executor using the wall clock.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_clock(transport, Arc::new(SystemClock))
    }

    /// Creates an executor with an explicit clock.
    #[must_use]
    pub fn with_clock(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self { transport, clock }
    }

    /// Sends `request` until it succeeds or fails terminally.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] / [`ApiError::Timeout`] if an exchange
    ///   could not complete (not retried)
    /// - [`ApiError::Http`] for any non-2xx status other than quota exhaustion
    #[instrument(skip(self, request), fields(url = %request.url()))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        debug!(query = ?request.query(), "executing request");
        let mut state = ExecutionState::Sending { attempt: 1 };

        loop {
            state = match state {
                ExecutionState::Sending { attempt } => {
                    debug!(attempt, "sending");
                    match self.transport.send(request).await {
                        Ok(response) => {
                            Self::transition(request, response, attempt, self.clock.now())
                        }
                        Err(e) => {
                            error!(url = %request.url(), error = %e, "request failed");
                            ExecutionState::Failed(e)
                        }
                    }
                }
                ExecutionState::WaitingForReset { attempt, wait, .. } => {
                    self.clock.sleep(wait).await;
                    ExecutionState::Sending {
                        attempt: attempt + 1,
                    }
                }
                ExecutionState::Done(response) => return Ok(response),
                ExecutionState::Failed(e) => return Err(e),
            };
        }
    }

    /// Classifies the response to attempt `attempt`.
    ///
    /// Pure apart from logging: given the same response and `now`, it always
    /// yields the same next state.
    #[must_use]
    pub fn transition(
        request: &ApiRequest,
        response: ApiResponse,
        attempt: u32,
        now: SystemTime,
    ) -> ExecutionState {
        let rate_limit = RateLimitState::from_headers(&response.headers);

        if response.is_success() {
            info!(
                url = %request.url(),
                status = response.status,
                attempt,
                "request succeeded"
            );
            debug!(
                remaining = ?rate_limit.remaining,
                limit = ?rate_limit.limit,
                "rate limit quota"
            );
            return ExecutionState::Done(response);
        }

        if response.status == 403 && rate_limit.is_exhausted() {
            if let (Some(reset_at), Some(wait)) = (
                rate_limit.reset_at(),
                rate_limit
                    .reset_epoch
                    .and_then(|reset_epoch| wait_until_reset(reset_epoch, now)),
            ) {
                warn!(
                    url = %request.url(),
                    attempt,
                    wait_secs = wait.as_secs_f64(),
                    reset_at = %httpdate::fmt_http_date(reset_at),
                    "rate limit reached, sleeping until reset"
                );
                return ExecutionState::WaitingForReset {
                    attempt,
                    wait,
                    reset_at,
                };
            }
            warn!(
                url = %request.url(),
                "rate limit exhausted without a usable reset header"
            );
        }

        let body = response.body_text();
        error!(
            url = %request.url(),
            status = response.status,
            body = %body_preview(&body),
            "API error"
        );
        ExecutionState::Failed(ApiError::http(request.url(), response.status, body))
    }
}
