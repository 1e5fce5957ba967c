//! Server-reported request quota tracking.
//!
//! The service reports its quota in `X-RateLimit-*` response headers and
//! signals throttling with HTTP 429 plus `Retry-After`. The state here is
//! purely what the server last said; nothing is decremented locally.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

/// Safety margin added on top of the server-reported reset instant.
pub const RESET_BUFFER: Duration = Duration::from_millis(500);

/// The most recently observed request quota.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// Requests allowed per window.
    pub limit: Option<u32>,
    /// Requests left before the window resets.
    pub remaining: Option<u32>,
    /// When the window resets.
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitState {
    /// Fold the rate-limit headers of one response into the state.
    ///
    /// Each field is taken when its header is present and parseable;
    /// absent or malformed headers leave the previous observation alone.
    /// Header names are expected lowercased, as the transport delivers
    /// them.
    pub fn update_from_headers(&mut self, headers: &HashMap<String, String>) {
        if let Some(limit) = parse_header_u32(headers, "x-ratelimit-limit") {
            self.limit = Some(limit);
        }
        if let Some(remaining) = parse_header_u32(headers, "x-ratelimit-remaining") {
            self.remaining = Some(remaining);
        }
        if let Some(reset) = parse_header_u64(headers, "x-ratelimit-reset") {
            if let Some(at) = Utc.timestamp_opt(reset as i64, 0).single() {
                self.reset_at = Some(at);
            }
        }
    }

    /// How long a caller must hold off before the next request, if the
    /// quota is spent and the window has not reset yet. Includes the
    /// safety buffer.
    pub fn required_wait(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.remaining != Some(0) {
            return None;
        }
        let reset_at = self.reset_at?;
        if reset_at <= now {
            return None;
        }
        let until_reset = (reset_at - now).to_std().ok()?;
        Some(until_reset + RESET_BUFFER)
    }
}

/// `Retry-After` delay from a throttled response, if one was given.
pub(crate) fn retry_after(headers: &HashMap<String, String>) -> Option<Duration> {
    parse_header_u64(headers, "retry-after").map(Duration::from_secs)
}

fn parse_header_u32(headers: &HashMap<String, String>, key: &str) -> Option<u32> {
    headers.get(key).and_then(|v| v.trim().parse().ok())
}

fn parse_header_u64(headers: &HashMap<String, String>, key: &str) -> Option<u64> {
    headers.get(key).and_then(|v| v.trim().parse().ok())
}
