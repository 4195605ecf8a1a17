//! Age and freshness-lifetime arithmetic, reshaped from `age`/`max_age`/
//! `time_to_live`/`is_stale`-style methods into a free function returning a
//! plain value type, since `Entry` itself stays free of any
//! cache-control-aware behavior.

use crate::cache_control::CacheControl;
use crate::clock::Clock;
use crate::config::CacheOptions;
use crate::date;
use crate::entry::Entry;
use std::time::SystemTime;

/// The result of evaluating one entry's freshness at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    /// Seconds since the response was served, per the RFC 2616 §13.2.3 age
    /// algorithm's `Date`-header-or-receipt-time basis.
    pub age_seconds: i64,
    /// Seconds the response may be served without revalidation, from
    /// `max-age`/`Expires`/heuristic computation.
    pub lifetime_seconds: i64,
    /// Whether `lifetime_seconds` came from the 10% heuristic rather than an
    /// explicit `max-age`/`Expires`.
    pub is_heuristic: bool,
}

impl Freshness {
    /// `age < lifetime`, strict inequality: an entry exactly at its lifetime
    /// boundary is stale.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.age_seconds < self.lifetime_seconds
    }

    /// How far past its lifetime the entry is, `0` if still fresh.
    #[must_use]
    pub fn stale_seconds(&self) -> i64 {
        (self.age_seconds - self.lifetime_seconds).max(0)
    }

    /// Whether the heuristic-computed lifetime exceeded the configured
    /// warning threshold (the 24h `Warning: 113` rule).
    #[must_use]
    pub fn needs_heuristic_warning(&self, options: &CacheOptions) -> bool {
        self.is_heuristic && self.lifetime_seconds as u64 > options.heuristic_warning_threshold.as_secs()
    }
}

/// Computes [`Freshness`] for `entry` as of `clock.now()`, given the entry's
/// own response-side `Cache-Control` directives. `s-maxage` is parsed but
/// never contributes to freshness here — only to `Authorization` gating (see
/// `CacheOptions`'s design notes).
#[must_use]
pub fn calculate(entry: &Entry, response_cc: &CacheControl, options: &CacheOptions, clock: &dyn Clock) -> Freshness {
    let now = clock.now();
    let served = served_time(entry);
    let age_seconds = date::age_seconds(now, served);
    let (lifetime_seconds, is_heuristic) = lifetime(entry, response_cc, served, options);
    Freshness { age_seconds, lifetime_seconds, is_heuristic }
}

/// The `served` instant an entry's age is measured from: its own `Date`
/// header if present and parseable, else the instant it was received.
fn served_time(entry: &Entry) -> SystemTime {
    entry
        .response_headers()
        .get_str("date")
        .and_then(date::parse)
        .unwrap_or_else(|| entry.response_time())
}

fn lifetime(entry: &Entry, cc: &CacheControl, served: SystemTime, options: &CacheOptions) -> (i64, bool) {
    if let Some(max_age) = cc.max_age() {
        return (max_age.max(0), false);
    }

    if let Some(expires) = entry.response_headers().get_str("expires").and_then(date::parse) {
        let seconds = expires.duration_since(served).map(|d| d.as_secs() as i64).unwrap_or(0);
        return (seconds, false);
    }

    // The 10% heuristic only fires for URIs without a query string; a
    // query-string URI with only `Last-Modified` (no `max-age`/`Expires`)
    // falls through to the immediately-stale default below.
    if !entry.uri().contains('?') {
        if let Some(last_modified) = entry.response_headers().get_str("last-modified").and_then(date::parse) {
            if let Ok(age_at_serve) = served.duration_since(last_modified) {
                let heuristic = (age_at_serve.as_secs() as f64 * options.heuristic_fraction) as i64;
                return (heuristic.max(0), true);
            }
        }
    }

    // No explicit lifetime and no `Last-Modified` to heuristically derive
    // one from: treat the entry as already stale.
    (0, true)
}
