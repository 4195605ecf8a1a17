//! RFC 1123 date parsing/formatting and the integer-second duration math
//! freshness calculations are built from (spec.md §2 `DateParser`, §6).
//!
//! The teacher parses/formats dates with `time::OffsetDateTime` and the
//! well-known `Rfc2822` format description, which is close to RFC 1123 but
//! not pinned to the `GMT` zone designator spec.md §6 requires verbatim
//! (`EEE, dd MMM yyyy HH:mm:ss zzz` with `GMT`). `httpdate` — already a
//! dependency of the full-cache siblings in this family
//! (`06chaynes-http-cache`, `matt-phylum-http-cache`) for exactly this
//! purpose — produces that exact format, so this module is a thin,
//! named wrapper around it rather than a reimplementation.

use std::time::SystemTime;

/// Parses an RFC 1123 (`Date`/`Expires`/`Last-Modified`/`If-Modified-Since`)
/// header value. Returns `None` on any malformed input — per spec.md §4.4,
/// callers should treat an invalid `Expires` as "already expired" rather
/// than propagating a parse error.
#[must_use]
pub fn parse(value: &str) -> Option<SystemTime> {
    httpdate::parse_http_date(value.trim()).ok()
}

/// Formats a `SystemTime` as an RFC 1123 date string with a `GMT` zone
/// designator, e.g. `"Tue, 15 Nov 1994 08:12:31 GMT"`.
#[must_use]
pub fn format(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}

/// `max(0, now - served)`, in whole seconds, per spec.md §4.4.
#[must_use]
pub fn age_seconds(now: SystemTime, served: SystemTime) -> i64 {
    now.duration_since(served).map(|d| d.as_secs() as i64).unwrap_or(0)
}
