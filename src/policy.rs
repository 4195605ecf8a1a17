//! Whether to store a response, and what to do with a stored one.
//!
//! Reshaped from `is_storable`/`before_request`/
//! `satisfies_without_revalidation`/`allows_storing_authenticated`-style
//! methods into free functions over this crate's own
//! `HeaderMap`/`CacheControl`/`Entry`/`Store` types.

use crate::cache_control::CacheControl;
use crate::clock::Clock;
use crate::config::CacheOptions;
use crate::entry::Entry;
use crate::freshness;
use crate::header_map::HeaderMap;
use crate::store::Store;
use http::Method;

/// The fixed set of status codes this cache will admit. `206` (Partial
/// Content) is deliberately excluded: range responses are always rejected,
/// since a single whole-body `Entry` per URI has nowhere to record the
/// requested range. 301 is the only redirect status cached; 302–308 are not.
const CACHEABLE_STATUS_CODES: &[u16] = &[200, 203, 300, 301, 410];

/// What a lookup against the `Store` should do next.
#[derive(Debug, Clone)]
pub enum Action {
    /// No usable entry: the caller must fetch from the network.
    Miss,
    /// A stored entry may be returned as-is, without contacting the origin.
    Fresh(Entry),
    /// A stored entry exists but is stale (or its freshness is being
    /// bypassed by `no-cache`/a client precondition); the caller must send a
    /// conditional request carrying the paired `HeaderMap` of conditional
    /// headers before reusing it. Those headers are either the client's own
    /// precondition headers (spec.md §4.3 step 6) or validators synthesized
    /// from the entry's own `ETag`/`Last-Modified` (steps 8/11) — never
    /// both, and the caller doesn't need to know which: the headers are
    /// already the ones to send.
    Revalidate(Entry, HeaderMap),
    /// `only-if-cached` was requested and no usable entry (fresh or
    /// revalidatable within `max-stale`) exists. The caller must fail the
    /// request with a 504 Gateway Timeout rather than going to the network.
    GatewayTimeout,
}

/// Should a response to `method` for `uri`, given the paired request and
/// response headers, ever be written into the `Store`? This governs writer
/// construction, not freshness — an entry can be storable but immediately
/// stale. (Rule 8, the `UseCaches` gate, is enforced by the caller before a
/// writer is ever constructed — see
/// [`CacheFacade::put_for_request`][crate::facade::CacheFacade::put_for_request].)
#[must_use]
pub fn storable(uri: &str, method: &Method, request_headers: &HeaderMap, response_headers: &HeaderMap, options: &CacheOptions) -> bool {
    // Rule 1: only GET responses are cached. Every other method is either
    // not idempotent or not meaningfully cacheable under this spec.
    if *method != Method::GET {
        log::debug!("not storable: method {method} is not GET");
        return false;
    }

    let status = response_headers
        .status_line()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok());

    // Rule 2: the status code must be one of the fixed cacheable codes
    // (exactly 200, 203, 300, 301, 410 — notably not 206, nor any other
    // 3xx/4xx/5xx).
    let Some(status) = status else {
        log::debug!("not storable: no parseable status line");
        return false;
    };
    if !CACHEABLE_STATUS_CODES.contains(&status) {
        log::debug!("not storable: status {status} is not in the cacheable set");
        return false;
    }

    let request_cc = CacheControl::parse(request_headers);
    let response_cc = CacheControl::parse(response_headers);

    // Rule 3: an explicit `no-store` on either side forbids storage outright.
    if request_cc.no_store() || response_cc.no_store() {
        log::debug!("not storable: no-store present");
        return false;
    }

    // Rule 4: a response carrying `Vary` can't be represented by this
    // store's single-entry-per-URI model, so it is never cached
    // (reject-all-variants).
    if response_headers.contains("vary") {
        log::debug!("not storable: response carries Vary");
        return false;
    }

    // Rule 5: a response to a request that carried `Authorization` is
    // storable only if the response explicitly opts back in. A private,
    // single-user cache can turn this gate off entirely.
    if options.gate_authenticated_responses && request_headers.contains("authorization") {
        let opted_in = response_cc.public() || response_cc.must_revalidate() || response_cc.s_maxage().is_some();
        if !opted_in {
            log::debug!("not storable: authenticated request without public/must-revalidate/s-maxage");
            return false;
        }
    }

    // Rule 6: `Content-Range` without a successful whole-body status means
    // this is a partial representation, which (per rule 2 already excluding
    // 206) should already be unreachable, but is checked explicitly in case
    // an origin sends `Content-Range` on a 200.
    if response_headers.contains("content-range") {
        log::debug!("not storable: response carries Content-Range");
        return false;
    }

    // Rule 7: a `Content-Location` that names a different URI than the one
    // being stored against advertises an alternate representation this
    // store has no way to key on, so the response is not stored at all (not
    // even retroactively under the `Content-Location` URI).
    if let Some(content_location) = response_headers.get_str("content-location") {
        if content_location != uri {
            log::debug!("not storable: Content-Location {content_location} differs from request URI {uri}");
            return false;
        }
    }

    // Rule 8 (UseCaches) is enforced by the caller, not here — see the
    // doc comment above.
    true
}

/// The request-side headers a client uses to supply its own precondition
/// (spec.md §4.3 step 6).
const CLIENT_PRECONDITION_HEADERS: &[&str] = &["if-modified-since", "if-none-match", "if-match", "if-unmodified-since", "if-range"];

/// Decide what a `get` for `uri`/`method`/`request_headers` should do against
/// `store`, as of `clock.now()`. `secure` records whether this request is
/// being made over `https` — an entry whose `tls_metadata` doesn't agree with
/// that is never served (spec.md §3, §4.3 step 4), evaluated before
/// freshness/staleness is even considered.
#[must_use]
pub fn lookup(
    uri: &str,
    method: &Method,
    request_headers: &HeaderMap,
    store: &Store,
    options: &CacheOptions,
    clock: &dyn Clock,
    secure: bool,
) -> Action {
    let request_cc = CacheControl::parse(request_headers);
    let only_if_cached = request_cc.only_if_cached();

    // Step 1: this store only ever serves GET.
    if *method != Method::GET {
        log::trace!("lookup {uri}: non-GET method, step 1");
        return if only_if_cached { Action::GatewayTimeout } else { Action::Miss };
    }

    let Some(entry) = store.lookup(uri) else {
        log::trace!("lookup {uri}: no stored entry, step 1");
        return if only_if_cached { Action::GatewayTimeout } else { Action::Miss };
    };

    // Step 4: a TLS-originated entry is never handed back out over a
    // non-secure connection. Unconditional `Miss` — not a demotion to
    // `Revalidate` — and evaluated ahead of every freshness/staleness rule
    // below, per spec.md §4.3's own step ordering.
    if entry.tls_metadata().is_some() && !secure {
        log::trace!("lookup {uri}: TLS-originated entry requested over a non-secure connection, step 4");
        return Action::Miss;
    }

    // Step 5: an explicit request-side `no-store` makes the entry invisible
    // to this lookup, exactly as if nothing were stored.
    if request_cc.no_store() {
        log::trace!("lookup {uri}: request no-store, treating entry as absent, step 5");
        return if only_if_cached { Action::GatewayTimeout } else { Action::Miss };
    }

    // Step 6: the client supplied its own precondition headers. Pass the
    // entry straight through as `Revalidate` carrying the client's own
    // conditions — the stored entry's validators are suppressed, and
    // freshness isn't even consulted.
    if let Some(client_conditions) = client_precondition_headers(request_headers) {
        log::trace!("lookup {uri}: client supplied its own precondition, revalidating with it, step 6");
        return if only_if_cached { Action::GatewayTimeout } else { Action::Revalidate(entry, client_conditions) };
    }

    // Step 8: an explicit `no-cache` (request or response side) always
    // forces revalidation, no matter how fresh the entry is.
    let response_cc = CacheControl::parse(entry.response_headers());
    if request_cc.no_cache() || response_cc.no_cache() {
        log::trace!("lookup {uri}: no-cache forces revalidation, step 8");
        let conditions = synthesize_validators(&entry);
        return if only_if_cached { Action::GatewayTimeout } else { Action::Revalidate(entry, conditions) };
    }

    let fresh = freshness::calculate(&entry, &response_cc, options, clock);

    // Step 9: `min-fresh=Δ` demands the entry outlive the next Δ seconds,
    // not just be fresh right now; the request's own `max-age=Δ` bounds how
    // old the entry may be, independent of the response's freshness
    // lifetime.
    let within_min_fresh = match request_cc.min_fresh() {
        Some(min_fresh) => fresh.age_seconds + min_fresh < fresh.lifetime_seconds,
        None => fresh.is_fresh(),
    };
    let within_request_max_age = match request_cc.max_age() {
        Some(max_age) => fresh.age_seconds <= max_age,
        None => true,
    };

    if within_min_fresh && within_request_max_age {
        log::trace!("lookup {uri}: fresh, step 9");
        let entry = if fresh.needs_heuristic_warning(options) {
            entry.with_warning("113 HttpURLConnection \"Heuristic expiration\"")
        } else {
            entry
        };
        return Action::Fresh(entry);
    }

    // Step 10: `max-stale[=Δ]` lets a client accept a stale entry, unless the
    // response demanded `must-revalidate`.
    if !response_cc.must_revalidate() {
        if let Some(bound) = request_cc.max_stale() {
            let within_bound = match bound {
                None => true,
                Some(seconds) => fresh.stale_seconds() <= seconds,
            };
            if within_bound {
                log::trace!("lookup {uri}: within max-stale bound, step 10");
                return Action::Fresh(entry.with_warning("110 HttpURLConnection \"Response is stale\""));
            }
        }
    }

    // Stale and not excused by `max-stale`. `only-if-cached` forbids going
    // to the network to revalidate.
    if only_if_cached {
        log::trace!("lookup {uri}: stale and only-if-cached");
        return Action::GatewayTimeout;
    }

    // Step 11: stale but carries a validator, so a conditional request can
    // cheaply confirm it's still good. Both `If-None-Match` and
    // `If-Modified-Since` are emitted when both validators exist.
    let conditions = synthesize_validators(&entry);
    if conditions.is_empty() {
        log::trace!("lookup {uri}: stale with no validator, treating as miss, step 12");
        Action::Miss
    } else {
        log::trace!("lookup {uri}: stale with validator, revalidating, step 11");
        Action::Revalidate(entry, conditions)
    }
}

/// If the request carries one of its own precondition headers, copies them
/// into a fresh `HeaderMap` to inject into the outgoing conditional request
/// (spec.md §4.3 step 6). Returns `None` if the request carries none of
/// them.
fn client_precondition_headers(request_headers: &HeaderMap) -> Option<HeaderMap> {
    let mut conditions = HeaderMap::new();
    for &name in CLIENT_PRECONDITION_HEADERS {
        for value in request_headers.get_all(name) {
            conditions.append(http::HeaderName::from_static(name), value.clone());
        }
    }
    if conditions.is_empty() {
        None
    } else {
        Some(conditions)
    }
}

/// Synthesizes conditional-request headers from the entry's own validators
/// (spec.md §4.3 step 11): `If-None-Match` from a stored `ETag`, and/or
/// `If-Modified-Since` from a stored `Last-Modified`. Both are emitted when
/// both validators exist.
fn synthesize_validators(entry: &Entry) -> HeaderMap {
    let mut conditions = HeaderMap::new();
    if let Some(etag) = entry.response_headers().get("etag") {
        conditions.append(http::HeaderName::from_static("if-none-match"), etag.clone());
    }
    if let Some(last_modified) = entry.response_headers().get("last-modified") {
        conditions.append(http::HeaderName::from_static("if-modified-since"), last_modified.clone());
    }
    conditions
}
