//! The public cache surface a calling engine actually holds: `CacheFacade`,
//! its per-request `RequestHandle`, and the `InsecureResponseCache`
//! decorator.
//!
//! `Policy`/`Store`/`EntryWriter` are the mechanism; this module is the
//! contract an engine actually programs against — generalized the way
//! `http-cache`'s `HttpCache<T: CacheManager>` wraps its manager with
//! request/response lifecycle methods rather than exposing the manager
//! directly.

use crate::clock::{Clock, SystemClock};
use crate::config::CacheOptions;
use crate::counters::{Counters, CountersSnapshot};
use crate::entry::TlsMetadata;
use crate::header_map::HeaderMap;
use crate::policy::{self, Action};
use crate::store::Store;
use crate::writer::EntryWriter;
use http::Method;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The process-wide default for whether new requests consult the cache at
/// all, mirroring `java.net.URLConnection`'s static
/// `setDefaultUseCaches`/`getDefaultUseCaches`. Captured per-request at
/// `RequestHandle` construction time, not read-through at call time — a
/// single process-wide flag a handle snapshots once, rather than something
/// each lookup re-reads.
static DEFAULT_USE_CACHES: AtomicBool = AtomicBool::new(true);

/// Sets the process-wide default `use_caches` value for `RequestHandle`s
/// constructed after this call. Does not affect handles already built.
pub fn set_default_use_caches(enabled: bool) {
    DEFAULT_USE_CACHES.store(enabled, Ordering::Relaxed);
}

/// The process-wide default `use_caches` value.
#[must_use]
pub fn default_use_caches() -> bool {
    DEFAULT_USE_CACHES.load(Ordering::Relaxed)
}

/// A single request's cache-relevant identity, captured once at
/// construction.
///
/// `use_caches` snapshots [`default_use_caches`] when the handle is built; a
/// later call to [`set_default_use_caches`] does not retroactively change a
/// handle already in flight, matching `URLConnection`'s per-connection
/// `useCaches` field semantics.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    uri: String,
    method: Method,
    request_headers: HeaderMap,
    secure: bool,
    use_caches: bool,
}

impl RequestHandle {
    /// Begins tracking a request. `secure` records whether the request is
    /// being made over a TLS transport, used to gate serving a
    /// TLS-originated entry back out over a plaintext connection (see
    /// [`InsecureResponseCache`]).
    #[must_use]
    pub fn new(uri: impl Into<String>, method: Method, request_headers: HeaderMap, secure: bool) -> Self {
        Self { uri: uri.into(), method, request_headers, secure, use_caches: default_use_caches() }
    }

    /// The URI this handle was constructed for.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Overrides the snapshot-at-construction `use_caches` value for this
    /// one request, same as `URLConnection#setUseCaches`.
    pub fn set_use_caches(&mut self, enabled: bool) {
        self.use_caches = enabled;
    }

    /// Whether this request should consult the cache at all.
    #[must_use]
    pub fn use_caches(&self) -> bool {
        self.use_caches
    }
}

/// The cache a calling engine programs against: `get` to look up a cached
/// response before going to the network, `put` to offer a response the
/// engine fetched for possible storage.
pub struct CacheFacade {
    store: Store,
    options: CacheOptions,
    clock: Box<dyn Clock>,
    counters: Arc<Counters>,
}

impl CacheFacade {
    /// A facade over an empty store, using the real wall clock.
    #[must_use]
    pub fn new(options: CacheOptions) -> Self {
        Self::with_clock(options, SystemClock)
    }

    /// A facade using an explicit [`Clock`], for deterministic tests.
    #[must_use]
    pub fn with_clock(options: CacheOptions, clock: impl Clock + 'static) -> Self {
        Self { store: Store::new(), options, clock: Box::new(clock), counters: Arc::new(Counters::default()) }
    }

    /// Looks up a cached response for `handle`.
    ///
    /// Records a hit iff the result is [`Action::Fresh`]; any other outcome
    /// (including `use_caches == false`) counts as a miss.
    #[must_use]
    pub fn get(&self, handle: &RequestHandle) -> Action {
        self.get_inner(handle, handle.secure)
    }

    fn get_inner(&self, handle: &RequestHandle, secure: bool) -> Action {
        if !handle.use_caches {
            log::trace!("get {}: use_caches is false, treating as miss", handle.uri);
            self.counters.record_miss();
            return Action::Miss;
        }

        let action = policy::lookup(&handle.uri, &handle.method, &handle.request_headers, &self.store, &self.options, self.clock.as_ref(), secure);
        match &action {
            Action::Fresh(_) => self.counters.record_hit(),
            _ => self.counters.record_miss(),
        }
        action
    }

    /// Offers a response for storage.
    ///
    /// `response_headers` is taken by value: once handed to `put`, the
    /// caller has no further handle on it to mutate, enforcing "don't
    /// mutate the response after handing it to `put`" structurally rather
    /// than by runtime check.
    ///
    /// For a GET whose response is storable, returns an [`EntryWriter`] the
    /// caller should stream the body into and then `commit`/`abort`. For any
    /// other response, performs mutating-method invalidation if applicable
    /// and returns `None` — there is nothing to write.
    pub fn put(
        &self,
        uri: impl Into<String>,
        method: Method,
        request_headers: &HeaderMap,
        response_headers: HeaderMap,
        tls_metadata: Option<TlsMetadata>,
    ) -> Option<EntryWriter> {
        let uri = uri.into();

        if is_mutating(&method) {
            if response_is_non_error(&response_headers) {
                self.invalidate_for_mutation(&uri, response_headers.get_str("location"), response_headers.get_str("content-location"));
            }
            return None;
        }

        if !policy::storable(&uri, &method, request_headers, &response_headers, &self.options) {
            return None;
        }

        Some(EntryWriter::new(
            self.store.clone(),
            self.counters.clone(),
            uri,
            method,
            response_headers,
            tls_metadata,
            self.clock.now(),
        ))
    }

    /// As [`put`][Self::put], but gated on `handle.use_caches()` first: if
    /// the `UseCaches` flag on this particular request is false, storage is
    /// skipped entirely. When the handle was constructed or later set with
    /// `use_caches = false`, this returns `None` without running admission
    /// or mutating-method invalidation — the cache neither reads nor writes
    /// for that request.
    pub fn put_for_request(&self, handle: &RequestHandle, response_headers: HeaderMap, tls_metadata: Option<TlsMetadata>) -> Option<EntryWriter> {
        if !handle.use_caches {
            log::trace!("put {}: use_caches is false, skipping storage", handle.uri);
            return None;
        }
        self.put(handle.uri.clone(), handle.method.clone(), &handle.request_headers, response_headers, tls_metadata)
    }

    /// The revalidation path: a 304 arrived for `uri`. Merges its headers
    /// into the stored entry (per [`Entry::merge_not_modified`][crate::entry::Entry::merge_not_modified])
    /// and leaves counting to the caller's next `get`: that subsequent call
    /// is what sees the now-fresh merged entry and records the hit, so this
    /// method only updates the store. Returns `false` if there was no
    /// stored entry to merge into (the origin sent a 304 for something this
    /// cache no longer has, which shouldn't happen but isn't this crate's
    /// problem to diagnose).
    pub fn handle_not_modified(&self, uri: &str, fresh_headers: &HeaderMap) -> bool {
        let Some(existing) = self.store.lookup(uri) else {
            log::warn!("304 received for {uri} but no stored entry exists");
            return false;
        };
        let merged = existing.merge_not_modified(fresh_headers, self.clock.now());
        self.store.insert(uri.to_string(), merged);
        true
    }

    fn invalidate_for_mutation(&self, primary_uri: &str, location: Option<&str>, content_location: Option<&str>) {
        if self.store.remove(primary_uri).is_some() {
            log::debug!("invalidated {primary_uri} after mutating-method response");
        }
        for related in [location, content_location].into_iter().flatten() {
            if self.store.remove(related).is_some() {
                log::debug!("invalidated {related} (named by Location/Content-Location) after mutating-method response");
            }
        }
    }

    /// Whether an entry is currently stored for `uri` (test introspection).
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.store.contains(uri)
    }

    /// A snapshot of the hit/miss/success/abort counters.
    #[must_use]
    pub fn counters(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }
}

fn is_mutating(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE | Method::PATCH)
}

/// Only a non-error response (2xx/3xx) to a mutating method invalidates the
/// resource — a failed mutation presumably didn't change anything on the
/// origin.
fn response_is_non_error(response_headers: &HeaderMap) -> bool {
    response_headers
        .status_line()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .map(|code| (200..400).contains(&code))
        .unwrap_or(false)
}

/// Decorates a [`CacheFacade`] so that TLS-originated entries may be served
/// back out even over a non-secure connection.
///
/// This is composition, not inheritance: `InsecureResponseCache` holds a
/// `CacheFacade` rather than subclassing or re-implementing its logic, the
/// same way `http-cache`'s various `CacheManager` implementations wrap
/// storage behavior instead of extending a base class. Reach for this only
/// when the calling engine has its own, out-of-band way of establishing that
/// serving the cached bytes is still safe (e.g. a local loopback proxy) —
/// the default `CacheFacade` behavior exists to stop a secure response
/// leaking out over a connection an attacker controls.
pub struct InsecureResponseCache {
    inner: CacheFacade,
}

impl InsecureResponseCache {
    /// Wraps `inner`, relaxing its transport-security check on `get`.
    #[must_use]
    pub fn new(inner: CacheFacade) -> Self {
        Self { inner }
    }

    /// As [`CacheFacade::get`], but never demotes a `Fresh` TLS-originated
    /// entry for being served over a non-secure `RequestHandle`.
    #[must_use]
    pub fn get(&self, handle: &RequestHandle) -> Action {
        self.inner.get_inner(handle, true)
    }

    /// Delegates to the inner facade unchanged — storage and invalidation
    /// rules don't depend on transport security.
    pub fn put(
        &self,
        uri: impl Into<String>,
        method: Method,
        request_headers: &HeaderMap,
        response_headers: HeaderMap,
        tls_metadata: Option<TlsMetadata>,
    ) -> Option<EntryWriter> {
        self.inner.put(uri, method, request_headers, response_headers, tls_metadata)
    }

    /// Delegates to the inner facade.
    pub fn put_for_request(&self, handle: &RequestHandle, response_headers: HeaderMap, tls_metadata: Option<TlsMetadata>) -> Option<EntryWriter> {
        self.inner.put_for_request(handle, response_headers, tls_metadata)
    }

    /// Delegates to the inner facade.
    pub fn handle_not_modified(&self, uri: &str, fresh_headers: &HeaderMap) -> bool {
        self.inner.handle_not_modified(uri, fresh_headers)
    }

    /// Delegates to the inner facade.
    #[must_use]
    pub fn counters(&self) -> CountersSnapshot {
        self.inner.counters()
    }
}
