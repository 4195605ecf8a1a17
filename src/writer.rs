//! The streaming write side of a cache entry.
//!
//! Grounded on servo's `CachedResource`/`HttpCache::store` construction
//! (`other_examples/1cb2976a_tharkum-servo__components-net-http_cache.rs.rs`)
//! for "a response is built up incrementally while bytes are still arriving
//! from the network," and on enum-driven state modeling
//! (`AfterResponse`/`BeforeRequest`-style variants) for the
//! `Open`/`Committed`/`Aborted` state machine below.

use crate::counters::Counters;
use crate::entry::{Entry, TlsMetadata};
use crate::error::{CacheError, Result};
use crate::header_map::HeaderMap;
use crate::store::Store;
use http::Method;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Committed,
    Aborted,
}

/// Accepts a response body incrementally and, on [`commit`][EntryWriter::commit],
/// turns it into an [`Entry`] in the backing [`Store`].
///
/// Dropping a writer that was never committed or aborted is treated as an
/// abort (a premature-disconnect "abandon without closing" scenario) — the
/// `abortCount` counter still advances, so callers don't have to remember to
/// call `abort()` defensively in every early-return path.
pub struct EntryWriter {
    store: Store,
    counters: Arc<Counters>,
    uri: String,
    request_method: Method,
    response_headers: HeaderMap,
    tls_metadata: Option<TlsMetadata>,
    declared_length: Option<usize>,
    buffer: Vec<u8>,
    response_time: SystemTime,
    state: WriterState,
}

impl EntryWriter {
    pub(crate) fn new(
        store: Store,
        counters: Arc<Counters>,
        uri: String,
        request_method: Method,
        response_headers: HeaderMap,
        tls_metadata: Option<TlsMetadata>,
        response_time: SystemTime,
    ) -> Self {
        let declared_length = response_headers.get_str("content-length").and_then(|v| v.parse().ok());
        Self {
            store,
            counters,
            uri,
            request_method,
            response_headers,
            tls_metadata,
            declared_length,
            buffer: Vec::new(),
            response_time,
            state: WriterState::Open,
        }
    }

    /// Appends bytes the caller wants kept in the entry. Errors if the
    /// writer already committed or aborted.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Reads `n` bytes from `source` and appends them to the buffer exactly
    /// as `write` would — skip-transparency: a caller that skips bytes it
    /// doesn't need must not cause them to be silently dropped from the
    /// stored entry. Returns the number of bytes actually read (fewer than
    /// `n` at EOF).
    pub fn skip(&mut self, n: usize, source: &mut dyn Read) -> io::Result<usize> {
        if self.state != WriterState::Open {
            return Ok(0);
        }
        let mut chunk = vec![0u8; n];
        let mut total = 0;
        while total < n {
            match source.read(&mut chunk[total..])? {
                0 => break,
                read => total += read,
            }
        }
        self.buffer.extend_from_slice(&chunk[..total]);
        Ok(total)
    }

    /// The number of bytes written or skipped so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    /// Finalizes the entry and inserts it into the `Store`.
    ///
    /// If a `Content-Length` was declared on the response and the number of
    /// bytes actually written doesn't match it, the writer is treated as
    /// aborted instead — a length mismatch is a store-time error, not a
    /// silently-truncated entry.
    pub fn commit(mut self) -> Result<()> {
        self.ensure_open()?;
        if let Some(declared) = self.declared_length {
            if declared != self.buffer.len() {
                let written = self.buffer.len();
                self.state = WriterState::Aborted;
                self.counters.record_abort();
                log::warn!(
                    "aborting entry for {}: declared Content-Length {} but wrote {} bytes",
                    self.uri,
                    declared,
                    written
                );
                return Err(CacheError::LengthMismatch { declared, written });
            }
        }

        let entry = Entry::new(
            self.uri.clone(),
            self.request_method.clone(),
            self.response_headers.clone(),
            std::mem::take(&mut self.buffer),
            self.tls_metadata.clone(),
            self.response_time,
        );
        self.store.insert(self.uri.clone(), entry);
        self.state = WriterState::Committed;
        self.counters.record_success();
        log::trace!("committed entry for {}", self.uri);
        Ok(())
    }

    /// Discards the buffered body without storing anything. Idempotent with
    /// an already-finished writer: aborting twice, or aborting after commit,
    /// is a no-op rather than a panic.
    pub fn abort(mut self) {
        if self.state == WriterState::Open {
            self.state = WriterState::Aborted;
            self.counters.record_abort();
            log::debug!("aborted entry for {} after {} bytes", self.uri, self.buffer.len());
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == WriterState::Open {
            Ok(())
        } else {
            Err(CacheError::IllegalAccess(format!("writer for {} already finished", self.uri)))
        }
    }
}

impl Drop for EntryWriter {
    fn drop(&mut self) {
        if self.state == WriterState::Open {
            self.counters.record_abort();
            log::warn!("entry writer for {} dropped without commit/abort; treating as aborted", self.uri);
        }
    }
}
