//! A single cached response.

use crate::header_map::HeaderMap;
use http::Method;
use std::time::SystemTime;

/// TLS connection metadata captured for a response received over `https`.
/// Preserved across a cache hit so the engine can still answer
/// "what cipher suite/certificate chain backs this response" without
/// re-handshaking.
#[derive(Debug, Clone)]
pub struct TlsMetadata {
    /// The negotiated cipher suite name, e.g. `"TLS_AES_128_GCM_SHA256"`.
    pub cipher_suite: String,
    /// The peer's (server's) certificate chain, leaf first, DER-encoded.
    pub peer_certificates: Vec<Vec<u8>>,
    /// The local (client's) certificate chain, if client-cert auth was used.
    pub local_certificates: Vec<Vec<u8>>,
    /// The peer's authenticated principal name, if available.
    pub peer_principal: Option<String>,
    /// The local principal name, if available.
    pub local_principal: Option<String>,
}

/// An immutable-after-commit cached response.
///
/// Constructed only by [`EntryWriter::commit`][crate::writer::EntryWriter::commit]
/// or by [`Entry::merge_not_modified`] (the 304-revalidation path) — there is
/// no public constructor that lets a caller assemble a half-formed `Entry`.
#[derive(Debug, Clone)]
pub struct Entry {
    uri: String,
    request_method: Method,
    response_headers: HeaderMap,
    body: Vec<u8>,
    tls_metadata: Option<TlsMetadata>,
    response_time: SystemTime,
}

impl Entry {
    /// Assembles a committed entry. Not exposed outside the crate: the only
    /// paths that produce an `Entry` are [`EntryWriter::commit`] and
    /// [`Entry::merge_not_modified`], both of which uphold the invariant that
    /// an `Entry` is never observed in a partial state.
    pub(crate) fn new(
        uri: String,
        request_method: Method,
        response_headers: HeaderMap,
        body: Vec<u8>,
        tls_metadata: Option<TlsMetadata>,
        response_time: SystemTime,
    ) -> Self {
        Self { uri, request_method, response_headers, body, tls_metadata, response_time }
    }

    /// The absolute URI this entry is keyed by.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Always `GET` for an admitted entry.
    #[must_use]
    pub fn request_method(&self) -> &Method {
        &self.request_method
    }

    /// The complete stored response headers, status line included.
    #[must_use]
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// The stored response body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// TLS metadata, present iff the response was originally received over
    /// `https`.
    #[must_use]
    pub fn tls_metadata(&self) -> Option<&TlsMetadata> {
        self.tls_metadata.as_ref()
    }

    /// The instant this entry's response was received — the basis `served`
    /// time for age calculations when no `Date` header is present.
    #[must_use]
    pub fn response_time(&self) -> SystemTime {
        self.response_time
    }

    /// The numeric status code parsed out of the stored status line, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.response_headers.status_line()?.split_whitespace().nth(1)?.parse().ok()
    }

    /// Implements the 304-merge rule: the 304's headers overwrite this
    /// entry's stored headers field-by-field, except content-defining
    /// headers, which stay fixed; the body, method, URI, and TLS metadata
    /// are carried over unchanged. `response_time` becomes the instant the
    /// 304 was received, which re-bases subsequent age calculations (`served`
    /// is the response's own `Date`/receipt time).
    #[must_use]
    pub fn merge_not_modified(&self, fresh_headers: &HeaderMap, response_time: SystemTime) -> Entry {
        Entry {
            uri: self.uri.clone(),
            request_method: self.request_method.clone(),
            response_headers: self.response_headers.merge_not_modified(fresh_headers),
            body: self.body.clone(),
            tls_metadata: self.tls_metadata.clone(),
            response_time,
        }
    }

    /// A copy of this entry with one extra `Warning` header appended. The
    /// synthesized `Warning: 110`/`Warning: 113` is a lookup-time annotation
    /// on the *served* copy, not a mutation of the stored entry itself.
    #[must_use]
    pub(crate) fn with_warning(&self, warning: &str) -> Entry {
        let mut response_headers = self.response_headers.clone();
        response_headers.append(
            http::HeaderName::from_static("warning"),
            http::HeaderValue::from_str(warning).expect("synthesized Warning text is valid header value"),
        );
        Entry {
            uri: self.uri.clone(),
            request_method: self.request_method.clone(),
            response_headers,
            body: self.body.clone(),
            tls_metadata: self.tls_metadata.clone(),
            response_time: self.response_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};

    fn sample_entry() -> Entry {
        let mut headers = HeaderMap::with_status_line("HTTP/1.1 200 OK");
        headers.append(HeaderName::from_static("etag"), HeaderValue::from_static("\"a\""));
        headers.append(HeaderName::from_static("content-length"), HeaderValue::from_static("5"));
        Entry::new(
            "http://example.com/a".into(),
            Method::GET,
            headers,
            b"ABCDE".to_vec(),
            None,
            SystemTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn status_code_parses_from_status_line() {
        assert_eq!(sample_entry().status_code(), Some(200));
    }

    #[test]
    fn merge_keeps_body_and_rebases_response_time() {
        let original = sample_entry();
        let mut fresh = HeaderMap::with_status_line("HTTP/1.1 304 Not Modified");
        fresh.append(HeaderName::from_static("etag"), HeaderValue::from_static("\"a\""));
        fresh.append(HeaderName::from_static("x-served-by"), HeaderValue::from_static("edge-1"));
        let new_time = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(100);

        let merged = original.merge_not_modified(&fresh, new_time);
        assert_eq!(merged.body(), b"ABCDE");
        assert_eq!(merged.response_time(), new_time);
        assert_eq!(merged.status_code(), Some(200), "status line stays the original 200, not 304");
        assert_eq!(merged.response_headers().get_str("content-length"), Some("5"));
        assert_eq!(merged.response_headers().get_str("x-served-by"), Some("edge-1"));
    }
}
