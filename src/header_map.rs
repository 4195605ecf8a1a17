//! Case-insensitive HTTP header multimap with an ordered, ordinary-looking
//! slot for the status line (spec.md §2 `HeaderMap`, §9 design note).
//!
//! `http::HeaderMap` almost fits, but it has nowhere to put the status line
//! (`"HTTP/1.1 200 OK"`) as a header-like, order-preserved entry, which
//! spec.md §6 requires ("an ordered header map whose entry for the `null`
//! key ... is the HTTP status line"). Rather than overload a sentinel key
//! the way the Java original does, spec.md's own design notes prescribe a
//! tagged variant: `Field = StatusLine(String) | Header(Name, Value)` over
//! an ordered vector. That's what this module is.

use http::{HeaderName, HeaderValue};
use std::fmt;

/// One entry in a [`HeaderMap`]: either the response status line, or a
/// single header field occurrence.
#[derive(Debug, Clone)]
pub enum Field {
    /// The `"HTTP/1.1 <code> <reason>"` status line. At most one should
    /// exist per `HeaderMap`, and by convention it sorts first.
    StatusLine(String),
    /// One occurrence of a header field. Multiple occurrences of the same
    /// name (e.g. repeated `Cache-Control` or `Set-Cookie`) are separate
    /// entries, in the order they were appended.
    Header(HeaderName, HeaderValue),
}

/// An ordered, case-insensitive multimap of HTTP header fields, with an
/// optional status line.
///
/// Insertion order is preserved for read-back (`iter`), which matters when
/// headers are being streamed back out to an engine that expects to see
/// them in the order the origin sent them.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    fields: Vec<Field>,
}

impl HeaderMap {
    /// An empty header map with no status line.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// An empty header map carrying only the given status line.
    #[must_use]
    pub fn with_status_line(line: impl Into<String>) -> Self {
        Self { fields: vec![Field::StatusLine(line.into())] }
    }

    /// The stored status line, if any.
    #[must_use]
    pub fn status_line(&self) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            Field::StatusLine(s) => Some(s.as_str()),
            Field::Header(..) => None,
        })
    }

    /// Sets (replacing any existing) status line.
    pub fn set_status_line(&mut self, line: impl Into<String>) {
        self.fields.retain(|f| !matches!(f, Field::StatusLine(_)));
        self.fields.insert(0, Field::StatusLine(line.into()));
    }

    /// Appends a header occurrence without removing any existing ones with
    /// the same name.
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        self.fields.push(Field::Header(name, value));
    }

    /// Removes every existing occurrence of `name`, then appends `value` as
    /// the sole occurrence.
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) {
        self.remove(name.as_str());
        self.append(name, value);
    }

    /// The first occurrence of `name` (case-insensitive), if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.get_all(name).next()
    }

    /// The first occurrence of `name`, as a `&str`, if present and valid
    /// UTF-8/ASCII.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    /// All occurrences of `name` (case-insensitive), in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        let name = name.to_ascii_lowercase();
        self.fields.iter().filter_map(move |f| match f {
            Field::Header(n, v) if n.as_str() == name => Some(v),
            _ => None,
        })
    }

    /// Whether any occurrence of `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes every occurrence of `name`. The status line, if any, is
    /// untouched.
    pub fn remove(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        self.fields.retain(|f| !matches!(f, Field::Header(n, _) if n.as_str() == name));
    }

    /// Iterates header fields (not the status line) in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.fields.iter().filter_map(|f| match f {
            Field::Header(n, v) => Some((n, v)),
            Field::StatusLine(_) => None,
        })
    }

    /// The raw, ordered field list, status line included.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The number of header field occurrences (status line excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether there are no header field occurrences (status line excluded).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Implements the 304-merge rule of spec.md §3: walk `self`'s fields in
    /// their original order, and for each field name, use `fresh`'s (the
    /// 304 response's) occurrences instead of `self`'s — **except** for the
    /// content-defining headers (`Content-Length`, `Content-Encoding`,
    /// `Content-Type`, `Content-Range`, and anything else prefixed
    /// `Content-`), which stay fixed at `self`'s value regardless of what
    /// `fresh` says. Field names that appear only in `fresh` (not already
    /// present in `self`) are appended at the end, in `fresh`'s order — a
    /// 304 can introduce a header the original response never sent (e.g. a
    /// refreshed `X-Served-By` from a different edge node).
    ///
    /// The status line is taken from `self` unconditionally — revalidation
    /// never changes the cached response's original status.
    #[must_use]
    pub fn merge_not_modified(&self, fresh: &HeaderMap) -> HeaderMap {
        let mut merged = HeaderMap::new();
        if let Some(line) = self.status_line() {
            merged.set_status_line(line.to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for (name, value) in self.iter() {
            let key = name.as_str().to_ascii_lowercase();
            if is_content_header(name.as_str()) {
                merged.append(name.clone(), value.clone());
                continue;
            }
            if seen.contains(&key) {
                // Already emitted this name's occurrences from `fresh`.
                continue;
            }
            seen.insert(key);
            let fresh_values: Vec<_> = fresh.get_all(name.as_str()).collect();
            if fresh_values.is_empty() {
                merged.append(name.clone(), value.clone());
            } else {
                for fresh_value in fresh_values {
                    merged.append(name.clone(), fresh_value.clone());
                }
            }
        }

        // Fields present only in `fresh` (never seen in `self`) are new
        // information the 304 is introducing; append them too.
        for (name, value) in fresh.iter() {
            let key = name.as_str().to_ascii_lowercase();
            if seen.contains(&key) || is_content_header(name.as_str()) {
                continue;
            }
            seen.insert(key);
            merged.append(name.clone(), value.clone());
        }
        merged
    }
}

fn is_content_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("content-length")
        || name.eq_ignore_ascii_case("content-encoding")
        || name.eq_ignore_ascii_case("content-type")
        || name.eq_ignore_ascii_case("content-range")
        || name.len() > 8 && name[..8].eq_ignore_ascii_case("content-")
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            match field {
                Field::StatusLine(line) => writeln!(f, "{line}")?,
                Field::Header(name, value) => {
                    writeln!(f, "{}: {}", name.as_str(), value.to_str().unwrap_or("<binary>"))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(name: &'static str, value: &'static str) -> (HeaderName, HeaderValue) {
        (HeaderName::from_static(name), HeaderValue::from_static(value))
    }

    #[test]
    fn status_line_is_ordered_first_but_excluded_from_iter() {
        let mut map = HeaderMap::new();
        let (n, v) = h("content-type", "text/plain");
        map.append(n, v);
        map.set_status_line("HTTP/1.1 200 OK");
        assert_eq!(map.status_line(), Some("HTTP/1.1 200 OK"));
        assert_eq!(map.iter().count(), 1);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut map = HeaderMap::new();
        let (n, v) = h("etag", "\"abc\"");
        map.append(n, v);
        assert_eq!(map.get_str("ETag"), Some("\"abc\""));
        assert_eq!(map.get_str("ETAG"), Some("\"abc\""));
    }

    #[test]
    fn get_all_preserves_multiple_occurrences() {
        let mut map = HeaderMap::new();
        let (n1, v1) = h("cache-control", "no-cache");
        let (n2, v2) = h("cache-control", "max-age=5");
        map.append(n1, v1);
        map.append(n2, v2);
        let vals: Vec<_> = map.get_all("Cache-Control").map(|v| v.to_str().unwrap()).collect();
        assert_eq!(vals, vec!["no-cache", "max-age=5"]);
    }

    #[test]
    fn insert_replaces_all_prior_occurrences() {
        let mut map = HeaderMap::new();
        let (n1, v1) = h("cache-control", "no-cache");
        let (n2, v2) = h("cache-control", "max-age=5");
        map.append(n1, v1);
        map.append(n2, v2);
        map.insert(HeaderName::from_static("cache-control"), HeaderValue::from_static("public"));
        let vals: Vec<_> = map.get_all("cache-control").collect();
        assert_eq!(vals.len(), 1);
        assert_eq!(vals[0], "public");
    }

    #[test]
    fn merge_preserves_content_headers_from_original() {
        let mut original = HeaderMap::new();
        original.set_status_line("HTTP/1.1 200 OK".to_string());
        let (n, v) = h("content-length", "5");
        original.append(n, v);
        let (n, v) = h("content-encoding", "gzip");
        original.append(n, v);
        let (n, v) = h("etag", "\"old\"");
        original.append(n, v);

        let mut fresh = HeaderMap::new();
        let (n, v) = h("content-length", "999");
        fresh.append(n, v);
        let (n, v) = h("etag", "\"new\"");
        fresh.append(n, v);
        let (n, v) = h("x-served-by", "origin-a");
        fresh.append(n, v);

        let merged = original.merge_not_modified(&fresh);
        assert_eq!(merged.get_str("content-length"), Some("5"));
        assert_eq!(merged.get_str("content-encoding"), Some("gzip"));
        assert_eq!(merged.get_str("etag"), Some("\"new\""));
        assert_eq!(merged.get_str("x-served-by"), Some("origin-a"));
        assert_eq!(merged.status_line(), Some("HTTP/1.1 200 OK"));
    }
}
