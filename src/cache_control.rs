//! Tokenizes and interprets `Cache-Control`/`Pragma` directives on either a
//! request or a response (spec.md §2 `CacheControl`, §4.1).
//!
//! Grounded on the teacher's `parse_cache_control`/`format_cache_control`
//! (`type CacheControl = HashMap<Box<str>, Option<Box<str>>>`, built by
//! splitting every `Cache-Control` occurrence on `,` and each directive on
//! the first `=`). This module keeps that representation and adds the named
//! accessors spec.md §4.1's directive table calls for, since spec.md's
//! directive set is a specific subset of RFC 7234's (no `s-maxage` effect on
//! freshness, `public` only affects `Authorization` gating, etc.) rather
//! than the teacher's full RFC-7234-shaped set.

use crate::header_map::HeaderMap;
use std::collections::HashMap;

/// A parsed, case-preserved-value `Cache-Control` (plus `Pragma: no-cache`)
/// directive set.
#[derive(Debug, Clone, Default)]
pub struct CacheControl {
    directives: HashMap<String, Option<String>>,
}

impl CacheControl {
    /// Parses every `Cache-Control` occurrence in `headers`, folding in
    /// `Pragma: no-cache` as though it were `Cache-Control: no-cache`
    /// (spec.md §4.1).
    #[must_use]
    pub fn parse(headers: &HeaderMap) -> Self {
        let mut directives = HashMap::new();
        for value in headers.get_all("cache-control") {
            let Ok(text) = value.to_str() else { continue };
            for part in text.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let mut kv = part.splitn(2, '=');
                let key = kv.next().unwrap_or("").trim().to_ascii_lowercase();
                if key.is_empty() {
                    continue;
                }
                let value = kv.next().map(|v| v.trim().trim_matches('"').to_string());
                directives.insert(key, value);
            }
        }
        if !directives.contains_key("no-cache") {
            let pragma_no_cache = headers
                .get_str("pragma")
                .map(|p| p.split(',').any(|d| d.trim().eq_ignore_ascii_case("no-cache")))
                .unwrap_or(false);
            if pragma_no_cache {
                directives.insert("no-cache".to_string(), None);
            }
        }
        Self { directives }
    }

    /// Whether `name` is present (with or without a value).
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    /// The directive's raw value string, if it has one.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.directives.get(name).and_then(|v| v.as_deref())
    }

    fn seconds(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(|v| v.parse().ok())
    }

    /// `no-store` — spec.md §4.1: entry must not be stored/used.
    #[must_use]
    pub fn no_store(&self) -> bool {
        self.has("no-store")
    }

    /// `no-cache` — spec.md §4.1: forces revalidation (request or response
    /// side; `Pragma: no-cache` is folded in by `parse`).
    #[must_use]
    pub fn no_cache(&self) -> bool {
        self.has("no-cache")
    }

    /// `max-age=Δ`, in seconds, if present and parseable.
    #[must_use]
    pub fn max_age(&self) -> Option<i64> {
        self.seconds("max-age")
    }

    /// `s-maxage=Δ`, in seconds. Relevant only to §4.2 rule 5's
    /// `Authorization` gating — never to freshness (spec.md §4.4, §9 open
    /// question).
    #[must_use]
    pub fn s_maxage(&self) -> Option<i64> {
        self.seconds("s-maxage")
    }

    /// `min-fresh=Δ`, in seconds (request-side only).
    #[must_use]
    pub fn min_fresh(&self) -> Option<i64> {
        self.seconds("min-fresh")
    }

    /// `max-stale[=Δ]` (request-side only). `Some(None)` means the
    /// directive was present with no value (accept any staleness);
    /// `Some(Some(n))` means staleness is bounded by `n` seconds; `None`
    /// means the directive wasn't present at all.
    #[must_use]
    pub fn max_stale(&self) -> Option<Option<i64>> {
        self.directives.get("max-stale").map(|v| v.as_deref().and_then(|v| v.parse().ok()))
    }

    /// `must-revalidate` — spec.md §4.1: forbids `max-stale` use of this
    /// entry.
    #[must_use]
    pub fn must_revalidate(&self) -> bool {
        self.has("must-revalidate")
    }

    /// `public` — spec.md §4.1: permits storing `Authorization`-bearing
    /// responses (response-side).
    #[must_use]
    pub fn public(&self) -> bool {
        self.has("public")
    }

    /// `only-if-cached` (request-side only).
    #[must_use]
    pub fn only_if_cached(&self) -> bool {
        self.has("only-if-cached")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};

    fn headers_from(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn parses_multiple_directives_across_occurrences() {
        let headers = headers_from(&[
            ("cache-control", "max-age=60, must-revalidate"),
            ("cache-control", "public"),
        ]);
        let cc = CacheControl::parse(&headers);
        assert_eq!(cc.max_age(), Some(60));
        assert!(cc.must_revalidate());
        assert!(cc.public());
    }

    #[test]
    fn pragma_no_cache_is_folded_in() {
        let headers = headers_from(&[("pragma", "no-cache")]);
        let cc = CacheControl::parse(&headers);
        assert!(cc.no_cache());
    }

    #[test]
    fn explicit_cache_control_no_cache_wins_over_absent_pragma() {
        let headers = headers_from(&[("cache-control", "max-age=5")]);
        let cc = CacheControl::parse(&headers);
        assert!(!cc.no_cache());
    }

    #[test]
    fn max_stale_without_value_is_some_none() {
        let headers = headers_from(&[("cache-control", "max-stale")]);
        let cc = CacheControl::parse(&headers);
        assert_eq!(cc.max_stale(), Some(None));
    }

    #[test]
    fn max_stale_with_value_is_some_some() {
        let headers = headers_from(&[("cache-control", "max-stale=30")]);
        let cc = CacheControl::parse(&headers);
        assert_eq!(cc.max_stale(), Some(Some(30)));
    }

    #[test]
    fn max_stale_absent_is_none() {
        let headers = headers_from(&[("cache-control", "no-cache")]);
        let cc = CacheControl::parse(&headers);
        assert_eq!(cc.max_stale(), None);
    }
}
