//! The at-most-one-entry-per-URI backing map (spec.md §2 `Store`, §5).
//!
//! Grounded on servo's `HttpCache { entries: HashMap<CacheKey, ...> }`
//! (`other_examples/1cb2976a_tharkum-servo__components-net-http_cache.rs.rs`),
//! narrowed from its `Vec`-per-key Vary-aware bucket down to a single `Entry`
//! per key, since spec.md §4.2 rejects `Vary` variance by storing at most one
//! representation per URI. Guarded by a single `Mutex` rather than sharded,
//! matching spec.md §5's single-lock concurrency model.

use crate::entry::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A cheap-to-clone handle onto the shared entry map. Every clone refers to
/// the same underlying storage — cloning a `Store` is how a `CacheFacade`
/// and the `EntryWriter`s it hands out share one map without a lifetime
/// parameter.
#[derive(Debug, Clone, Default)]
pub struct Store {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl Store {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry keyed by `uri`, if any.
    #[must_use]
    pub fn lookup(&self, uri: &str) -> Option<Entry> {
        self.lock().get(uri).cloned()
    }

    /// Inserts or replaces the entry for `uri`.
    pub fn insert(&self, uri: String, entry: Entry) {
        self.lock().insert(uri, entry);
    }

    /// Removes and returns the entry for `uri`, if any (spec.md §4.7:
    /// invalidation on a mutating-method response).
    pub fn remove(&self, uri: &str) -> Option<Entry> {
        self.lock().remove(uri)
    }

    /// Whether an entry is stored for `uri`.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.lock().contains_key(uri)
    }

    /// All stored keys, for test introspection (spec.md §8: "at most one
    /// entry per URI").
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// The number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes every stored entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header_map::HeaderMap;
    use http::Method;
    use std::time::SystemTime;

    fn sample_entry(uri: &str) -> Entry {
        Entry::new(
            uri.to_string(),
            Method::GET,
            HeaderMap::with_status_line("HTTP/1.1 200 OK"),
            Vec::new(),
            None,
            SystemTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn insert_then_lookup_round_trips() {
        let store = Store::new();
        store.insert("http://example.com/a".into(), sample_entry("http://example.com/a"));
        assert!(store.lookup("http://example.com/a").is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_replaces_rather_than_accumulates() {
        let store = Store::new();
        store.insert("http://example.com/a".into(), sample_entry("http://example.com/a"));
        store.insert("http://example.com/a".into(), sample_entry("http://example.com/a"));
        assert_eq!(store.len(), 1, "at most one entry per URI");
    }

    #[test]
    fn remove_drops_the_entry() {
        let store = Store::new();
        store.insert("http://example.com/a".into(), sample_entry("http://example.com/a"));
        assert!(store.remove("http://example.com/a").is_some());
        assert!(store.lookup("http://example.com/a").is_none());
    }

    #[test]
    fn clones_share_the_same_backing_map() {
        let store = Store::new();
        let handle = store.clone();
        handle.insert("http://example.com/a".into(), sample_entry("http://example.com/a"));
        assert!(store.contains("http://example.com/a"));
    }
}
