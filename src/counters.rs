//! The monotonic hit/miss/success/abort counters a cache facade exposes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic 64-bit counters shared between a [`CacheFacade`][crate::facade::CacheFacade]
/// and every [`EntryWriter`][crate::writer::EntryWriter] it hands out.
#[derive(Debug, Default)]
pub struct Counters {
    hit: AtomicU64,
    miss: AtomicU64,
    success: AtomicU64,
    abort: AtomicU64,
}

/// A point-in-time read of [`Counters`], for test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountersSnapshot {
    /// Fresh returns from `get` that didn't require a network round trip,
    /// including a stored response returned after a 304 revalidation.
    pub hit_count: u64,
    /// `get` calls that returned null or led to a network fetch/revalidation.
    pub miss_count: u64,
    /// Writers that committed a new `Entry` into the `Store`.
    pub success_count: u64,
    /// Writers that discarded their buffer without committing.
    pub abort_count: u64,
}

impl Counters {
    pub(crate) fn record_hit(&self) {
        self.hit.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.miss.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abort(&self) {
        self.abort.fetch_add(1, Ordering::Relaxed);
    }

    /// A consistent-enough snapshot for test assertions to read without
    /// locking — plain relaxed loads are sufficient since nothing here
    /// establishes happens-before ordering with other memory.
    #[must_use]
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            hit_count: self.hit.load(Ordering::Relaxed),
            miss_count: self.miss.load(Ordering::Relaxed),
            success_count: self.success.load(Ordering::Relaxed),
            abort_count: self.abort.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_visible_in_snapshot() {
        let counters = Counters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        counters.record_success();
        counters.record_abort();
        let snap = counters.snapshot();
        assert_eq!(snap, CountersSnapshot { hit_count: 2, miss_count: 1, success_count: 1, abort_count: 1 });
    }
}
