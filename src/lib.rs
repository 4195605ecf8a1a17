//! A private, single-process HTTP/1.1 response cache implementing the
//! freshness, validation, and invalidation rules of RFC 2616 §13.
//!
//! The pieces, roughly outside-in:
//!
//! - [`facade`] — [`CacheFacade`][facade::CacheFacade], the surface an engine
//!   actually calls: `get` before going to the network, `put` after.
//! - [`policy`] — the storability and freshness decision functions the
//!   facade is built on.
//! - [`store`] — the backing map, at most one [`entry::Entry`] per URI.
//! - [`writer`] — the streaming write side that turns a response into an
//!   `Entry`.
//! - [`cache_control`], [`freshness`], [`date`], [`header_map`] — the
//!   parsing and arithmetic the policy layer is built from.
//! - [`clock`], [`config`], [`error`], [`counters`] — the ambient
//!   infrastructure (time source, tunables, error type, hit/miss
//!   accounting).
//!
//! This crate has no network layer of its own: it is a pure decision-and-
//! storage core an HTTP client or proxy wires into its own request/response
//! lifecycle.

pub mod cache_control;
pub mod clock;
pub mod config;
pub mod counters;
pub mod date;
pub mod entry;
pub mod error;
pub mod facade;
pub mod freshness;
pub mod header_map;
pub mod policy;
pub mod store;
pub mod writer;

pub use cache_control::CacheControl;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CacheOptions;
pub use counters::CountersSnapshot;
pub use entry::{Entry, TlsMetadata};
pub use error::{CacheError, Result};
pub use facade::{CacheFacade, InsecureResponseCache, RequestHandle};
pub use freshness::Freshness;
pub use header_map::HeaderMap;
pub use policy::Action;
pub use store::Store;
pub use writer::EntryWriter;
