//! Error kinds the core distinguishes.

use thiserror::Error;

/// A `Result` typedef to use with the [`CacheError`] type.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors raised by the cache policy and entry lifecycle core.
///
/// Admission refusal (`NotStorable`) and a miss with no usable entry are
/// *not* represented here: both are ordinary `None`/`Action::Miss` return
/// values, not errors. This enum is reserved for the cases spec.md §7 calls
/// out as genuine error conditions.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The body stream ended prematurely, or the caller closed the response
    /// stream before the declared `Content-Length` (or before the origin's
    /// own EOF) was reached. No entry was committed.
    #[error("writer aborted before the response body was fully received")]
    WriterAborted,

    /// The engine violated the `put`-callback contract of spec.md §4.8:
    /// either it mutated the request from inside the callback, or it read
    /// the response body stream before returning the sink.
    #[error("illegal access from put callback: {0}")]
    IllegalAccess(String),

    /// The writer was committed with a byte count that doesn't match the
    /// `Content-Length` the stored headers declared.
    #[error("body length mismatch: declared {declared}, wrote {written}")]
    LengthMismatch {
        /// The `Content-Length` value taken from the response headers.
        declared: usize,
        /// The number of bytes actually written before commit was called.
        written: usize,
    },

    /// A header name supplied by the engine did not parse as a valid
    /// `http::HeaderName`.
    #[error(transparent)]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// A header value supplied by the engine did not parse as a valid
    /// `http::HeaderValue`.
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// A method string supplied by the engine did not parse as a valid
    /// `http::Method`.
    #[error(transparent)]
    InvalidMethod(#[from] http::method::InvalidMethod),
}
