//! `EntryWriter` streaming behavior driven through the public facade
//! (spec.md §4.5, §8: skip-transparency, premature disconnect, length
//! mismatch).

use http::{HeaderName, HeaderValue, Method};
use http_cache_core::{Action, CacheError, CacheFacade, CacheOptions, FixedClock, HeaderMap, RequestHandle};
use std::io::Cursor;
use std::time::SystemTime;

fn facade() -> CacheFacade {
    CacheFacade::with_clock(CacheOptions::default(), FixedClock(SystemTime::UNIX_EPOCH))
}

fn cacheable_response() -> HeaderMap {
    let mut map = HeaderMap::with_status_line("HTTP/1.1 200 OK");
    map.append(HeaderName::from_static("cache-control"), HeaderValue::from_static("max-age=60"));
    map
}

#[test]
fn skipped_bytes_still_end_up_in_the_stored_body() {
    let facade = facade();
    let mut writer = facade.put("http://example.com/a", Method::GET, &HeaderMap::new(), cacheable_response(), None).unwrap();
    writer.write(b"head-").unwrap();
    let mut origin = Cursor::new(b"skipped-bytes".to_vec());
    let skipped = writer.skip(13, &mut origin).unwrap();
    assert_eq!(skipped, 13);
    writer.write(b"-tail").unwrap();
    writer.commit().unwrap();

    let handle = RequestHandle::new("http://example.com/a", Method::GET, HeaderMap::new(), false);
    match facade.get(&handle) {
        Action::Fresh(entry) => assert_eq!(entry.body(), b"head-skipped-bytes-tail"),
        other => panic!("expected a fresh hit, got {other:?}"),
    }
}

#[test]
fn premature_disconnect_does_not_store_a_partial_entry() {
    let facade = facade();
    {
        let mut writer = facade.put("http://example.com/b", Method::GET, &HeaderMap::new(), cacheable_response(), None).unwrap();
        writer.write(b"only some of the body").unwrap();
        // Writer is dropped here without commit/abort, simulating a
        // connection that closed mid-stream.
    }
    assert!(!facade.contains("http://example.com/b"));
    assert_eq!(facade.counters().abort_count, 1);
}

#[test]
fn content_length_mismatch_aborts_the_commit() {
    let facade = facade();
    let mut response = cacheable_response();
    response.append(HeaderName::from_static("content-length"), HeaderValue::from_static("100"));
    let mut writer = facade.put("http://example.com/c", Method::GET, &HeaderMap::new(), response, None).unwrap();
    writer.write(b"too short").unwrap();
    let err = writer.commit().unwrap_err();
    assert!(matches!(err, CacheError::LengthMismatch { declared: 100, written: 9 }));
    assert!(!facade.contains("http://example.com/c"));
}
