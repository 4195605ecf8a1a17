//! Mutating-method invalidation (spec.md §4.7, §8).

use http::{HeaderName, HeaderValue, Method};
use http_cache_core::{Action, CacheFacade, CacheOptions, FixedClock, HeaderMap, RequestHandle};
use std::time::SystemTime;

fn facade() -> CacheFacade {
    CacheFacade::with_clock(CacheOptions::default(), FixedClock(SystemTime::UNIX_EPOCH))
}

fn response(status: &str, pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::with_status_line(status);
    for (name, value) in pairs {
        map.append(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    map
}

fn store_cacheable(facade: &CacheFacade, uri: &str) {
    let resp = response("HTTP/1.1 200 OK", &[("cache-control", "max-age=300")]);
    facade.put(uri, Method::GET, &HeaderMap::new(), resp, None).unwrap().commit().unwrap();
}

#[test]
fn successful_put_invalidates_the_stored_entry() {
    let facade = facade();
    store_cacheable(&facade, "http://example.com/a");
    assert!(facade.contains("http://example.com/a"));

    let put_response = response("HTTP/1.1 200 OK", &[]);
    assert!(facade.put("http://example.com/a", Method::PUT, &HeaderMap::new(), put_response, None).is_none());
    assert!(!facade.contains("http://example.com/a"));
}

#[test]
fn failed_mutation_does_not_invalidate() {
    let facade = facade();
    store_cacheable(&facade, "http://example.com/a");

    let error_response = response("HTTP/1.1 500 Internal Server Error", &[]);
    facade.put("http://example.com/a", Method::DELETE, &HeaderMap::new(), error_response, None);
    assert!(facade.contains("http://example.com/a"), "a failed mutation leaves the cached GET alone");
}

#[test]
fn location_header_also_gets_invalidated() {
    let facade = facade();
    store_cacheable(&facade, "http://example.com/a");
    store_cacheable(&facade, "http://example.com/moved-to");

    let created = response("HTTP/1.1 201 Created", &[("location", "http://example.com/moved-to")]);
    facade.put("http://example.com/a", Method::POST, &HeaderMap::new(), created, None);

    assert!(!facade.contains("http://example.com/a"));
    assert!(!facade.contains("http://example.com/moved-to"));
}

#[test]
fn get_to_a_mutated_uri_is_a_miss_afterward() {
    let facade = facade();
    store_cacheable(&facade, "http://example.com/a");
    let post_response = response("HTTP/1.1 204 No Content", &[]);
    facade.put("http://example.com/a", Method::POST, &HeaderMap::new(), post_response, None);

    let handle = RequestHandle::new("http://example.com/a", Method::GET, HeaderMap::new(), false);
    assert!(matches!(facade.get(&handle), Action::Miss));
}
