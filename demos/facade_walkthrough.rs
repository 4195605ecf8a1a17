//! A scripted walkthrough of `CacheFacade`: a miss, a fill, a fresh hit, a
//! stale-then-revalidate, a 304 merge, and a mutating-method invalidation,
//! each printed as it happens.
//!
//! Run with `RUST_LOG=trace cargo run --example facade_walkthrough` to see
//! the policy's own `log` output alongside the narration below.

use http::{HeaderName, HeaderValue, Method};
use http_cache_core::{Action, CacheFacade, CacheOptions, Clock, HeaderMap, RequestHandle};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

/// A clock the demo can advance between steps from outside the facade that
/// owns it, since a real connection's elapsed time can't be simulated with
/// the `FixedClock` test helper alone. Shared via `Rc` so both the facade's
/// boxed copy and the handle kept in `main` see the same instant.
#[derive(Debug, Clone)]
struct SteppedClock(Rc<Cell<SystemTime>>);

impl SteppedClock {
    fn starting_at(time: SystemTime) -> Self {
        Self(Rc::new(Cell::new(time)))
    }

    fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> SystemTime {
        self.0.get()
    }
}

fn response(status: &str, pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::with_status_line(status);
    for (name, value) in pairs {
        map.append(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    map
}

fn main() {
    env_logger::init();

    let uri = "https://example.com/widgets/42";
    let clock = SteppedClock::starting_at(SystemTime::UNIX_EPOCH);
    let facade = CacheFacade::with_clock(CacheOptions::default(), clock.clone());
    let handle = RequestHandle::new(uri, Method::GET, HeaderMap::new(), true);

    println!("1. GET {uri} with nothing cached yet");
    describe(&facade.get(&handle));

    println!("\n2. origin answers 200, cacheable for 60s; storing it");
    let resp = response("HTTP/1.1 200 OK", &[("cache-control", "max-age=60"), ("etag", "\"rev-1\"")]);
    let mut writer = facade.put(uri, Method::GET, &HeaderMap::new(), resp, None).unwrap();
    writer.write(b"{\"id\":42,\"name\":\"sprocket\"}").unwrap();
    writer.commit().unwrap();

    println!("\n3. GET {uri} again, 10s later: should be a fresh hit");
    clock.advance(Duration::from_secs(10));
    describe(&facade.get(&handle));

    println!("\n4. 90s later still (past the 60s max-age): should need revalidation");
    clock.advance(Duration::from_secs(90));
    describe(&facade.get(&handle));

    println!("\n5. origin answers 304 Not Modified; merging into the stored entry");
    let not_modified = response("HTTP/1.1 304 Not Modified", &[("cache-control", "max-age=300"), ("etag", "\"rev-1\"")]);
    facade.handle_not_modified(uri, &not_modified);
    describe(&facade.get(&handle));

    println!("\n6. a PUT to the same URI invalidates the cached GET");
    let put_ack = response("HTTP/1.1 204 No Content", &[]);
    facade.put(uri, Method::PUT, &HeaderMap::new(), put_ack, None);
    describe(&facade.get(&handle));

    println!("\nfinal counters: {:?}", facade.counters());
}

fn describe(action: &Action) {
    match action {
        Action::Miss => println!("   -> miss: go to the network"),
        Action::Fresh(entry) => println!("   -> fresh hit: {} bytes served from cache", entry.body().len()),
        Action::Revalidate(entry, conditions) => {
            println!("   -> stale ({} bytes cached), revalidate with:", entry.body().len());
            for (name, value) in conditions.iter() {
                println!("        {}: {}", name.as_str(), value.to_str().unwrap_or("<binary>"));
            }
        }
        Action::GatewayTimeout => println!("   -> only-if-cached with nothing usable: 504"),
    }
}
