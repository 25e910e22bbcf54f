//! Per-attempt timeouts.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{Reply, ScriptedHost};
use pretty_assertions::assert_eq;
use rastr_connect::{
    AutomationHost, ConnectionResolver, ConnectionStrategy, DispatchResult, NullSink,
};
use uuid::Uuid;

#[test]
fn test_hung_strategy_times_out_and_next_one_connects() {
    let host = ScriptedHost::new([
        Reply::Slow(Duration::from_secs(5), "late"),
        Reply::Handle("H"),
    ]);
    let started = Instant::now();

    let outcome = ConnectionResolver::rastr().resolve_with_timeout(
        &host,
        &mut NullSink,
        Duration::from_millis(50),
    );

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(outcome.handle().map(String::as_str), Some("H"));
    assert_eq!(outcome.failures().len(), 1);
    assert_eq!(outcome.failures()[0].message, "timed out after 50 ms");
    assert_eq!(host.call_count(), 2);
}

#[test]
fn test_fast_strategies_behave_like_plain_resolve() {
    let host = ScriptedHost::new([Reply::Fail("not registered"), Reply::Handle("H")]);

    let outcome = ConnectionResolver::rastr().resolve_with_timeout(
        &host,
        &mut NullSink,
        Duration::from_secs(5),
    );

    assert_eq!(outcome.handle().map(String::as_str), Some("H"));
    assert_eq!(
        outcome.failures()[0].to_string(),
        "ProgID('Astra.Rastr'): not registered"
    );
}

#[test]
fn test_unsupported_platform_spawns_nothing() {
    let host = ScriptedHost::unavailable("no COM");

    let outcome = ConnectionResolver::rastr().resolve_with_timeout(
        &host,
        &mut NullSink,
        Duration::from_millis(10),
    );

    assert!(!outcome.is_connected());
    assert_eq!(host.call_count(), 0);
}

/// Handle that counts how many instances have been released.
#[derive(Debug)]
struct Counted(Arc<AtomicUsize>);

impl Drop for Counted {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Every dispatch sleeps, then hands back a [`Counted`] handle.
#[derive(Clone)]
struct SlowHost {
    delay: Duration,
    dropped: Arc<AtomicUsize>,
}

impl SlowHost {
    fn answer(&self) -> DispatchResult<Counted> {
        thread::sleep(self.delay);
        Ok(Some(Counted(Arc::clone(&self.dropped))))
    }
}

impl AutomationHost for SlowHost {
    type Handle = Counted;

    fn availability(&self) -> Result<(), String> {
        Ok(())
    }

    fn dispatch(&self, _prog_id: &str) -> DispatchResult<Counted> {
        self.answer()
    }

    fn dispatch_by_guid(&self, _guid: &Uuid) -> DispatchResult<Counted> {
        self.answer()
    }

    fn dispatch_with_type_cache(&self, _guid: &Uuid) -> DispatchResult<Counted> {
        self.answer()
    }
}

#[test]
fn test_late_handle_from_abandoned_attempt_is_released() {
    let dropped = Arc::new(AtomicUsize::new(0));
    let host = SlowHost {
        delay: Duration::from_millis(200),
        dropped: Arc::clone(&dropped),
    };
    let resolver =
        ConnectionResolver::new(vec![ConnectionStrategy::prog_id("Astra.Rastr")]).unwrap();

    let outcome =
        resolver.resolve_with_timeout(&host, &mut NullSink, Duration::from_millis(20));

    assert!(!outcome.is_connected());
    assert_eq!(outcome.failures()[0].message, "timed out after 20 ms");

    // Give the worker time to finish and find nobody listening.
    let deadline = Instant::now() + Duration::from_secs(5);
    while dropped.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
}
