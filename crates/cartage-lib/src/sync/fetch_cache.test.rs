use super::*;
use futures::FutureExt;
use std::cell::Cell;

const IDENTITY: &str = "github.com/carthage/carthage";

fn ready_operation() -> InFlight {
    futures::future::ready(Ok(None)).boxed().shared()
}

#[test]
fn test_second_caller_joins_in_flight_operation() {
    let cache = FetchCache::new();
    let starts = Cell::new(0);
    let start = || {
        starts.set(starts.get() + 1);
        ready_operation()
    };

    assert!(cache.join_or_start(IDENTITY, || true, |_| start()).is_some());
    assert!(cache.join_or_start(IDENTITY, || true, |_| start()).is_some());
    assert!(cache.join_or_start(IDENTITY, || false, |_| start()).is_some());
    assert_eq!(starts.get(), 1);
}

#[test]
fn test_fresh_entry_is_skipped_only_when_mirrored() {
    let cache = FetchCache::new();
    cache.join_or_start(IDENTITY, || false, |_| ready_operation());
    cache.finish(IDENTITY, true);

    assert!(cache.is_fresh(IDENTITY));
    assert!(cache.join_or_start(IDENTITY, || true, |_| ready_operation()).is_none());
    assert!(cache.join_or_start(IDENTITY, || false, |_| ready_operation()).is_some());
}

#[test]
fn test_failed_operation_is_not_stamped() {
    let cache = FetchCache::new();
    cache.join_or_start(IDENTITY, || false, |_| ready_operation());
    cache.finish(IDENTITY, false);

    assert!(cache.last_fetch(IDENTITY).is_none());
    assert!(cache.join_or_start(IDENTITY, || true, |_| ready_operation()).is_some());
}

#[test]
fn test_clear_fetch_times_forces_refresh() {
    let cache = FetchCache::new();
    cache.join_or_start(IDENTITY, || false, |_| ready_operation());
    cache.finish(IDENTITY, true);

    cache.clear_fetch_times();

    assert!(!cache.is_fresh(IDENTITY));
    assert!(cache.join_or_start(IDENTITY, || true, |_| ready_operation()).is_some());
}

#[test]
fn test_zero_interval_never_skips() {
    let cache = FetchCache::with_interval(Duration::ZERO);
    cache.join_or_start(IDENTITY, || false, |_| ready_operation());
    cache.finish(IDENTITY, true);

    assert!(cache.join_or_start(IDENTITY, || true, |_| ready_operation()).is_some());
}

#[test]
fn test_identities_are_independent() {
    let cache = FetchCache::new();
    cache.join_or_start(IDENTITY, || false, |_| ready_operation());
    cache.finish(IDENTITY, true);

    assert!(!cache.is_fresh("github.com/reactivex/rxswift"));
    assert!(
        cache
            .join_or_start("github.com/reactivex/rxswift", || true, |_| ready_operation())
            .is_some()
    );
}

#[test]
fn test_existence_is_checked_under_entry_lock() {
    let cache = FetchCache::new();
    let checks = Cell::new(0);
    let mirror_exists = || {
        checks.set(checks.get() + 1);
        true
    };

    // Joining a running clone never looks at the mirror
    cache.join_or_start(IDENTITY, || false, |_| ready_operation());
    assert!(cache.join_or_start(IDENTITY, mirror_exists, |_| ready_operation()).is_some());
    assert_eq!(checks.get(), 0);

    // A caller arriving just after that clone lands sees the fresh mirror
    cache.finish(IDENTITY, true);
    let restarted = Cell::new(false);
    let operation = cache.join_or_start(IDENTITY, mirror_exists, |_| {
        restarted.set(true);
        ready_operation()
    });
    assert!(operation.is_none());
    assert!(!restarted.get());
    assert_eq!(checks.get(), 1);
}

#[test]
fn test_start_receives_existence_check() {
    let cache = FetchCache::new();
    let seen = Cell::new(None);
    cache.join_or_start(IDENTITY, || false, |exists| {
        seen.set(Some(exists));
        ready_operation()
    });
    cache.finish(IDENTITY, true);
    cache.clear_fetch_times();
    cache.join_or_start(IDENTITY, || true, |exists| {
        assert!(exists);
        ready_operation()
    });

    assert_eq!(seen.get(), Some(false));
}
