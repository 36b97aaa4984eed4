// Leak-signal behavior of the resource guard, observed through unwinding.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use loadstone::api::{LeakInfo, ResourceGuard};

fn pool_handle_info() -> LeakInfo {
    LeakInfo {
        symbol: "pool-handle-3".to_string(),
        description: "A pool handle borrowed from the native addon.".to_string(),
        release_fn: "pool.close()".to_string(),
        resource_class: "PoolHandle".to_string(),
    }
}

#[test]
fn explicit_release_keeps_later_scopes_quiet() {
    let released = Arc::new(AtomicUsize::new(0));

    let result = std::panic::catch_unwind({
        let released = Arc::clone(&released);
        move || {
            let guard = ResourceGuard::protect(
                move || {
                    released.fetch_add(1, Ordering::SeqCst);
                },
                pool_handle_info(),
            );
            guard.release();
            // Guard storage is gone here; nothing is left to fire later.
        }
    });

    assert!(result.is_ok());
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn forgotten_release_raises_exactly_one_signal_with_the_payload() {
    let released = Arc::new(AtomicUsize::new(0));

    let result = std::panic::catch_unwind({
        let released = Arc::clone(&released);
        move || {
            let _guard = ResourceGuard::protect(
                move || {
                    released.fetch_add(1, Ordering::SeqCst);
                },
                pool_handle_info(),
            );
        }
    });

    let payload = result.expect_err("leak must raise");
    let message = payload
        .downcast_ref::<String>()
        .expect("string panic payload");
    assert!(message.contains("PoolHandle pool-handle-3"));
    assert!(message.contains("Call pool.close()"));
    assert!(message.contains("may still be reclaimed"));
    assert_eq!(released.load(Ordering::SeqCst), 0);
}

#[test]
fn guards_are_independent_per_resource() {
    let calls = Arc::new(AtomicUsize::new(0));

    let result = std::panic::catch_unwind({
        let calls = Arc::clone(&calls);
        move || {
            let first = ResourceGuard::protect(
                {
                    let calls = Arc::clone(&calls);
                    move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                    }
                },
                pool_handle_info(),
            );
            let second = ResourceGuard::protect(
                {
                    let calls = Arc::clone(&calls);
                    move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                    }
                },
                LeakInfo {
                    symbol: "pool-handle-4".to_string(),
                    ..pool_handle_info()
                },
            );
            first.release();
            second.release();
        }
    });

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
