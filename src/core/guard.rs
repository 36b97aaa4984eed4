//! Purpose: Tie a native resource's release to a scoped owner and flag leaks.
//! Exports: `ResourceGuard`, `LeakInfo`, `leak_error`, `leak_message`.
//! Role: Safety net for resources handed out by the loaded addon.
//! Invariants: `release` consumes the guard; a released guard can never raise the leak signal.
//! Invariants: The guard never invokes the release callback on the leak path.

use crate::core::error::{Error, ErrorKind};

/// Diagnostic payload carried verbatim into the leak signal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeakInfo {
    /// Short symbolic name of the leaked resource instance.
    pub symbol: String,
    /// Human description of what the resource is.
    pub description: String,
    /// Name of the call the owner was supposed to make.
    pub release_fn: String,
    /// Name of the resource class.
    pub resource_class: String,
}

/// Composes the standard leak explanation from the diagnostic payload.
pub fn leak_message(info: &LeakInfo) -> String {
    format!(
        "{class} {symbol} was dropped without an explicit release. {description} \
         Call {release_fn} before the {class} goes out of scope. \
         The underlying native resource may still be reclaimed by its own \
         teardown, but this signal means the owning code skipped the release it owed.",
        class = info.resource_class,
        symbol = info.symbol,
        description = info.description,
        release_fn = info.release_fn,
    )
}

/// The leak signal as a crate error, for hosts that embed the guard.
pub fn leak_error(info: &LeakInfo) -> Error {
    Error::new(ErrorKind::ResourceLeak).with_message(leak_message(info))
}

/// Scoped guard pairing a release callback with its diagnostic payload.
///
/// Dropping an armed guard raises the leak signal as a panic. That signal is
/// a last-resort diagnostic for a missing release, not a cleanup path.
#[derive(Debug)]
pub struct ResourceGuard<R: FnOnce()> {
    release: Option<R>,
    info: LeakInfo,
}

impl<R: FnOnce()> ResourceGuard<R> {
    pub fn protect(release: R, info: LeakInfo) -> Self {
        Self {
            release: Some(release),
            info,
        }
    }

    pub fn info(&self) -> &LeakInfo {
        &self.info
    }

    /// Invokes the release callback and disarms the guard.
    pub fn release(mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(resource = %self.info.symbol, "releasing guarded resource");
            release();
        }
    }
}

impl<R: FnOnce()> Drop for ResourceGuard<R> {
    fn drop(&mut self) {
        if self.release.is_none() {
            return;
        }
        let message = leak_message(&self.info);
        if std::thread::panicking() {
            // A second panic here would abort and mask the first one.
            tracing::error!("{message}");
        } else {
            panic!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LeakInfo, ResourceGuard, leak_error, leak_message};
    use crate::core::error::ErrorKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn info() -> LeakInfo {
        LeakInfo {
            symbol: "session-7".to_string(),
            description: "A session handle owned by the embedding host.".to_string(),
            release_fn: "session.close()".to_string(),
            resource_class: "Session".to_string(),
        }
    }

    #[test]
    fn release_runs_the_callback_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let guard = ResourceGuard::protect(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            info(),
        );
        guard.release();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn released_guard_does_not_raise_on_drop() {
        let result = std::panic::catch_unwind(|| {
            let guard = ResourceGuard::protect(|| {}, info());
            guard.release();
        });
        assert!(result.is_ok());
    }

    #[test]
    fn dropping_an_armed_guard_raises_the_leak_signal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = std::panic::catch_unwind(move || {
            let _guard = ResourceGuard::protect(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                info(),
            );
        });

        let payload = result.expect_err("armed drop must panic");
        let message = payload
            .downcast_ref::<String>()
            .expect("panic payload is the composed message");
        assert!(message.contains("session-7"));
        assert!(message.contains("session.close()"));
        assert!(message.contains("Session"));
        // The leak path reports; it does not release.
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn leak_error_carries_the_composed_message() {
        let info = info();
        let err = leak_error(&info);
        assert_eq!(err.kind(), ErrorKind::ResourceLeak);
        assert_eq!(err.message(), Some(leak_message(&info).as_str()));
        assert!(err.message().unwrap().contains("may still be reclaimed"));
    }
}
