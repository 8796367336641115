//! Memoized permission checks.
//!
//! The first caller to touch a protected capability pays for the check (and
//! any OS prompt it triggers); everyone after that reads the cached outcome.

use std::future::Future;
use std::time::Duration;

use tokio::sync::OnceCell;

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Granted,
    Denied,
}

/// Once-only, concurrency-safe cache of a permission outcome.
///
/// Concurrent callers during the first check wait for it instead of
/// prompting twice. A check that exceeds its timeout counts as denied.
#[derive(Debug, Default)]
pub struct AccessCache {
    state: OnceCell<AccessState>,
}

impl AccessCache {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::const_new(),
        }
    }

    /// Cached outcome, if a check has completed.
    pub fn cached(&self) -> Option<AccessState> {
        self.state.get().copied()
    }

    /// Return the cached outcome, running `check` first if nobody has yet.
    ///
    /// `check` yields `Ok(true)` for a grant and `Ok(false)` for a denial;
    /// both are cached, as is a check that outlives `timeout`. An `Err` means
    /// the check could not run at all: it is returned to the caller and the
    /// next caller checks again.
    pub async fn get_or_check<F, Fut, E>(&self, timeout: Duration, check: F) -> Result<AccessState, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        self.state
            .get_or_try_init(|| async move {
                match tokio::time::timeout(timeout, check()).await {
                    Ok(Ok(true)) => {
                        tracing::info!("Calendar automation access granted");
                        Ok(AccessState::Granted)
                    }
                    Ok(Ok(false)) => {
                        tracing::warn!("Calendar automation access denied");
                        Ok(AccessState::Denied)
                    }
                    Ok(Err(e)) => Err(e),
                    Err(_) => {
                        tracing::warn!(
                            timeout_secs = timeout.as_secs(),
                            "Calendar permission prompt timed out, treating as denied"
                        );
                        Ok(AccessState::Denied)
                    }
                }
            })
            .await
            .copied()
    }
}

static AUTOMATION_ACCESS: AccessCache = AccessCache::new();

/// Process-wide cache for the Calendar automation permission.
pub fn automation_access() -> &'static AccessCache {
    &AUTOMATION_ACCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn checks_once_and_memoizes() {
        let cache = AccessCache::new();
        let checks = AtomicUsize::new(0);

        for _ in 0..3 {
            let state = cache
                .get_or_check(Duration::from_secs(1), || async {
                    checks.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(true)
                })
                .await;
            assert_eq!(state, Ok(AccessState::Granted));
        }

        assert_eq!(checks.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached(), Some(AccessState::Granted));
    }

    #[tokio::test]
    async fn denial_is_cached_too() {
        let cache = AccessCache::new();
        assert_eq!(
            cache
                .get_or_check(Duration::from_secs(1), || async { Ok::<_, ()>(false) })
                .await,
            Ok(AccessState::Denied)
        );
        assert_eq!(
            cache
                .get_or_check(Duration::from_secs(1), || async { Ok::<_, ()>(true) })
                .await,
            Ok(AccessState::Denied)
        );
    }

    #[tokio::test]
    async fn timeout_counts_as_denied() {
        let cache = AccessCache::new();
        let state = cache
            .get_or_check(Duration::from_millis(20), || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ()>(true)
            })
            .await;
        assert_eq!(state, Ok(AccessState::Denied));
        assert_eq!(cache.cached(), Some(AccessState::Denied));
    }

    #[tokio::test]
    async fn check_errors_are_returned_and_not_cached() {
        let cache = AccessCache::new();

        let failed = cache
            .get_or_check(Duration::from_secs(1), || async { Err::<bool, _>("no osascript") })
            .await;
        assert_eq!(failed, Err("no osascript"));
        assert_eq!(cache.cached(), None);

        let retried = cache
            .get_or_check(Duration::from_secs(1), || async { Ok::<_, &str>(true) })
            .await;
        assert_eq!(retried, Ok(AccessState::Granted));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_check() {
        let cache = Arc::new(AccessCache::new());
        let checks = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let checks = Arc::clone(&checks);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_check(Duration::from_secs(1), || async move {
                        checks.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ()>(true)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(AccessState::Granted));
        }
        assert_eq!(checks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn global_cache_is_a_single_instance() {
        assert!(std::ptr::eq(automation_access(), automation_access()));
    }
}
