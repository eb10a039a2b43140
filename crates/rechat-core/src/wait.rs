//! Bounded polling — the one suspend/resume-with-deadline primitive behind
//! every "poll until condition or timeout" loop in the workspace.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// The condition never became true within the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut;

/// Poll `check` at `interval` until it returns true or `deadline` elapses.
///
/// The check runs once immediately; the deadline is measured from entry,
/// so a check that suspends does not extend the allowed time.
pub async fn await_condition<F, Fut>(
    mut check: F,
    interval: Duration,
    deadline: Duration,
) -> Result<(), TimedOut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    loop {
        if check().await {
            return Ok(());
        }
        if started.elapsed() + interval > deadline {
            return Err(TimedOut);
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_immediate_success() {
        let result = await_condition(
            || async { true },
            Duration::from_millis(10),
            Duration::from_millis(100),
        )
        .await;
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_success_after_polls() {
        let calls = AtomicUsize::new(0);
        let result = await_condition(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { n >= 2 }
            },
            Duration::from_millis(1),
            Duration::from_millis(500),
        )
        .await;
        assert_eq!(result, Ok(()));
        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_deadline_elapses() {
        let result = await_condition(
            || async { false },
            Duration::from_millis(5),
            Duration::from_millis(20),
        )
        .await;
        assert_eq!(result, Err(TimedOut));
    }
}
