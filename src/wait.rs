//! Bounded-time readiness polling
//!
//! External state (container network attachment, cluster node conditions)
//! converges on its own schedule; this module provides the single polling
//! primitive used to wait for it. Every wait in the crate is a bounded poll
//! loop, never a retry of a failed action.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::{Error, Result};

/// Poll `check` until it yields a value or `timeout` elapses.
///
/// `check` reports `Ok(Some(value))` when the awaited state has been reached,
/// `Ok(None)` when it has not (the loop sleeps for `poll_interval` and asks
/// again), and `Err(_)` for a hard failure, which propagates immediately
/// rather than being retried. Transient absence and hard failure are
/// deliberately distinct: a check that cannot even be evaluated should abort
/// the wait, not burn the rest of the deadline.
///
/// On timeout, fails with [`Error::ReadinessTimeout`] carrying
/// `failure_message`. The deadline is checked at the top of each iteration,
/// so the error is produced only after `timeout` has actually elapsed.
pub async fn wait_until<T, F, Fut>(
    timeout: Duration,
    poll_interval: Duration,
    failure_message: impl Into<String>,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    let failure_message = failure_message.into();

    loop {
        if start.elapsed() > timeout {
            return Err(Error::readiness_timeout(failure_message, timeout));
        }

        match check().await? {
            Some(value) => return Ok(value),
            None => trace!("condition not yet met, polling again"),
        }

        tokio::time::sleep(poll_interval).await;
    }
}
