//! Bounded retry-with-delay for strategies that wait on data arriving out of band

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// How often and how long a polling strategy waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_millis(500),
        }
    }
}

/// Sleep `interval`, then run `check`, up to `attempts` times.
///
/// Returns the first `Some` produced by `check`, or `Ok(None)` once every attempt
/// is used up. Exhaustion is a normal outcome, not an error.
pub async fn poll_until<T, E, F, Fut>(settings: PollSettings, mut check: F) -> Result<Option<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    for attempt in 1..=settings.attempts {
        tokio::time::sleep(settings.interval).await;
        if let Some(value) = check(attempt).await? {
            return Ok(Some(value));
        }
        debug!("Poll attempt {}/{} found nothing", attempt, settings.attempts);
    }
    Ok(None)
}
