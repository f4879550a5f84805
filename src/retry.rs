use anyhow::Result;
use log::warn;
use std::future::Future;
use std::time::Duration;

/// Fixed-interval retry, no backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Runs `op` until it succeeds or `max_attempts` is used up.
    ///
    /// Every failed attempt is logged against `what`. The delay is only
    /// slept between attempts, never after the last one.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return Some(value),
                Err(e) => {
                    warn!(
                        "{} failed (attempt {}/{}): {:#}",
                        what, attempt, self.max_attempts, e
                    );
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.delay).await;
            }
        }

        None
    }
}
