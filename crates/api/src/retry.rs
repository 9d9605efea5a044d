use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::RetryConfig;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.initial_backoff_ms, config.max_backoff_ms)
    }

    /// Retry a future with exponential backoff while `should_retry`
    /// accepts the error. Rejected errors are returned after one attempt.
    pub async fn retry<F, Fut, T, E, P>(&self, operation_name: &str, mut f: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(result);
                }
                Err(e) => {
                    attempt += 1;
                    if !should_retry(&e) {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %e,
                            "Operation failed with a non-retryable error"
                        );
                        return Err(e);
                    }
                    if attempt > self.max_retries {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %e,
                            "Operation failed after max retries"
                        );
                        return Err(e);
                    }

                    warn!(
                        operation = operation_name,
                        attempt = attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis(),
                        error = %e,
                        "Operation failed, retrying"
                    );

                    sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, self.max_backoff);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(3, 1, 4);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<&str, String> = policy
            .retry("annotate", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("503 Service Unavailable".to_string())
                } else {
                    Ok("ok")
                }
            }, |_| true)
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(2, 1, 2);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<(), String> = policy
            .retry("annotate", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("503 Service Unavailable".to_string())
            }, |_| true)
            .await;

        assert_eq!(result, Err("503 Service Unavailable".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_calls_once() {
        let policy = RetryPolicy::new(0, 1, 1);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<(), String> = policy
            .retry("annotate", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("503 Service Unavailable".to_string())
            }, |_| true)
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_is_attempted_once() {
        let policy = RetryPolicy::new(4, 1, 2);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<(), String> = policy
            .retry("annotate", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("401 Unauthorized".to_string())
            }, |e: &String| !e.starts_with("401"))
            .await;

        assert_eq!(result, Err("401 Unauthorized".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
