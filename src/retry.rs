//! Rate-limit handling for the HTTP collaborators.
//!
//! Only [`AtelierError::RateLimit`] is retried. Everything else, including a
//! missing record or a malformed payload, goes straight back to the caller.

use crate::config::RetryConfig;
use crate::{AtelierError, Result};
use std::future::Future;
use std::time::Duration;

/// Value returned by a call that may have been rate limited on the way.
#[derive(Debug)]
pub struct Retried<T> {
    pub value: T,
    /// Rate-limit responses absorbed before the call went through
    pub retries: u32,
    /// Seconds slept in total
    pub waited_secs: u64,
}

/// Seconds to sleep before retry number `retries` (0-based).
///
/// The provider's `Retry-After` plus `base_delay * 2^retries`, never more
/// than `max_delay`.
pub fn backoff_delay(config: &RetryConfig, retry_after: u64, retries: u32) -> u64 {
    let exponential = config.base_delay.saturating_mul(2_u64.saturating_pow(retries));
    retry_after.saturating_add(exponential).min(config.max_delay)
}

/// Run `call` until it is no longer rate limited or `max_retries` is spent.
///
/// `label` names the call in logs; it must not contain credentials.
pub async fn retry_rate_limited<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut call: F,
) -> Result<Retried<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries = 0;
    let mut waited_secs = 0;

    loop {
        let retry_after = match call().await {
            Ok(value) => {
                if retries > 0 {
                    log::debug!("{label} went through after {retries} rate-limited attempt(s)");
                }
                return Ok(Retried {
                    value,
                    retries,
                    waited_secs,
                });
            }
            Err(AtelierError::RateLimit { retry_after }) => retry_after,
            Err(other) => return Err(other),
        };

        if retries >= config.max_retries {
            log::warn!("{label}: provider still rate limiting after {retries} retries, giving up");
            return Err(AtelierError::RateLimit { retry_after });
        }

        let delay = backoff_delay(config, retry_after, retries);
        log::info!(
            "{label}: rate limited by provider, sleeping {delay}s (retry {}/{})",
            retries + 1,
            config.max_retries
        );
        tokio::time::sleep(Duration::from_secs(delay)).await;
        retries += 1;
        waited_secs += delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn no_wait(max_retries: u32) -> RetryConfig {
        RetryConfig::disabled().with_max_retries(max_retries)
    }

    #[test]
    fn test_backoff_delay_is_capped() {
        let config = RetryConfig::default();
        assert_eq!(backoff_delay(&config, 0, 0), 2);
        assert_eq!(backoff_delay(&config, 1, 2), 9);
        assert_eq!(backoff_delay(&config, 50, 4), 60);
    }

    #[tokio::test]
    async fn test_first_answer_needs_no_retry() {
        let retried = retry_rate_limited(&no_wait(3), "GET /search", || async {
            Ok::<_, AtelierError>("Angèle")
        })
        .await
        .unwrap();

        assert_eq!(retried.value, "Angèle");
        assert_eq!(retried.retries, 0);
        assert_eq!(retried.waited_secs, 0);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_until_answered() {
        let calls = Cell::new(0);

        let retried = retry_rate_limited(&no_wait(2), "GET /top-tracks", || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(AtelierError::RateLimit { retry_after: 0 })
                } else {
                    Ok(10)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(retried.value, 10);
        assert_eq!(retried.retries, 2);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_with_the_last_retry_after() {
        let result = retry_rate_limited(&no_wait(1), "GET /artist", || async {
            Err::<(), _>(AtelierError::RateLimit { retry_after: 0 })
        })
        .await;

        assert!(matches!(result, Err(AtelierError::RateLimit { retry_after: 0 })));
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let calls = Cell::new(0);

        let result = retry_rate_limited(&no_wait(3), "GET /lyrics", || {
            calls.set(calls.get() + 1);
            async { Err::<(), _>(AtelierError::Http("status 503".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(AtelierError::Http(_))));
        assert_eq!(calls.get(), 1);
    }
}
