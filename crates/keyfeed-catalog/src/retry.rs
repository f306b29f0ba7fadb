//! Retry policies for upstream catalog requests.
//!
//! A [`RetryPolicy`] is a plain value: the attempt budget plus one
//! [`Backoff`] curve for rate-limit responses and one for other transient
//! failures. [`retry_with_policy`] drives any fallible async operation under
//! a policy. Non-retriable errors (401, 404, bad base URL) are returned
//! immediately without sleeping.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Upper bound for a server-requested `Retry-After` delay.
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// Delay curve between attempts. `attempt` is the 1-based number of the
/// attempt that just failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failure.
    Fixed(Duration),
    /// `base * attempt`.
    Linear(Duration),
    /// `base * 2^(attempt - 1)`.
    Exponential(Duration),
}

impl Backoff {
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match *self {
            Backoff::Fixed(base) => base,
            Backoff::Linear(base) => base.saturating_mul(attempt),
            Backoff::Exponential(base) => base.saturating_mul(1u32 << (attempt - 1).min(20)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first one. Always >= 1.
    pub max_attempts: u32,
    /// Curve applied after HTTP 429.
    pub rate_limited: Backoff,
    /// Curve applied after network errors, 5xx and malformed bodies.
    pub transient: Backoff,
}

impl RetryPolicy {
    /// Linear backoff for rate limiting and a fixed pause for other transient
    /// errors, both scaled from `base`.
    #[must_use]
    pub fn new(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            rate_limited: Backoff::Linear(base),
            transient: Backoff::Fixed(base),
        }
    }

    /// A policy that retries without sleeping. Used by tests.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// How long to wait after `attempt` failed with `err`.
    ///
    /// For rate limiting, a `Retry-After` hint from the server raises the
    /// delay to at least that many seconds (capped at one minute).
    #[must_use]
    pub fn delay_for(&self, err: &CatalogError, attempt: u32) -> Duration {
        match err {
            CatalogError::RateLimited {
                retry_after_secs, ..
            } => {
                let curve = self.rate_limited.delay(attempt);
                let hinted =
                    Duration::from_secs(retry_after_secs.unwrap_or(0).min(MAX_RETRY_AFTER_SECS));
                curve.max(hinted)
            }
            _ => self.transient.delay(attempt),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::Http(_)
        | CatalogError::RateLimited { .. }
        | CatalogError::UnexpectedStatus { .. }
        | CatalogError::Deserialize { .. }
        | CatalogError::MalformedPage { .. } => true,
        CatalogError::Unauthorized { .. }
        | CatalogError::NotFound { .. }
        | CatalogError::InvalidBaseUrl { .. } => false,
    }
}

/// Executes `operation` under `policy`, sleeping between retriable failures.
///
/// With `max_attempts = 3` the operation runs at most three times. When the
/// budget is exhausted the last error is returned.
pub(crate) async fn retry_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 1u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) || attempt >= policy.max_attempts {
            return Err(err);
        }

        let delay = policy.delay_for(&err, attempt);
        tracing::warn!(
            attempt,
            max_attempts = policy.max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient catalog error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited() -> CatalogError {
        CatalogError::RateLimited {
            url: "https://api.test/products".to_owned(),
            retry_after_secs: None,
        }
    }

    #[test]
    fn fixed_backoff_is_constant() {
        let b = Backoff::Fixed(Duration::from_millis(250));
        assert_eq!(b.delay(1), Duration::from_millis(250));
        assert_eq!(b.delay(5), Duration::from_millis(250));
    }

    #[test]
    fn linear_backoff_grows_with_attempt() {
        let b = Backoff::Linear(Duration::from_millis(100));
        assert_eq!(b.delay(1), Duration::from_millis(100));
        assert_eq!(b.delay(2), Duration::from_millis(200));
        assert_eq!(b.delay(3), Duration::from_millis(300));
    }

    #[test]
    fn exponential_backoff_doubles() {
        let b = Backoff::Exponential(Duration::from_millis(100));
        assert_eq!(b.delay(1), Duration::from_millis(100));
        assert_eq!(b.delay(2), Duration::from_millis(200));
        assert_eq!(b.delay(4), Duration::from_millis(800));
    }

    #[test]
    fn attempt_zero_is_treated_as_first() {
        let b = Backoff::Linear(Duration::from_millis(100));
        assert_eq!(b.delay(0), Duration::from_millis(100));
    }

    #[test]
    fn policy_uses_rate_limit_curve_for_429() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(
            policy.delay_for(&rate_limited(), 2),
            Duration::from_millis(1000)
        );
        let transient = CatalogError::UnexpectedStatus {
            status: 503,
            url: "u".to_owned(),
        };
        assert_eq!(policy.delay_for(&transient, 2), Duration::from_millis(500));
    }

    #[test]
    fn retry_after_hint_raises_delay_but_is_capped() {
        let policy = RetryPolicy::immediate(3);
        let err = CatalogError::RateLimited {
            url: "u".to_owned(),
            retry_after_secs: Some(5),
        };
        assert_eq!(policy.delay_for(&err, 1), Duration::from_secs(5));

        let err = CatalogError::RateLimited {
            url: "u".to_owned(),
            retry_after_secs: Some(3600),
        };
        assert_eq!(policy.delay_for(&err, 1), Duration::from_secs(60));
    }

    #[test]
    fn max_attempts_is_at_least_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn unauthorized_and_not_found_are_not_retriable() {
        assert!(!is_retriable(&CatalogError::Unauthorized { url: "u".into() }));
        assert!(!is_retriable(&CatalogError::NotFound { url: "u".into() }));
        assert!(is_retriable(&rate_limited()));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_policy(&RetryPolicy::immediate(3), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, CatalogError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn two_rate_limits_then_success_sleeps_twice() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let started = tokio::time::Instant::now();

        let result = retry_with_policy(&policy, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(rate_limited())
                } else {
                    Ok::<u32, CatalogError>(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms after the first 429, 200ms after the second.
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn returns_last_error_after_budget_is_spent() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_policy(&RetryPolicy::immediate(2), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, CatalogError>(rate_limited())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(result, Err(CatalogError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn unauthorized_is_returned_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_policy(&RetryPolicy::immediate(5), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, CatalogError>(CatalogError::Unauthorized {
                    url: "https://api.test/products".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(CatalogError::Unauthorized { .. })));
    }
}
