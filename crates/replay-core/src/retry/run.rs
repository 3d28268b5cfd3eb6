//! Retry loop: run an async operation until success or the policy says stop.

use std::future::Future;
use std::time::Duration;

use crate::classify::Classify;
use crate::control::CancellationToken;

use super::error::RetryError;
use super::policy::{RetryDecision, RetryPolicy};

pub(super) type ShouldRetry<'a, E> = Box<dyn Fn(&E) -> bool + Send + Sync + 'a>;
pub(super) type OnRetry<'a, E> = Box<dyn FnMut(u32, Duration, &E) + Send + 'a>;

/// Hooks for a single `retry` call. All fields are optional.
pub struct RetryOptions<'a, E> {
    pub(super) should_retry: Option<ShouldRetry<'a, E>>,
    pub(super) on_retry: Option<OnRetry<'a, E>>,
    pub(super) cancel: Option<CancellationToken>,
}

impl<E> Default for RetryOptions<'_, E> {
    fn default() -> Self {
        Self {
            should_retry: None,
            on_retry: None,
            cancel: None,
        }
    }
}

impl<'a, E> RetryOptions<'a, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the classifier-derived retryability check.
    pub fn should_retry(mut self, f: impl Fn(&E) -> bool + Send + Sync + 'a) -> Self {
        self.should_retry = Some(Box::new(f));
        self
    }

    /// Called as `(attempt, delay, error)` before each backoff sleep.
    pub fn on_retry(mut self, f: impl FnMut(u32, Duration, &E) + Send + 'a) -> Self {
        self.on_retry = Some(Box::new(f));
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Runs `operation` until it succeeds or the policy says to stop.
///
/// The closure receives the 0-based attempt index. The final error is the
/// operation's own error, wrapped in `RetryError::Failed`.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    options: RetryOptions<'_, E>,
    operation: F,
) -> Result<T, RetryError<E>>
where
    E: Classify,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let RetryOptions {
        should_retry,
        mut on_retry,
        cancel,
    } = options;
    let mut attempts = 0;
    drive(
        policy,
        should_retry.as_deref(),
        on_retry.as_deref_mut(),
        cancel.as_ref(),
        &mut attempts,
        operation,
    )
    .await
}

/// Shared loop for `retry` and `RetryHandle::execute`. `attempts` counts
/// invocations as they start.
pub(super) async fn drive<T, E, F, Fut>(
    policy: &RetryPolicy,
    should_retry: Option<&(dyn Fn(&E) -> bool + Send + Sync + '_)>,
    mut on_retry: Option<&mut (dyn FnMut(u32, Duration, &E) + Send + '_)>,
    cancel: Option<&CancellationToken>,
    attempts: &mut u32,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    E: Classify,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(RetryError::Cancelled);
        }
        *attempts = attempt + 1;
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let classified = err.classify();
        let retryable = match should_retry {
            Some(predicate) => predicate(&err),
            None => classified.is_retryable(),
        };
        let delay = match policy.decide(attempt, retryable) {
            RetryDecision::NoRetry => {
                tracing::debug!(attempt, kind = %classified.kind, retryable, "giving up");
                return Err(RetryError::Failed(err));
            }
            RetryDecision::RetryAfter(d) => d,
        };

        tracing::warn!(
            attempt = attempt + 1,
            max = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            kind = %classified.kind,
            "retrying after transient error"
        );
        if let Some(cb) = on_retry.as_deref_mut() {
            cb(attempt, delay, &err);
        }

        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => return Err(RetryError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            None => tokio::time::sleep(delay).await,
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifiedError, ErrorKind};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn err(kind: ErrorKind) -> ClassifiedError {
        ClassifiedError::new(kind, kind.as_str())
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_retryable_runs_max_plus_one_times() {
        let calls = AtomicU32::new(0);
        let mut seen = Vec::new();
        let start = tokio::time::Instant::now();

        let result: Result<(), _> = retry(
            &RetryPolicy::default(),
            RetryOptions::new().on_retry(|attempt, delay, e: &ClassifiedError| {
                seen.push((attempt, delay, e.kind));
            }),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(err(ErrorKind::Network)) }
            },
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.unwrap_err().into_inner(), Some(err(ErrorKind::Network)));
        assert_eq!(
            seen,
            vec![
                (0, Duration::from_millis(1000), ErrorKind::Network),
                (1, Duration::from_millis(2000), ErrorKind::Network),
                (2, Duration::from_millis(4000), ErrorKind::Network),
            ]
        );
        assert!(start.elapsed() >= Duration::from_millis(7000));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_runs_once() {
        for kind in [
            ErrorKind::Auth,
            ErrorKind::Forbidden,
            ErrorKind::Validation,
            ErrorKind::NotFound,
            ErrorKind::RateLimited,
            ErrorKind::Unknown,
        ] {
            let calls = AtomicU32::new(0);
            let policy = RetryPolicy {
                max_retries: 10,
                ..RetryPolicy::default()
            };
            let result: Result<(), _> = retry(&policy, RetryOptions::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(err(kind)) }
            })
            .await;
            assert_eq!(calls.load(Ordering::SeqCst), 1, "{kind}");
            assert!(result.is_err());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let result = retry(&RetryPolicy::default(), RetryOptions::new(), |attempt| async move {
            if attempt < 2 {
                Err(err(ErrorKind::Server))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_retry_override() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(
            &RetryPolicy::default(),
            RetryOptions::new().should_retry(|e: &ClassifiedError| e.kind == ErrorKind::RateLimited),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(err(ErrorKind::RateLimited)) }
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let calls = AtomicU32::new(0);
        let _: Result<(), _> = retry(
            &RetryPolicy::default(),
            RetryOptions::new().should_retry(|_: &ClassifiedError| false),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(err(ErrorKind::Network)) }
            },
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_backoff_stops_loop() {
        let token = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));
        let trigger = token.clone();
        let counter = Arc::clone(&calls);
        let result: Result<(), _> = retry(
            &RetryPolicy::default(),
            RetryOptions::new()
                .cancel_token(token)
                .on_retry(move |_, _, _: &ClassifiedError| trigger.cancel()),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(err(ErrorKind::Timeout)) }
            },
        )
        .await;
        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pre_cancelled_token_never_invokes() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryError<ClassifiedError>> = retry(
            &RetryPolicy::default(),
            RetryOptions::new().cancel_token(token),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            },
        )
        .await;
        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
