//! Stateful retry handle: attempt introspection, reset, and per-execute
//! success/failure callbacks.

use std::future::Future;
use std::time::Duration;

use crate::classify::Classify;
use crate::control::CancellationToken;

use super::error::RetryError;
use super::policy::RetryPolicy;
use super::run::{drive, OnRetry, ShouldRetry};

type OnSuccess<'a, T> = Box<dyn FnMut(&T) + Send + 'a>;
type OnFailure<'a, E> = Box<dyn FnMut(&RetryError<E>, u32) + Send + 'a>;

/// Reusable retry wrapper for one logical operation.
///
/// `execute` resets the attempt counter, runs the retry loop, then fires
/// exactly one of `on_success` / `on_failure`.
pub struct RetryHandle<'a, T, E> {
    policy: RetryPolicy,
    attempts: u32,
    should_retry: Option<ShouldRetry<'a, E>>,
    on_retry: Option<OnRetry<'a, E>>,
    on_success: Option<OnSuccess<'a, T>>,
    on_failure: Option<OnFailure<'a, E>>,
    cancel: Option<CancellationToken>,
}

impl<'a, T, E: Classify> RetryHandle<'a, T, E> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            should_retry: None,
            on_retry: None,
            on_success: None,
            on_failure: None,
            cancel: None,
        }
    }

    pub fn should_retry(mut self, f: impl Fn(&E) -> bool + Send + Sync + 'a) -> Self {
        self.should_retry = Some(Box::new(f));
        self
    }

    pub fn on_retry(mut self, f: impl FnMut(u32, Duration, &E) + Send + 'a) -> Self {
        self.on_retry = Some(Box::new(f));
        self
    }

    pub fn on_success(mut self, f: impl FnMut(&T) + Send + 'a) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Called with the final error and the number of invocations made.
    pub fn on_failure(mut self, f: impl FnMut(&RetryError<E>, u32) + Send + 'a) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Invocations made by the current (or last) `execute`.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_retries(&self) -> u32 {
        self.policy.max_retries
    }

    /// Whether another retry would be allowed after the attempts made so far.
    pub fn can_retry(&self) -> bool {
        self.attempts <= self.policy.max_retries
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub async fn execute<F, Fut>(&mut self, operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.attempts = 0;
        let result = drive(
            &self.policy,
            self.should_retry.as_deref(),
            self.on_retry.as_deref_mut(),
            self.cancel.as_ref(),
            &mut self.attempts,
            operation,
        )
        .await;

        match &result {
            Ok(value) => {
                if let Some(cb) = self.on_success.as_mut() {
                    cb(value);
                }
            }
            Err(e) => {
                if let Some(cb) = self.on_failure.as_mut() {
                    cb(e, self.attempts);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifiedError, ErrorKind};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn network() -> ClassifiedError {
        ClassifiedError::new(ErrorKind::Network, "offline")
    }

    #[tokio::test(start_paused = true)]
    async fn failure_callback_fires_once_with_attempts() {
        let successes = AtomicU32::new(0);
        let failures = AtomicU32::new(0);
        let reported = AtomicU32::new(0);
        let mut handle: RetryHandle<'_, (), ClassifiedError> = RetryHandle::new(RetryPolicy::default())
            .on_success(|_| {
                successes.fetch_add(1, Ordering::SeqCst);
            })
            .on_failure(|_, attempts| {
                failures.fetch_add(1, Ordering::SeqCst);
                reported.store(attempts, Ordering::SeqCst);
            });

        let result = handle.execute(|_| async { Err(network()) }).await;
        assert!(result.is_err());
        assert_eq!(handle.attempts(), 4);
        assert!(!handle.can_retry());
        drop(handle);
        assert_eq!(successes.load(Ordering::SeqCst), 0);
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert_eq!(reported.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn success_callback_and_reset() {
        let successes = AtomicU32::new(0);
        let mut handle: RetryHandle<'_, u32, ClassifiedError> =
            RetryHandle::new(RetryPolicy::default()).on_success(|v| {
                successes.fetch_add(*v, Ordering::SeqCst);
            });

        let value = handle
            .execute(|attempt| async move {
                if attempt == 0 {
                    Err(network())
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(handle.attempts(), 2);
        assert!(handle.can_retry());

        handle.reset();
        assert_eq!(handle.attempts(), 0);

        // A new execute starts counting from zero again.
        handle.execute(|_| async { Ok(1) }).await.unwrap();
        assert_eq!(handle.attempts(), 1);
        assert_eq!(handle.max_retries(), 3);
        drop(handle);
        assert_eq!(successes.load(Ordering::SeqCst), 8);
    }
}
