//! Retrying Invoker — absorbs the generation service's rate limits.
//!
//! Only throttling is retried, with a fixed backoff. Callers never see a raw
//! throttling signal: they get either the response, `GenerationFailed`, or
//! `RetryExhausted`.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::llm_client::TextGenerator;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Generation service still rate limited after {attempts} attempts")]
    RetryExhausted { attempts: u32 },
}

/// Fixed-interval retry policy for throttled calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff: BACKOFF,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RetryingInvoker {
    policy: RetryPolicy,
}

impl RetryingInvoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Calls `generator` with `prompt`, sleeping `backoff` between throttled attempts.
    pub async fn invoke(
        &self,
        generator: &dyn TextGenerator,
        prompt: &str,
    ) -> Result<String, InvokeError> {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match generator.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_throttled() => {
                    if attempt == max_attempts {
                        break;
                    }
                    warn!(
                        "Generation attempt {}/{} throttled ({}), retrying after {}s...",
                        attempt,
                        max_attempts,
                        e,
                        self.policy.backoff.as_secs()
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Err(e) => return Err(InvokeError::GenerationFailed(e.to_string())),
            }
        }

        warn!("Generation still throttled after {max_attempts} attempts, giving up");
        Err(InvokeError::RetryExhausted {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::GenerationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Plays back a fixed script of outcomes, then repeats the last one.
    struct ScriptedGenerator {
        script: Mutex<Vec<Result<String, GenerationError>>>,
        calls: AtomicU32,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.remove(0)
            } else {
                match &script[0] {
                    Ok(text) => Ok(text.clone()),
                    Err(GenerationError::Throttled(m)) => Err(GenerationError::Throttled(m.clone())),
                    Err(GenerationError::Rejected(m)) => Err(GenerationError::Rejected(m.clone())),
                    Err(_) => Err(GenerationError::EmptyContent),
                }
            }
        }
    }

    fn throttled() -> Result<String, GenerationError> {
        Err(GenerationError::Throttled("quota".to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_throttled_makes_exactly_three_calls() {
        let generator = ScriptedGenerator::new(vec![throttled()]);
        let started = tokio::time::Instant::now();

        let err = RetryingInvoker::default()
            .invoke(&generator, "prompt")
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::RetryExhausted { attempts: 3 }));
        assert_eq!(generator.calls(), 3);
        // Two backoffs between three attempts, none after the last.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_throttling_failure_is_not_retried() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::Rejected(
            "prompt blocked (SAFETY)".to_string(),
        ))]);
        let started = tokio::time::Instant::now();

        let err = RetryingInvoker::default()
            .invoke(&generator, "prompt")
            .await
            .unwrap_err();

        assert_eq!(generator.calls(), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
        match err {
            InvokeError::GenerationFailed(reason) => assert!(reason.contains("SAFETY")),
            other => panic!("expected GenerationFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_one_throttle() {
        let generator = ScriptedGenerator::new(vec![throttled(), Ok("[]".to_string())]);

        let text = RetryingInvoker::default()
            .invoke(&generator, "prompt")
            .await
            .unwrap();

        assert_eq!(text, "[]");
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_throttle_propagates_immediately() {
        let generator = ScriptedGenerator::new(vec![throttled(), Err(GenerationError::EmptyContent)]);

        let err = RetryingInvoker::default()
            .invoke(&generator, "prompt")
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::GenerationFailed(_)));
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_first_success_makes_one_call() {
        let generator = ScriptedGenerator::new(vec![Ok("answer".to_string())]);

        let text = RetryingInvoker::default()
            .invoke(&generator, "prompt")
            .await
            .unwrap();

        assert_eq!(text, "answer");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy_bounds_attempts() {
        let generator = ScriptedGenerator::new(vec![throttled()]);
        let invoker = RetryingInvoker::new(RetryPolicy {
            max_attempts: 5,
            backoff: Duration::from_millis(50),
        });

        let err = invoker.invoke(&generator, "prompt").await.unwrap_err();

        assert!(matches!(err, InvokeError::RetryExhausted { attempts: 5 }));
        assert_eq!(generator.calls(), 5);
    }

    #[test]
    fn test_default_policy_is_three_attempts_ten_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(10));
    }
}
