//! Language-model enrichment seam
//!
//! The engine can hand each changed record to an external analyzer for a
//! natural-language description. The analyzer is a narrow trait the caller
//! implements over whatever API it talks to; the core only owns the retry
//! discipline around it. Enrichment is strictly additive: a failed or
//! disabled analyzer leaves the record's `llm_response` empty and never
//! influences status or classification.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Failure of a single analyzer call. Always recovered inside the
/// enrichment step; never propagates to the comparison caller.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
    #[error("analyzer request failed: {0}")]
    Request(String),
}

/// External collaborator producing a textual analysis of one change.
///
/// Implementations own their transport, authentication and per-call
/// timeout. Returning an empty string signals "no insight" and is not an
/// error. Calls should be idempotent-ish: the same input may be retried.
pub trait ChangeAnalyzer: Send + Sync {
    /// Analyze the change from `old_text` to `new_text`. Either side may be
    /// empty for added/deleted elements. `context` carries the element's
    /// heading path and page, when known.
    fn analyze(
        &self,
        old_text: &str,
        new_text: &str,
        context: Option<&str>,
    ) -> Result<String, EnrichError>;

    /// Whether the analyzer can currently serve calls. Disabled analyzers
    /// are skipped wholesale.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Analyzer stub for runs without enrichment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl ChangeAnalyzer for Disabled {
    fn analyze(&self, _: &str, _: &str, _: Option<&str>) -> Result<String, EnrichError> {
        Ok(String::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Bounded-retry parameters: attempt ceiling and exponential backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Backoff before retrying after the given 1-based failed attempt:
    /// `base_delay * 2^(attempt - 1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Explicit state of one bounded-retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    /// About to run the given 1-based attempt
    Pending { attempt: u32 },
    /// Attempt ceiling reached; terminal
    Exhausted,
}

/// Bounded-retry state machine. Each failure either yields the delay to
/// wait before the next attempt or transitions to the terminal state.
#[derive(Debug, Clone, Copy)]
pub struct BoundedRetry {
    policy: RetryPolicy,
    state: RetryState,
}

impl BoundedRetry {
    pub fn new(policy: RetryPolicy) -> Self {
        let state = if policy.max_attempts == 0 {
            RetryState::Exhausted
        } else {
            RetryState::Pending { attempt: 1 }
        };
        Self { policy, state }
    }

    /// Whether another attempt may run.
    pub fn can_attempt(&self) -> bool {
        matches!(self.state, RetryState::Pending { .. })
    }

    /// The attempt about to run, 1-based.
    pub fn attempt(&self) -> Option<u32> {
        match self.state {
            RetryState::Pending { attempt } => Some(attempt),
            RetryState::Exhausted => None,
        }
    }

    /// Record a failed attempt. Returns the backoff to apply before the
    /// next one, or `None` once the ceiling is reached.
    pub fn record_failure(&mut self) -> Option<Duration> {
        match self.state {
            RetryState::Pending { attempt } if attempt < self.policy.max_attempts => {
                self.state = RetryState::Pending {
                    attempt: attempt + 1,
                };
                Some(self.policy.delay_after(attempt))
            }
            _ => {
                self.state = RetryState::Exhausted;
                None
            }
        }
    }
}

/// Run one analyzer call under the retry policy, sleeping through backoff.
/// Exhaustion degrades to `None`.
pub fn analyze_with_retry(
    analyzer: &dyn ChangeAnalyzer,
    policy: RetryPolicy,
    old_text: &str,
    new_text: &str,
    context: Option<&str>,
) -> Option<String> {
    let mut retry = BoundedRetry::new(policy);
    while retry.can_attempt() {
        match analyzer.analyze(old_text, new_text, context) {
            Ok(response) => return Some(response),
            Err(error) => {
                let attempt = retry.attempt().unwrap_or(0);
                match retry.record_failure() {
                    Some(delay) => {
                        warn!(%error, attempt, ?delay, "analyzer call failed, retrying");
                        std::thread::sleep(delay);
                    }
                    None => {
                        warn!(%error, attempt, "analyzer call failed, giving up");
                    }
                }
            }
        }
    }
    None
}
