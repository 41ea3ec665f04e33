//! Retry policy for provider calls.
//!
//! Only authorization failures (401/403) are retried, and only after the
//! credential has been refreshed. Transport errors, timeouts and 5xx
//! responses are reported to the caller as they are.

use tokio::time::Instant;

use crate::descriptor::RequestDescriptor;

/// What to do after an authorization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Refresh the credential and send once more.
    Resend,
    /// The descriptor has no retries left.
    Exhausted,
    /// The caller's deadline passed; the retry must not be sent.
    DeadlineElapsed,
}

pub(crate) fn is_auth_failure(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// Decide whether an authorization failure on `descriptor` is retried.
pub fn decide(descriptor: &RequestDescriptor, now: Instant) -> RetryDecision {
    if descriptor.remaining_retries() == 0 {
        RetryDecision::Exhausted
    } else if descriptor.deadline_elapsed(now) {
        RetryDecision::DeadlineElapsed
    } else {
        RetryDecision::Resend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor::get(Url::parse("https://provider.example.com/cards").unwrap())
    }

    #[test]
    fn only_401_and_403_are_auth_failures() {
        assert!(is_auth_failure(401));
        assert!(is_auth_failure(403));
        for status in [200, 400, 404, 407, 500, 503] {
            assert!(!is_auth_failure(status));
        }
    }

    #[tokio::test]
    async fn resend_while_budget_remains() {
        assert_eq!(decide(&descriptor(), Instant::now()), RetryDecision::Resend);
    }

    #[tokio::test]
    async fn exhausted_after_one_retry() {
        let retried = descriptor().next_attempt();
        assert_eq!(decide(&retried, Instant::now()), RetryDecision::Exhausted);
    }

    #[tokio::test]
    async fn zero_budget_is_exhausted_even_past_deadline() {
        let now = Instant::now();
        let d = descriptor().with_auth_retries(0).with_deadline(now);
        assert_eq!(decide(&d, now), RetryDecision::Exhausted);
    }

    #[tokio::test]
    async fn elapsed_deadline_blocks_resend() {
        let now = Instant::now();
        let d = descriptor().with_deadline(now + Duration::from_millis(10));
        assert_eq!(decide(&d, now), RetryDecision::Resend);
        assert_eq!(
            decide(&d, now + Duration::from_millis(10)),
            RetryDecision::DeadlineElapsed
        );
    }
}
