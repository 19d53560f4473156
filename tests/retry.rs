//! Retry-loop behavior tests.
//!
//! These drive [`CodeRetriever`] with a scripted in-memory backend under
//! tokio's paused clock, so sleep counts and spacing are asserted exactly
//! without real waiting.

use async_trait::async_trait;
use otp_inbox::{CodeRetriever, Error, FetchedCode, MailboxBackend, Result, RetryPolicy};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// What one scripted fetch call should produce.
enum Step {
    Code(&'static str),
    Empty,
    Fail,
}

/// Backend that replays a fixed script and counts calls.
struct ScriptedBackend {
    script: VecDeque<Step>,
    fetch_calls: u32,
    cleanup_calls: u32,
    cleanup_result: bool,
}

impl ScriptedBackend {
    fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            fetch_calls: 0,
            cleanup_calls: 0,
            cleanup_result: true,
        }
    }

    fn with_failing_cleanup(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            cleanup_result: false,
            ..Self::new(steps)
        }
    }
}

#[async_trait]
impl MailboxBackend for ScriptedBackend {
    async fn fetch(&mut self) -> Result<Option<FetchedCode>> {
        self.fetch_calls += 1;
        match self.script.pop_front() {
            Some(Step::Code(code)) => Ok(Some(FetchedCode {
                code: code.into(),
                message_id: Some("7".into()),
            })),
            Some(Step::Empty) | None => Ok(None),
            Some(Step::Fail) => Err(Error::ProbesExhausted { rounds: 20 }),
        }
    }

    async fn cleanup(&mut self, _found: &FetchedCode) -> bool {
        self.cleanup_calls += 1;
        self.cleanup_result
    }
}

fn policy(max_retries: u32, interval_secs: u64) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_secs(interval_secs))
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_never_sleeps() {
    let backend = ScriptedBackend::new([Step::Code("482910")]);
    let mut retriever = CodeRetriever::new(backend, policy(5, 30)).unwrap();

    let start = Instant::now();
    let code = retriever.retrieve().await.unwrap();

    assert_eq!(code, "482910");
    assert_eq!(start.elapsed(), Duration::ZERO);

    let backend = retriever.into_backend();
    assert_eq!(backend.fetch_calls, 1);
    assert_eq!(backend.cleanup_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_success_mid_sequence_stops_early() {
    let backend = ScriptedBackend::new([Step::Empty, Step::Fail, Step::Code("654321")]);
    let mut retriever = CodeRetriever::new(backend, policy(5, 30)).unwrap();

    let start = Instant::now();
    let code = retriever.retrieve().await.unwrap();

    assert_eq!(code, "654321");
    // Two failed attempts, one sleep after each; none after the success
    assert_eq!(start.elapsed(), Duration::from_secs(60));
    assert_eq!(retriever.backend().fetch_calls, 3);
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_reports_attempt_count() {
    let backend = ScriptedBackend::new([Step::Empty, Step::Empty, Step::Empty]);
    let mut retriever = CodeRetriever::new(backend, policy(3, 10)).unwrap();

    let start = Instant::now();
    let result = retriever.retrieve().await;

    match result {
        Err(Error::RetriesExhausted { attempts }) => assert_eq!(attempts, 3),
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }

    // N attempts, N-1 sleeps: no sleep after the final attempt
    assert_eq!(start.elapsed(), Duration::from_secs(20));
    assert_eq!(retriever.backend().fetch_calls, 3);
    assert_eq!(retriever.backend().cleanup_calls, 0);
}

#[tokio::test(start_paused = true)]
async fn test_backend_errors_absorbed_as_failed_attempts() {
    let backend = ScriptedBackend::new([Step::Fail, Step::Code("111222")]);
    let mut retriever = CodeRetriever::new(backend, policy(5, 30)).unwrap();

    let code = retriever.retrieve().await.unwrap();

    assert_eq!(code, "111222");
    assert_eq!(retriever.backend().fetch_calls, 2);
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_failure_is_not_fatal() {
    let backend = ScriptedBackend::with_failing_cleanup([Step::Code("482910")]);
    let mut retriever = CodeRetriever::new(backend, policy(5, 30)).unwrap();

    let code = retriever.retrieve().await.unwrap();

    assert_eq!(code, "482910");
    assert_eq!(retriever.backend().cleanup_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_success_on_last_attempt_skips_trailing_sleep() {
    let backend = ScriptedBackend::new([Step::Empty, Step::Code("482910")]);
    let mut retriever = CodeRetriever::new(backend, policy(2, 10)).unwrap();

    let start = Instant::now();
    let code = retriever.retrieve().await.unwrap();

    assert_eq!(code, "482910");
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test]
async fn test_zero_max_retries_rejected() {
    let backend = ScriptedBackend::new([]);
    let result = CodeRetriever::new(backend, policy(0, 10));

    assert!(matches!(result, Err(Error::InvalidConfig { .. })));
}
