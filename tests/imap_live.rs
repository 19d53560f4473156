//! Live IMAP tests for otp-inbox.
//!
//! These tests require a real IMAP mailbox and are disabled by default.
//! To run them:
//!
//! ```bash
//! # Set environment variables (a .env file works too)
//! export OTP_INBOX_TEST_HOST="imap.example.com"
//! export OTP_INBOX_TEST_USER="your@email.com"
//! export OTP_INBOX_TEST_PASSWORD="your-app-password"
//! export OTP_INBOX_TEST_SENDER="no-reply@service.example"
//!
//! # Optional
//! export OTP_INBOX_TEST_FOLDER="INBOX"
//!
//! # Run with the integration-tests feature
//! cargo test --features integration-tests -- --ignored
//! ```

use otp_inbox::{Backend, CodeRetriever, ImapBackend, ImapConfig, MailboxBackend, RetryPolicy};
use std::env;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn live_config() -> Option<ImapConfig> {
    dotenvy::dotenv().ok();

    let host = env::var("OTP_INBOX_TEST_HOST").ok()?;
    let user = env::var("OTP_INBOX_TEST_USER").ok()?;
    let password = env::var("OTP_INBOX_TEST_PASSWORD").ok()?;
    let sender = env::var("OTP_INBOX_TEST_SENDER").ok()?;

    let mut builder = ImapConfig::builder()
        .host(host)
        .user(user)
        .password(password)
        .sender(sender)
        // Keep probing short so an empty mailbox fails fast
        .probe_rounds(2)
        .probe_spacing(Duration::from_secs(1));

    if let Ok(folder) = env::var("OTP_INBOX_TEST_FOLDER") {
        builder = builder.folder(folder);
    }

    builder.build().ok()
}

#[tokio::test]
#[ignore = "requires real IMAP server"]
async fn test_fetch_against_live_mailbox() {
    init_tracing();
    let config = live_config().expect("test config from environment variables");

    let mut backend = ImapBackend::new(config);
    let result = backend.fetch().await;

    // Result depends on mailbox contents: a code, an empty inbox, or a spent
    // probe budget are all legitimate outcomes against a live server
    match result {
        Ok(Some(found)) => {
            assert_eq!(found.code.len(), 6);
            assert!(found.code.chars().all(|c| c.is_ascii_digit()));
        }
        Ok(None) => println!("Newest matching message carried no code"),
        Err(e) => {
            println!("Fetch failed: {e} (category: {})", e.category());
            assert!(e.is_retryable());
        }
    }
}

#[tokio::test]
#[ignore = "requires real IMAP server"]
async fn test_retrieve_with_short_budget() {
    init_tracing();
    let config = live_config().expect("test config from environment variables");

    let backend = Backend::select(Some(config), None).expect("backend");
    let mut retriever =
        CodeRetriever::new(backend, RetryPolicy::new(2, Duration::from_secs(1))).expect("policy");

    match retriever.retrieve().await {
        Ok(code) => {
            assert_eq!(code.len(), 6);
        }
        Err(e) => {
            // An empty mailbox exhausts the two attempts
            assert!(matches!(e, otp_inbox::Error::RetriesExhausted { attempts: 2 }));
        }
    }
}

#[tokio::test]
#[ignore = "requires intentionally wrong credentials"]
async fn test_invalid_credentials_fail_each_attempt() {
    init_tracing();

    let config = ImapConfig::builder()
        .host("imap.gmail.com")
        .user("test@gmail.com")
        .password("wrong-password")
        .sender("no-reply@service.example")
        .probe_rounds(1)
        .build()
        .expect("valid config structure");

    let mut backend = ImapBackend::new(config);
    let result = backend.fetch().await;

    let err = result.expect_err("login should fail");
    // Authentication errors are retryable (could be a temporary server issue)
    assert!(err.is_retryable());
}
