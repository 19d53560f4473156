//! # otp-inbox
//!
//! Async retrieval of emailed verification codes, over IMAP or a temp-mail
//! HTTP inbox.
//!
//! This crate provides a high-level, async API for:
//! - Polling a mailbox for a verification email and extracting its 6-digit code
//! - Two interchangeable transports: a direct IMAP connection (with optional
//!   SOCKS5 proxy support) and a tempmail.plus-shaped REST API
//! - Deleting the consumed message once its code has been read
//!
//! ## Features
//!
//! - **`observability`**: Enables OpenTelemetry integration for distributed
//!   tracing. Without this feature, tracing spans are still emitted but
//!   require no OTEL dependencies.
//!
//! ## Quick Start
//!
//! ```no_run
//! use otp_inbox::{Backend, CodeRetriever, ImapConfig, RetryPolicy};
//!
//! # async fn example() -> otp_inbox::Result<()> {
//! // Configure the IMAP transport
//! let config = ImapConfig::builder()
//!     .host("imap.example.com")
//!     .user("user@example.com")
//!     .password("app-password")  // Use app-specific password for Gmail
//!     .sender("no-reply@service.example")
//!     .build()?;
//!
//! // Select a backend and retrieve the code
//! let backend = Backend::select(Some(config), None)?;
//! let mut retriever = CodeRetriever::new(backend, RetryPolicy::default())?;
//!
//! let code = retriever.retrieve().await?;
//! println!("Got code: {code}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Using a temp-mail inbox
//!
//! ```no_run
//! use otp_inbox::{Backend, CodeRetriever, RetryPolicy, TempMailConfig};
//!
//! # async fn example() -> otp_inbox::Result<()> {
//! let config = TempMailConfig::builder()
//!     .username("pickup")
//!     .extension("@mailto.plus")
//!     .pin("1234")
//!     .build()?;
//!
//! let backend = Backend::select(None, Some(config))?;
//! let mut retriever = CodeRetriever::new(backend, RetryPolicy::default())?;
//! let code = retriever.retrieve().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Retry model
//!
//! Three nested budgets, all plain timed pauses:
//!
//! - The [`CodeRetriever`] makes up to `max_retries` attempts, spaced
//!   `retry_interval` apart. Every backend failure is absorbed as a failed
//!   attempt; only [`Error::RetriesExhausted`] ever surfaces.
//! - Within one IMAP attempt, the mailbox search is probed up to 20 rounds,
//!   3 seconds apart, while it comes back empty (mail-delivery latency).
//! - Deleting a consumed temp-mail message is retried up to 5 times, half a
//!   second apart, and is never fatal.
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Use
//! [`Error::is_retryable`] to classify failures:
//!
//! ```
//! use otp_inbox::Error;
//!
//! fn handle_error(error: &Error) {
//!     if error.is_retryable() {
//!         println!("Transient error: {}", error);
//!     } else {
//!         println!("Permanent error: {}", error);
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. All major operations emit
//! spans with structured fields.
//!
//! ### Span Naming Convention
//!
//! - `CodeRetriever::retrieve` - The outer retry loop
//! - `ImapBackend::fetch` - One IMAP probe cycle
//! - `TempMailBackend::fetch` - One temp-mail read
//! - `TempMailBackend::delete` - Temp-mail message deletion
//! - `session::authenticate` - IMAP authentication
//! - `connection::establish_tls` - TLS connection
//!
//! ### Standard Fields
//!
//! - `host` / `folder` - IMAP target
//! - `address` - Temp-mail inbox address
//! - `attempt` / `round` - Position within a retry or probe budget
//! - `message_id` / `uid` - Message being handled
//!
//! Enable the `observability` feature for OpenTelemetry integration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod backend;
pub mod code;
pub mod config;
pub mod error;
pub mod proxy;

// Internal modules
mod connection;
mod imap;
mod parser;
mod retriever;
mod session;
mod tempmail;

// Re-exports for ergonomic API
pub use backend::{Backend, FetchedCode, MailboxBackend};
pub use config::{
    ImapConfig, ImapConfigBuilder, ProbeConfig, RetryPolicy, TempMailConfig, TempMailConfigBuilder,
    TimeoutConfig, DEFAULT_TEMP_MAIL_API,
};
pub use error::{Error, ErrorCategory, Result};
pub use imap::ImapBackend;
pub use proxy::{ProxyAuth, Socks5Proxy};
pub use retriever::CodeRetriever;
pub use tempmail::TempMailBackend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // Ensure all public types are accessible
        let _ = ImapConfig::builder();
        let _ = TempMailConfig::builder();
        let _ = Socks5Proxy::new("localhost", 1080);
        let _ = RetryPolicy::default();
        assert_eq!(code::find_code("code 482910"), Some("482910"));
    }
}
