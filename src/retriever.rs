//! The outer retry loop that turns a backend into a verification code.
//!
//! # Example
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
//!
//! let code = retriever.retrieve().await?;
//! println!("Got code: {code}");
//! # Ok(())
//! # }
//! ```

use crate::backend::{Backend, MailboxBackend};
use crate::config::{ImapConfig, RetryPolicy, TempMailConfig};
use crate::error::{Error, Result};
use tracing::{debug, instrument, warn};

/// Bounded-retry driver over a [`MailboxBackend`].
///
/// Every backend failure - transport errors, malformed responses, spent probe
/// budgets - is absorbed and logged as a failed attempt; the loop only ever
/// surfaces [`Error::RetriesExhausted`]. A successful fetch triggers cleanup
/// of the consumed message and returns immediately.
#[derive(Debug)]
pub struct CodeRetriever<B = Backend> {
    backend: B,
    policy: RetryPolicy,
}

impl CodeRetriever<Backend> {
    /// Builds a retriever with the backend selected from configuration.
    ///
    /// IMAP wins when both configurations are present; see
    /// [`Backend::select`].
    ///
    /// # Errors
    ///
    /// Returns an error if neither configuration is given or the policy is
    /// invalid.
    pub fn select(
        imap: Option<ImapConfig>,
        temp_mail: Option<TempMailConfig>,
        policy: RetryPolicy,
    ) -> Result<Self> {
        Self::new(Backend::select(imap, temp_mail)?, policy)
    }
}

impl<B: MailboxBackend> CodeRetriever<B> {
    /// Creates a retriever over an already-constructed backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `policy.max_retries` is zero.
    pub fn new(backend: B, policy: RetryPolicy) -> Result<Self> {
        if policy.max_retries == 0 {
            return Err(Error::InvalidConfig {
                message: "max_retries must be at least 1".into(),
            });
        }

        Ok(Self { backend, policy })
    }

    /// Retrieves a verification code, retrying up to the configured budget.
    ///
    /// Sleeps `retry_interval` between attempts, never after the last one and
    /// never after a success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetriesExhausted`] when every attempt came back
    /// empty or failed.
    #[instrument(
        name = "CodeRetriever::retrieve",
        skip(self),
        fields(max_retries = self.policy.max_retries)
    )]
    pub async fn retrieve(&mut self) -> Result<String> {
        let max_retries = self.policy.max_retries;

        for attempt in 1..=max_retries {
            debug!(attempt, max_retries, "Fetching verification code");

            match self.backend.fetch().await {
                Ok(Some(found)) => {
                    if !self.backend.cleanup(&found).await {
                        warn!(
                            message_id = found.message_id.as_deref(),
                            "Source message could not be deleted"
                        );
                    }
                    debug!(attempt, "Verification code retrieved");
                    return Ok(found.code);
                }
                Ok(None) => {
                    warn!(attempt, max_retries, "No code found this attempt");
                }
                Err(error) => {
                    warn!(
                        attempt,
                        max_retries,
                        category = %error.category(),
                        error = %error,
                        "Attempt failed"
                    );
                }
            }

            if attempt < max_retries {
                tokio::time::sleep(self.policy.retry_interval).await;
            }
        }

        Err(Error::RetriesExhausted {
            attempts: max_retries,
        })
    }

    /// Returns the retry policy in effect.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the backend driven by this retriever.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the retriever, returning the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }
}
