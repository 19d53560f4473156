//! Error types for the otp-inbox crate.
//!
//! All errors implement [`std::error::Error`] and carry context about what went
//! wrong. Backend errors are absorbed by the retry loop in
//! [`CodeRetriever`](crate::CodeRetriever); the only error that terminates a
//! retrieval is [`Error::RetriesExhausted`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while retrieving a verification code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid email address format.
    #[error("invalid email address: {address}")]
    InvalidEmailFormat {
        /// The invalid address.
        address: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid DNS name for TLS.
    #[error("invalid DNS name for host '{host}'")]
    InvalidDnsName {
        /// The invalid hostname.
        host: String,
        /// The underlying DNS name error.
        #[source]
        source: rustls::client::InvalidDnsNameError,
    },

    /// Failed to construct the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Network / connection errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to establish TCP connection.
    #[error("failed to connect to {target}")]
    TcpConnect {
        /// The target address that failed.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to establish TLS connection.
    #[error("failed to establish TLS connection to {target}")]
    TlsConnect {
        /// The target address that failed.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to connect via SOCKS5 proxy.
    #[error("failed to connect via SOCKS5 proxy {proxy_host} to {target}")]
    Socks5Connect {
        /// The SOCKS5 proxy hostname.
        proxy_host: String,
        /// The target address.
        target: String,
        /// The underlying SOCKS5 error.
        #[source]
        source: tokio_socks::Error,
    },

    /// An HTTP request to the temp-mail API failed before a response arrived.
    #[error("HTTP request to '{endpoint}' failed")]
    HttpRequest {
        /// The API endpoint that failed.
        endpoint: &'static str,
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Timeout errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// Connection timeout.
    #[error("connection timeout to {target} after {timeout:?}")]
    ConnectTimeout {
        /// The target address.
        target: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Authentication timeout.
    #[error("authentication timeout for {user} after {timeout:?}")]
    AuthTimeout {
        /// The login name used for authentication.
        user: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// An IMAP command did not complete in time.
    #[error("IMAP {command} timeout after {timeout:?}")]
    CommandTimeout {
        /// The command that timed out.
        command: &'static str,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // IMAP protocol errors (RETRYABLE - could be transient server issues)
    // ─────────────────────────────────────────────────────────────────────────
    /// IMAP login failed.
    #[error("IMAP login failed for {user}")]
    ImapLogin {
        /// The login name.
        user: String,
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// Failed to select a mailbox folder.
    #[error("failed to select folder '{folder}'")]
    SelectFolder {
        /// The folder name.
        folder: String,
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// IMAP search failed.
    #[error("IMAP search failed")]
    ImapSearch {
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// IMAP fetch failed.
    #[error("IMAP fetch failed for UID {uid}")]
    ImapFetch {
        /// The UID that failed.
        uid: u32,
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// Failed to flag a message as deleted.
    #[error("failed to mark UID {uid} deleted")]
    ImapStore {
        /// The UID that failed.
        uid: u32,
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// IMAP expunge failed.
    #[error("IMAP expunge failed")]
    ImapExpunge {
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// IMAP logout failed.
    #[error("IMAP logout failed")]
    ImapLogout {
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Malformed remote data (RETRYABLE - the next response may be fine)
    // ─────────────────────────────────────────────────────────────────────────
    /// The temp-mail API returned a response that could not be decoded.
    #[error("malformed response from '{endpoint}'")]
    MalformedResponse {
        /// The API endpoint whose response could not be decoded.
        endpoint: &'static str,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Budget exhaustion
    // ─────────────────────────────────────────────────────────────────────────
    /// The inner IMAP probe loop ran out of rounds without seeing a matching
    /// message. Absorbed by the outer retry loop as a failed attempt.
    #[error("no matching message after {rounds} probe rounds")]
    ProbesExhausted {
        /// The number of probe rounds performed.
        rounds: u32,
    },

    /// All retry attempts were spent without obtaining a code. This is the
    /// only error surfaced by
    /// [`CodeRetriever::retrieve`](crate::CodeRetriever::retrieve).
    #[error("no verification code after {attempts} attempts")]
    RetriesExhausted {
        /// The number of attempts performed.
        attempts: u32,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might
    /// succeed on a later attempt.
    ///
    /// The retry loop continues on every backend error regardless; this
    /// classification exists for logging and for callers that wrap the
    /// retrieval in their own policy.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            // RETRYABLE: network, timeouts, IMAP operations, malformed data,
            // and a spent probe budget (mail may still be in flight)
            Error::TcpConnect { .. }
            | Error::TlsConnect { .. }
            | Error::Socks5Connect { .. }
            | Error::HttpRequest { .. }
            | Error::ConnectTimeout { .. }
            | Error::AuthTimeout { .. }
            | Error::CommandTimeout { .. }
            | Error::ImapLogin { .. }
            | Error::SelectFolder { .. }
            | Error::ImapSearch { .. }
            | Error::ImapFetch { .. }
            | Error::ImapStore { .. }
            | Error::ImapExpunge { .. }
            | Error::MalformedResponse { .. }
            | Error::ProbesExhausted { .. } => true,

            // NOT retryable: config errors, logout, spent outer budget
            Error::InvalidEmailFormat { .. }
            | Error::InvalidConfig { .. }
            | Error::InvalidDnsName { .. }
            | Error::HttpClient { .. }
            | Error::ImapLogout { .. }
            | Error::RetriesExhausted { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidEmailFormat { .. }
            | Error::InvalidConfig { .. }
            | Error::InvalidDnsName { .. }
            | Error::HttpClient { .. } => ErrorCategory::Configuration,

            Error::TcpConnect { .. }
            | Error::TlsConnect { .. }
            | Error::Socks5Connect { .. }
            | Error::HttpRequest { .. } => ErrorCategory::Network,

            Error::ConnectTimeout { .. }
            | Error::AuthTimeout { .. }
            | Error::CommandTimeout { .. } => ErrorCategory::Timeout,

            Error::ImapLogin { .. }
            | Error::SelectFolder { .. }
            | Error::ImapSearch { .. }
            | Error::ImapFetch { .. }
            | Error::ImapStore { .. }
            | Error::ImapExpunge { .. }
            | Error::ImapLogout { .. } => ErrorCategory::Protocol,

            Error::MalformedResponse { .. } => ErrorCategory::Malformed,

            Error::ProbesExhausted { .. } | Error::RetriesExhausted { .. } => {
                ErrorCategory::Exhausted
            }
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Network connectivity errors.
    Network,
    /// Timeout errors.
    Timeout,
    /// IMAP protocol errors.
    Protocol,
    /// Undecodable remote responses.
    Malformed,
    /// A retry or probe budget was spent.
    Exhausted,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::Malformed => write!(f, "malformed"),
            ErrorCategory::Exhausted => write!(f, "exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        // Configuration errors are not retryable
        let err = Error::InvalidEmailFormat {
            address: "bad".into(),
        };
        assert!(!err.is_retryable());

        // Network errors are retryable
        let err = Error::TcpConnect {
            target: "imap.example.com:993".into(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.is_retryable());

        // A spent probe budget is retryable (new mail may still arrive)
        let err = Error::ProbesExhausted { rounds: 20 };
        assert!(err.is_retryable());

        // A spent outer retry budget is terminal
        let err = Error::RetriesExhausted { attempts: 5 };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_categories() {
        let err = Error::InvalidConfig {
            message: "missing host".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = Error::ConnectTimeout {
            target: "imap.example.com:993".into(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.category(), ErrorCategory::Timeout);

        let err = Error::RetriesExhausted { attempts: 5 };
        assert_eq!(err.category(), ErrorCategory::Exhausted);
    }

    #[test]
    fn test_exhaustion_messages_carry_counts() {
        let err = Error::RetriesExhausted { attempts: 3 };
        assert!(err.to_string().contains('3'));

        let err = Error::ProbesExhausted { rounds: 20 };
        assert!(err.to_string().contains("20"));
    }
}
