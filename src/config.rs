//! Configuration for the two mailbox backends and the retry policy.
//!
//! Use the builders to create configurations with sensible defaults:
//!
//! ```
//! use otp_inbox::{ImapConfig, TempMailConfig};
//!
//! let imap = ImapConfig::builder()
//!     .host("imap.example.com")
//!     .user("user@example.com")
//!     .password("app-password")
//!     .sender("no-reply@service.example")
//!     .build()
//!     .expect("valid config");
//!
//! let temp_mail = TempMailConfig::builder()
//!     .username("pickup")
//!     .extension("@mailto.plus")
//!     .pin("1234")
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::{Error, Result};
use crate::proxy::Socks5Proxy;
use email_address::EmailAddress;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Default base URL of the temp-mail REST API.
pub const DEFAULT_TEMP_MAIL_API: &str = "https://tempmail.plus/api";

/// Configuration for the direct IMAP backend.
///
/// Create using [`ImapConfig::builder()`].
///
/// The `password` field is stored as a [`SecretString`] to prevent accidental
/// logging of credentials.
#[derive(Clone)]
pub struct ImapConfig {
    /// IMAP server hostname.
    pub host: String,
    /// IMAP server port (default: 993 for IMAPS).
    pub port: u16,
    /// Login name (usually the mailbox address).
    user: String,
    /// Mailbox password or app-specific password (protected from logging).
    password: SecretString,
    /// Folder to search (default: "INBOX").
    pub folder: String,
    /// Sender address the verification email is expected from.
    pub sender: String,
    /// Inner probe-loop configuration.
    pub probe: ProbeConfig,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Optional SOCKS5 proxy for the connection.
    pub proxy: Option<Socks5Proxy>,
}

impl std::fmt::Debug for ImapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("folder", &self.folder)
            .field("sender", &self.sender)
            .field("probe", &self.probe)
            .field("timeouts", &self.timeouts)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl ImapConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ImapConfigBuilder {
        ImapConfigBuilder::default()
    }

    /// Returns the login name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the password for authentication.
    ///
    /// The password is intentionally not a public field to prevent accidental
    /// logging.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Returns the full IMAP server address as "host:port".
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Inner probe-loop configuration for the IMAP backend.
///
/// One fetch call probes the mailbox up to `rounds` times, `spacing` apart,
/// while the sender search comes back empty. This is a tighter poll for
/// mail-delivery latency, distinct from the outer [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Maximum probe rounds per fetch call.
    pub rounds: u32,
    /// Pause between probe rounds.
    pub spacing: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            rounds: 20,
            spacing: Duration::from_secs(3),
        }
    }
}

/// Timeout configuration for IMAP operations.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for establishing the TCP/TLS connection.
    pub connect: Duration,
    /// Timeout for IMAP authentication.
    pub auth: Duration,
    /// Timeout for short commands (select, search, store, expunge).
    pub command: Duration,
    /// Timeout for fetching message content.
    pub fetch: Duration,
    /// Timeout for the logout operation.
    pub logout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            auth: Duration::from_secs(30),
            command: Duration::from_secs(10),
            fetch: Duration::from_secs(30),
            logout: Duration::from_secs(5),
        }
    }
}

/// Outer retry policy for [`CodeRetriever`](crate::CodeRetriever).
///
/// `max_retries` attempts, `retry_interval` between them. The interval is a
/// plain timed pause; there is no backoff growth.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum fetch attempts (must be at least 1).
    pub max_retries: u32,
    /// Pause between attempts.
    pub retry_interval: Duration,
}

impl RetryPolicy {
    /// Creates a retry policy.
    #[must_use]
    pub fn new(max_retries: u32, retry_interval: Duration) -> Self {
        Self {
            max_retries,
            retry_interval,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_interval: Duration::from_secs(30),
        }
    }
}

/// Builder for [`ImapConfig`].
#[derive(Debug, Default)]
pub struct ImapConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    folder: Option<String>,
    sender: Option<String>,
    probe: Option<ProbeConfig>,
    timeouts: Option<TimeoutConfig>,
    proxy: Option<Socks5Proxy>,
}

impl ImapConfigBuilder {
    /// Sets the IMAP server hostname (required).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the IMAP server port.
    ///
    /// Default is 993 (IMAPS with TLS).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the login name (required).
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the password (required).
    ///
    /// For Gmail/Outlook, use an app-specific password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the folder to search.
    ///
    /// Default is "INBOX".
    #[must_use]
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Sets the expected sender of the verification email (required).
    #[must_use]
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Sets the inner probe-loop configuration.
    #[must_use]
    pub fn probe(mut self, probe: ProbeConfig) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Sets the number of probe rounds per fetch call.
    #[must_use]
    pub fn probe_rounds(mut self, rounds: u32) -> Self {
        self.probe.get_or_insert_with(ProbeConfig::default).rounds = rounds;
        self
    }

    /// Sets the pause between probe rounds.
    #[must_use]
    pub fn probe_spacing(mut self, spacing: Duration) -> Self {
        self.probe.get_or_insert_with(ProbeConfig::default).spacing = spacing;
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets a SOCKS5 proxy for the connection.
    #[must_use]
    pub fn proxy(mut self, proxy: Socks5Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, or if the sender is
    /// not a valid email address.
    pub fn build(self) -> Result<ImapConfig> {
        let host = self.host.ok_or_else(|| Error::InvalidConfig {
            message: "IMAP host is required".into(),
        })?;

        let user = self.user.ok_or_else(|| Error::InvalidConfig {
            message: "IMAP user is required".into(),
        })?;

        let password = self.password.ok_or_else(|| Error::InvalidConfig {
            message: "IMAP password is required".into(),
        })?;

        let sender = self.sender.ok_or_else(|| Error::InvalidConfig {
            message: "sender address is required".into(),
        })?;
        validate_address(&sender)?;

        Ok(ImapConfig {
            host,
            port: self.port.unwrap_or(993),
            user,
            password: SecretString::from(password),
            folder: self.folder.unwrap_or_else(|| "INBOX".into()),
            sender,
            probe: self.probe.unwrap_or_default(),
            timeouts: self.timeouts.unwrap_or_default(),
            proxy: self.proxy,
        })
    }
}

/// Configuration for the temp-mail HTTP backend.
///
/// Create using [`TempMailConfig::builder()`].
///
/// The inbox is identified by `{username}{extension}` (for example
/// `pickup@mailto.plus`) and protected by an access pin. The pin is stored as
/// a [`SecretString`].
#[derive(Clone)]
pub struct TempMailConfig {
    /// Mailbox local part.
    username: String,
    /// Address extension suffix, including the `@` (for example
    /// "@mailto.plus").
    extension: String,
    /// Inbox access pin (protected from logging).
    pin: SecretString,
    /// Base URL of the API, without a trailing slash.
    base_url: String,
}

impl std::fmt::Debug for TempMailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempMailConfig")
            .field("username", &self.username)
            .field("extension", &self.extension)
            .field("pin", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TempMailConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> TempMailConfigBuilder {
        TempMailConfigBuilder::default()
    }

    /// Returns the full inbox address, `{username}{extension}`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}{}", self.username, self.extension)
    }

    /// Returns the inbox access pin.
    #[must_use]
    pub fn pin(&self) -> &str {
        self.pin.expose_secret()
    }

    /// Returns the API base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Builder for [`TempMailConfig`].
#[derive(Debug, Default)]
pub struct TempMailConfigBuilder {
    username: Option<String>,
    extension: Option<String>,
    pin: Option<String>,
    base_url: Option<String>,
}

impl TempMailConfigBuilder {
    /// Sets the mailbox local part (required).
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the address extension suffix, including the `@` (required).
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Sets the inbox access pin (required; may be empty for unpinned
    /// inboxes).
    #[must_use]
    pub fn pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    /// Overrides the API base URL.
    ///
    /// Default is [`DEFAULT_TEMP_MAIL_API`]. A trailing slash is trimmed.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, if the composed
    /// address is not a valid email address, or if the base URL does not
    /// parse.
    pub fn build(self) -> Result<TempMailConfig> {
        let username = self.username.ok_or_else(|| Error::InvalidConfig {
            message: "temp-mail username is required".into(),
        })?;

        let extension = self.extension.ok_or_else(|| Error::InvalidConfig {
            message: "temp-mail extension is required".into(),
        })?;

        let pin = self.pin.ok_or_else(|| Error::InvalidConfig {
            message: "temp-mail pin is required".into(),
        })?;

        validate_address(&format!("{username}{extension}"))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_TEMP_MAIL_API.into());
        let base_url = base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url).map_err(|e| Error::InvalidConfig {
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(TempMailConfig {
            username,
            extension,
            pin: SecretString::from(pin),
            base_url,
        })
    }
}

/// Validates an email address format.
fn validate_address(address: &str) -> Result<()> {
    EmailAddress::parse_with_options(address, email_address::Options::default())
        .map(|_| ())
        .map_err(|_| Error::InvalidEmailFormat {
            address: address.to_string(),
        })
}
