//! SOCKS5 proxy configuration for IMAP connections.
//!
//! Verification mailboxes often live behind providers that are only reachable
//! through an egress proxy; the connection layer routes through one when
//! configured.
//!
//! # Example
//!
//! ```
//! use otp_inbox::Socks5Proxy;
//!
//! let plain = Socks5Proxy::new("proxy.example.com", 1080);
//! let authed = Socks5Proxy::with_auth("proxy.example.com", 1080, "user", "pass");
//! ```

use secrecy::{ExposeSecret, SecretString};

/// SOCKS5 proxy configuration.
#[derive(Debug, Clone)]
pub struct Socks5Proxy {
    /// Proxy server hostname or IP address.
    pub host: String,
    /// Proxy server port.
    pub port: u16,
    /// Optional authentication credentials.
    pub auth: Option<ProxyAuth>,
}

/// Authentication credentials for a SOCKS5 proxy.
#[derive(Clone)]
pub struct ProxyAuth {
    /// Username for proxy authentication.
    pub username: String,
    /// Password for proxy authentication (redacted in `Debug` output).
    password: SecretString,
}

impl ProxyAuth {
    /// Creates proxy credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns the password for the SOCKS5 handshake.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for ProxyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Socks5Proxy {
    /// Creates a proxy configuration without authentication.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth: None,
        }
    }

    /// Creates a proxy configuration with username/password authentication.
    #[must_use]
    pub fn with_auth(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            auth: Some(ProxyAuth::new(username, password)),
        }
    }

    /// Returns `true` if the proxy requires authentication.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.auth.is_some()
    }
}

impl std::fmt::Display for Socks5Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "socks5://{}:{}", self.host, self.port)
    }
}
