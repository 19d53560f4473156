//! Backend abstraction over the two mailbox transports.
//!
//! Both transports answer the same question - "is there a verification code
//! in this inbox right now?" - through one fetch/cleanup capability pair.
//! Selection between them happens once at construction, from configuration,
//! never per call.

use crate::config::{ImapConfig, TempMailConfig};
use crate::error::{Error, Result};
use crate::imap::ImapBackend;
use crate::tempmail::TempMailBackend;
use async_trait::async_trait;

/// A verification code pulled from a mailbox, together with the handle needed
/// to delete its source message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedCode {
    /// The 6-digit code.
    pub code: String,
    /// Identifier of the source message, when the transport still holds it
    /// after the fetch. The temp-mail API does; the IMAP backend deletes the
    /// message inside the fetch and carries no pending handle.
    pub message_id: Option<String>,
}

/// One fetch/cleanup capability pair over a mailbox transport.
///
/// `fetch` performs a fresh query against the remote inbox; nothing is cached
/// across calls. `cleanup` is best-effort deletion of the consumed message
/// and reports success as a `bool` rather than an error - the retrieval flow
/// never fails because a message could not be deleted.
#[async_trait]
pub trait MailboxBackend {
    /// Fetches the newest matching message and extracts its code.
    ///
    /// Returns `Ok(None)` when the inbox holds no code right now. Errors are
    /// absorbed by the retry loop as failed attempts.
    async fn fetch(&mut self) -> Result<Option<FetchedCode>>;

    /// Deletes the message a code was extracted from, best-effort.
    ///
    /// Returns whether deletion was confirmed.
    async fn cleanup(&mut self, found: &FetchedCode) -> bool;
}

/// The active mailbox backend, selected once from configuration.
#[derive(Debug)]
pub enum Backend {
    /// Direct IMAP mailbox.
    Imap(ImapBackend),
    /// Temporary-mailbox HTTP API.
    TempMail(TempMailBackend),
}

impl Backend {
    /// Selects the active backend from the available configuration.
    ///
    /// IMAP wins when both configurations are present, mirroring how
    /// deployments fall back to the temp-mail service only when no real
    /// mailbox is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when neither configuration is given,
    /// or when the temp-mail HTTP client cannot be constructed.
    pub fn select(imap: Option<ImapConfig>, temp_mail: Option<TempMailConfig>) -> Result<Self> {
        match (imap, temp_mail) {
            (Some(config), _) => Ok(Self::Imap(ImapBackend::new(config))),
            (None, Some(config)) => Ok(Self::TempMail(TempMailBackend::new(config)?)),
            (None, None) => Err(Error::InvalidConfig {
                message: "either an IMAP or a temp-mail configuration is required".into(),
            }),
        }
    }
}

#[async_trait]
impl MailboxBackend for Backend {
    async fn fetch(&mut self) -> Result<Option<FetchedCode>> {
        match self {
            Self::Imap(backend) => backend.fetch().await,
            Self::TempMail(backend) => backend.fetch().await,
        }
    }

    async fn cleanup(&mut self, found: &FetchedCode) -> bool {
        match self {
            Self::Imap(backend) => backend.cleanup(found).await,
            Self::TempMail(backend) => backend.cleanup(found).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imap_config() -> ImapConfig {
        ImapConfig::builder()
            .host("imap.example.com")
            .user("user@example.com")
            .password("secret")
            .sender("no-reply@service.example")
            .build()
            .unwrap()
    }

    fn temp_mail_config() -> TempMailConfig {
        TempMailConfig::builder()
            .username("pickup")
            .extension("@mailto.plus")
            .pin("1234")
            .build()
            .unwrap()
    }

    #[test]
    fn test_select_prefers_imap() {
        let backend = Backend::select(Some(imap_config()), Some(temp_mail_config())).unwrap();
        assert!(matches!(backend, Backend::Imap(_)));
    }

    #[test]
    fn test_select_falls_back_to_temp_mail() {
        let backend = Backend::select(None, Some(temp_mail_config())).unwrap();
        assert!(matches!(backend, Backend::TempMail(_)));
    }

    #[test]
    fn test_select_requires_some_config() {
        let result = Backend::select(None, None);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
