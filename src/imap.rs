//! Direct IMAP mailbox backend.
//!
//! One fetch call is a complete cycle: connect, authenticate, select, search
//! for the configured sender, pull the newest match, extract the code, delete
//! the consumed message, log out. The mailbox search is probed repeatedly
//! (bounded rounds, fixed spacing) to ride out mail-delivery latency; this
//! inner poll is distinct from the outer retry loop in
//! [`CodeRetriever`](crate::CodeRetriever).

use crate::backend::{FetchedCode, MailboxBackend};
use crate::code;
use crate::config::ImapConfig;
use crate::connection;
use crate::error::{Error, Result};
use crate::parser;
use crate::session::{self, ImapSession};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Mailbox backend over a direct IMAP connection.
///
/// Created from an [`ImapConfig`]; each fetch opens and fully closes its own
/// session, so instances are cheap and hold no connection state.
#[derive(Debug)]
pub struct ImapBackend {
    config: ImapConfig,
}

/// What one probe round observed.
enum ProbeOutcome {
    /// The sender search matched nothing; worth probing again.
    NoMessages,
    /// A message was found but its body carries no code; the call is over.
    NoCode,
    /// A code was extracted and its source message deleted.
    Code(FetchedCode),
}

impl ImapBackend {
    /// Creates a backend over the given configuration.
    #[must_use]
    pub fn new(config: ImapConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this backend was built from.
    #[must_use]
    pub fn config(&self) -> &ImapConfig {
        &self.config
    }

    /// Opens a fresh session: TLS connect, authenticate, select folder.
    async fn open_session(&self) -> Result<ImapSession> {
        let target_addr = self.config.server_address();
        let timeouts = &self.config.timeouts;

        let tls_stream = tokio::time::timeout(
            timeouts.connect,
            connection::establish_tls_connection(
                &self.config.host,
                &target_addr,
                self.config.proxy.as_ref(),
            ),
        )
        .await
        .map_err(|_| Error::ConnectTimeout {
            target: target_addr.clone(),
            timeout: timeouts.connect,
        })??;

        let mut imap_session = tokio::time::timeout(
            timeouts.auth,
            session::authenticate(tls_stream, self.config.user(), self.config.password()),
        )
        .await
        .map_err(|_| Error::AuthTimeout {
            user: self.config.user().to_string(),
            timeout: timeouts.auth,
        })??;

        timed(
            timeouts.command,
            "select",
            session::select_folder(&mut imap_session, &self.config.folder),
        )
        .await?;

        Ok(imap_session)
    }

    /// Closes a session, best-effort. A failed logout never fails the fetch.
    async fn close_session(&self, imap_session: &mut ImapSession) {
        let timeout = self.config.timeouts.logout;
        match tokio::time::timeout(timeout, session::logout(imap_session)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "IMAP logout failed"),
            Err(_) => warn!(timeout_secs = timeout.as_secs(), "IMAP logout timed out"),
        }
    }

    /// One full open/search/extract/close cycle.
    async fn probe_once(&self) -> Result<ProbeOutcome> {
        let timeouts = self.config.timeouts.clone();
        let mut imap_session = self.open_session().await?;

        let uids = timed(
            timeouts.command,
            "search",
            session::search_from(&mut imap_session, &self.config.sender),
        )
        .await?;

        // Newest message carries the highest UID
        let Some(newest) = uids.iter().max().copied() else {
            self.close_session(&mut imap_session).await;
            return Ok(ProbeOutcome::NoMessages);
        };

        let raw = timed(
            timeouts.fetch,
            "fetch",
            session::fetch_message_body(&mut imap_session, newest),
        )
        .await?;

        let body = raw.map(|raw| parser::plain_text_body(&raw)).unwrap_or_default();

        match code::find_code(&body) {
            Some(found) => {
                let found = found.to_owned();

                // The message is consumed the moment its code leaves this
                // call, so deletion happens here, not in a later cleanup
                timed(
                    timeouts.command,
                    "store",
                    session::delete_message(&mut imap_session, newest),
                )
                .await?;

                self.close_session(&mut imap_session).await;

                Ok(ProbeOutcome::Code(FetchedCode {
                    code: found,
                    message_id: None,
                }))
            }
            None => {
                debug!(uid = newest, "Newest matching message carries no code");
                self.close_session(&mut imap_session).await;
                Ok(ProbeOutcome::NoCode)
            }
        }
    }
}

#[async_trait]
impl MailboxBackend for ImapBackend {
    /// Probes the mailbox until a matching message appears or the probe
    /// budget is spent.
    ///
    /// A message without a code ends the call with `Ok(None)`; only an empty
    /// search result triggers another probe round.
    #[instrument(
        name = "ImapBackend::fetch",
        skip(self),
        fields(host = %self.config.host, folder = %self.config.folder)
    )]
    async fn fetch(&mut self) -> Result<Option<FetchedCode>> {
        let rounds = self.config.probe.rounds;

        for round in 1..=rounds {
            if round > 1 {
                tokio::time::sleep(self.config.probe.spacing).await;
            }

            match self.probe_once().await? {
                ProbeOutcome::NoMessages => {
                    debug!(round, rounds, "No matching messages yet");
                }
                ProbeOutcome::NoCode => return Ok(None),
                ProbeOutcome::Code(found) => return Ok(Some(found)),
            }
        }

        Err(Error::ProbesExhausted { rounds })
    }

    /// Nothing to do: the source message was deleted inside the fetch.
    async fn cleanup(&mut self, _found: &FetchedCode) -> bool {
        true
    }
}

/// Wraps an IMAP command future with a timeout.
async fn timed<T, F>(duration: Duration, command: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| Error::CommandTimeout {
            command,
            timeout: duration,
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImapConfig;

    fn test_config() -> ImapConfig {
        ImapConfig::builder()
            .host("imap.example.com")
            .user("user@example.com")
            .password("secret")
            .sender("no-reply@service.example")
            .build()
            .unwrap()
    }

    #[test]
    fn test_backend_holds_config() {
        let backend = ImapBackend::new(test_config());
        assert_eq!(backend.config().server_address(), "imap.example.com:993");
    }

    #[tokio::test]
    async fn test_cleanup_is_a_no_op() {
        let mut backend = ImapBackend::new(test_config());
        let found = FetchedCode {
            code: "482910".into(),
            message_id: None,
        };
        assert!(backend.cleanup(&found).await);
    }

    #[tokio::test]
    async fn test_timed_maps_elapsed_to_command_timeout() {
        let result: Result<()> = timed(Duration::from_millis(5), "noop", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        match result {
            Err(Error::CommandTimeout { command, .. }) => assert_eq!(command, "noop"),
            other => panic!("expected CommandTimeout, got {other:?}"),
        }
    }
}
