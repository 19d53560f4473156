//! Internal IMAP session management.
//!
//! This module wraps async-imap operations with proper error handling. One
//! session corresponds to one open/authenticate/select/.../logout cycle; the
//! backend never reuses a session across probe rounds.

use crate::connection::TlsStream;
use crate::error::{Error, Result};
use async_imap::Session;
use futures::StreamExt;
use tracing::{debug, instrument};

/// Type alias for IMAP session over TLS.
pub(crate) type ImapSession = Session<TlsStream>;

/// Authenticates to the IMAP server and returns a session.
#[instrument(name = "session::authenticate", skip_all, fields(user = %user))]
pub(crate) async fn authenticate(
    tls_stream: TlsStream,
    user: &str,
    password: &str,
) -> Result<ImapSession> {
    let client = async_imap::Client::new(tls_stream);

    debug!("Authenticating to IMAP server");

    client.login(user, password).await.map_err(|e| Error::ImapLogin {
        user: user.to_string(),
        source: e.0,
    })
}

/// Selects a mailbox folder (typically "INBOX").
#[instrument(name = "session::select", skip(session), fields(folder = %folder))]
pub(crate) async fn select_folder(session: &mut ImapSession, folder: &str) -> Result<()> {
    session
        .select(folder)
        .await
        .map_err(|source| Error::SelectFolder {
            folder: folder.to_string(),
            source,
        })?;

    Ok(())
}

/// Searches the selected folder for messages from `sender`.
///
/// Returns the matching UIDs (unordered; the newest message carries the
/// highest UID).
#[instrument(name = "session::search_from", skip(session), fields(sender = %sender))]
pub(crate) async fn search_from(session: &mut ImapSession, sender: &str) -> Result<Vec<u32>> {
    let query = format!("FROM \"{sender}\"");

    let uids = session
        .uid_search(&query)
        .await
        .map_err(|source| Error::ImapSearch { source })?;

    let uids: Vec<u32> = uids.into_iter().collect();

    debug!(uid_count = uids.len(), "Search complete");

    Ok(uids)
}

/// Fetches the raw `BODY[]` of a single message.
///
/// Returns `None` if the server answered without a body section.
#[instrument(name = "session::fetch_body", skip(session), fields(uid))]
pub(crate) async fn fetch_message_body(
    session: &mut ImapSession,
    uid: u32,
) -> Result<Option<Vec<u8>>> {
    let uid_set = uid.to_string();

    let mut stream = session
        .uid_fetch(&uid_set, "BODY[]")
        .await
        .map_err(|source| Error::ImapFetch { uid, source })?;

    let mut body = None;
    while let Some(message) = stream.next().await {
        let message = message.map_err(|source| Error::ImapFetch { uid, source })?;
        if body.is_none() {
            body = message.body().map(<[u8]>::to_vec);
        }
    }

    Ok(body)
}

/// Flags a message `\Deleted` and expunges the folder.
#[instrument(name = "session::delete", skip(session), fields(uid))]
pub(crate) async fn delete_message(session: &mut ImapSession, uid: u32) -> Result<()> {
    let uid_set = uid.to_string();

    {
        let updates = session
            .uid_store(&uid_set, "+FLAGS (\\Deleted)")
            .await
            .map_err(|source| Error::ImapStore { uid, source })?;
        futures::pin_mut!(updates);

        while let Some(update) = updates.next().await {
            update.map_err(|source| Error::ImapStore { uid, source })?;
        }
    }

    let expunged = session
        .expunge()
        .await
        .map_err(|source| Error::ImapExpunge { source })?;
    futures::pin_mut!(expunged);

    while let Some(seq) = expunged.next().await {
        seq.map_err(|source| Error::ImapExpunge { source })?;
    }

    debug!("Message deleted and expunged");

    Ok(())
}

/// Logs out from the IMAP session.
#[instrument(name = "session::logout", skip(session))]
pub(crate) async fn logout(session: &mut ImapSession) -> Result<()> {
    session
        .logout()
        .await
        .map_err(|source| Error::ImapLogout { source })?;

    Ok(())
}
