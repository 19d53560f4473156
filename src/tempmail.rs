//! Temporary-mailbox HTTP backend.
//!
//! Talks to a tempmail.plus-shaped REST API: list the inbox, read the newest
//! message, scan its text for a code, and delete the consumed message. The
//! API reports logical failure through a `result` field rather than status
//! codes, so every step short-circuits on its own distinct condition.

use crate::backend::{FetchedCode, MailboxBackend};
use crate::code;
use crate::config::TempMailConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Deletion attempts before giving up on a consumed message.
const DELETE_ATTEMPTS: u32 = 5;

/// Pause between deletion attempts.
const DELETE_PAUSE: Duration = Duration::from_millis(500);

/// Inbox listings are capped to the most recent entries.
const LIST_LIMIT: &str = "20";

/// Mailbox backend over a temporary-mailbox REST API.
///
/// Holds one persistent [`reqwest::Client`] for connection reuse across
/// calls; every fetch still queries the remote inbox fresh.
#[derive(Debug)]
pub struct TempMailBackend {
    config: TempMailConfig,
    http: reqwest::Client,
}

/// The API encodes message ids as numbers in listings but accepts them as
/// path segments, so both shapes normalize to a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{n}"),
            MessageId::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MailListResponse {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    first_id: Option<MessageId>,
}

#[derive(Debug, Deserialize)]
struct MailDetailResponse {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    result: bool,
}

impl TempMailBackend {
    /// Creates a backend over the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: TempMailConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|source| Error::HttpClient { source })?;

        Ok(Self { config, http })
    }

    /// Returns the configuration this backend was built from.
    #[must_use]
    pub fn config(&self) -> &TempMailConfig {
        &self.config
    }

    /// Lists the inbox and returns the id of the newest message, if any.
    async fn newest_message_id(&self) -> Result<Option<String>> {
        let url = format!("{}/mails", self.config.base_url());

        let response = self
            .http
            .get(&url)
            .query(&[
                ("email", self.config.address().as_str()),
                ("limit", LIST_LIMIT),
                ("epin", self.config.pin()),
            ])
            .send()
            .await
            .map_err(|source| Error::HttpRequest {
                endpoint: "mails",
                source,
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Inbox listing failed");
            return Ok(None);
        }

        let list: MailListResponse =
            response
                .json()
                .await
                .map_err(|source| Error::MalformedResponse {
                    endpoint: "mails",
                    source,
                })?;

        if !list.result {
            debug!("Inbox listing reported no messages");
            return Ok(None);
        }

        match list.first_id {
            Some(id) => {
                let id = id.to_string();
                if id.is_empty() {
                    warn!("Inbox listing carried an empty message id");
                    Ok(None)
                } else {
                    Ok(Some(id))
                }
            }
            None => {
                warn!("Inbox listing carried no message id");
                Ok(None)
            }
        }
    }

    /// Reads one message; `None` when the API refuses or errors it away.
    async fn message_detail(&self, message_id: &str) -> Result<Option<MailDetailResponse>> {
        let url = format!("{}/mails/{message_id}", self.config.base_url());

        let response = self
            .http
            .get(&url)
            .query(&[
                ("email", self.config.address().as_str()),
                ("epin", self.config.pin()),
            ])
            .send()
            .await
            .map_err(|source| Error::HttpRequest {
                endpoint: "mails/{id}",
                source,
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), message_id, "Message detail failed");
            return Ok(None);
        }

        let detail: MailDetailResponse =
            response
                .json()
                .await
                .map_err(|source| Error::MalformedResponse {
                    endpoint: "mails/{id}",
                    source,
                })?;

        if !detail.result {
            debug!(message_id, "Message detail reported no content");
            return Ok(None);
        }

        Ok(Some(detail))
    }

    /// Deletes a consumed message, retrying on unconfirmed responses.
    ///
    /// Undecodable responses count as failed attempts, not errors.
    #[instrument(name = "TempMailBackend::delete", skip(self), fields(message_id))]
    async fn delete_message(&self, message_id: &str) -> bool {
        let url = format!("{}/mails/", self.config.base_url());

        for attempt in 1..=DELETE_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(DELETE_PAUSE).await;
            }

            let response = self
                .http
                .delete(&url)
                .form(&[
                    ("email", self.config.address().as_str()),
                    ("first_id", message_id),
                    ("epin", self.config.pin()),
                ])
                .send()
                .await;

            match response {
                Ok(response) => match response.json::<DeleteResponse>().await {
                    Ok(body) if body.result => {
                        debug!(attempt, "Message deleted");
                        return true;
                    }
                    Ok(_) => debug!(attempt, "Deletion not confirmed"),
                    Err(e) => debug!(attempt, error = %e, "Undecodable deletion response"),
                },
                Err(e) => debug!(attempt, error = %e, "Deletion request failed"),
            }
        }

        warn!(attempts = DELETE_ATTEMPTS, "Giving up on message deletion");
        false
    }
}

#[async_trait]
impl MailboxBackend for TempMailBackend {
    /// Reads the newest inbox message and extracts its code.
    ///
    /// Each short-circuit (non-2xx listing, negative `result`, missing id,
    /// code-less body) yields `Ok(None)`; only transport failures and
    /// undecodable payloads are errors.
    #[instrument(
        name = "TempMailBackend::fetch",
        skip(self),
        fields(address = %self.config.address())
    )]
    async fn fetch(&mut self) -> Result<Option<FetchedCode>> {
        let Some(message_id) = self.newest_message_id().await? else {
            return Ok(None);
        };

        let Some(detail) = self.message_detail(&message_id).await? else {
            return Ok(None);
        };

        debug!(subject = %detail.subject, "Read newest message");

        match code::find_code(&detail.text) {
            Some(found) => Ok(Some(FetchedCode {
                code: found.to_owned(),
                message_id: Some(message_id),
            })),
            None => {
                debug!(message_id, "Message text carries no code");
                Ok(None)
            }
        }
    }

    /// Deletes the source message; confirmed deletion is best-effort.
    async fn cleanup(&mut self, found: &FetchedCode) -> bool {
        let Some(message_id) = found.message_id.as_deref() else {
            return true;
        };
        self.delete_message(message_id).await
    }
}
