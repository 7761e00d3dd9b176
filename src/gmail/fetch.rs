//! Message Fetcher — most-recent-message retrieval and normalization.

use async_trait::async_trait;
use tracing::error;

use crate::error::MailboxError;

use super::api::{GmailMessage, MessageId, MessagePart};
use super::body::extract_body;
use super::client::GmailClient;

/// Placeholder values for absent headers and snippets.
const NO_SUBJECT: &str = "No Subject";
const UNKNOWN_SENDER: &str = "Unknown Sender";
const UNKNOWN_DATE: &str = "Unknown Date";
const NO_SNIPPET: &str = "No snippet available.";

/// A mailbox message normalized for downstream processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub id: MessageId,
    pub subject: String,
    pub sender: String,
    pub date: String,
    pub snippet: String,
    /// Decoded, entity-unescaped plain text; empty when no usable part exists.
    pub full_body: String,
}

/// Capability the poller needs from a mailbox: "what is the latest message?"
///
/// Implementations must convert fetch failures into `None`: a failed cycle is
/// "no new information", never a fatal error, because polling has to continue.
#[async_trait]
pub trait MailSource: Send + Sync {
    async fn latest(&self) -> Option<NormalizedMessage>;
}

#[async_trait]
impl MailSource for GmailClient {
    async fn latest(&self) -> Option<NormalizedMessage> {
        match self.fetch_latest().await {
            Ok(found) => found,
            Err(e) => {
                error!("mailbox fetch failed: {e}");
                None
            }
        }
    }
}

impl GmailClient {
    /// Fetch and normalize the single most recent message in the watched view.
    ///
    /// `Ok(None)` means the mailbox is empty; errors are transport/API level
    /// and are converted to an absent result at the `MailSource` boundary.
    pub async fn fetch_latest(&self) -> Result<Option<NormalizedMessage>, MailboxError> {
        let Some(latest) = self.list_latest().await? else {
            return Ok(None);
        };

        let id = MessageId::new(latest.id);
        let message = self.get_message(&id).await?;
        Ok(Some(normalize_message(id, message)))
    }
}

/// Build a `NormalizedMessage` from a full Gmail message: default absent
/// headers, carry the provider snippet, extract the body text.
pub fn normalize_message(id: MessageId, message: GmailMessage) -> NormalizedMessage {
    let (subject, sender, date) = message
        .payload
        .as_ref()
        .map(header_fields)
        .unwrap_or_else(|| {
            (
                NO_SUBJECT.to_string(),
                UNKNOWN_SENDER.to_string(),
                UNKNOWN_DATE.to_string(),
            )
        });

    let full_body = message.payload.as_ref().map(extract_body).unwrap_or_default();

    NormalizedMessage {
        id,
        subject,
        sender,
        date,
        snippet: message
            .snippet
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_SNIPPET.to_string()),
        full_body,
    }
}

fn header_fields(payload: &MessagePart) -> (String, String, String) {
    (
        header_or(payload, "Subject", NO_SUBJECT),
        header_or(payload, "From", UNKNOWN_SENDER),
        header_or(payload, "Date", UNKNOWN_DATE),
    )
}

/// Case-insensitive header lookup with a fixed placeholder default.
fn header_or(payload: &MessagePart, name: &str, default: &str) -> String {
    payload
        .headers
        .as_ref()
        .and_then(|headers| headers.iter().find(|h| h.name.eq_ignore_ascii_case(name)))
        .map(|h| h.value.clone())
        .unwrap_or_else(|| default.to_string())
}
