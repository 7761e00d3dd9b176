//! Gmail REST client — lists and fetches messages over HTTPS.

use std::sync::Arc;

use crate::auth::GoogleAuth;
use crate::error::MailboxError;

use super::api::{GmailMessage, ListMessagesResponse, MessageId, MessageRef};

/// Thin client over the Gmail REST API.
///
/// Shares a reqwest client carrying a bounded request timeout, and the OAuth
/// capability, with the rest of the process. Safe for sequential reuse.
pub struct GmailClient {
    http: reqwest::Client,
    auth: Arc<GoogleAuth>,
    query: String,
}

impl GmailClient {
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Only the single most recent message is inspected per cycle.
    const MAX_RESULTS: &'static str = "1";

    pub fn new(http: reqwest::Client, auth: Arc<GoogleAuth>, query: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            query: query.into(),
        }
    }

    /// List the most recent message reference in the watched view, if any.
    pub async fn list_latest(&self) -> Result<Option<MessageRef>, MailboxError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/users/me/messages", Self::BASE_URL);

        let response = self
            .http
            .get(&url)
            .query(&[("maxResults", Self::MAX_RESULTS), ("q", self.query.as_str())])
            .bearer_auth(&token)
            .send()
            .await?;
        let response = check_status(response).await?;

        let list: ListMessagesResponse = response.json().await?;
        Ok(list.messages.and_then(|refs| refs.into_iter().next()))
    }

    /// Get a message's headers and full MIME payload tree.
    pub async fn get_message(&self, id: &MessageId) -> Result<GmailMessage, MailboxError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/users/me/messages/{}", Self::BASE_URL, id);

        let response = self
            .http
            .get(&url)
            .query(&[("format", "full")])
            .bearer_auth(&token)
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, MailboxError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(MailboxError::Api {
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    })
}
