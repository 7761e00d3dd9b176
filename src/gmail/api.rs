//! Gmail API response types.

use std::fmt;

use serde::Deserialize;

/// Opaque, stable identifier Gmail assigns to a message. Compared only for
/// equality; recency ordering is whatever the mailbox reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response from listing messages.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    pub messages: Option<Vec<MessageRef>>,
    pub result_size_estimate: Option<u32>,
}

/// Reference to a message (id and thread id only).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    pub thread_id: Option<String>,
}

/// Full message as returned by `messages.get` with `format=full`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    pub id: String,
    pub thread_id: Option<String>,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
}

/// A node in a message's MIME tree.
///
/// Leaf parts carry body data; multipart containers carry nested parts. A
/// container's own body data is never used for extraction beyond what
/// recursion yields from its children.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    pub mime_type: Option<String>,
    pub headers: Option<Vec<Header>>,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

/// Leaf payload: URL-safe base64, possibly with trailing padding stripped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePartBody {
    pub size: Option<u64>,
    pub data: Option<String>,
}

/// Message header (name-value pair).
#[derive(Debug, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_message_deserializes() {
        let raw = r#"{
            "id": "18f2a",
            "threadId": "18f2a",
            "labelIds": ["INBOX"],
            "snippet": "Hello there",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    {"name": "Subject", "value": "Meeting"},
                    {"name": "From", "value": "alice@example.com"}
                ],
                "body": {"size": 0},
                "parts": [
                    {
                        "mimeType": "text/plain",
                        "body": {"size": 5, "data": "SGVsbG8="}
                    }
                ]
            }
        }"#;

        let msg: GmailMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.id, "18f2a");
        assert_eq!(msg.snippet.as_deref(), Some("Hello there"));

        let payload = msg.payload.unwrap();
        assert_eq!(payload.mime_type.as_deref(), Some("multipart/alternative"));
        assert_eq!(payload.headers.as_ref().unwrap().len(), 2);

        let parts = payload.parts.unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(
            parts[0].body.as_ref().unwrap().data.as_deref(),
            Some("SGVsbG8=")
        );
    }

    #[test]
    fn empty_list_response_deserializes() {
        let list: ListMessagesResponse =
            serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(list.messages.is_none());
    }

    #[test]
    fn list_response_with_messages_deserializes() {
        let list: ListMessagesResponse = serde_json::from_str(
            r#"{"messages":[{"id":"a1","threadId":"t1"}],"resultSizeEstimate":1}"#,
        )
        .unwrap();
        assert_eq!(list.messages.unwrap()[0].id, "a1");
    }
}
