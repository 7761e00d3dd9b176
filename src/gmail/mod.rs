//! Gmail integration: API models, HTTP client, body extraction, normalization.

pub mod api;
pub mod body;
pub mod client;
pub mod fetch;

pub use api::{GmailMessage, Header, MessageId, MessagePart, MessagePartBody};
pub use body::extract_body;
pub use client::GmailClient;
pub use fetch::{MailSource, NormalizedMessage, normalize_message};
