//! Error types for Mail Assist.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

/// Configuration-related errors. Fatal: the process refuses to start the
/// polling loop when required configuration is absent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// OAuth token errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token refresh failed with status {status}: {body}")]
    RefreshFailed { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Mailbox fetch errors. These never reach the poller: the `MailSource`
/// boundary converts them into an absent result for the cycle.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Gmail API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Calendar insert errors.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Calendar API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unparseable event start time {value:?}: {reason}")]
    InvalidEventTime { value: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
