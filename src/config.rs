//! Configuration — environment-driven, dotenv-loaded at startup.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Seconds between the end of one poll cycle and the next fetch.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
/// Bound on any single HTTP request so a stalled fetch cannot stall the loop.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
/// Primary inbox view only; spam and other categorizations are excluded.
const DEFAULT_QUERY: &str = "in:inbox";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_CALENDAR_ID: &str = "primary";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    /// Gmail search query selecting the mailbox view to watch.
    pub query: String,
    pub calendar_id: String,
    pub llm: LlmConfig,
    pub google: GoogleCredentials,
}

/// Configuration for the extraction model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub model: String,
}

/// OAuth client credentials plus a pre-acquired refresh token.
///
/// The interactive authorization flow lives outside this binary; obtain the
/// refresh token separately and supply it via the environment.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

impl AppConfig {
    /// Build config from environment variables. Missing required variables
    /// are fatal; optional ones fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let poll_interval_secs = parse_or_default(
            std::env::var("MAIL_ASSIST_POLL_INTERVAL_SECS").ok(),
            DEFAULT_POLL_INTERVAL_SECS,
        );
        let fetch_timeout_secs = parse_or_default(
            std::env::var("MAIL_ASSIST_FETCH_TIMEOUT_SECS").ok(),
            DEFAULT_FETCH_TIMEOUT_SECS,
        );
        let query =
            std::env::var("MAIL_ASSIST_QUERY").unwrap_or_else(|_| DEFAULT_QUERY.to_string());
        let calendar_id = std::env::var("MAIL_ASSIST_CALENDAR_ID")
            .unwrap_or_else(|_| DEFAULT_CALENDAR_ID.to_string());

        let llm = LlmConfig {
            api_key: SecretString::from(require("GEMINI_API_KEY")?),
            model: std::env::var("MAIL_ASSIST_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        };

        let google = GoogleCredentials {
            client_id: require("GOOGLE_CLIENT_ID")?,
            client_secret: SecretString::from(require("GOOGLE_CLIENT_SECRET")?),
            refresh_token: SecretString::from(require("GOOGLE_REFRESH_TOKEN")?),
        };

        Ok(Self {
            poll_interval_secs,
            fetch_timeout_secs,
            query,
            calendar_id,
            llm,
            google,
        })
    }
}

fn require(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Lenient numeric parse: unset or malformed values fall back to the default.
fn parse_or_default<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or(default)
}
