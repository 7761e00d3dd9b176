//! Google OAuth token capability — refresh-token exchange with caching.
//!
//! One credential covers both the Gmail and Calendar scopes, so a single
//! instance is shared by both clients. Only the refresh grant is implemented
//! here; acquiring the refresh token in the first place is an offline step.

use chrono::Utc;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::GoogleCredentials;
use crate::error::AuthError;

/// Refresh slightly early so in-flight requests never carry a stale token.
const EXPIRY_BUFFER_SECS: i64 = 300;
/// Google returns expires_in for refresh grants; fall back to an hour if not.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Access-token provider backed by the OAuth refresh grant.
pub struct GoogleAuth {
    http: reqwest::Client,
    credentials: GoogleCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl GoogleAuth {
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    pub fn new(http: reqwest::Client, credentials: GoogleCredentials) -> Self {
        Self {
            http,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Get a valid access token, refreshing when the cached one is stale.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref()
            && token.expires_at > Utc::now().timestamp() + EXPIRY_BUFFER_SECS
        {
            return Ok(token.access_token.clone());
        }

        let fresh = self.refresh().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn refresh(&self) -> Result<CachedToken, AuthError> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            ),
            (
                "refresh_token",
                self.credentials.refresh_token.expose_secret(),
            ),
            ("grant_type", "refresh_token"),
        ];

        let response = self.http.post(Self::TOKEN_URL).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::RefreshFailed {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!("access token refreshed");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now().timestamp()
                + token
                    .expires_in
                    .map(|secs| secs as i64)
                    .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_parses_google_shape() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"ya29.abc","expires_in":3599,"scope":"x","token_type":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "ya29.abc");
        assert_eq!(token.expires_in, Some(3599));
    }
}
