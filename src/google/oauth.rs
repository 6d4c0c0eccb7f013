use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::check_status;
use crate::errors::BackendError;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh a cached token this long before Google says it expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// OAuth2 client credentials plus a long-lived refresh token.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Hands out access tokens, refreshing through the refresh-token grant when needed.
pub struct TokenSource {
    client: Client,
    credentials: OAuthCredentials,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(client: Client, credentials: OAuthCredentials) -> Self {
        Self {
            client,
            credentials,
            token_url: TOKEN_URL.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Current access token; refreshes it when missing or about to expire.
    pub async fn access_token(&self) -> Result<String, BackendError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + EXPIRY_MARGIN < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn refresh(&self) -> Result<CachedToken, BackendError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;
        let response = check_status(response)
            .await
            .map_err(|e| BackendError::Auth(e.to_string()))?;
        let token: TokenResponse = response.json().await?;

        log::debug!("Refreshed Google access token");
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in.unwrap_or(3600)),
        })
    }
}
