//! Service-account authentication: static bearer token or `OAuth2` client
//! credentials.

use std::sync::Arc;
use std::time::{Duration, Instant};

use searchctx_core::BearerToken;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Credentials of the service account used against the search backend and
/// the directory.
///
/// The [`Debug`] impl redacts secrets.
#[derive(Clone, PartialEq, Eq)]
pub enum ServiceCredentials {
    /// A pre-issued bearer token.
    Bearer { token: String },

    /// `OAuth2` client credentials grant.
    OAuth2 {
        client_id: String,
        client_secret: String,
        token_endpoint: String,
        scopes: Vec<String>,
    },
}

impl std::fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::OAuth2 {
                client_id,
                token_endpoint,
                scopes,
                ..
            } => f
                .debug_struct("OAuth2")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("token_endpoint", token_endpoint)
                .field("scopes", scopes)
                .finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// Obtains service-account tokens, caching `OAuth2` tokens until shortly
/// before they expire. Clones share the cache.
#[derive(Debug, Clone)]
pub struct ServiceAuth {
    credentials: ServiceCredentials,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: reqwest::Client,
}

impl ServiceAuth {
    #[must_use]
    pub fn new(credentials: ServiceCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// A token for one reconciliation operation.
    pub async fn access_token(&self) -> ClientResult<BearerToken> {
        match &self.credentials {
            ServiceCredentials::Bearer { token } => Ok(BearerToken::new(token.clone())),
            ServiceCredentials::OAuth2 {
                client_id,
                client_secret,
                token_endpoint,
                scopes,
            } => {
                {
                    let cache = self.cached_token.read().await;
                    if let Some(cached) = cache.as_ref().filter(|c| !c.is_expired()) {
                        return Ok(BearerToken::new(cached.access_token.clone()));
                    }
                }

                debug!(%token_endpoint, "fetching service-account access token");
                let scope = scopes.join(" ");
                let mut form = vec![
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                ];
                if !scopes.is_empty() {
                    form.push(("scope", scope.as_str()));
                }

                let response = self
                    .http_client
                    .post(token_endpoint)
                    .form(&form)
                    .send()
                    .await
                    .map_err(|e| ClientError::Auth(format!("token request failed: {e}")))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<no body>".to_string());
                    return Err(ClientError::Auth(format!(
                        "token endpoint returned {status}: {body}"
                    )));
                }

                let token: TokenResponse = response.json().await.map_err(|e| {
                    ClientError::Auth(format!("failed to parse token response: {e}"))
                })?;

                // Treat the token as expired 30 seconds early.
                let expires_at = token
                    .expires_in
                    .map(|secs| Instant::now() + Duration::from_secs(secs.saturating_sub(30)));

                *self.cached_token.write().await = Some(CachedToken {
                    access_token: token.access_token.clone(),
                    expires_at,
                });

                Ok(BearerToken::new(token.access_token))
            }
        }
    }

    /// Drop the cached token, e.g. after the backend answered 401.
    pub async fn invalidate_cache(&self) {
        *self.cached_token.write().await = None;
    }
}
