//! Access-control API client (reqwest-based).

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use searchctx_core::BearerToken;
use tracing::{debug, warn};

use crate::endpoint::SecurityEndpoints;
use crate::error::{ClientError, ClientResult};

/// Result of a create or delete call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The backend performed the change.
    Applied,
    /// The backend reported the resource already in the requested state
    /// (absent on delete, present on a tolerated create).
    AlreadyInDesiredState,
}

/// Client for one search cluster. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AccessControlClient {
    /// Cluster URL without trailing slash, e.g. `https://opensearch:9200`.
    cluster_url: String,
    endpoints: SecurityEndpoints,
    http_client: Client,
}

impl AccessControlClient {
    pub fn new(
        cluster_url: impl Into<String>,
        security_path: &str,
        timeout: Duration,
        tls_verify: bool,
    ) -> ClientResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!tls_verify)
            .user_agent("searchctx/0.1")
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(cluster_url, security_path, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(
        cluster_url: impl Into<String>,
        security_path: &str,
        http_client: Client,
    ) -> Self {
        let cluster_url = cluster_url.into().trim_end_matches('/').to_string();
        Self {
            cluster_url,
            endpoints: SecurityEndpoints::new(security_path),
            http_client,
        }
    }

    #[must_use]
    pub fn cluster_url(&self) -> &str {
        &self.cluster_url
    }

    /// Open a session whose every request carries `token`.
    #[must_use]
    pub fn session(&self, token: BearerToken) -> AccessControlSession {
        AccessControlSession {
            client: self.clone(),
            token,
        }
    }
}

/// A client bound to exactly one bearer token for the duration of one
/// reconciliation operation.
#[derive(Debug, Clone)]
pub struct AccessControlSession {
    client: AccessControlClient,
    token: BearerToken,
}

impl AccessControlSession {
    #[must_use]
    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    #[must_use]
    pub fn endpoints(&self) -> &SecurityEndpoints {
        &self.client.endpoints
    }

    /// Create or replace the resource at `path`. Only 2xx succeeds.
    pub async fn put_resource(&self, path: &str, body: Option<&str>) -> ClientResult<Outcome> {
        self.put(path, body, None).await
    }

    /// Create or replace the resource at `path`, treating `tolerated` as
    /// "already exists".
    pub async fn put_resource_tolerating(
        &self,
        path: &str,
        body: Option<&str>,
        tolerated: StatusCode,
    ) -> ClientResult<Outcome> {
        self.put(path, body, Some(tolerated)).await
    }

    /// Delete the resource at `path`. A 404 means it is already gone.
    pub async fn delete_resource(&self, path: &str) -> ClientResult<Outcome> {
        let url = self.url(path);
        debug!(%url, "DELETE");
        let response = self.send(self.client.http_client.delete(&url), &url).await?;

        let status = response.status();
        if status.is_success() {
            Ok(Outcome::Applied)
        } else if status == StatusCode::NOT_FOUND {
            debug!(%url, "resource not found, skipping deletion");
            Ok(Outcome::AlreadyInDesiredState)
        } else {
            Err(status_error(response, &url).await)
        }
    }

    /// Names of the resources listed at `path`, lower-cased.
    ///
    /// The endpoint must answer with a JSON object keyed by resource name.
    pub async fn list_resource_names(&self, path: &str) -> ClientResult<BTreeSet<String>> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.send(self.client.http_client.get(&url), &url).await?;

        if !response.status().is_success() {
            return Err(status_error(response, &url).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(&url, &e))?;
        let resources: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode {
                url: url.clone(),
                message: e.to_string(),
            })?;

        Ok(resources.keys().map(|name| name.to_lowercase()).collect())
    }

    /// Probe `path`: 2xx is present, 404 is absent, anything else fails.
    pub async fn resource_exists(&self, path: &str) -> ClientResult<bool> {
        let url = self.url(path);
        debug!(%url, "GET (probe)");
        let response = self.send(self.client.http_client.get(&url), &url).await?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(status_error(response, &url).await)
        }
    }

    async fn put(
        &self,
        path: &str,
        body: Option<&str>,
        tolerated: Option<StatusCode>,
    ) -> ClientResult<Outcome> {
        let url = self.url(path);
        debug!(%url, "PUT");
        let mut builder = self.client.http_client.put(&url);
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }
        let response = self.send(builder, &url).await?;

        let status = response.status();
        if status.is_success() {
            Ok(Outcome::Applied)
        } else if Some(status) == tolerated {
            debug!(%url, %status, "resource already exists, skipping creation");
            Ok(Outcome::AlreadyInDesiredState)
        } else {
            Err(status_error(response, &url).await)
        }
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> ClientResult<Response> {
        builder
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| {
                let err = ClientError::from_reqwest(url, &e);
                if err.is_unreachable() {
                    warn!(%url, error = %e, "search backend unreachable");
                }
                err
            })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.client.cluster_url, path)
    }
}

async fn status_error(response: Response, url: &str) -> ClientError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    ClientError::Status {
        url: url.to_string(),
        status,
        body,
    }
}
