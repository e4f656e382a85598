use std::time::Duration;

use searchctx_client::{AccessControlClient, ClientError, ServiceAuth, ServiceCredentials};

use crate::directory::HttpDirectory;

/// Default root of the security plugin's REST API.
pub const DEFAULT_SECURITY_PATH: &str = "/_plugins/_security/api";

/// Configuration for reconciling one search cluster.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Cluster URL, e.g. `https://opensearch:9200`.
    pub opensearch_url: String,

    /// Root of the security API below the cluster URL.
    pub security_path: String,

    /// Request timeout for the cluster, the directory and the token endpoint.
    pub timeout_secs: u64,

    /// Verify the cluster's TLS certificate. Disable only for local clusters
    /// with self-signed certificates.
    pub tls_verify: bool,

    /// Organization directory endpoint (`GET <endpoint>`, `GET <endpoint>/<id>`).
    pub organization_endpoint: String,

    /// Space directory endpoint (`GET <endpoint>/<organization id>`).
    pub space_endpoint: String,

    /// Service-account credentials.
    pub credentials: ServiceCredentials,
}

impl ContextConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let required = |key: &str| reader(key).map_err(|_| ConfigError::MissingVar(key.into()));

        let opensearch_url = required("OPENSEARCH_URL")?;

        let security_path = reader("OPENSEARCH_SECURITY_PATH")
            .unwrap_or_else(|_| DEFAULT_SECURITY_PATH.to_string());

        let timeout_secs = reader("OPENSEARCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue("OPENSEARCH_TIMEOUT_SECS".into(), e.to_string()))?;

        let tls_verify = reader("OPENSEARCH_TLS_VERIFY")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let organization_endpoint = required("ORGANIZATION_ENDPOINT")?;
        let space_endpoint = required("SPACE_ENDPOINT")?;

        let credentials = match reader("AUTH_BEARER_TOKEN") {
            Ok(token) if !token.is_empty() => ServiceCredentials::Bearer { token },
            _ => ServiceCredentials::OAuth2 {
                token_endpoint: required("AUTH_TOKEN_ENDPOINT")?,
                client_id: required("AUTH_CLIENT_ID")?,
                client_secret: required("AUTH_CLIENT_SECRET")?,
                scopes: reader("AUTH_SCOPE")
                    .unwrap_or_else(|_| "profile".to_string())
                    .split([' ', ','])
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        };

        Ok(Self {
            opensearch_url,
            security_path,
            timeout_secs,
            tls_verify,
            organization_endpoint,
            space_endpoint,
            credentials,
        })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client for the cluster's access-control API.
    pub fn access_control_client(&self) -> Result<AccessControlClient, ClientError> {
        AccessControlClient::new(
            &self.opensearch_url,
            &self.security_path,
            self.timeout(),
            self.tls_verify,
        )
    }

    /// HTTP client for the directory and the token endpoint.
    pub fn http_client(&self) -> Result<reqwest::Client, ClientError> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))
    }

    #[must_use]
    pub fn service_auth(&self, http_client: reqwest::Client) -> ServiceAuth {
        ServiceAuth::new(self.credentials.clone(), http_client)
    }

    #[must_use]
    pub fn directory(&self, http_client: reqwest::Client) -> HttpDirectory {
        HttpDirectory::new(
            &self.organization_endpoint,
            &self.space_endpoint,
            http_client,
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
