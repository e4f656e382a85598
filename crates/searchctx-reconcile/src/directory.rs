//! Organization and Space directory.
//!
//! The directory is the source of truth for which Organizations and Spaces
//! exist and how they are classified. The engine only reads from it.

use async_trait::async_trait;
use reqwest::Client;
use searchctx_core::{
    BearerToken, ContextError, ContextResult, Organization, Space, SpaceRecord,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Read access to the Organization/Space directory.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Fetch one Organization by id.
    async fn organization(&self, token: &BearerToken, id: i64) -> ContextResult<Organization>;

    /// List every Organization.
    async fn organizations(&self, token: &BearerToken) -> ContextResult<Vec<Organization>>;

    /// List the Spaces of `organization`, each annotated with it.
    async fn spaces(
        &self,
        token: &BearerToken,
        organization: &Organization,
    ) -> ContextResult<Vec<Space>>;

    /// Find a Space of `organization` by name, ignoring case.
    async fn space_by_name(
        &self,
        token: &BearerToken,
        organization: &Organization,
        name: &str,
    ) -> ContextResult<Option<Space>> {
        let spaces = self.spaces(token, organization).await?;
        Ok(spaces
            .into_iter()
            .find(|space| space.name.eq_ignore_ascii_case(name)))
    }
}

/// [`Directory`] backed by the organization manager's REST API.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    organization_endpoint: String,
    space_endpoint: String,
    http_client: Client,
}

impl HttpDirectory {
    #[must_use]
    pub fn new(
        organization_endpoint: impl Into<String>,
        space_endpoint: impl Into<String>,
        http_client: Client,
    ) -> Self {
        Self {
            organization_endpoint: organization_endpoint.into().trim_end_matches('/').to_string(),
            space_endpoint: space_endpoint.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &BearerToken,
        url: &str,
        what: &str,
    ) -> ContextResult<T> {
        debug!(%url, "directory lookup");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| lookup_failed(what, url, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(lookup_failed(what, url, &format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| lookup_failed(what, url, &e.to_string()))
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    async fn organization(&self, token: &BearerToken, id: i64) -> ContextResult<Organization> {
        let url = format!("{}/{id}", self.organization_endpoint);
        self.get_json(token, &url, "organization").await
    }

    async fn organizations(&self, token: &BearerToken) -> ContextResult<Vec<Organization>> {
        self.get_json(token, &self.organization_endpoint, "organizations")
            .await
    }

    async fn spaces(
        &self,
        token: &BearerToken,
        organization: &Organization,
    ) -> ContextResult<Vec<Space>> {
        let url = format!("{}/{}", self.space_endpoint, organization.id);
        let records: Vec<SpaceRecord> = self.get_json(token, &url, "spaces").await?;
        Ok(records
            .into_iter()
            .map(|record| record.within(organization.clone()))
            .collect())
    }
}

fn lookup_failed(what: &str, url: &str, detail: &str) -> ContextError {
    error!(%url, %detail, "unable to get {what}");
    ContextError::DirectoryLookupFailed(format!("unable to get {what} from {url}: {detail}"))
}
