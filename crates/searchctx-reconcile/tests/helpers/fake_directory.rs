//! In-memory [`Directory`] with a call log and failure injection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use searchctx_core::{
    BearerToken, Capability, Confidentiality, ContextError, ContextResult, Organization, Space,
    SpaceRecord,
};
use searchctx_reconcile::Directory;

#[derive(Default)]
pub struct FakeDirectory {
    organizations: Vec<Organization>,
    spaces: HashMap<i64, Vec<SpaceRecord>>,
    failing_spaces: Option<i64>,
    calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organizations.push(organization);
        self
    }

    pub fn with_space(
        mut self,
        organization_id: i64,
        id: i64,
        name: &str,
        confidentiality: Confidentiality,
        capabilities: &[Capability],
    ) -> Self {
        self.spaces
            .entry(organization_id)
            .or_default()
            .push(SpaceRecord {
                id,
                name: name.to_string(),
                confidentiality,
                capabilities: capabilities.iter().copied().collect(),
            });
        self
    }

    /// Make `spaces` fail for the Organization with `organization_id`.
    pub fn failing_spaces_for(mut self, organization_id: i64) -> Self {
        self.failing_spaces = Some(organization_id);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn organization(&self, _token: &BearerToken, id: i64) -> ContextResult<Organization> {
        self.record(format!("organization:{id}"));
        self.organizations
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| ContextError::DirectoryLookupFailed(format!("no organization {id}")))
    }

    async fn organizations(&self, _token: &BearerToken) -> ContextResult<Vec<Organization>> {
        self.record("organizations".to_string());
        Ok(self.organizations.clone())
    }

    async fn spaces(
        &self,
        _token: &BearerToken,
        organization: &Organization,
    ) -> ContextResult<Vec<Space>> {
        self.record(format!("spaces:{}", organization.id));
        if self.failing_spaces == Some(organization.id) {
            return Err(ContextError::DirectoryLookupFailed(
                "unable to get spaces".to_string(),
            ));
        }
        Ok(self
            .spaces
            .get(&organization.id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|record| record.within(organization.clone()))
            .collect())
    }
}
