//! Shared fixtures for the reconciliation integration tests.

#![allow(dead_code)]

pub mod fake_backend;
pub mod fake_directory;

use std::sync::Arc;

use searchctx_core::{Confidentiality, Organization, RoleTemplates, Space};
use searchctx_reconcile::{ContextService, Directory};

use fake_directory::FakeDirectory;

pub fn service() -> ContextService {
    service_with(FakeDirectory::new())
}

pub fn service_with(directory: impl Directory + 'static) -> ContextService {
    ContextService::new(
        RoleTemplates::load().expect("built-in templates are valid"),
        Arc::new(directory),
    )
}

pub fn restricted_org() -> Organization {
    Organization::new(1, "acme", Confidentiality::Restricted).with_description("Acme Corp")
}

pub fn public_org() -> Organization {
    Organization::new(2, "acme", Confidentiality::Public)
}

pub fn restricted_space(organization: Organization) -> Space {
    Space::new(10, "beta", organization, Confidentiality::Restricted)
}

pub fn public_space(organization: Organization) -> Space {
    Space::new(11, "beta", organization, Confidentiality::Public)
}
