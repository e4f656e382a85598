//! # searchctx core
//!
//! Pure building blocks for provisioning access-control contexts in a
//! multi-tenant search backend. Nothing in this crate performs I/O.
//!
//! - [`model`] - Organizations, Spaces, confidentiality and capabilities
//! - [`naming`] - Canonical tenant, role and index names
//! - [`scope`] - The fixed role-scope tables for Organizations and Spaces
//! - [`template`] - Role and role-mapping body rendering
//! - [`error`] - The error taxonomy shared by the client and the engine

pub mod error;
pub mod model;
pub mod naming;
pub mod scope;
pub mod template;

pub use error::{ContextError, ContextResult, ResourceKind};
pub use model::{BearerToken, Capability, Confidentiality, Organization, Space, SpaceRecord};
pub use template::{RoleTemplates, SpaceRoleParams, TemplateError, TenantRoleParams};
