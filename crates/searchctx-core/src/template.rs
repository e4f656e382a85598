//! Role and role-mapping bodies for the security API.
//!
//! The bodies are produced by plain placeholder substitution into static
//! JSON templates. Templates are checked once in [`RoleTemplates::load`];
//! rendering itself cannot fail.

use serde_json::Value;
use thiserror::Error;

use crate::model::Space;
use crate::naming;
use crate::scope::SpaceRoleScope;

const SPACE_ROLE_TEMPLATE: &str = include_str!("../templates/role_space.json");
const ORGANIZATION_ROLE_TEMPLATE: &str = include_str!("../templates/role_organization.json");
const ROLE_MAPPING_TEMPLATE: &str = include_str!("../templates/rolemapping.json");

const TENANT_PATTERN: &str = "<tenant_pattern>";
const TENANT_ALLOWED_ACTION: &str = "<tenant_allowed_action>";
const INDEX_PATTERN: &str = "<index_pattern>";
const INDEX_ALLOWED_ACTIONS: &str = "<index_allowed_actions>";
const MODELINDEX_ALLOWED_ACTION: &str = "<modelindex_allowed_action>";
const BACKEND_ROLES: &str = "<backend_roles>";

/// A role template could not be used. Raised at startup only.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template '{template}' is missing placeholder {placeholder}")]
    MissingPlaceholder {
        template: &'static str,
        placeholder: &'static str,
    },

    #[error("template '{template}' does not render to valid JSON: {source}")]
    InvalidJson {
        template: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Parameters of a Space role body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceRoleParams {
    pub tenant_pattern: String,
    pub tenant_permission: &'static str,
    pub index_pattern: String,
    pub index_permissions: &'static [&'static str],
    pub modelindex_permission: &'static str,
}

impl SpaceRoleParams {
    /// Parameters granting `scope` on the Space's tenant and indices.
    #[must_use]
    pub fn for_space(space: &Space, scope: &SpaceRoleScope) -> Self {
        let organization = &space.organization.name;
        Self {
            tenant_pattern: naming::space_tenant_name(organization, &space.name),
            tenant_permission: scope.tenant_permission,
            index_pattern: naming::space_index_pattern(organization, &space.name),
            index_permissions: scope.index_permissions,
            modelindex_permission: scope.modelindex_permission,
        }
    }
}

/// Parameters of an Organization (tenant-only) role body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRoleParams {
    pub tenant_pattern: String,
    pub tenant_permission: &'static str,
}

/// The loaded role, tenant-role and role-mapping templates.
#[derive(Debug, Clone)]
pub struct RoleTemplates {
    space_role: String,
    organization_role: String,
    role_mapping: String,
}

impl RoleTemplates {
    /// Load the built-in templates.
    pub fn load() -> Result<Self, TemplateError> {
        Self::from_sources(
            SPACE_ROLE_TEMPLATE,
            ORGANIZATION_ROLE_TEMPLATE,
            ROLE_MAPPING_TEMPLATE,
        )
    }

    /// Load templates from the given sources, checking each placeholder and
    /// that a sample rendering is valid JSON.
    pub fn from_sources(
        space_role: &str,
        organization_role: &str,
        role_mapping: &str,
    ) -> Result<Self, TemplateError> {
        require_placeholders(
            "space role",
            space_role,
            &[
                TENANT_PATTERN,
                TENANT_ALLOWED_ACTION,
                INDEX_PATTERN,
                INDEX_ALLOWED_ACTIONS,
                MODELINDEX_ALLOWED_ACTION,
            ],
        )?;
        require_placeholders(
            "organization role",
            organization_role,
            &[TENANT_PATTERN, TENANT_ALLOWED_ACTION],
        )?;
        require_placeholders("role mapping", role_mapping, &[BACKEND_ROLES])?;

        let templates = Self {
            space_role: space_role.to_string(),
            organization_role: organization_role.to_string(),
            role_mapping: role_mapping.to_string(),
        };
        templates.check_sample_renderings()?;
        Ok(templates)
    }

    /// Render the body of a Space role.
    #[must_use]
    pub fn render_space_role(&self, params: &SpaceRoleParams) -> String {
        let actions = Value::from(params.index_permissions.to_vec()).to_string();
        self.space_role
            .replace(TENANT_PATTERN, &escape(&params.tenant_pattern))
            .replace(TENANT_ALLOWED_ACTION, &escape(params.tenant_permission))
            .replace(INDEX_PATTERN, &escape(&params.index_pattern))
            .replace(INDEX_ALLOWED_ACTIONS, &actions)
            .replace(MODELINDEX_ALLOWED_ACTION, &escape(params.modelindex_permission))
    }

    /// Render the body of an Organization role, which only grants tenant
    /// access.
    #[must_use]
    pub fn render_tenant_role(&self, params: &TenantRoleParams) -> String {
        self.organization_role
            .replace(TENANT_PATTERN, &escape(&params.tenant_pattern))
            .replace(TENANT_ALLOWED_ACTION, &escape(params.tenant_permission))
    }

    /// Render a role-mapping body binding the given backend roles, in order.
    #[must_use]
    pub fn render_role_mapping<S: AsRef<str>>(&self, backend_roles: &[S]) -> String {
        let roles: Vec<&str> = backend_roles.iter().map(AsRef::as_ref).collect();
        self.role_mapping
            .replace(BACKEND_ROLES, &Value::from(roles).to_string())
    }

    fn check_sample_renderings(&self) -> Result<(), TemplateError> {
        let space_role = self.render_space_role(&SpaceRoleParams {
            tenant_pattern: "sample".into(),
            tenant_permission: "sample",
            index_pattern: "sample_*".into(),
            index_permissions: &["read"],
            modelindex_permission: "read",
        });
        parse("space role", &space_role)?;

        let tenant_role = self.render_tenant_role(&TenantRoleParams {
            tenant_pattern: "sample".into(),
            tenant_permission: "sample",
        });
        parse("organization role", &tenant_role)?;

        parse("role mapping", &self.render_role_mapping(&["sample"]))
    }
}

fn require_placeholders(
    template: &'static str,
    source: &str,
    placeholders: &[&'static str],
) -> Result<(), TemplateError> {
    match placeholders.iter().find(|p| !source.contains(**p)) {
        Some(placeholder) => Err(TemplateError::MissingPlaceholder {
            template,
            placeholder: *placeholder,
        }),
        None => Ok(()),
    }
}

fn parse(template: &'static str, rendered: &str) -> Result<(), TemplateError> {
    serde_json::from_str::<Value>(rendered)
        .map(|_| ())
        .map_err(|source| TemplateError::InvalidJson { template, source })
}

/// Escape a value for use inside a JSON string literal of a template.
fn escape(value: &str) -> String {
    let quoted = Value::from(value).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
