//! Reconciliation of tenants, roles, role mappings and measurement indices.
//!
//! Every operation runs its remote calls strictly in order and stops at the
//! first failure. Creates are idempotent and deletes treat "not found" as
//! done, so an interrupted operation is repaired by running it again.

use std::sync::Arc;

use reqwest::StatusCode;
use searchctx_client::{endpoint, AccessControlSession, Outcome};
use searchctx_core::naming::{
    self, ALL_PUBLIC_ROLE, MEASUREMENT_ALIAS, ORG_ALL_PUBLIC, PUBLIC_ROLE, SPC_ALL_PUBLIC,
};
use searchctx_core::scope::{
    organization_scope_roles, public_space_scope, space_scope_roles, KIBANA_ALL_READ,
};
use searchctx_core::{
    Capability, ContextResult, Organization, ResourceKind, RoleTemplates, Space, SpaceRoleParams,
    TenantRoleParams,
};
use serde_json::json;
use tracing::{debug, info};

use crate::directory::Directory;

/// Counts of a completed full resync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub organizations: usize,
    pub spaces: usize,
}

/// Creates, updates and deletes the access-control context of Organizations
/// and Spaces.
pub struct ContextService {
    templates: RoleTemplates,
    directory: Arc<dyn Directory>,
}

impl ContextService {
    #[must_use]
    pub fn new(templates: RoleTemplates, directory: Arc<dyn Directory>) -> Self {
        Self {
            templates,
            directory,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    // =========================================================================
    // Organization context
    // =========================================================================

    /// Create the tenant, roles and role mappings of `organization`.
    pub async fn create_organization_context(
        &self,
        session: &AccessControlSession,
        organization: &Organization,
    ) -> ContextResult<()> {
        info!(organization = %organization.name, "creating organization context");
        self.create_organization_tenant(session, organization).await?;
        self.create_organization_roles(session, organization).await?;
        self.create_organization_role_mappings(session, organization)
            .await
    }

    /// Recreate the roles and role mappings of `organization`. The tenant is
    /// left alone.
    pub async fn update_organization_context(
        &self,
        session: &AccessControlSession,
        organization: &Organization,
    ) -> ContextResult<()> {
        info!(organization = %organization.name, "updating organization context");
        self.delete_organization_role_mappings(session, &organization.name)
            .await?;
        self.delete_organization_roles(session, &organization.name)
            .await?;
        self.create_organization_roles(session, organization).await?;
        self.create_organization_role_mappings(session, organization)
            .await
    }

    /// Delete role mappings, roles and the tenant of the Organization named
    /// `organization`, public and restricted variants alike.
    pub async fn delete_organization_context(
        &self,
        session: &AccessControlSession,
        organization: &str,
    ) -> ContextResult<()> {
        info!(%organization, "deleting organization context");
        self.delete_organization_role_mappings(session, organization)
            .await?;
        self.delete_organization_roles(session, organization).await?;
        self.delete_tenant(session, &naming::organization_tenant_name(organization))
            .await?;
        Ok(())
    }

    pub async fn create_organization_tenant(
        &self,
        session: &AccessControlSession,
        organization: &Organization,
    ) -> ContextResult<Outcome> {
        self.create_tenant(
            session,
            &naming::organization_tenant_name(&organization.name),
            organization.description_or_empty(),
        )
        .await
    }

    /// A public Organization gets the single `<org>_public` role; otherwise
    /// one role per scoped role.
    pub async fn create_organization_roles(
        &self,
        session: &AccessControlSession,
        organization: &Organization,
    ) -> ContextResult<()> {
        let tenant_pattern = naming::organization_tenant_name(&organization.name);

        if organization.is_public() {
            let body = self.templates.render_tenant_role(&TenantRoleParams {
                tenant_pattern,
                tenant_permission: KIBANA_ALL_READ,
            });
            let name = naming::organization_role_name(&organization.name, PUBLIC_ROLE);
            return self.put_role(session, &name, &body).await;
        }

        for (scope, role) in organization_scope_roles() {
            let body = self.templates.render_tenant_role(&TenantRoleParams {
                tenant_pattern: tenant_pattern.clone(),
                tenant_permission: scope.tenant_permission,
            });
            let name = naming::organization_role_name(&organization.name, role);
            self.put_role(session, &name, &body).await?;
        }
        Ok(())
    }

    pub async fn create_organization_role_mappings(
        &self,
        session: &AccessControlSession,
        organization: &Organization,
    ) -> ContextResult<()> {
        if organization.is_public() {
            let name = naming::organization_role_name(&organization.name, PUBLIC_ROLE);
            let body = self.templates.render_role_mapping(&[ORG_ALL_PUBLIC]);
            return self.put_role_mapping(session, &name, &body).await;
        }

        for (_, role) in organization_scope_roles() {
            let name = naming::organization_role_name(&organization.name, role);
            let backend_role = naming::organization_backend_role(&organization.name, role);
            let body = self.templates.render_role_mapping(&[backend_role]);
            self.put_role_mapping(session, &name, &body).await?;
        }
        Ok(())
    }

    pub async fn delete_organization_role_mappings(
        &self,
        session: &AccessControlSession,
        organization: &str,
    ) -> ContextResult<()> {
        for name in organization_role_names(organization) {
            self.delete_role_mapping(session, &name).await?;
        }
        Ok(())
    }

    pub async fn delete_organization_roles(
        &self,
        session: &AccessControlSession,
        organization: &str,
    ) -> ContextResult<()> {
        for name in organization_role_names(organization) {
            self.delete_role(session, &name).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Space context
    // =========================================================================

    /// Create the tenant, roles and role mappings of `space`, plus its
    /// measurement index when it has the metadata capability.
    pub async fn create_space_context(
        &self,
        session: &AccessControlSession,
        space: &Space,
    ) -> ContextResult<()> {
        info!(
            organization = %space.organization.name,
            space = %space.name,
            "creating space context"
        );
        self.create_space_tenant(session, space).await?;
        self.create_space_roles(session, space).await?;
        self.create_space_role_mappings(session, space).await?;
        if space.has_capability(Capability::Metadata) {
            self.create_measurement_index(session, space).await?;
        }
        Ok(())
    }

    /// Recreate the context of `space`.
    ///
    /// The measurement index is never deleted here, even when the Space lost
    /// its metadata capability.
    pub async fn update_space_context(
        &self,
        session: &AccessControlSession,
        space: &Space,
    ) -> ContextResult<()> {
        info!(
            organization = %space.organization.name,
            space = %space.name,
            "updating space context"
        );
        self.delete_space_role_mappings(session, &space.organization.name, &space.name)
            .await?;
        self.delete_space_roles(session, &space.organization.name, &space.name)
            .await?;
        self.create_space_context(session, space).await
    }

    /// Delete role mappings, roles and the tenant of a Space.
    pub async fn delete_space_context(
        &self,
        session: &AccessControlSession,
        organization: &str,
        space: &str,
    ) -> ContextResult<()> {
        info!(%organization, %space, "deleting space context");
        self.delete_space_role_mappings(session, organization, space)
            .await?;
        self.delete_space_roles(session, organization, space).await?;
        self.delete_tenant(session, &naming::space_tenant_name(organization, space))
            .await?;
        Ok(())
    }

    pub async fn create_space_tenant(
        &self,
        session: &AccessControlSession,
        space: &Space,
    ) -> ContextResult<Outcome> {
        let name = naming::space_tenant_name(&space.organization.name, &space.name);
        self.create_tenant(session, &name, "").await
    }

    /// A public Space gets the single `<org>_<space>_all_public` read role;
    /// otherwise one role per scoped role.
    pub async fn create_space_roles(
        &self,
        session: &AccessControlSession,
        space: &Space,
    ) -> ContextResult<()> {
        let organization = &space.organization.name;

        if space.is_public() {
            let params = SpaceRoleParams::for_space(space, public_space_scope());
            let body = self.templates.render_space_role(&params);
            let name = naming::space_role_name(organization, &space.name, ALL_PUBLIC_ROLE);
            return self.put_role(session, &name, &body).await;
        }

        for (scope, role) in space_scope_roles() {
            let body = self
                .templates
                .render_space_role(&SpaceRoleParams::for_space(space, scope));
            let name = naming::space_role_name(organization, &space.name, role);
            self.put_role(session, &name, &body).await?;
        }
        Ok(())
    }

    /// Each mapping binds the role's own backend role and the access role of
    /// the owning Organization.
    pub async fn create_space_role_mappings(
        &self,
        session: &AccessControlSession,
        space: &Space,
    ) -> ContextResult<()> {
        let organization = &space.organization.name;
        let organization_role =
            naming::organization_access_role(organization, space.organization.is_public());

        if space.is_public() {
            let name = naming::space_role_name(organization, &space.name, ALL_PUBLIC_ROLE);
            let body = self
                .templates
                .render_role_mapping(&[SPC_ALL_PUBLIC, organization_role.as_str()]);
            return self.put_role_mapping(session, &name, &body).await;
        }

        for (_, role) in space_scope_roles() {
            let name = naming::space_role_name(organization, &space.name, role);
            let body = self
                .templates
                .render_role_mapping(&[name.as_str(), organization_role.as_str()]);
            self.put_role_mapping(session, &name, &body).await?;
        }
        Ok(())
    }

    /// Create `<org>_<space>_measurements` unless it exists, then point the
    /// `measurements` alias at it.
    pub async fn create_measurement_index(
        &self,
        session: &AccessControlSession,
        space: &Space,
    ) -> ContextResult<()> {
        let index = naming::measurement_index_name(&space.organization.name, &space.name);

        let probe = endpoint::cat_index(&index);
        let exists = session
            .resource_exists(&probe)
            .await
            .map_err(|e| e.into_lookup_failure(probe.as_str()))?;

        if exists {
            debug!(%index, "index already exists, skipping creation");
        } else {
            debug!(%index, "creating index");
            session
                .put_resource_tolerating(&endpoint::index(&index), None, StatusCode::BAD_REQUEST)
                .await
                .map_err(|e| e.into_create_failure(ResourceKind::Index, index.as_str()))?;
        }

        debug!(%index, alias = MEASUREMENT_ALIAS, "creating index alias");
        session
            .put_resource_tolerating(
                &endpoint::index_alias(&index, MEASUREMENT_ALIAS),
                None,
                StatusCode::BAD_REQUEST,
            )
            .await
            .map_err(|e| {
                e.into_create_failure(ResourceKind::Alias, format!("{index}/{MEASUREMENT_ALIAS}"))
            })?;
        Ok(())
    }

    pub async fn delete_space_role_mappings(
        &self,
        session: &AccessControlSession,
        organization: &str,
        space: &str,
    ) -> ContextResult<()> {
        for name in space_role_names(organization, space) {
            self.delete_role_mapping(session, &name).await?;
        }
        Ok(())
    }

    pub async fn delete_space_roles(
        &self,
        session: &AccessControlSession,
        organization: &str,
        space: &str,
    ) -> ContextResult<()> {
        for name in space_role_names(organization, space) {
            self.delete_role(session, &name).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Tenants
    // =========================================================================

    /// Create tenant `name` unless a tenant of that name, ignoring case,
    /// already exists.
    pub async fn create_tenant(
        &self,
        session: &AccessControlSession,
        name: &str,
        description: &str,
    ) -> ContextResult<Outcome> {
        let tenants = session.endpoints().tenants();
        let existing = session
            .list_resource_names(&tenants)
            .await
            .map_err(|e| e.into_lookup_failure(tenants.as_str()))?;

        if existing.contains(&name.to_lowercase()) {
            debug!(tenant = %name, "tenant already exists, skipping creation");
            return Ok(Outcome::AlreadyInDesiredState);
        }

        debug!(tenant = %name, "creating tenant");
        let body = json!({ "description": description }).to_string();
        session
            .put_resource(&session.endpoints().tenant(name), Some(&body))
            .await
            .map_err(|e| e.into_create_failure(ResourceKind::Tenant, name))
    }

    pub async fn delete_tenant(
        &self,
        session: &AccessControlSession,
        name: &str,
    ) -> ContextResult<Outcome> {
        debug!(tenant = %name, "deleting tenant");
        session
            .delete_resource(&session.endpoints().tenant(name))
            .await
            .map_err(|e| e.into_delete_failure(ResourceKind::Tenant, name))
    }

    // =========================================================================
    // Full resync
    // =========================================================================

    /// Recreate the context of every Organization and Space in the
    /// directory. The first failure aborts the run; re-run it from the
    /// start.
    pub async fn sync_all(&self, session: &AccessControlSession) -> ContextResult<SyncReport> {
        let organizations = self.directory.organizations(session.token()).await?;
        info!(count = organizations.len(), "starting full resync");

        let mut report = SyncReport::default();
        for organization in &organizations {
            info!(organization = %organization.name, "resync: updating organization context");
            self.update_organization_context(session, organization)
                .await?;
            self.create_organization_tenant(session, organization)
                .await?;

            let spaces = self
                .directory
                .spaces(session.token(), organization)
                .await?;
            for space in &spaces {
                info!(
                    organization = %organization.name,
                    space = %space.name,
                    "resync: updating space context"
                );
                self.update_space_context(session, space).await?;
                report.spaces += 1;
            }
            report.organizations += 1;
        }

        info!(
            organizations = report.organizations,
            spaces = report.spaces,
            "full resync complete"
        );
        Ok(report)
    }

    // =========================================================================
    // Roles and role mappings
    // =========================================================================

    async fn put_role(
        &self,
        session: &AccessControlSession,
        name: &str,
        body: &str,
    ) -> ContextResult<()> {
        debug!(role = %name, "creating role");
        session
            .put_resource(&session.endpoints().role(name), Some(body))
            .await
            .map_err(|e| e.into_create_failure(ResourceKind::Role, name))?;
        Ok(())
    }

    async fn put_role_mapping(
        &self,
        session: &AccessControlSession,
        name: &str,
        body: &str,
    ) -> ContextResult<()> {
        debug!(role_mapping = %name, "creating role mapping");
        session
            .put_resource(&session.endpoints().role_mapping(name), Some(body))
            .await
            .map_err(|e| e.into_create_failure(ResourceKind::RoleMapping, name))?;
        Ok(())
    }

    async fn delete_role(&self, session: &AccessControlSession, name: &str) -> ContextResult<()> {
        debug!(role = %name, "deleting role");
        session
            .delete_resource(&session.endpoints().role(name))
            .await
            .map_err(|e| e.into_delete_failure(ResourceKind::Role, name))?;
        Ok(())
    }

    async fn delete_role_mapping(
        &self,
        session: &AccessControlSession,
        name: &str,
    ) -> ContextResult<()> {
        debug!(role_mapping = %name, "deleting role mapping");
        session
            .delete_resource(&session.endpoints().role_mapping(name))
            .await
            .map_err(|e| e.into_delete_failure(ResourceKind::RoleMapping, name))?;
        Ok(())
    }
}

/// Every role name an Organization can own, public or not.
fn organization_role_names(organization: &str) -> Vec<String> {
    std::iter::once(PUBLIC_ROLE)
        .chain(organization_scope_roles().map(|(_, role)| role))
        .map(|role| naming::organization_role_name(organization, role))
        .collect()
}

/// Every role name a Space can own, public or not.
fn space_role_names(organization: &str, space: &str) -> Vec<String> {
    std::iter::once(ALL_PUBLIC_ROLE)
        .chain(space_scope_roles().map(|(_, role)| role))
        .map(|role| naming::space_role_name(organization, space, role))
        .collect()
}
