//! Role scopes.
//!
//! Each scope expands to one or more role labels and carries the permission
//! strings embedded into the generated role bodies. Remote role definitions
//! depend on these strings verbatim.

/// Tenant-level permission granting read access to dashboards.
pub const KIBANA_ALL_READ: &str = "kibana_all_read";

/// Tenant-level permission granting write access to dashboards.
pub const KIBANA_ALL_WRITE: &str = "kibana_all_write";

/// A role scope of an Organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationRoleScope {
    pub scope: &'static str,
    pub roles: &'static [&'static str],
    pub tenant_permission: &'static str,
}

/// A role scope of a Space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceRoleScope {
    pub scope: &'static str,
    pub roles: &'static [&'static str],
    pub index_permissions: &'static [&'static str],
    pub modelindex_permission: &'static str,
    pub tenant_permission: &'static str,
}

pub static ORGANIZATION_ROLE_SCOPES: [OrganizationRoleScope; 2] = [
    OrganizationRoleScope {
        scope: "READ",
        roles: &["access"],
        tenant_permission: KIBANA_ALL_READ,
    },
    OrganizationRoleScope {
        scope: "WRITE",
        roles: &["admin", "trustee"],
        tenant_permission: KIBANA_ALL_WRITE,
    },
];

pub static SPACE_ROLE_SCOPES: [SpaceRoleScope; 2] = [
    SpaceRoleScope {
        scope: "READ",
        roles: &["user", "supplier"],
        index_permissions: &[
            "read",
            "indices:data/read/scroll",
            "indices:admin/mappings/get",
        ],
        modelindex_permission: "read",
        tenant_permission: KIBANA_ALL_READ,
    },
    SpaceRoleScope {
        scope: "CRUD",
        roles: &["trustee"],
        index_permissions: &[
            "crud",
            "indices:data/read/scroll",
            "indices:admin/mappings/get",
            "indices:admin/mappings/put",
        ],
        modelindex_permission: "crud",
        tenant_permission: KIBANA_ALL_WRITE,
    },
];

/// Permissions of the single role of a public Space (same as `READ`).
#[must_use]
pub fn public_space_scope() -> &'static SpaceRoleScope {
    &SPACE_ROLE_SCOPES[0]
}

/// Every `(scope, role label)` pair of a restricted Organization.
pub fn organization_scope_roles(
) -> impl Iterator<Item = (&'static OrganizationRoleScope, &'static str)> {
    ORGANIZATION_ROLE_SCOPES
        .iter()
        .flat_map(|scope| scope.roles.iter().map(move |role| (scope, *role)))
}

/// Every `(scope, role label)` pair of a restricted Space.
pub fn space_scope_roles() -> impl Iterator<Item = (&'static SpaceRoleScope, &'static str)> {
    SPACE_ROLE_SCOPES
        .iter()
        .flat_map(|scope| scope.roles.iter().map(move |role| (scope, *role)))
}
