//! Canonical names of the resources derived from an Organization or Space.
//!
//! Names are case preserving. The only exception is the measurement index,
//! which the search backend requires in lower case.

/// Role label of the single role of a public Organization.
pub const PUBLIC_ROLE: &str = "public";

/// Role label of the single role of a public Space.
pub const ALL_PUBLIC_ROLE: &str = "all_public";

/// Backend role every caller holds for public Organizations.
pub const ORG_ALL_PUBLIC: &str = "org_all_public";

/// Backend role every caller holds for public Spaces.
pub const SPC_ALL_PUBLIC: &str = "spc_all_public";

/// Alias of every measurement index.
pub const MEASUREMENT_ALIAS: &str = "measurements";

/// `<org>_<role>`
#[must_use]
pub fn organization_role_name(organization: &str, role: &str) -> String {
    format!("{organization}_{role}")
}

/// `<org>_<space>_<role>`
#[must_use]
pub fn space_role_name(organization: &str, space: &str, role: &str) -> String {
    format!("{organization}_{space}_{role}")
}

/// An Organization's tenant is named after the Organization itself.
#[must_use]
pub fn organization_tenant_name(organization: &str) -> String {
    organization.to_string()
}

/// `<org>_<space>`
#[must_use]
pub fn space_tenant_name(organization: &str, space: &str) -> String {
    format!("{organization}_{space}")
}

/// Index pattern covering every index of a Space: `<org>_<space>_*`.
#[must_use]
pub fn space_index_pattern(organization: &str, space: &str) -> String {
    format!("{organization}_{space}_*")
}

/// Identity-provider role mapped onto an Organization role: `org_<org>_<role>`.
#[must_use]
pub fn organization_backend_role(organization: &str, role: &str) -> String {
    format!("org_{organization}_{role}")
}

/// Backend role granting access to an Organization, as required by every
/// Space role-mapping below it.
#[must_use]
pub fn organization_access_role(organization: &str, public: bool) -> String {
    if public {
        ORG_ALL_PUBLIC.to_string()
    } else {
        organization_backend_role(organization, "access")
    }
}

/// `lower(<org>_<space>_measurements)`
#[must_use]
pub fn measurement_index_name(organization: &str, space: &str) -> String {
    format!("{organization}_{space}_{MEASUREMENT_ALIAS}").to_lowercase()
}
