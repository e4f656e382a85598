//! Error taxonomy for context reconciliation.
//!
//! Every failure names the resource kind and the resource it happened on, so
//! callers can tell a failed role-mapping from a failed tenant without
//! parsing messages.

use thiserror::Error;

/// Kinds of resources provisioned in the search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Tenant,
    Role,
    RoleMapping,
    Index,
    Alias,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Tenant => "tenant",
            ResourceKind::Role => "role",
            ResourceKind::RoleMapping => "rolesmapping",
            ResourceKind::Index => "index",
            ResourceKind::Alias => "alias",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a context operation.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A create call returned a status that is not a recognised
    /// "already exists".
    #[error("unable to create {kind} '{name}': {detail}")]
    ResourceCreateFailed {
        kind: ResourceKind,
        name: String,
        detail: String,
    },

    /// A delete call returned a status other than success or 404.
    #[error("unable to delete {kind} '{name}': {detail}")]
    ResourceDeleteFailed {
        kind: ResourceKind,
        name: String,
        detail: String,
    },

    /// The search backend could not be reached at all.
    #[error("search backend unreachable: {message}")]
    BackendUnreachable { message: String },

    /// Listing resources or probing an index failed.
    #[error("unable to look up {endpoint}: {detail}")]
    LookupFailed { endpoint: String, detail: String },

    /// The Organization/Space directory failed.
    #[error("directory lookup failed: {0}")]
    DirectoryLookupFailed(String),

    /// The caller lacks the rights for this action.
    #[error("you do not have permission for this action")]
    InsufficientRights,

    /// No service-account token could be obtained.
    #[error("unable to obtain access token: {0}")]
    Auth(String),
}

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;

impl ContextError {
    /// HTTP status a request boundary should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            // Rejected role, index and alias bodies count as bad requests.
            ContextError::ResourceCreateFailed {
                kind: ResourceKind::Role | ResourceKind::Index | ResourceKind::Alias,
                ..
            } => 400,
            ContextError::ResourceCreateFailed { .. }
            | ContextError::ResourceDeleteFailed { .. }
            | ContextError::Auth(_) => 500,
            ContextError::BackendUnreachable { .. } => 502,
            ContextError::LookupFailed { .. } | ContextError::DirectoryLookupFailed(_) => 400,
            ContextError::InsufficientRights => 403,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ContextError::ResourceCreateFailed { .. } => "resource_create_failed",
            ContextError::ResourceDeleteFailed { .. } => "resource_delete_failed",
            ContextError::BackendUnreachable { .. } => "backend_unreachable",
            ContextError::LookupFailed { .. } => "lookup_failed",
            ContextError::DirectoryLookupFailed(_) => "directory_lookup_failed",
            ContextError::InsufficientRights => "insufficient_rights",
            ContextError::Auth(_) => "auth_failed",
        }
    }

    /// The resource kind a create or delete failure refers to.
    #[must_use]
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        match self {
            ContextError::ResourceCreateFailed { kind, .. }
            | ContextError::ResourceDeleteFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The name of the resource a create or delete failure refers to.
    #[must_use]
    pub fn resource_name(&self) -> Option<&str> {
        match self {
            ContextError::ResourceCreateFailed { name, .. }
            | ContextError::ResourceDeleteFailed { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether the whole backend, not a single resource, is unavailable.
    #[must_use]
    pub fn is_backend_unreachable(&self) -> bool {
        matches!(self, ContextError::BackendUnreachable { .. })
    }
}
