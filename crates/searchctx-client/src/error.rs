//! Client-level failures and their conversion into [`ContextError`].

use searchctx_core::{ContextError, ResourceKind};
use thiserror::Error;

/// Failure of a single access-control API call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure or timeout: the backend as a whole is
    /// unavailable.
    #[error("backend unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// The backend answered with a non-2xx status that was not tolerated.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The request failed for another reason (body, redirect, protocol).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The response body could not be interpreted.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// No token could be obtained for the service account.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The HTTP client could not be built.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for client calls.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub(crate) fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            ClientError::Unreachable {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            ClientError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// HTTP status, if the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Unreachable { .. })
    }

    /// Classify a failed create of `kind` named `name`.
    #[must_use]
    pub fn into_create_failure(self, kind: ResourceKind, name: impl Into<String>) -> ContextError {
        let detail = self.to_string();
        match self {
            ClientError::Unreachable { .. } => ContextError::BackendUnreachable { message: detail },
            ClientError::Auth(message) => ContextError::Auth(message),
            _ => ContextError::ResourceCreateFailed {
                kind,
                name: name.into(),
                detail,
            },
        }
    }

    /// Classify a failed delete of `kind` named `name`.
    #[must_use]
    pub fn into_delete_failure(self, kind: ResourceKind, name: impl Into<String>) -> ContextError {
        let detail = self.to_string();
        match self {
            ClientError::Unreachable { .. } => ContextError::BackendUnreachable { message: detail },
            ClientError::Auth(message) => ContextError::Auth(message),
            _ => ContextError::ResourceDeleteFailed {
                kind,
                name: name.into(),
                detail,
            },
        }
    }

    /// Classify a failed listing or existence probe of `endpoint`.
    #[must_use]
    pub fn into_lookup_failure(self, endpoint: impl Into<String>) -> ContextError {
        let detail = self.to_string();
        match self {
            ClientError::Unreachable { .. } => ContextError::BackendUnreachable { message: detail },
            ClientError::Auth(message) => ContextError::Auth(message),
            _ => ContextError::LookupFailed {
                endpoint: endpoint.into(),
                detail,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error() -> ClientError {
        ClientError::Status {
            url: "http://os/roles/acme_admin".into(),
            status: 500,
            body: "boom".into(),
        }
    }

    fn refused() -> ClientError {
        ClientError::Unreachable {
            url: "http://os/roles/acme_admin".into(),
            message: "connection refused".into(),
        }
    }

    #[test]
    fn test_status_becomes_create_failure() {
        let err = server_error().into_create_failure(ResourceKind::Role, "acme_admin");
        assert!(matches!(
            err,
            ContextError::ResourceCreateFailed {
                kind: ResourceKind::Role,
                ref name,
                ..
            } if name == "acme_admin"
        ));
    }

    #[test]
    fn test_status_becomes_delete_failure() {
        let err = server_error().into_delete_failure(ResourceKind::Tenant, "acme");
        assert_eq!(err.resource_kind(), Some(ResourceKind::Tenant));
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn test_unreachable_is_never_a_resource_failure() {
        assert!(refused()
            .into_create_failure(ResourceKind::Role, "x")
            .is_backend_unreachable());
        assert!(refused()
            .into_delete_failure(ResourceKind::Role, "x")
            .is_backend_unreachable());
        assert!(refused().into_lookup_failure("/tenants").is_backend_unreachable());
    }

    #[test]
    fn test_lookup_failure() {
        let err = server_error().into_lookup_failure("/tenants");
        assert!(matches!(err, ContextError::LookupFailed { ref endpoint, .. } if endpoint == "/tenants"));
    }

    #[test]
    fn test_auth_failure_passes_through() {
        let err = ClientError::Auth("token endpoint returned 401".into())
            .into_create_failure(ResourceKind::Tenant, "acme");
        assert!(matches!(err, ContextError::Auth(_)));
    }
}
