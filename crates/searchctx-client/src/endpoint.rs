//! Endpoint paths, relative to the cluster URL.
//!
//! Resource names are percent-encoded as single path segments.

use urlencoding::encode;

/// Paths of the security plugin's REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEndpoints {
    base: String,
}

impl SecurityEndpoints {
    /// `security_path` is the API root, e.g. `/_plugins/_security/api`.
    #[must_use]
    pub fn new(security_path: &str) -> Self {
        let trimmed = security_path.trim_matches('/');
        let base = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self { base }
    }

    #[must_use]
    pub fn tenants(&self) -> String {
        format!("{}/tenants", self.base)
    }

    #[must_use]
    pub fn tenant(&self, name: &str) -> String {
        format!("{}/tenants/{}", self.base, encode(name))
    }

    #[must_use]
    pub fn role(&self, name: &str) -> String {
        format!("{}/roles/{}", self.base, encode(name))
    }

    #[must_use]
    pub fn role_mapping(&self, name: &str) -> String {
        format!("{}/rolesmapping/{}", self.base, encode(name))
    }
}

/// `/<index>`
#[must_use]
pub fn index(name: &str) -> String {
    format!("/{}", encode(name))
}

/// `/<index>/_alias/<alias>`
#[must_use]
pub fn index_alias(index: &str, alias: &str) -> String {
    format!("/{}/_alias/{}", encode(index), encode(alias))
}

/// `/_cat/indices/<index>`, answers 404 when the index does not exist.
#[must_use]
pub fn cat_index(name: &str) -> String {
    format!("/_cat/indices/{}", encode(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_paths() {
        let endpoints = SecurityEndpoints::new("/_plugins/_security/api/");
        assert_eq!(endpoints.tenants(), "/_plugins/_security/api/tenants");
        assert_eq!(
            endpoints.tenant("acme"),
            "/_plugins/_security/api/tenants/acme"
        );
        assert_eq!(
            endpoints.role("acme_admin"),
            "/_plugins/_security/api/roles/acme_admin"
        );
        assert_eq!(
            endpoints.role_mapping("acme_admin"),
            "/_plugins/_security/api/rolesmapping/acme_admin"
        );
    }

    #[test]
    fn test_empty_security_path() {
        assert_eq!(SecurityEndpoints::new("").tenants(), "/tenants");
    }

    #[test]
    fn test_index_paths() {
        assert_eq!(index("acme_beta_measurements"), "/acme_beta_measurements");
        assert_eq!(
            index_alias("acme_beta_measurements", "measurements"),
            "/acme_beta_measurements/_alias/measurements"
        );
        assert_eq!(cat_index("x"), "/_cat/indices/x");
    }

    #[test]
    fn test_names_are_single_path_segments() {
        let endpoints = SecurityEndpoints::new("/_plugins/_security/api");
        assert_eq!(
            endpoints.role("a/b"),
            "/_plugins/_security/api/roles/a%2Fb"
        );
        assert_eq!(
            endpoints.tenant("x?y#z"),
            "/_plugins/_security/api/tenants/x%3Fy%23z"
        );
        assert_eq!(
            endpoints.role_mapping("acme beta"),
            "/_plugins/_security/api/rolesmapping/acme%20beta"
        );
        assert_eq!(index("../_all"), "/..%2F_all");
        assert_eq!(index_alias("a#b", "m"), "/a%23b/_alias/m");
        assert_eq!(cat_index("a?v"), "/_cat/indices/a%3Fv");
    }

    #[test]
    fn test_plain_names_are_unchanged() {
        let endpoints = SecurityEndpoints::new("/api");
        assert_eq!(endpoints.role("acme_beta-1.x~"), "/api/roles/acme_beta-1.x~");
    }
}
