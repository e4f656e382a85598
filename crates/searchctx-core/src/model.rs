//! Organizations and Spaces as delivered by the directory service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Visibility of an Organization or Space.
///
/// Anything the directory reports other than `PUBLIC` is provisioned with the
/// full restricted role set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidentiality {
    Public,
    #[default]
    #[serde(other)]
    Restricted,
}

/// Feature flag on a Space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    /// The Space gets a measurement index and its alias.
    Metadata,
    /// Capabilities this service does not act on.
    #[serde(other)]
    Other,
}

/// An Organization, the top level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    /// Unique name, used as the naming key for every derived resource.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confidentiality: Confidentiality,
}

impl Organization {
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, confidentiality: Confidentiality) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            confidentiality,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.confidentiality == Confidentiality::Public
    }

    /// Tenant description, empty when the directory has none.
    #[must_use]
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// A Space as listed by the directory, before it is attached to its
/// Organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub confidentiality: Confidentiality,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl SpaceRecord {
    /// Attach the record to its owning Organization.
    #[must_use]
    pub fn within(self, organization: Organization) -> Space {
        Space {
            id: self.id,
            name: self.name,
            organization,
            confidentiality: self.confidentiality,
            capabilities: self.capabilities,
        }
    }
}

/// A Space, always owned by exactly one Organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: i64,
    pub name: String,
    pub organization: Organization,
    #[serde(default)]
    pub confidentiality: Confidentiality,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl Space {
    #[must_use]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        organization: Organization,
        confidentiality: Confidentiality,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            organization,
            confidentiality,
            capabilities: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.confidentiality == Confidentiality::Public
    }

    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Bearer token used for every request of one reconciliation call.
///
/// The [`Debug`] impl redacts the value so tokens never reach log output.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BearerToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_confidentiality_is_restricted() {
        let org: Organization = serde_json::from_value(json!({
            "id": 7,
            "name": "acme",
            "confidentiality": "INTERNAL"
        }))
        .unwrap();
        assert_eq!(org.confidentiality, Confidentiality::Restricted);
        assert!(!org.is_public());
    }

    #[test]
    fn test_public_confidentiality_roundtrips() {
        let org: Organization = serde_json::from_value(json!({
            "id": 7,
            "name": "acme",
            "confidentiality": "PUBLIC"
        }))
        .unwrap();
        assert!(org.is_public());
        assert_eq!(
            serde_json::to_value(org.confidentiality).unwrap(),
            json!("PUBLIC")
        );
    }

    #[test]
    fn test_missing_description_renders_empty() {
        let org = Organization::new(1, "acme", Confidentiality::Restricted);
        assert_eq!(org.description_or_empty(), "");
        let org = org.with_description("Acme Corp");
        assert_eq!(org.description_or_empty(), "Acme Corp");
    }

    #[test]
    fn test_space_record_capabilities() {
        let record: SpaceRecord = serde_json::from_value(json!({
            "id": 3,
            "name": "beta",
            "confidentiality": "PRIVATE",
            "capabilities": ["STORAGE", "METADATA"]
        }))
        .unwrap();
        let org = Organization::new(1, "acme", Confidentiality::Public);
        let space = record.within(org.clone());

        assert_eq!(space.organization, org);
        assert!(!space.is_public());
        assert!(space.has_capability(Capability::Metadata));
        assert!(space.has_capability(Capability::Other));
    }

    #[test]
    fn test_space_without_capabilities() {
        let record: SpaceRecord =
            serde_json::from_value(json!({ "id": 3, "name": "beta" })).unwrap();
        assert!(record.capabilities.is_empty());
        assert_eq!(record.confidentiality, Confidentiality::Restricted);
    }

    #[test]
    fn test_bearer_token_debug_is_redacted() {
        let token = BearerToken::new("secret-value");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("REDACTED"));
        assert_eq!(token.expose(), "secret-value");
    }
}
