use std::collections::BTreeMap;

use gatehouse_core::AppResult;
use serde::{Deserialize, Serialize};

use crate::record::{RecordId, TableRecord, require_field};

/// Resource namespace guarding the administration data.
pub const RBAC_DATA_OBJECT: &str = "rbac::data";

/// Action name for read access.
pub const READ_ACTION: &str = "read";

/// Action name for write access.
pub const WRITE_ACTION: &str = "write";

/// Role known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Unique role name.
    pub role: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// User row joined with the role currently assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRoleAssignment {
    /// Identity provider subject id.
    pub id: RecordId,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
    /// Sign-in email.
    #[serde(default)]
    pub email: String,
    /// Assigned role name; empty when unassigned.
    #[serde(default)]
    pub role: String,
}

impl TableRecord for SubjectRoleAssignment {
    fn record_id(&self) -> &RecordId {
        &self.id
    }

    fn draft() -> Self {
        Self {
            id: RecordId::Draft,
            full_name: String::new(),
            email: String::new(),
            role: String::new(),
        }
    }

    fn validate(&self) -> AppResult<()> {
        require_field("role", &self.role)
    }
}

/// One assignable permission and whether a given role holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDescriptor {
    /// Backend permission id.
    pub id: i64,
    /// Resource namespace.
    pub resource: String,
    /// Operation name.
    pub action: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Whether the selected role currently holds this permission.
    #[serde(default)]
    pub has_permission: bool,
}

/// Permissions for one role grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePermissionMatrix(BTreeMap<String, Vec<PermissionDescriptor>>);

impl RolePermissionMatrix {
    /// Creates a matrix from categorized descriptors.
    #[must_use]
    pub fn new(categories: BTreeMap<String, Vec<PermissionDescriptor>>) -> Self {
        Self(categories)
    }

    /// Iterates categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[PermissionDescriptor])> {
        self.0
            .iter()
            .map(|(category, descriptors)| (category.as_str(), descriptors.as_slice()))
    }

    /// Finds the descriptor for a resource/action pair.
    #[must_use]
    pub fn find(&self, resource: &str, action: &str) -> Option<&PermissionDescriptor> {
        self.0
            .values()
            .flatten()
            .find(|descriptor| descriptor.resource == resource && descriptor.action == action)
    }

    /// Returns true when no category is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::RolePermissionMatrix;

    #[test]
    fn matrix_deserializes_from_category_map() {
        let matrix: Result<RolePermissionMatrix, _> = serde_json::from_str(
            r#"{"Admin":[{"id":1,"resource":"rbac::data","action":"read","description":"Read RBAC data","has_permission":true}]}"#,
        );
        let Ok(matrix) = matrix else {
            panic!("matrix should deserialize");
        };

        let descriptor = matrix.find("rbac::data", "read");
        assert!(descriptor.is_some_and(|value| value.has_permission));
        assert!(matrix.find("rbac::data", "write").is_none());
    }
}
