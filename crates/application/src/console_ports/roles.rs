use async_trait::async_trait;
use gatehouse_core::AppResult;
use gatehouse_domain::{RoleDefinition, RolePermissionMatrix};

/// Grant or revoke request for one role permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionChange {
    /// Role name.
    pub role: String,
    /// Resource namespace.
    pub resource: String,
    /// Operation name.
    pub action: String,
}

/// Port for role and role-permission administration.
#[async_trait]
pub trait RoleAdminGateway: Send + Sync {
    /// Lists all roles.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Creates a role.
    async fn create_role(&self, role: &RoleDefinition) -> AppResult<()>;

    /// Deletes a role by name.
    async fn delete_role(&self, role: &str) -> AppResult<()>;

    /// Lists assignable permissions for a role, grouped by category.
    async fn list_role_permissions(&self, role: &str) -> AppResult<RolePermissionMatrix>;

    /// Grants a permission to a role.
    async fn grant_permission(&self, change: &PermissionChange) -> AppResult<()>;

    /// Revokes a permission from a role.
    async fn revoke_permission(&self, change: &PermissionChange) -> AppResult<()>;
}
