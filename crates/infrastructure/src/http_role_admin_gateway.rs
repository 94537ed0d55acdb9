use async_trait::async_trait;
use gatehouse_application::{PermissionChange, RoleAdminGateway};
use gatehouse_core::AppResult;
use gatehouse_domain::{RoleDefinition, RolePermissionMatrix};
use reqwest::Method;
use serde_json::json;

use crate::http_backend_client::HttpBackendClient;

const ROLES_PATH: &str = "/api/roles/";
const PERMISSIONS_PATH: &str = "/api/permissions/";

/// Role and role-permission administration over HTTP.
#[derive(Clone)]
pub struct HttpRoleAdminGateway {
    client: HttpBackendClient,
}

impl HttpRoleAdminGateway {
    /// Creates a role admin gateway.
    #[must_use]
    pub fn new(client: HttpBackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleAdminGateway for HttpRoleAdminGateway {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let url = self.client.endpoint(ROLES_PATH)?;
        self.client.get_list(url).await
    }

    async fn create_role(&self, role: &RoleDefinition) -> AppResult<()> {
        let url = self.client.endpoint(ROLES_PATH)?;
        let body = json!({
            "role": role.role,
            "description": role.description,
        });
        self.client.send(Method::POST, url, Some(&body)).await
    }

    async fn delete_role(&self, role: &str) -> AppResult<()> {
        let url = self.client.endpoint(ROLES_PATH)?;
        let body = json!({ "role": role });
        self.client.send(Method::DELETE, url, Some(&body)).await
    }

    async fn list_role_permissions(&self, role: &str) -> AppResult<RolePermissionMatrix> {
        let mut url = self.client.endpoint(PERMISSIONS_PATH)?;
        url.query_pairs_mut().append_pair("role", role);
        let matrix: Option<RolePermissionMatrix> =
            self.client.fetch_json(Method::GET, url, None).await?;
        Ok(matrix.unwrap_or_default())
    }

    async fn grant_permission(&self, change: &PermissionChange) -> AppResult<()> {
        let url = self.client.endpoint(PERMISSIONS_PATH)?;
        let body = json!({
            "newRole": change.role,
            "newData": change.resource,
            "newPrivilege": change.action,
        });
        self.client.send(Method::POST, url, Some(&body)).await
    }

    async fn revoke_permission(&self, change: &PermissionChange) -> AppResult<()> {
        let url = self.client.endpoint(PERMISSIONS_PATH)?;
        let body = json!({
            "role": change.role,
            "data": change.resource,
            "privilege": change.action,
        });
        self.client.send(Method::DELETE, url, Some(&body)).await
    }
}
