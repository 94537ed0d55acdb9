use std::sync::Arc;

use gatehouse_core::{AppError, AppResult, NonEmptyString};
use gatehouse_domain::{
    PermissionDescriptor, RecordId, RoleDefinition, RolePermissionMatrix, SubjectRoleAssignment,
};
use tokio::sync::RwLock;

use crate::console_ports::{
    ListFilter, Notification, Notifier, PermissionChange, ResourceGateway, RoleAdminGateway,
};
use crate::refresh_coordinator::{RefreshCoordinator, RefreshTopic};
use crate::table_controller::TableController;

/// Users-with-roles table plus the role options offered for assignment.
pub struct RoleAssignmentController {
    roles: Arc<dyn RoleAdminGateway>,
    notifier: Arc<dyn Notifier>,
    table: TableController<SubjectRoleAssignment>,
    role_options: RwLock<Vec<String>>,
}

impl RoleAssignmentController {
    /// Creates a controller registered under the users topic.
    #[must_use]
    pub fn new(
        assignments: Arc<dyn ResourceGateway<SubjectRoleAssignment>>,
        roles: Arc<dyn RoleAdminGateway>,
        notifier: Arc<dyn Notifier>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        let table = TableController::new(
            assignments,
            notifier.clone(),
            coordinator,
            RefreshTopic::users(),
        );

        Self {
            roles,
            notifier,
            table,
            role_options: RwLock::new(Vec::new()),
        }
    }

    /// Returns the underlying users table.
    #[must_use]
    pub fn table(&self) -> &TableController<SubjectRoleAssignment> {
        &self.table
    }

    /// Loads users and, once per mount, the role options.
    pub async fn mount(&self, filter: ListFilter) -> AppResult<()> {
        let users = self.table.fetch(filter).await;

        match self.roles.list_roles().await {
            Ok(roles) => {
                *self.role_options.write().await =
                    roles.into_iter().map(|definition| definition.role).collect();
            }
            Err(error) => {
                tracing::warn!(error = %error, "role options failed");
                self.notifier.notify(Notification::from_error(&error));
                return Err(error);
            }
        }

        users
    }

    /// Returns the role names offered for assignment.
    pub async fn role_options(&self) -> Vec<String> {
        self.role_options.read().await.clone()
    }

    /// Assigns one of the offered roles to a user and reloads.
    pub async fn assign_role(&self, id: &RecordId, role: &str) -> AppResult<()> {
        if !self.role_options.read().await.iter().any(|option| option == role) {
            let error = AppError::Validation(format!("unknown role '{role}'"));
            self.notifier.notify(Notification::from_error(&error));
            return Err(error);
        }

        let Some(mut assignment) = self.table.snapshot().await.find(id).cloned() else {
            let error = AppError::NotFound(format!("user '{id}' is not in the table"));
            self.notifier.notify(Notification::from_error(&error));
            return Err(error);
        };

        assignment.role = role.to_owned();
        self.table.save(assignment).await
    }
}

#[derive(Debug, Clone, Default)]
struct RoleAdminState {
    roles: Vec<RoleDefinition>,
    selected: Option<String>,
    matrix: RolePermissionMatrix,
}

/// Role list with the permission matrix of the selected role.
pub struct RoleAdminController {
    gateway: Arc<dyn RoleAdminGateway>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<RoleAdminState>,
}

impl RoleAdminController {
    /// Creates a controller with no roles loaded.
    #[must_use]
    pub fn new(gateway: Arc<dyn RoleAdminGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            state: RwLock::new(RoleAdminState::default()),
        }
    }

    /// Loads roles, keeps the selection when it still exists and otherwise
    /// selects the first role, then loads its permissions.
    pub async fn load_roles(&self) -> AppResult<()> {
        let roles = match self.gateway.list_roles().await {
            Ok(roles) => roles,
            Err(error) => {
                tracing::warn!(error = %error, "role list failed");
                self.notifier.notify(Notification::from_error(&error));
                return Err(error);
            }
        };

        {
            let mut state = self.state.write().await;
            let keep_selection = state
                .selected
                .as_ref()
                .is_some_and(|selected| roles.iter().any(|role| &role.role == selected));
            if !keep_selection {
                state.selected = roles.first().map(|role| role.role.clone());
            }
            state.roles = roles;
        }

        self.load_permissions().await
    }

    /// Loads the permission matrix of the selected role.
    pub async fn load_permissions(&self) -> AppResult<()> {
        let Some(role) = self.selected_role().await else {
            self.state.write().await.matrix = RolePermissionMatrix::default();
            return Ok(());
        };

        match self.gateway.list_role_permissions(&role).await {
            Ok(matrix) => {
                let mut state = self.state.write().await;
                if state.selected.as_deref() == Some(role.as_str()) {
                    state.matrix = matrix;
                }
                Ok(())
            }
            Err(error) => {
                tracing::warn!(role = %role, error = %error, "role permissions failed");
                self.notifier.notify(Notification::from_error(&error));
                Err(error)
            }
        }
    }

    /// Selects a loaded role and loads its permissions.
    pub async fn select_role(&self, role: &str) -> AppResult<()> {
        {
            let mut state = self.state.write().await;
            if !state.roles.iter().any(|definition| definition.role == role) {
                return Err(AppError::NotFound(format!("role '{role}' does not exist")));
            }
            state.selected = Some(role.to_owned());
            state.matrix = RolePermissionMatrix::default();
        }

        self.load_permissions().await
    }

    /// Creates a role, then reloads the role list.
    pub async fn create_role(&self, role: &str, description: &str) -> AppResult<()> {
        let role = match NonEmptyString::new(role.trim()) {
            Ok(role) => role,
            Err(error) => {
                self.notifier.notify(Notification::from_error(&error));
                return Err(error);
            }
        };
        let definition = RoleDefinition {
            role: role.into(),
            description: description.trim().to_owned(),
        };

        let result = self.gateway.create_role(&definition).await;
        match &result {
            Ok(()) => {
                tracing::info!(role = %definition.role, "role created");
                self.notifier.notify(Notification::success("Success"));
            }
            Err(error) => {
                tracing::warn!(role = %definition.role, error = %error, "role create failed");
                self.notifier.notify(Notification::from_error(error));
            }
        }

        // The list is reloaded even after a failed create.
        self.reload_roles_quietly().await;
        result
    }

    /// Deletes the selected role; reloads the role list only on success.
    pub async fn delete_role(&self) -> AppResult<()> {
        let Some(role) = self.selected_role().await else {
            let error = AppError::Validation("no role is selected".to_owned());
            self.notifier.notify(Notification::from_error(&error));
            return Err(error);
        };

        match self.gateway.delete_role(&role).await {
            Ok(()) => {
                tracing::info!(role = %role, "role deleted");
                self.notifier.notify(Notification::success("Success"));
                self.reload_roles_quietly().await;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(role = %role, error = %error, "role delete failed");
                self.notifier.notify(Notification::from_error(&error));
                Err(error)
            }
        }
    }

    /// Grants or revokes one permission for the selected role, then reloads
    /// the matrix.
    pub async fn set_permission(
        &self,
        descriptor: &PermissionDescriptor,
        checked: bool,
    ) -> AppResult<()> {
        let Some(role) = self.selected_role().await else {
            let error = AppError::Validation("no role is selected".to_owned());
            self.notifier.notify(Notification::from_error(&error));
            return Err(error);
        };

        let change = PermissionChange {
            role,
            resource: descriptor.resource.clone(),
            action: descriptor.action.clone(),
        };
        let result = if checked {
            self.gateway.grant_permission(&change).await
        } else {
            self.gateway.revoke_permission(&change).await
        };

        match &result {
            Ok(()) => {
                tracing::info!(
                    role = %change.role,
                    resource = %change.resource,
                    action = %change.action,
                    granted = checked,
                    "role permission changed"
                );
                self.notifier.notify(Notification::success("Success"));
            }
            Err(error) => {
                tracing::warn!(
                    role = %change.role,
                    error = %error,
                    "role permission change failed"
                );
                self.notifier.notify(Notification::from_error(error));
            }
        }

        self.reload_permissions_quietly().await;
        result
    }

    // Reload failures are already surfaced as notifications; the caller
    // reports the outcome of the mutation itself.
    async fn reload_roles_quietly(&self) {
        let _ = self.load_roles().await;
    }

    async fn reload_permissions_quietly(&self) {
        let _ = self.load_permissions().await;
    }

    /// Returns the loaded roles.
    pub async fn roles(&self) -> Vec<RoleDefinition> {
        self.state.read().await.roles.clone()
    }

    /// Returns the selected role name.
    pub async fn selected_role(&self) -> Option<String> {
        self.state.read().await.selected.clone()
    }

    /// Returns the permission matrix of the selected role.
    pub async fn permissions(&self) -> RolePermissionMatrix {
        self.state.read().await.matrix.clone()
    }
}
