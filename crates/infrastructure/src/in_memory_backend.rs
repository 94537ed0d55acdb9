use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use gatehouse_application::{
    GrantSource, IdentityAdminGateway, NewUserAccount, PermissionChange, RoleAdminGateway,
};
use gatehouse_core::{AppError, AppResult, BackendFailure, Severity, UserIdentity};
use gatehouse_domain::{
    Customer, Employee, Grant, PermissionDescriptor, RBAC_DATA_OBJECT, READ_ACTION, RecordId,
    RoleDefinition, RolePermissionMatrix, UserAccount, WRITE_ACTION,
};
use tokio::sync::RwLock;

mod directory;
mod links;

/// Permissions the backend knows about, as `(category, resource, action, description)`.
const PERMISSION_CATALOG: [(&str, &str, &str, &str); 4] = [
    ("RBAC", RBAC_DATA_OBJECT, READ_ACTION, "Read RBAC data"),
    ("RBAC", RBAC_DATA_OBJECT, WRITE_ACTION, "Modify RBAC data"),
    ("Reports", "reports::data", READ_ACTION, "Read customer reports"),
    ("Reports", "reports::data", WRITE_ACTION, "Publish customer reports"),
];

/// Subject of the seeded administrator.
pub const DEMO_ADMIN_SUBJECT: &str = "uid-admin";

/// Email of the seeded administrator.
pub const DEMO_ADMIN_EMAIL: &str = "admin@example.com";

/// User row of the synced directory.
#[derive(Debug, Clone)]
struct StoredUser {
    id: String,
    full_name: String,
    email: String,
    role: String,
}

/// Identity-provider account.
#[derive(Debug, Clone)]
struct StoredAccount {
    id: String,
    email: String,
}

#[derive(Debug, Clone)]
struct StoredCustomerLink {
    customer_id: String,
    user_id: String,
    has_performance_access: bool,
    has_financial_access: bool,
}

#[derive(Debug, Default)]
struct BackendState {
    next_id: u64,
    employees: BTreeMap<u64, Employee>,
    customers: BTreeMap<u64, Customer>,
    accounts: Vec<StoredAccount>,
    users: Vec<StoredUser>,
    roles: Vec<RoleDefinition>,
    policies: BTreeSet<(String, String, String)>,
    employee_links: Vec<(String, String)>,
    customer_links: Vec<StoredCustomerLink>,
}

impl BackendState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_by_email(&self, email: &str) -> Option<&StoredUser> {
        self.users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email.trim()))
    }

    fn user_email(&self, user_id: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.email.as_str())
    }

    fn forget_user(&mut self, user_id: &str) {
        self.users.retain(|user| user.id != user_id);
        self.employee_links.retain(|(_, linked)| linked != user_id);
        self.customer_links.retain(|link| link.user_id != user_id);
    }
}

/// Backend double holding every collection in process memory.
///
/// Failures mirror the HTTP backend: soft conflicts come back as warnings,
/// missing rows as `NotFound`.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: RwLock<BackendState>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend seeded with an administrator, a viewer and a few
    /// directory rows.
    #[must_use]
    pub fn with_demo_data() -> Self {
        let mut state = BackendState {
            roles: vec![
                RoleDefinition {
                    role: "admin".to_owned(),
                    description: "Full access".to_owned(),
                },
                RoleDefinition {
                    role: "viewer".to_owned(),
                    description: "Read only".to_owned(),
                },
            ],
            ..BackendState::default()
        };

        for (id, email, full_name, role) in [
            (DEMO_ADMIN_SUBJECT, DEMO_ADMIN_EMAIL, "Ada Admin", "admin"),
            ("uid-grace", "grace@example.com", "Grace Viewer", "viewer"),
            ("uid-linus", "linus@example.com", "Linus New", ""),
        ] {
            state.accounts.push(StoredAccount {
                id: id.to_owned(),
                email: email.to_owned(),
            });
            state.users.push(StoredUser {
                id: id.to_owned(),
                full_name: full_name.to_owned(),
                email: email.to_owned(),
                role: role.to_owned(),
            });
        }

        for (_, resource, action, _) in PERMISSION_CATALOG {
            state
                .policies
                .insert(("admin".to_owned(), resource.to_owned(), action.to_owned()));
        }
        state.policies.insert((
            "viewer".to_owned(),
            RBAC_DATA_OBJECT.to_owned(),
            READ_ACTION.to_owned(),
        ));

        for name in ["Margaret Hamilton", "Ken Thompson"] {
            let id = state.allocate_id();
            state
                .employees
                .insert(id, Employee::new(RecordId::saved(id.to_string()), name));
        }
        for name in ["Initech", "Globex"] {
            let id = state.allocate_id();
            state
                .customers
                .insert(id, Customer::new(RecordId::saved(id.to_string()), name));
        }

        Self {
            state: RwLock::new(state),
        }
    }

    /// Returns the identity-provider accounts.
    pub async fn accounts(&self) -> Vec<UserAccount> {
        self.state
            .read()
            .await
            .accounts
            .iter()
            .map(|account| UserAccount {
                id: RecordId::saved(account.id.clone()),
                email: account.email.clone(),
            })
            .collect()
    }
}

fn warning(message: impl Into<String>) -> AppError {
    AppError::Backend(BackendFailure {
        status: 400,
        message: message.into(),
        severity: Severity::Warning,
    })
}

fn numeric_id(id: &str) -> AppResult<u64> {
    id.parse::<u64>()
        .map_err(|_| AppError::NotFound(format!("record '{id}' does not exist")))
}

fn matches_keyword(keyword: Option<&str>, values: &[&str]) -> bool {
    let Some(keyword) = keyword else {
        return true;
    };
    let keyword = keyword.to_lowercase();
    values
        .iter()
        .any(|value| value.to_lowercase().contains(keyword.as_str()))
}

#[async_trait]
impl GrantSource for InMemoryBackend {
    async fn fetch_grants(&self, identity: &UserIdentity) -> AppResult<Vec<Grant>> {
        let state = self.state.read().await;
        let Some(user) = state.users.iter().find(|user| {
            user.id == identity.subject()
                || identity
                    .email()
                    .is_some_and(|email| user.email.eq_ignore_ascii_case(email))
        }) else {
            return Ok(Vec::new());
        };

        Ok(state
            .policies
            .iter()
            .filter(|(role, _, _)| role == &user.role)
            .map(|(role, resource, action)| Grant::new(role, resource, action))
            .collect())
    }
}

#[async_trait]
impl RoleAdminGateway for InMemoryBackend {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        Ok(self.state.read().await.roles.clone())
    }

    async fn create_role(&self, role: &RoleDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.roles.iter().any(|existing| existing.role == role.role) {
            return Err(warning(format!("role '{}' already exists", role.role)));
        }
        state.roles.push(role.clone());
        Ok(())
    }

    async fn delete_role(&self, role: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.roles.len();
        state.roles.retain(|existing| existing.role != role);
        if state.roles.len() == before {
            return Err(AppError::NotFound(format!("role '{role}' does not exist")));
        }

        state.policies.retain(|(policy_role, _, _)| policy_role != role);
        for user in state.users.iter_mut().filter(|user| user.role == role) {
            user.role.clear();
        }
        Ok(())
    }

    async fn list_role_permissions(&self, role: &str) -> AppResult<RolePermissionMatrix> {
        let state = self.state.read().await;
        let mut categories: BTreeMap<String, Vec<PermissionDescriptor>> = BTreeMap::new();
        for (id, (category, resource, action, description)) in
            (1_i64..).zip(PERMISSION_CATALOG.iter())
        {
            let has_permission = state.policies.contains(&(
                role.to_owned(),
                (*resource).to_owned(),
                (*action).to_owned(),
            ));
            categories
                .entry((*category).to_owned())
                .or_default()
                .push(PermissionDescriptor {
                    id,
                    resource: (*resource).to_owned(),
                    action: (*action).to_owned(),
                    description: (*description).to_owned(),
                    has_permission,
                });
        }
        Ok(RolePermissionMatrix::new(categories))
    }

    async fn grant_permission(&self, change: &PermissionChange) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.iter().any(|role| role.role == change.role) {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                change.role
            )));
        }
        state.policies.insert((
            change.role.clone(),
            change.resource.clone(),
            change.action.clone(),
        ));
        Ok(())
    }

    async fn revoke_permission(&self, change: &PermissionChange) -> AppResult<()> {
        self.state.write().await.policies.remove(&(
            change.role.clone(),
            change.resource.clone(),
            change.action.clone(),
        ));
        Ok(())
    }
}

#[async_trait]
impl IdentityAdminGateway for InMemoryBackend {
    async fn provision_account(&self, account: &NewUserAccount) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .accounts
            .iter()
            .any(|existing| existing.email == account.email.as_str())
        {
            return Err(warning(format!(
                "account '{}' already exists",
                account.email.as_str()
            )));
        }

        let id = state.allocate_id();
        state.accounts.push(StoredAccount {
            id: format!("uid-{id}"),
            email: account.email.as_str().to_owned(),
        });
        Ok(())
    }

    async fn sync_identities(&self) -> AppResult<()> {
        let mut state = self.state.write().await;

        let stale: Vec<String> = state
            .users
            .iter()
            .filter(|user| !state.accounts.iter().any(|account| account.id == user.id))
            .map(|user| user.id.clone())
            .collect();
        for user_id in &stale {
            state.forget_user(user_id);
        }

        let missing: Vec<StoredUser> = state
            .accounts
            .iter()
            .filter(|account| !state.users.iter().any(|user| user.id == account.id))
            .map(|account| StoredUser {
                id: account.id.clone(),
                full_name: String::new(),
                email: account.email.clone(),
                role: String::new(),
            })
            .collect();
        tracing::debug!(
            added = missing.len(),
            removed = stale.len(),
            "directory synced with identity provider"
        );
        state.users.extend(missing);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
