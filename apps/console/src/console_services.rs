use std::sync::Arc;

use gatehouse_application::{
    AssociationGateway, GrantSource, IdentityAdminGateway, IdentityAdminService, Notifier,
    PermissionCache, RefreshCoordinator, ResourceGateway, RoleAdminGateway, SessionManager,
};
use gatehouse_domain::{
    Customer, CustomerUserLink, Employee, EmployeeUserLink, SubjectRoleAssignment, UserAccount,
};
use gatehouse_infrastructure::{
    CollectionRoutes, HttpAccountGateway, HttpBackendClient, HttpCustomerGateway,
    HttpCustomerLinkGateway, HttpEmployeeGateway, HttpEmployeeLinkGateway, HttpGrantSource,
    HttpIdentityAdminGateway, HttpRoleAdminGateway, HttpRoleAssignmentGateway, InMemoryBackend,
    StaticCredentialIdentityProvider, TracingNotifier,
};

use crate::console_config::{BackendConfig, ConsoleConfig};

/// Every gateway a view may need, behind its port.
#[derive(Clone)]
pub struct Gateways {
    pub grants: Arc<dyn GrantSource>,
    pub employees: Arc<dyn ResourceGateway<Employee>>,
    pub customers: Arc<dyn ResourceGateway<Customer>>,
    pub accounts: Arc<dyn ResourceGateway<UserAccount>>,
    pub assignments: Arc<dyn ResourceGateway<SubjectRoleAssignment>>,
    pub employee_links: Arc<dyn AssociationGateway<EmployeeUserLink>>,
    pub customer_links: Arc<dyn AssociationGateway<CustomerUserLink>>,
    pub roles: Arc<dyn RoleAdminGateway>,
    pub identity_admin: Arc<dyn IdentityAdminGateway>,
}

#[derive(Clone)]
pub struct ConsoleServices {
    pub provider: Arc<StaticCredentialIdentityProvider>,
    pub session: SessionManager,
    pub notifier: Arc<dyn Notifier>,
    pub coordinator: Arc<RefreshCoordinator>,
    pub gateways: Gateways,
    pub identity_admin: IdentityAdminService,
}

pub fn build_console_services(config: &ConsoleConfig) -> ConsoleServices {
    let provider = Arc::new(StaticCredentialIdentityProvider::new(
        config.credentials.clone(),
    ));

    let gateways = match &config.backend {
        BackendConfig::Memory => memory_gateways(Arc::new(InMemoryBackend::with_demo_data())),
        BackendConfig::Http { api_base_url } => {
            let client = HttpBackendClient::new(
                reqwest::Client::new(),
                api_base_url.clone(),
                provider.clone(),
            );
            http_gateways(&client)
        }
    };

    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let coordinator = RefreshCoordinator::new();
    let session = SessionManager::new(
        provider.clone(),
        gateways.grants.clone(),
        PermissionCache::new(),
    );
    let identity_admin = IdentityAdminService::new(
        gateways.identity_admin.clone(),
        notifier.clone(),
        coordinator.clone(),
    );

    ConsoleServices {
        provider,
        session,
        notifier,
        coordinator,
        gateways,
        identity_admin,
    }
}

fn memory_gateways(backend: Arc<InMemoryBackend>) -> Gateways {
    Gateways {
        grants: backend.clone(),
        employees: backend.clone(),
        customers: backend.clone(),
        accounts: backend.clone(),
        assignments: backend.clone(),
        employee_links: backend.clone(),
        customer_links: backend.clone(),
        roles: backend.clone(),
        identity_admin: backend,
    }
}

fn http_gateways(client: &HttpBackendClient) -> Gateways {
    Gateways {
        grants: Arc::new(HttpGrantSource::new(client.clone())),
        employees: Arc::new(HttpEmployeeGateway::new(
            client.clone(),
            CollectionRoutes::EMPLOYEES,
        )),
        customers: Arc::new(HttpCustomerGateway::new(
            client.clone(),
            CollectionRoutes::CUSTOMERS,
        )),
        accounts: Arc::new(HttpAccountGateway::new(
            client.clone(),
            CollectionRoutes::ACCOUNTS,
        )),
        assignments: Arc::new(HttpRoleAssignmentGateway::new(
            client.clone(),
            CollectionRoutes::ROLE_ASSIGNMENTS,
        )),
        employee_links: Arc::new(HttpEmployeeLinkGateway::new(client.clone())),
        customer_links: Arc::new(HttpCustomerLinkGateway::new(client.clone())),
        roles: Arc::new(HttpRoleAdminGateway::new(client.clone())),
        identity_admin: Arc::new(HttpIdentityAdminGateway::new(client.clone())),
    }
}
