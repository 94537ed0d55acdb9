//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_association_gateway;
mod http_backend_client;
mod http_collection_gateway;
mod http_grant_source;
mod http_identity_admin_gateway;
mod http_role_admin_gateway;
mod in_memory_backend;
mod static_identity_provider;
#[cfg(test)]
mod test_support;
mod tracing_notifier;

pub use http_association_gateway::{HttpCustomerLinkGateway, HttpEmployeeLinkGateway};
pub use http_backend_client::HttpBackendClient;
pub use http_collection_gateway::{
    CollectionRoutes, HttpAccountGateway, HttpCollectionGateway, HttpCustomerGateway,
    HttpEmployeeGateway, HttpRoleAssignmentGateway,
};
pub use http_grant_source::HttpGrantSource;
pub use http_identity_admin_gateway::HttpIdentityAdminGateway;
pub use http_role_admin_gateway::HttpRoleAdminGateway;
pub use in_memory_backend::{DEMO_ADMIN_EMAIL, DEMO_ADMIN_SUBJECT, InMemoryBackend};
pub use static_identity_provider::{StaticCredentialIdentityProvider, StaticCredentials};
pub use tracing_notifier::TracingNotifier;
