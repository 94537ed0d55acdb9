use async_trait::async_trait;
use gatehouse_application::{AssociationGateway, LinkFlagToggle};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{CustomerUserLink, EmployeeUserLink, wire_id_value};
use reqwest::Method;
use serde_json::json;

use crate::http_backend_client::HttpBackendClient;

const EMPLOYEE_LINKS_PATH: &str = "/api/employees/associations/";
const CUSTOMER_LINKS_PATH: &str = "/api/customers/associations/";
const UNASSIGNED_EMAILS_PATH: &str = "/api/users/unassigned";
const ALL_EMAILS_PATH: &str = "/api/users/emails";

/// Links between employees and identity-provider users.
///
/// A user belongs to at most one employee, so only unassigned users are
/// offered for new links.
#[derive(Clone)]
pub struct HttpEmployeeLinkGateway {
    client: HttpBackendClient,
}

impl HttpEmployeeLinkGateway {
    /// Creates an employee link gateway.
    #[must_use]
    pub fn new(client: HttpBackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssociationGateway<EmployeeUserLink> for HttpEmployeeLinkGateway {
    async fn list_links(&self, parent_id: &str) -> AppResult<Vec<EmployeeUserLink>> {
        let url = self.client.endpoint_with_id(EMPLOYEE_LINKS_PATH, parent_id)?;
        self.client.get_list(url).await
    }

    async fn create_link(&self, parent_id: &str, child_reference: &str) -> AppResult<()> {
        let url = self.client.endpoint(EMPLOYEE_LINKS_PATH)?;
        let body = json!({
            "employee_id": wire_id_value(parent_id),
            "user_email": child_reference,
        });
        self.client.send(Method::POST, url, Some(&body)).await
    }

    async fn delete_link(&self, parent_id: &str, child_id: &str) -> AppResult<()> {
        let url = self.client.endpoint(EMPLOYEE_LINKS_PATH)?;
        let body = json!({
            "employee_id": wire_id_value(parent_id),
            "user_id": child_id,
        });
        self.client.send(Method::DELETE, url, Some(&body)).await
    }

    async fn toggle_flag(&self, toggle: &LinkFlagToggle) -> AppResult<()> {
        Err(AppError::Validation(format!(
            "employee links carry no '{}' flag",
            toggle.flag.as_str()
        )))
    }

    async fn list_eligible_children(&self) -> AppResult<Vec<String>> {
        let url = self.client.endpoint(UNASSIGNED_EMAILS_PATH)?;
        self.client.get_list(url).await
    }
}

/// Links between customers and identity-provider users, with access flags.
#[derive(Clone)]
pub struct HttpCustomerLinkGateway {
    client: HttpBackendClient,
}

impl HttpCustomerLinkGateway {
    /// Creates a customer link gateway.
    #[must_use]
    pub fn new(client: HttpBackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssociationGateway<CustomerUserLink> for HttpCustomerLinkGateway {
    async fn list_links(&self, parent_id: &str) -> AppResult<Vec<CustomerUserLink>> {
        let url = self.client.endpoint_with_id(CUSTOMER_LINKS_PATH, parent_id)?;
        self.client.get_list(url).await
    }

    async fn create_link(&self, parent_id: &str, child_reference: &str) -> AppResult<()> {
        let url = self.client.endpoint(CUSTOMER_LINKS_PATH)?;
        let body = json!({
            "id": wire_id_value(parent_id),
            "email": child_reference,
        });
        self.client.send(Method::POST, url, Some(&body)).await
    }

    async fn delete_link(&self, parent_id: &str, child_id: &str) -> AppResult<()> {
        let url = self.client.endpoint(CUSTOMER_LINKS_PATH)?;
        let body = json!({
            "customer_id": wire_id_value(parent_id),
            "user_id": child_id,
        });
        self.client.send(Method::DELETE, url, Some(&body)).await
    }

    async fn toggle_flag(&self, toggle: &LinkFlagToggle) -> AppResult<()> {
        let url = self.client.endpoint(CUSTOMER_LINKS_PATH)?;
        let body = json!({
            "customer_id": wire_id_value(&toggle.parent_id),
            "user_id": toggle.child_id,
            "access_object": toggle.flag.as_str(),
            "has_access": toggle.enabled,
        });
        self.client.send(Method::PUT, url, Some(&body)).await
    }

    async fn list_eligible_children(&self) -> AppResult<Vec<String>> {
        let url = self.client.endpoint(ALL_EMAILS_PATH)?;
        self.client.get_list(url).await
    }
}
