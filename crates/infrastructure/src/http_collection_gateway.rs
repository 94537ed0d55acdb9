use std::marker::PhantomData;

use async_trait::async_trait;
use gatehouse_application::{ListFilter, ResourceGateway};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{Customer, Employee, SubjectRoleAssignment, TableRecord, UserAccount};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http_backend_client::HttpBackendClient;

/// Backend routes of one flat collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRoutes {
    /// Human-readable collection name for messages.
    pub name: &'static str,
    /// `GET` path accepting a `keyword` query.
    pub list: &'static str,
    /// `POST` path, when rows can be created here.
    pub create: Option<&'static str>,
    /// `PUT` path, when rows can be updated here.
    pub update: Option<&'static str>,
    /// `DELETE` path prefix taking a trailing id, when rows can be deleted here.
    pub delete: Option<&'static str>,
}

impl CollectionRoutes {
    /// Employee directory routes.
    pub const EMPLOYEES: Self = Self {
        name: "employees",
        list: "/api/employees/",
        create: Some("/api/employees/"),
        update: Some("/api/employees/"),
        delete: Some("/api/employees/"),
    };

    /// Customer directory routes.
    pub const CUSTOMERS: Self = Self {
        name: "customers",
        list: "/api/customers/",
        create: Some("/api/customers/"),
        update: Some("/api/customers/"),
        delete: Some("/api/customers/"),
    };

    /// Identity-provider account routes; accounts are created through the
    /// identity admin service because they need a password.
    pub const ACCOUNTS: Self = Self {
        name: "accounts",
        list: "/api/firebase/",
        create: None,
        update: None,
        delete: Some("/api/firebase/"),
    };

    /// Users-with-roles routes; an update assigns the row's role.
    pub const ROLE_ASSIGNMENTS: Self = Self {
        name: "users",
        list: "/api/users/",
        create: None,
        update: Some("/api/roles/"),
        delete: None,
    };
}

/// Resource gateway for one flat backend collection.
pub struct HttpCollectionGateway<R> {
    client: HttpBackendClient,
    routes: CollectionRoutes,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpCollectionGateway<R> {
    /// Creates a gateway over the given routes.
    #[must_use]
    pub fn new(client: HttpBackendClient, routes: CollectionRoutes) -> Self {
        Self {
            client,
            routes,
            _record: PhantomData,
        }
    }

    fn unsupported(&self, operation: &str) -> AppError {
        AppError::Validation(format!(
            "{} cannot be {operation} from this view",
            self.routes.name
        ))
    }
}

/// Request body for a create: every scalar field except the id.
fn create_body<R: Serialize>(record: &R) -> AppResult<Value> {
    let mut body = serde_json::to_value(record)
        .map_err(|error| AppError::Internal(format!("failed to encode record: {error}")))?;
    if let Some(fields) = body.as_object_mut() {
        fields.remove("id");
    }
    Ok(body)
}

#[async_trait]
impl<R> ResourceGateway<R> for HttpCollectionGateway<R>
where
    R: TableRecord + Serialize + DeserializeOwned,
{
    async fn list(&self, filter: &ListFilter) -> AppResult<Vec<R>> {
        let url = self
            .client
            .endpoint_with_keyword(self.routes.list, filter.keyword.as_deref())?;
        self.client.get_list(url).await
    }

    async fn create(&self, record: &R) -> AppResult<()> {
        let Some(path) = self.routes.create else {
            return Err(self.unsupported("created"));
        };
        let url = self.client.endpoint(path)?;
        let body = create_body(record)?;
        self.client.send(Method::POST, url, Some(&body)).await
    }

    async fn update(&self, record: &R) -> AppResult<()> {
        let Some(path) = self.routes.update else {
            return Err(self.unsupported("edited"));
        };
        if record.record_id().is_draft() {
            return Err(AppError::Validation(
                "a draft row cannot be updated".to_owned(),
            ));
        }
        let url = self.client.endpoint(path)?;
        let body = serde_json::to_value(record)
            .map_err(|error| AppError::Internal(format!("failed to encode record: {error}")))?;
        self.client.send(Method::PUT, url, Some(&body)).await
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let Some(path) = self.routes.delete else {
            return Err(self.unsupported("deleted"));
        };
        let url = self.client.endpoint_with_id(path, id)?;
        self.client.send(Method::DELETE, url, None).await
    }
}

/// Employee directory gateway.
pub type HttpEmployeeGateway = HttpCollectionGateway<Employee>;
/// Customer directory gateway.
pub type HttpCustomerGateway = HttpCollectionGateway<Customer>;
/// Identity-provider account gateway.
pub type HttpAccountGateway = HttpCollectionGateway<UserAccount>;
/// Users-with-roles gateway.
pub type HttpRoleAssignmentGateway = HttpCollectionGateway<SubjectRoleAssignment>;
