use async_trait::async_trait;
use gatehouse_application::{ListFilter, ResourceGateway};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{Customer, Employee, RecordId, SubjectRoleAssignment, UserAccount};

use super::{InMemoryBackend, matches_keyword, numeric_id, warning};

fn saved_id<'a>(id: &'a RecordId, collection: &str) -> AppResult<&'a str> {
    id.as_saved().ok_or_else(|| {
        AppError::Validation(format!("draft {collection} rows must be created first"))
    })
}

#[async_trait]
impl ResourceGateway<Employee> for InMemoryBackend {
    async fn list(&self, filter: &ListFilter) -> AppResult<Vec<Employee>> {
        let state = self.state.read().await;
        Ok(state
            .employees
            .values()
            .filter(|employee| {
                matches_keyword(filter.keyword.as_deref(), &[employee.full_name.as_str()])
            })
            .cloned()
            .collect())
    }

    async fn create(&self, record: &Employee) -> AppResult<()> {
        let mut state = self.state.write().await;
        let full_name = record.full_name.trim();
        if state
            .employees
            .values()
            .any(|employee| employee.full_name == full_name)
        {
            return Err(warning(format!("employee '{full_name}' already exists")));
        }

        let id = state.allocate_id();
        state.employees.insert(
            id,
            Employee::new(RecordId::saved(id.to_string()), full_name),
        );
        Ok(())
    }

    async fn update(&self, record: &Employee) -> AppResult<()> {
        let id = numeric_id(saved_id(&record.id, "employee")?)?;
        let mut state = self.state.write().await;
        let Some(employee) = state.employees.get_mut(&id) else {
            return Err(AppError::NotFound(format!("employee '{id}' does not exist")));
        };
        employee.full_name = record.full_name.trim().to_owned();
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let numeric = numeric_id(id)?;
        let mut state = self.state.write().await;
        if state.employees.remove(&numeric).is_none() {
            return Err(AppError::NotFound(format!("employee '{id}' does not exist")));
        }
        state.employee_links.retain(|(employee_id, _)| employee_id != id);
        Ok(())
    }
}

#[async_trait]
impl ResourceGateway<Customer> for InMemoryBackend {
    async fn list(&self, filter: &ListFilter) -> AppResult<Vec<Customer>> {
        let state = self.state.read().await;
        Ok(state
            .customers
            .values()
            .filter(|customer| {
                matches_keyword(filter.keyword.as_deref(), &[customer.full_name.as_str()])
            })
            .cloned()
            .collect())
    }

    async fn create(&self, record: &Customer) -> AppResult<()> {
        let mut state = self.state.write().await;
        let full_name = record.full_name.trim();
        if state
            .customers
            .values()
            .any(|customer| customer.full_name == full_name)
        {
            return Err(warning(format!("customer '{full_name}' already exists")));
        }

        let id = state.allocate_id();
        state.customers.insert(
            id,
            Customer::new(RecordId::saved(id.to_string()), full_name),
        );
        Ok(())
    }

    async fn update(&self, record: &Customer) -> AppResult<()> {
        let id = numeric_id(saved_id(&record.id, "customer")?)?;
        let mut state = self.state.write().await;
        let Some(customer) = state.customers.get_mut(&id) else {
            return Err(AppError::NotFound(format!("customer '{id}' does not exist")));
        };
        customer.full_name = record.full_name.trim().to_owned();
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let numeric = numeric_id(id)?;
        let mut state = self.state.write().await;
        if state.customers.remove(&numeric).is_none() {
            return Err(AppError::NotFound(format!("customer '{id}' does not exist")));
        }
        state.customer_links.retain(|link| link.customer_id != id);
        Ok(())
    }
}

#[async_trait]
impl ResourceGateway<UserAccount> for InMemoryBackend {
    async fn list(&self, filter: &ListFilter) -> AppResult<Vec<UserAccount>> {
        Ok(self
            .accounts()
            .await
            .into_iter()
            .filter(|account| matches_keyword(filter.keyword.as_deref(), &[account.email.as_str()]))
            .collect())
    }

    async fn create(&self, _record: &UserAccount) -> AppResult<()> {
        Err(AppError::Validation(
            "accounts are provisioned with a password, not created as rows".to_owned(),
        ))
    }

    async fn update(&self, _record: &UserAccount) -> AppResult<()> {
        Err(AppError::Validation("accounts cannot be edited".to_owned()))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.accounts.len();
        state.accounts.retain(|account| account.id != id);
        if state.accounts.len() == before {
            return Err(AppError::NotFound(format!("account '{id}' does not exist")));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceGateway<SubjectRoleAssignment> for InMemoryBackend {
    async fn list(&self, filter: &ListFilter) -> AppResult<Vec<SubjectRoleAssignment>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|user| {
                matches_keyword(
                    filter.keyword.as_deref(),
                    &[user.full_name.as_str(), user.email.as_str()],
                )
            })
            .map(|user| SubjectRoleAssignment {
                id: RecordId::saved(user.id.clone()),
                full_name: user.full_name.clone(),
                email: user.email.clone(),
                role: user.role.clone(),
            })
            .collect())
    }

    async fn create(&self, _record: &SubjectRoleAssignment) -> AppResult<()> {
        Err(AppError::Validation(
            "users come from the identity provider; run a sync instead".to_owned(),
        ))
    }

    async fn update(&self, record: &SubjectRoleAssignment) -> AppResult<()> {
        let user_id = saved_id(&record.id, "user")?;
        let mut state = self.state.write().await;
        if !state.roles.iter().any(|role| role.role == record.role) {
            return Err(warning(format!("role '{}' does not exist", record.role)));
        }
        let Some(user) = state.users.iter_mut().find(|user| user.id == user_id) else {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        };
        user.role = record.role.clone();
        Ok(())
    }

    async fn delete(&self, _id: &str) -> AppResult<()> {
        Err(AppError::Validation(
            "users are removed by deleting their account".to_owned(),
        ))
    }
}
