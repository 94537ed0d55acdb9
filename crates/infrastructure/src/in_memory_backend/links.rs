use async_trait::async_trait;
use gatehouse_application::{AssociationGateway, LinkFlagToggle};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{AccessFlag, CustomerUserLink, EmployeeUserLink, RecordId};

use super::{InMemoryBackend, StoredCustomerLink, numeric_id, warning};

#[async_trait]
impl AssociationGateway<EmployeeUserLink> for InMemoryBackend {
    async fn list_links(&self, parent_id: &str) -> AppResult<Vec<EmployeeUserLink>> {
        let state = self.state.read().await;
        Ok(state
            .employee_links
            .iter()
            .filter(|(employee_id, _)| employee_id == parent_id)
            .filter_map(|(_, user_id)| {
                state.user_email(user_id).map(|email| EmployeeUserLink {
                    id: RecordId::saved(user_id.clone()),
                    email: email.to_owned(),
                })
            })
            .collect())
    }

    async fn create_link(&self, parent_id: &str, child_reference: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.employees.contains_key(&numeric_id(parent_id)?) {
            return Err(AppError::NotFound(format!(
                "employee '{parent_id}' does not exist"
            )));
        }
        let Some(user_id) = state.user_by_email(child_reference).map(|user| user.id.clone())
        else {
            return Err(warning(format!("user '{child_reference}' not found")));
        };
        if state
            .employee_links
            .iter()
            .any(|(_, linked)| linked == &user_id)
        {
            return Err(warning(format!(
                "user '{child_reference}' is already assigned to an employee"
            )));
        }

        state.employee_links.push((parent_id.to_owned(), user_id));
        Ok(())
    }

    async fn delete_link(&self, parent_id: &str, child_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.employee_links.len();
        state
            .employee_links
            .retain(|(employee_id, user_id)| !(employee_id == parent_id && user_id == child_id));
        if state.employee_links.len() == before {
            return Err(warning("link not found"));
        }
        Ok(())
    }

    async fn toggle_flag(&self, toggle: &LinkFlagToggle) -> AppResult<()> {
        Err(AppError::Validation(format!(
            "employee links carry no '{}' flag",
            toggle.flag.as_str()
        )))
    }

    async fn list_eligible_children(&self) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|user| {
                !state
                    .employee_links
                    .iter()
                    .any(|(_, linked)| linked == &user.id)
            })
            .map(|user| user.email.clone())
            .collect())
    }
}

#[async_trait]
impl AssociationGateway<CustomerUserLink> for InMemoryBackend {
    async fn list_links(&self, parent_id: &str) -> AppResult<Vec<CustomerUserLink>> {
        let state = self.state.read().await;
        Ok(state
            .customer_links
            .iter()
            .filter(|link| link.customer_id == parent_id)
            .filter_map(|link| {
                state.user_email(&link.user_id).map(|email| CustomerUserLink {
                    id: RecordId::saved(link.user_id.clone()),
                    email: email.to_owned(),
                    has_performance_access: link.has_performance_access,
                    has_financial_access: link.has_financial_access,
                })
            })
            .collect())
    }

    async fn create_link(&self, parent_id: &str, child_reference: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.customers.contains_key(&numeric_id(parent_id)?) {
            return Err(AppError::NotFound(format!(
                "customer '{parent_id}' does not exist"
            )));
        }
        let Some(user_id) = state.user_by_email(child_reference).map(|user| user.id.clone())
        else {
            return Err(warning(format!("user '{child_reference}' not found")));
        };
        if state
            .customer_links
            .iter()
            .any(|link| link.customer_id == parent_id && link.user_id == user_id)
        {
            return Err(warning(format!(
                "user '{child_reference}' is already linked to this customer"
            )));
        }

        state.customer_links.push(StoredCustomerLink {
            customer_id: parent_id.to_owned(),
            user_id,
            has_performance_access: false,
            has_financial_access: false,
        });
        Ok(())
    }

    async fn delete_link(&self, parent_id: &str, child_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.customer_links.len();
        state
            .customer_links
            .retain(|link| !(link.customer_id == parent_id && link.user_id == child_id));
        if state.customer_links.len() == before {
            return Err(warning("link not found"));
        }
        Ok(())
    }

    async fn toggle_flag(&self, toggle: &LinkFlagToggle) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(link) = state.customer_links.iter_mut().find(|link| {
            link.customer_id == toggle.parent_id && link.user_id == toggle.child_id
        }) else {
            return Err(warning("link not found"));
        };

        match toggle.flag {
            AccessFlag::Performance => link.has_performance_access = toggle.enabled,
            AccessFlag::Financial => link.has_financial_access = toggle.enabled,
        }
        Ok(())
    }

    async fn list_eligible_children(&self) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state.users.iter().map(|user| user.email.clone()).collect())
    }
}
