use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{AccessFlag, LinkRecord, RecordId};
use tokio::sync::RwLock;

use crate::console_ports::{
    AssociationGateway, LinkFlagToggle, ListFilter, Notification, Notifier, ResourceGateway,
};
use crate::refresh_coordinator::{RefreshCoordinator, RefreshTopic};
use crate::table_controller::TableController;

/// Adapts an association gateway to one parent so the generic table
/// controller can drive it.
struct ScopedLinkGateway<L: LinkRecord> {
    gateway: Arc<dyn AssociationGateway<L>>,
    parent_id: String,
}

#[async_trait]
impl<L: LinkRecord> ResourceGateway<L> for ScopedLinkGateway<L> {
    async fn list(&self, _filter: &ListFilter) -> AppResult<Vec<L>> {
        self.gateway.list_links(&self.parent_id).await
    }

    async fn create(&self, record: &L) -> AppResult<()> {
        self.gateway
            .create_link(&self.parent_id, record.child_reference().trim())
            .await
    }

    async fn update(&self, _record: &L) -> AppResult<()> {
        Err(AppError::Validation(
            "links cannot be edited; toggle a flag or relink instead".to_owned(),
        ))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.gateway.delete_link(&self.parent_id, id).await
    }
}

/// Link table for one parent entity, with per-flag toggles.
pub struct AssociationController<L: LinkRecord> {
    gateway: Arc<dyn AssociationGateway<L>>,
    notifier: Arc<dyn Notifier>,
    parent_id: String,
    table: TableController<L>,
    eligible_children: RwLock<Vec<String>>,
}

impl<L: LinkRecord> AssociationController<L> {
    /// Creates a controller for the links of `parent_id` in `collection`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn AssociationGateway<L>>,
        notifier: Arc<dyn Notifier>,
        coordinator: Arc<RefreshCoordinator>,
        collection: &str,
        parent_id: impl Into<String>,
    ) -> Self {
        let parent_id = parent_id.into();
        let scoped = Arc::new(ScopedLinkGateway {
            gateway: gateway.clone(),
            parent_id: parent_id.clone(),
        });
        let table = TableController::new(
            scoped,
            notifier.clone(),
            coordinator,
            RefreshTopic::links(collection, &parent_id),
        );

        Self {
            gateway,
            notifier,
            parent_id,
            table,
            eligible_children: RwLock::new(Vec::new()),
        }
    }

    /// Returns the parent entity id.
    #[must_use]
    pub fn parent_id(&self) -> &str {
        self.parent_id.as_str()
    }

    /// Returns the underlying link table.
    #[must_use]
    pub fn table(&self) -> &TableController<L> {
        &self.table
    }

    /// Loads the links and, once per mount, the eligible children.
    pub async fn mount(&self) -> AppResult<()> {
        let links = self.table.fetch(ListFilter::default()).await;

        match self.gateway.list_eligible_children().await {
            Ok(children) => {
                tracing::debug!(
                    parent_id = %self.parent_id,
                    child_count = children.len(),
                    "eligible children loaded"
                );
                *self.eligible_children.write().await = children;
            }
            Err(error) => {
                tracing::warn!(
                    parent_id = %self.parent_id,
                    error = %error,
                    "eligible children failed"
                );
                self.notifier.notify(Notification::from_error(&error));
                return Err(error);
            }
        }

        links
    }

    /// Returns the children offered for a new link.
    pub async fn eligible_children(&self) -> Vec<String> {
        self.eligible_children.read().await.clone()
    }

    /// Links a child by reference, then reloads.
    pub async fn create_link(&self, child_reference: &str) -> AppResult<()> {
        let child_reference = child_reference.trim();
        if child_reference.is_empty() {
            let error = AppError::Validation("a user email is required".to_owned());
            self.notifier.notify(Notification::from_error(&error));
            return Err(error);
        }

        let result = self
            .gateway
            .create_link(&self.parent_id, child_reference)
            .await;
        self.report("link created", &result);
        self.table.reload().await;
        result
    }

    /// Flips one capability flag of a link; reloads whatever the outcome.
    pub async fn toggle(
        &self,
        child_id: &RecordId,
        flag: AccessFlag,
        enabled: bool,
    ) -> AppResult<()> {
        let Some(child) = child_id.as_saved() else {
            let error =
                AppError::Validation("save the link before changing its flags".to_owned());
            self.notifier.notify(Notification::from_error(&error));
            return Err(error);
        };

        let supports_flag = self
            .table
            .snapshot()
            .await
            .find(child_id)
            .is_none_or(|link| link.flag(flag).is_some());
        if !supports_flag {
            let error =
                AppError::Validation(format!("this link has no '{}' flag", flag.as_str()));
            self.notifier.notify(Notification::from_error(&error));
            return Err(error);
        }

        let toggle = LinkFlagToggle {
            parent_id: self.parent_id.clone(),
            child_id: child.to_owned(),
            flag,
            enabled,
        };
        let result = self.gateway.toggle_flag(&toggle).await;
        self.report("link flag changed", &result);
        self.table.reload().await;
        result
    }

    /// Removes a link; reloads only on success.
    pub async fn delete_link(&self, child_id: &RecordId) -> AppResult<()> {
        self.table.delete(child_id).await
    }

    fn report(&self, event: &'static str, result: &AppResult<()>) {
        match result {
            Ok(()) => {
                tracing::info!(parent_id = %self.parent_id, "{event}");
                self.notifier.notify(Notification::success("Success"));
            }
            Err(error) => {
                tracing::warn!(parent_id = %self.parent_id, error = %error, "{event} failed");
                self.notifier.notify(Notification::from_error(error));
            }
        }
    }
}
