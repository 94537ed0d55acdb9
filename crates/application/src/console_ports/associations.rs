use async_trait::async_trait;
use gatehouse_core::AppResult;
use gatehouse_domain::{AccessFlag, LinkRecord};

/// Targeted partial update of one link capability flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFlagToggle {
    /// Parent entity id.
    pub parent_id: String,
    /// Linked child id.
    pub child_id: String,
    /// Flag being changed.
    pub flag: AccessFlag,
    /// New flag value.
    pub enabled: bool,
}

/// Port for many-to-many links nested under a parent collection.
#[async_trait]
pub trait AssociationGateway<L: LinkRecord>: Send + Sync {
    /// Lists links of one parent.
    async fn list_links(&self, parent_id: &str) -> AppResult<Vec<L>>;

    /// Links a child, looked up server-side by reference.
    async fn create_link(&self, parent_id: &str, child_reference: &str) -> AppResult<()>;

    /// Removes a link.
    async fn delete_link(&self, parent_id: &str, child_id: &str) -> AppResult<()>;

    /// Flips one capability flag of a link.
    async fn toggle_flag(&self, toggle: &LinkFlagToggle) -> AppResult<()>;

    /// Lists child references eligible for a new link.
    async fn list_eligible_children(&self) -> AppResult<Vec<String>>;
}
