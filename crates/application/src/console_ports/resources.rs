use async_trait::async_trait;
use gatehouse_core::AppResult;
use gatehouse_domain::TableRecord;

/// Optional filter parameters for collection listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Free-text keyword matched server-side.
    pub keyword: Option<String>,
}

impl ListFilter {
    /// Creates a keyword filter; blank keywords mean "no filter".
    #[must_use]
    pub fn keyword(keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self {
            keyword: (!keyword.trim().is_empty()).then_some(keyword),
        }
    }
}

/// Port for one backend entity collection.
#[async_trait]
pub trait ResourceGateway<R: TableRecord>: Send + Sync {
    /// Lists the full current collection.
    async fn list(&self, filter: &ListFilter) -> AppResult<Vec<R>>;

    /// Creates a record from the scalar fields of a draft row.
    async fn create(&self, record: &R) -> AppResult<()>;

    /// Replaces a saved record.
    async fn update(&self, record: &R) -> AppResult<()>;

    /// Deletes a saved record.
    async fn delete(&self, id: &str) -> AppResult<()>;
}
