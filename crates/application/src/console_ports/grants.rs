use async_trait::async_trait;
use gatehouse_core::{AppResult, UserIdentity};
use gatehouse_domain::Grant;

/// Port for the backend permission-evaluation endpoint.
#[async_trait]
pub trait GrantSource: Send + Sync {
    /// Lists every grant reachable by the identity.
    async fn fetch_grants(&self, identity: &UserIdentity) -> AppResult<Vec<Grant>>;
}
