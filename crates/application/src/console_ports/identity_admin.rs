use async_trait::async_trait;
use gatehouse_core::AppResult;
use gatehouse_domain::EmailAddress;

/// Validated input for a new identity-provider account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    /// Sign-in email.
    pub email: EmailAddress,
    /// Initial password.
    pub password: String,
}

/// Port for identity-provider account administration.
#[async_trait]
pub trait IdentityAdminGateway: Send + Sync {
    /// Creates an account at the identity provider.
    async fn provision_account(&self, account: &NewUserAccount) -> AppResult<()>;

    /// Copies identity-provider accounts into the backend user table.
    async fn sync_identities(&self) -> AppResult<()>;
}
