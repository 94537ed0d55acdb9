use async_trait::async_trait;
use gatehouse_core::{AppResult, UserIdentity};
use tokio::sync::watch;

/// Authentication state published by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The provider has not reported yet.
    Pending,
    /// An operator is signed in, or their token was refreshed.
    SignedIn(UserIdentity),
    /// Nobody is signed in.
    SignedOut,
}

/// Port for pulling a fresh bearer token before each backend request.
#[async_trait]
pub trait BearerTokenSource: Send + Sync {
    /// Returns the current bearer token, or `None` when signed out.
    async fn bearer_token(&self) -> AppResult<Option<String>>;
}

/// Port for the external identity provider.
#[async_trait]
pub trait IdentityProvider: BearerTokenSource {
    /// Subscribes to auth state changes (sign-in, sign-out, token refresh).
    fn subscribe(&self) -> watch::Receiver<AuthState>;

    /// Starts an interactive sign-in.
    ///
    /// A dismissal by the operator is reported as `AppError::Cancelled`.
    async fn sign_in(&self) -> AppResult<UserIdentity>;

    /// Signs the current operator out.
    async fn sign_out(&self) -> AppResult<()>;
}
