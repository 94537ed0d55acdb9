use async_trait::async_trait;
use gatehouse_application::{AuthState, BearerTokenSource, IdentityProvider};
use gatehouse_core::{AppError, AppResult, UserIdentity};
use tokio::sync::{RwLock, watch};

/// Pre-issued credentials for one operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    /// Identity reported on sign-in.
    pub identity: UserIdentity,
    /// Bearer token attached to backend requests.
    pub id_token: String,
}

/// Identity provider backed by credentials handed over at startup.
///
/// Without credentials every sign-in is reported as dismissed.
pub struct StaticCredentialIdentityProvider {
    credentials: Option<StaticCredentials>,
    token: RwLock<Option<String>>,
    sender: watch::Sender<AuthState>,
}

impl StaticCredentialIdentityProvider {
    /// Creates a provider that has not reported an auth state yet.
    #[must_use]
    pub fn new(credentials: Option<StaticCredentials>) -> Self {
        let (sender, _) = watch::channel(AuthState::Pending);
        Self {
            credentials,
            token: RwLock::new(None),
            sender,
        }
    }

    /// Reports the persisted session, if any, as the initial auth state.
    pub async fn restore_session(&self, signed_in: bool) {
        match (&self.credentials, signed_in) {
            (Some(credentials), true) => self.publish_sign_in(credentials).await,
            _ => {
                *self.token.write().await = None;
                self.sender.send_replace(AuthState::SignedOut);
            }
        }
    }

    /// Rotates the bearer token and republishes the same identity.
    pub async fn refresh_token(&self, id_token: impl Into<String>) -> AppResult<()> {
        let Some(credentials) = &self.credentials else {
            return Err(AppError::Unauthorized("nobody is signed in".to_owned()));
        };
        let mut token = self.token.write().await;
        if token.is_none() {
            return Err(AppError::Unauthorized("nobody is signed in".to_owned()));
        }

        *token = Some(id_token.into());
        drop(token);
        tracing::debug!(subject = %credentials.identity.subject(), "bearer token refreshed");
        self.sender
            .send_replace(AuthState::SignedIn(credentials.identity.clone()));
        Ok(())
    }

    async fn publish_sign_in(&self, credentials: &StaticCredentials) {
        *self.token.write().await = Some(credentials.id_token.clone());
        self.sender
            .send_replace(AuthState::SignedIn(credentials.identity.clone()));
    }
}

#[async_trait]
impl BearerTokenSource for StaticCredentialIdentityProvider {
    async fn bearer_token(&self) -> AppResult<Option<String>> {
        Ok(self.token.read().await.clone())
    }
}

#[async_trait]
impl IdentityProvider for StaticCredentialIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.sender.subscribe()
    }

    async fn sign_in(&self) -> AppResult<UserIdentity> {
        let Some(credentials) = &self.credentials else {
            return Err(AppError::Cancelled(
                "no credentials were configured for sign-in".to_owned(),
            ));
        };

        self.publish_sign_in(credentials).await;
        tracing::info!(subject = %credentials.identity.subject(), "operator signed in");
        Ok(credentials.identity.clone())
    }

    async fn sign_out(&self) -> AppResult<()> {
        *self.token.write().await = None;
        self.sender.send_replace(AuthState::SignedOut);
        tracing::info!("operator signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_application::{AuthState, BearerTokenSource, IdentityProvider};
    use gatehouse_core::{AppError, UserIdentity};

    use super::{StaticCredentialIdentityProvider, StaticCredentials};

    fn provider() -> StaticCredentialIdentityProvider {
        StaticCredentialIdentityProvider::new(Some(StaticCredentials {
            identity: UserIdentity::new("uid-ada", "Ada", None),
            id_token: "token-1".to_owned(),
        }))
    }

    #[tokio::test]
    async fn sign_in_publishes_identity_and_token() {
        let provider = provider();
        let receiver = provider.subscribe();
        assert_eq!(*receiver.borrow(), AuthState::Pending);

        assert!(provider.sign_in().await.is_ok());

        assert!(matches!(
            &*receiver.borrow(),
            AuthState::SignedIn(identity) if identity.subject() == "uid-ada"
        ));
        assert!(matches!(
            provider.bearer_token().await,
            Ok(Some(ref token)) if token == "token-1"
        ));
    }

    #[tokio::test]
    async fn refresh_rotates_token_and_republishes() {
        let provider = provider();
        assert!(provider.sign_in().await.is_ok());
        let mut receiver = provider.subscribe();
        receiver.mark_unchanged();

        assert!(provider.refresh_token("token-2").await.is_ok());

        assert!(receiver.has_changed().is_ok_and(|changed| changed));
        assert!(matches!(
            provider.bearer_token().await,
            Ok(Some(ref token)) if token == "token-2"
        ));
    }

    #[tokio::test]
    async fn refresh_requires_a_session() {
        let provider = provider();
        provider.restore_session(false).await;

        assert!(matches!(
            provider.refresh_token("token-2").await,
            Err(AppError::Unauthorized(_))
        ));
        assert_eq!(*provider.subscribe().borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn sign_in_without_credentials_is_cancelled() {
        let provider = StaticCredentialIdentityProvider::new(None);

        assert!(matches!(provider.sign_in().await, Err(AppError::Cancelled(_))));
        assert!(matches!(provider.bearer_token().await, Ok(None)));
    }

    #[tokio::test]
    async fn sign_out_drops_token() {
        let provider = provider();
        provider.restore_session(true).await;

        assert!(provider.sign_out().await.is_ok());

        assert!(matches!(provider.bearer_token().await, Ok(None)));
        assert_eq!(*provider.subscribe().borrow(), AuthState::SignedOut);
    }
}
