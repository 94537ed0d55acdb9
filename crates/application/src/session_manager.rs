use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gatehouse_core::{AppError, AppResult, UserIdentity};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::console_ports::{AuthState, GrantSource, IdentityProvider};
use crate::permission_cache::PermissionCache;

/// Lifecycle of the operator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Not started yet.
    Unresolved,
    /// Subscribed, waiting for the identity provider.
    Resolving,
    /// An identity is present.
    Authenticated(UserIdentity),
    /// The provider reported no identity.
    Anonymous,
}

/// Identity as seen by consumers; `Unresolved` is distinct from `SignedOut`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentIdentity {
    /// The session has not resolved yet.
    Unresolved,
    /// Resolved with no identity.
    SignedOut,
    /// Resolved with an identity.
    SignedIn(UserIdentity),
}

/// Grant fetch scheduled for one auth event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantFetch {
    generation: u64,
    identity: UserIdentity,
}

struct SessionInner {
    identity_provider: Arc<dyn IdentityProvider>,
    grant_source: Arc<dyn GrantSource>,
    permissions: PermissionCache,
    state: watch::Sender<SessionState>,
    resolved: watch::Sender<bool>,
    // Held while an auth event or a grant publish touches the cache.
    generation: Mutex<u64>,
}

impl SessionInner {
    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the operator identity and keeps the permission cache in step with it.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

/// Running auth-state subscription; aborted when dropped.
pub struct SessionListener {
    handle: JoinHandle<()>,
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl SessionManager {
    /// Creates a session manager in the `Unresolved` state.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        grant_source: Arc<dyn GrantSource>,
        permissions: PermissionCache,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Unresolved);
        let (resolved, _) = watch::channel(false);

        Self {
            inner: Arc::new(SessionInner {
                identity_provider,
                grant_source,
                permissions,
                state,
                resolved,
                generation: Mutex::new(0),
            }),
        }
    }

    /// Subscribes to the identity provider and handles every auth event
    /// until the returned listener is dropped.
    #[must_use]
    pub fn start(&self) -> SessionListener {
        let mut receiver = self.inner.identity_provider.subscribe();
        self.inner.state.send_replace(SessionState::Resolving);

        let manager = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                let auth_state = receiver.borrow_and_update().clone();
                if let Some(fetch) = manager.apply_auth_state(auth_state) {
                    let fetcher = manager.clone();
                    tokio::spawn(async move { fetcher.complete_grant_fetch(fetch).await });
                }

                if receiver.changed().await.is_err() {
                    tracing::debug!("identity provider stream closed");
                    break;
                }
            }
        });

        SessionListener { handle }
    }

    /// Applies one auth event and waits for any grant fetch it schedules.
    pub async fn handle_auth_state(&self, auth_state: AuthState) {
        if let Some(fetch) = self.apply_auth_state(auth_state) {
            self.complete_grant_fetch(fetch).await;
        }
    }

    /// Applies the synchronous part of an auth event.
    ///
    /// Every call supersedes grant fetches scheduled by earlier events.
    #[must_use]
    pub fn apply_auth_state(&self, auth_state: AuthState) -> Option<GrantFetch> {
        let mut latest = self.inner.lock_generation();
        *latest += 1;
        let generation = *latest;

        match auth_state {
            AuthState::Pending => {
                self.inner.state.send_replace(SessionState::Resolving);
                None
            }
            AuthState::SignedOut => {
                tracing::info!("session signed out");
                self.inner.state.send_replace(SessionState::Anonymous);
                self.inner.permissions.clear();
                self.inner.resolved.send_replace(true);
                None
            }
            AuthState::SignedIn(identity) => {
                let same_subject = matches!(
                    &*self.inner.state.borrow(),
                    SessionState::Authenticated(current) if current.subject() == identity.subject()
                );

                if !same_subject {
                    tracing::info!(subject = %identity.subject(), "session authenticated");
                    self.inner.permissions.clear();
                    self.inner.resolved.send_replace(false);
                }

                self.inner
                    .state
                    .send_replace(SessionState::Authenticated(identity.clone()));

                Some(GrantFetch {
                    generation,
                    identity,
                })
            }
        }
    }

    /// Fetches grants for a scheduled event and publishes them unless a newer
    /// event arrived meanwhile.
    pub async fn complete_grant_fetch(&self, fetch: GrantFetch) {
        let result = self.inner.grant_source.fetch_grants(&fetch.identity).await;

        // The cache and the resolved flag change under the same lock as
        // `apply_auth_state`, so a newer event cannot interleave.
        let latest = self.inner.lock_generation();
        if *latest != fetch.generation {
            tracing::debug!(
                subject = %fetch.identity.subject(),
                "discarding grants of superseded auth event"
            );
            return;
        }

        match result {
            Ok(grants) => {
                tracing::info!(
                    subject = %fetch.identity.subject(),
                    grant_count = grants.len(),
                    "permissions resolved"
                );
                self.inner.permissions.replace(grants);
            }
            Err(error) => {
                tracing::warn!(
                    subject = %fetch.identity.subject(),
                    error = %error,
                    "permission fetch failed, continuing without permissions"
                );
                self.inner.permissions.clear();
            }
        }

        self.inner.resolved.send_replace(true);
    }

    /// Starts an interactive sign-in through the identity provider.
    ///
    /// The resulting identity arrives through the auth-state stream.
    pub async fn sign_in(&self) -> AppResult<UserIdentity> {
        match self.inner.identity_provider.sign_in().await {
            Ok(identity) => Ok(identity),
            Err(AppError::Cancelled(detail)) => {
                tracing::info!(detail = %detail, "sign-in dismissed");
                Err(AppError::Cancelled(detail))
            }
            Err(error) => {
                tracing::warn!(error = %error, "sign-in failed");
                Err(error)
            }
        }
    }

    /// Signs the operator out through the identity provider.
    pub async fn sign_out(&self) -> AppResult<()> {
        self.inner.identity_provider.sign_out().await
    }

    /// Returns the current identity.
    #[must_use]
    pub fn current_identity(&self) -> CurrentIdentity {
        match &*self.inner.state.borrow() {
            SessionState::Unresolved | SessionState::Resolving => CurrentIdentity::Unresolved,
            SessionState::Anonymous => CurrentIdentity::SignedOut,
            SessionState::Authenticated(identity) => CurrentIdentity::SignedIn(identity.clone()),
        }
    }

    /// Returns the session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to session state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Returns whether identity and permissions are both settled.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        *self.inner.resolved.borrow()
    }

    /// Waits until identity and permissions are both settled.
    pub async fn wait_until_resolved(&self) {
        let mut receiver = self.inner.resolved.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|resolved| *resolved).await;
    }

    /// Returns the permission cache fed by this session.
    #[must_use]
    pub fn permissions(&self) -> &PermissionCache {
        &self.inner.permissions
    }
}
