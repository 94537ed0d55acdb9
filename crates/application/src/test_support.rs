use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_core::{AppError, AppResult, UserIdentity};
use gatehouse_domain::Grant;
use tokio::sync::watch;

use crate::console_ports::{
    AuthState, BearerTokenSource, GrantSource, IdentityProvider, Notification, Notifier,
};
use crate::permission_cache::PermissionCache;
use crate::session_manager::SessionManager;

pub(crate) struct ScriptedIdentityProvider {
    pub(crate) sender: watch::Sender<AuthState>,
}

impl ScriptedIdentityProvider {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(AuthState::Pending);
        Self { sender }
    }
}

#[async_trait]
impl BearerTokenSource for ScriptedIdentityProvider {
    async fn bearer_token(&self) -> AppResult<Option<String>> {
        Ok(None)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.sender.subscribe()
    }

    async fn sign_in(&self) -> AppResult<UserIdentity> {
        Err(AppError::Cancelled("scripted provider".to_owned()))
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.sender.send_replace(AuthState::SignedOut);
        Ok(())
    }
}

pub(crate) struct StaticGrantSource {
    pub(crate) grants: Vec<Grant>,
}

#[async_trait]
impl GrantSource for StaticGrantSource {
    async fn fetch_grants(&self, _identity: &UserIdentity) -> AppResult<Vec<Grant>> {
        Ok(self.grants.clone())
    }
}

pub(crate) fn operator() -> UserIdentity {
    UserIdentity::new("operator", "Operator", Some("operator@example.com".to_owned()))
}

pub(crate) fn session_with_grants(grants: Vec<Grant>) -> SessionManager {
    SessionManager::new(
        Arc::new(ScriptedIdentityProvider::new()),
        Arc::new(StaticGrantSource { grants }),
        PermissionCache::new(),
    )
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notifications: std::sync::Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.notifications
            .lock()
            .map(|notifications| {
                notifications
                    .iter()
                    .map(|notification| notification.message.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn all(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|notifications| notifications.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}
