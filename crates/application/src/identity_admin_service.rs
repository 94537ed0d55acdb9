use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{EmailAddress, validate_account_password};

use crate::console_ports::{IdentityAdminGateway, NewUserAccount, Notification, Notifier};
use crate::refresh_coordinator::{RefreshCoordinator, RefreshTopic};

/// Application service for identity-provider account administration.
#[derive(Clone)]
pub struct IdentityAdminService {
    gateway: Arc<dyn IdentityAdminGateway>,
    notifier: Arc<dyn Notifier>,
    coordinator: Arc<RefreshCoordinator>,
    syncing: Arc<AtomicBool>,
}

/// Clears the in-flight flag when a sync settles, however it ends.
struct SyncInFlight(Arc<AtomicBool>);

impl Drop for SyncInFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl IdentityAdminService {
    /// Creates a new identity admin service.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn IdentityAdminGateway>,
        notifier: Arc<dyn Notifier>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            coordinator,
            syncing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates an account at the identity provider and reloads account views.
    pub async fn provision_account(&self, email: &str, password: &str) -> AppResult<()> {
        let account = match EmailAddress::new(email).and_then(|email| {
            validate_account_password(password)?;
            Ok(NewUserAccount {
                email,
                password: password.to_owned(),
            })
        }) {
            Ok(account) => account,
            Err(error) => {
                self.notifier.notify(Notification::from_error(&error));
                return Err(error);
            }
        };

        match self.gateway.provision_account(&account).await {
            Ok(()) => {
                tracing::info!(email = %account.email.as_str(), "account provisioned");
                self.notifier.notify(Notification::success("Success"));
                self.coordinator
                    .trigger_many(&[RefreshTopic::accounts(), RefreshTopic::users()])
                    .await;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(
                    email = %account.email.as_str(),
                    error = %error,
                    "account provisioning failed"
                );
                self.notifier.notify(Notification::from_error(&error));
                Err(error)
            }
        }
    }

    /// Copies identity-provider accounts into the backend and reloads every
    /// view that lists users.
    ///
    /// A second request while one is in flight is rejected locally.
    pub async fn sync_identities(&self) -> AppResult<()> {
        if self.syncing.swap(true, Ordering::SeqCst) {
            let error = AppError::Conflict("an identity sync is already running".to_owned());
            self.notifier.notify(Notification::from_error(&error));
            return Err(error);
        }
        let _in_flight = SyncInFlight(self.syncing.clone());

        self.notifier.notify(Notification::info("Started update"));
        match self.gateway.sync_identities().await {
            Ok(()) => {
                tracing::info!("identity sync finished");
                self.notifier
                    .notify(Notification::success("Successfully updated"));
                self.coordinator
                    .trigger_many(&[
                        RefreshTopic::accounts(),
                        RefreshTopic::users(),
                        RefreshTopic::employees(),
                        RefreshTopic::customers(),
                    ])
                    .await;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = %error, "identity sync failed");
                self.notifier.notify(Notification::from_error(&error));
                Err(error)
            }
        }
    }

    /// Returns whether a sync is in flight.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }
}
