use std::sync::Arc;

use gatehouse_domain::{Grant, GrantSet};
use tokio::sync::watch;

/// Process-wide cache of the grants held by the signed-in operator.
///
/// Advisory only: it gates what the console shows, the backend still
/// enforces every request.
#[derive(Clone)]
pub struct PermissionCache {
    sender: Arc<watch::Sender<Arc<GrantSet>>>,
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(GrantSet::empty()));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns whether the current grant set allows `action` on `object`.
    ///
    /// False while unresolved or empty.
    #[must_use]
    pub fn can(&self, action: &str, object: &str) -> bool {
        self.sender.borrow().allows(action, object)
    }

    /// Replaces the whole grant set.
    pub fn replace(&self, grants: Vec<Grant>) {
        let grant_set = Arc::new(GrantSet::new(grants));
        tracing::debug!(grant_count = grant_set.len(), "permission cache replaced");
        self.sender.send_replace(grant_set);
    }

    /// Empties the grant set.
    pub fn clear(&self) {
        self.sender.send_replace(Arc::new(GrantSet::empty()));
    }

    /// Returns the current grant set.
    #[must_use]
    pub fn snapshot(&self) -> Arc<GrantSet> {
        Arc::clone(&self.sender.borrow())
    }

    /// Subscribes to grant set replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<GrantSet>> {
        self.sender.subscribe()
    }
}
