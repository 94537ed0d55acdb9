use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;

/// Name of a group of views that reload together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefreshTopic(String);

impl RefreshTopic {
    /// Creates a topic from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Users-with-roles views.
    #[must_use]
    pub fn users() -> Self {
        Self::new("users")
    }

    /// Identity-provider account views.
    #[must_use]
    pub fn accounts() -> Self {
        Self::new("accounts")
    }

    /// Employee views.
    #[must_use]
    pub fn employees() -> Self {
        Self::new("employees")
    }

    /// Customer views.
    #[must_use]
    pub fn customers() -> Self {
        Self::new("customers")
    }

    /// Link views under one parent of a collection.
    #[must_use]
    pub fn links(collection: &str, parent_id: &str) -> Self {
        Self::new(format!("{collection}/{parent_id}/links"))
    }

    /// Returns the topic name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RefreshTopic {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Anything that can reload itself from the backend.
#[async_trait]
pub trait Refreshable: Send + Sync {
    /// Reloads state from the backend.
    async fn refresh(&self);
}

type Registrations = HashMap<RefreshTopic, Vec<(u64, Weak<dyn Refreshable>)>>;

/// Shared reload fan-out for sibling views of one collection.
///
/// Registrations are weak: a dropped controller simply stops receiving
/// refreshes.
#[derive(Default)]
pub struct RefreshCoordinator {
    registrations: Mutex<Registrations>,
    next_id: AtomicU64,
}

/// Keeps a registration alive; unregisters on drop.
pub struct RefreshRegistration {
    coordinator: Weak<RefreshCoordinator>,
    topic: RefreshTopic,
    id: u64,
}

impl Drop for RefreshRegistration {
    fn drop(&mut self) {
        if let Some(coordinator) = self.coordinator.upgrade() {
            coordinator.unregister(&self.topic, self.id);
        }
    }
}

impl RefreshCoordinator {
    /// Creates an empty coordinator.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a refresh target under a topic.
    #[must_use]
    pub fn register(
        self: &Arc<Self>,
        topic: RefreshTopic,
        target: Weak<dyn Refreshable>,
    ) -> RefreshRegistration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut registrations) = self.registrations.lock() {
            registrations
                .entry(topic.clone())
                .or_default()
                .push((id, target));
        }

        tracing::debug!(topic = %topic, registration_id = id, "refresh target registered");
        RefreshRegistration {
            coordinator: Arc::downgrade(self),
            topic,
            id,
        }
    }

    fn unregister(&self, topic: &RefreshTopic, id: u64) {
        if let Ok(mut registrations) = self.registrations.lock()
            && let Some(targets) = registrations.get_mut(topic)
        {
            targets.retain(|(target_id, _)| *target_id != id);
            if targets.is_empty() {
                registrations.remove(topic);
            }
        }
    }

    /// Returns the number of live targets under a topic.
    #[must_use]
    pub fn target_count(&self, topic: &RefreshTopic) -> usize {
        self.live_targets(topic).len()
    }

    /// Refreshes every live target registered under a topic.
    pub async fn trigger(&self, topic: &RefreshTopic) {
        let targets = self.live_targets(topic);
        tracing::debug!(topic = %topic, target_count = targets.len(), "refresh triggered");

        for target in targets {
            target.refresh().await;
        }
    }

    /// Refreshes several topics in order.
    pub async fn trigger_many(&self, topics: &[RefreshTopic]) {
        for topic in topics {
            self.trigger(topic).await;
        }
    }

    fn live_targets(&self, topic: &RefreshTopic) -> Vec<Arc<dyn Refreshable>> {
        let Ok(mut registrations) = self.registrations.lock() else {
            return Vec::new();
        };

        let Some(targets) = registrations.get_mut(topic) else {
            return Vec::new();
        };

        targets.retain(|(_, target)| target.strong_count() > 0);
        targets
            .iter()
            .filter_map(|(_, target)| target.upgrade())
            .collect()
    }
}

#[cfg(test)]
mod tests;
