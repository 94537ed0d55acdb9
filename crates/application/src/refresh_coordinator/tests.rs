use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{RefreshCoordinator, RefreshTopic, Refreshable};

#[derive(Default)]
struct CountingTarget {
    refreshes: AtomicUsize,
}

#[async_trait]
impl Refreshable for CountingTarget {
    async fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

fn weak_target(target: &Arc<CountingTarget>) -> std::sync::Weak<dyn Refreshable> {
    let target: Arc<dyn Refreshable> = target.clone();
    Arc::downgrade(&target)
}

#[tokio::test]
async fn trigger_refreshes_every_sibling_on_topic() {
    let coordinator = RefreshCoordinator::new();
    let table = Arc::new(CountingTarget::default());
    let action_bar = Arc::new(CountingTarget::default());
    let unrelated = Arc::new(CountingTarget::default());

    let _table = coordinator.register(RefreshTopic::employees(), weak_target(&table));
    let _bar = coordinator.register(RefreshTopic::employees(), weak_target(&action_bar));
    let _other = coordinator.register(RefreshTopic::customers(), weak_target(&unrelated));

    coordinator.trigger(&RefreshTopic::employees()).await;

    assert_eq!(table.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(action_bar.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(unrelated.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dropped_registration_stops_refreshes() {
    let coordinator = RefreshCoordinator::new();
    let table = Arc::new(CountingTarget::default());

    let registration = coordinator.register(RefreshTopic::users(), weak_target(&table));
    assert_eq!(coordinator.target_count(&RefreshTopic::users()), 1);
    drop(registration);

    coordinator.trigger(&RefreshTopic::users()).await;
    assert_eq!(table.refreshes.load(Ordering::SeqCst), 0);
    assert_eq!(coordinator.target_count(&RefreshTopic::users()), 0);
}

#[tokio::test]
async fn dropped_target_is_pruned() {
    let coordinator = RefreshCoordinator::new();
    let table = Arc::new(CountingTarget::default());
    let _registration = coordinator.register(RefreshTopic::accounts(), weak_target(&table));

    drop(table);

    assert_eq!(coordinator.target_count(&RefreshTopic::accounts()), 0);
    coordinator.trigger(&RefreshTopic::accounts()).await;
}

#[tokio::test]
async fn trigger_many_covers_each_topic() {
    let coordinator = RefreshCoordinator::new();
    let users = Arc::new(CountingTarget::default());
    let customers = Arc::new(CountingTarget::default());
    let _users = coordinator.register(RefreshTopic::users(), weak_target(&users));
    let _customers = coordinator.register(RefreshTopic::customers(), weak_target(&customers));

    coordinator
        .trigger_many(&[RefreshTopic::users(), RefreshTopic::customers()])
        .await;

    assert_eq!(users.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(customers.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(
        RefreshTopic::links("customers", "7").as_str(),
        "customers/7/links"
    );
}
