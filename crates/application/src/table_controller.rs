mod edit_policy;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{RecordId, TableRecord};
use tokio::sync::RwLock;

use crate::console_ports::{ListFilter, Notification, Notifier, ResourceGateway};
use crate::refresh_coordinator::{
    RefreshCoordinator, RefreshRegistration, RefreshTopic, Refreshable,
};

pub use edit_policy::SingleRowEditPolicy;

/// Client-held mirror of one backend collection.
///
/// A cache only: every mutation is followed by a full reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState<R> {
    rows: Vec<R>,
    editing: BTreeSet<RecordId>,
}

impl<R> Default for TableState<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            editing: BTreeSet::new(),
        }
    }
}

impl<R: TableRecord> TableState<R> {
    /// Returns rows in backend order, drafts first.
    #[must_use]
    pub fn rows(&self) -> &[R] {
        self.rows.as_slice()
    }

    /// Returns ids of rows currently in edit mode.
    pub fn editing(&self) -> impl Iterator<Item = &RecordId> {
        self.editing.iter()
    }

    /// Returns whether a row is in edit mode.
    #[must_use]
    pub fn is_editing(&self, id: &RecordId) -> bool {
        self.editing.contains(id)
    }

    /// Finds a row by id.
    #[must_use]
    pub fn find(&self, id: &RecordId) -> Option<&R> {
        self.rows.iter().find(|row| row.record_id() == id)
    }

    fn replace_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        let rows = &self.rows;
        self.editing
            .retain(|id| rows.iter().any(|row| row.record_id() == id));
    }

    fn remove_draft(&mut self) {
        self.rows.retain(|row| !row.record_id().is_draft());
        self.editing.remove(&RecordId::Draft);
    }
}

struct TableInner<R: TableRecord> {
    gateway: Arc<dyn ResourceGateway<R>>,
    notifier: Arc<dyn Notifier>,
    coordinator: Arc<RefreshCoordinator>,
    topic: RefreshTopic,
    state: RwLock<TableState<R>>,
    filter: RwLock<ListFilter>,
    mounted: AtomicBool,
    fetch_epoch: AtomicU64,
}

impl<R: TableRecord> TableInner<R> {
    async fn fetch(&self, filter: ListFilter) -> AppResult<()> {
        let epoch = self.fetch_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        *self.filter.write().await = filter.clone();

        let result = self.gateway.list(&filter).await;

        // Checked under the write guard so an older result queued behind
        // readers cannot overwrite a newer one.
        let mut state = self.state.write().await;
        if !self.mounted.load(Ordering::SeqCst) {
            tracing::debug!(topic = %self.topic, "ignoring fetch result after unmount");
            return Ok(());
        }
        if self.fetch_epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(topic = %self.topic, "ignoring superseded fetch result");
            return Ok(());
        }

        match result {
            Ok(rows) => {
                tracing::debug!(topic = %self.topic, row_count = rows.len(), "table fetched");
                state.replace_rows(rows);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(topic = %self.topic, error = %error, "table fetch failed");
                self.notifier.notify(Notification::from_error(&error));
                Err(error)
            }
        }
    }
}

#[async_trait]
impl<R: TableRecord> Refreshable for TableInner<R> {
    async fn refresh(&self) {
        let filter = self.filter.read().await.clone();
        // Failures are already surfaced as notifications.
        let _ = self.fetch(filter).await;
    }
}

/// Generic fetch/create/update/delete controller over one collection.
pub struct TableController<R: TableRecord> {
    inner: Arc<TableInner<R>>,
    _registration: RefreshRegistration,
}

impl<R: TableRecord> TableController<R> {
    /// Creates a mounted controller registered under `topic`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ResourceGateway<R>>,
        notifier: Arc<dyn Notifier>,
        coordinator: Arc<RefreshCoordinator>,
        topic: RefreshTopic,
    ) -> Self {
        let inner = Arc::new(TableInner {
            gateway,
            notifier,
            coordinator: coordinator.clone(),
            topic: topic.clone(),
            state: RwLock::new(TableState::default()),
            filter: RwLock::new(ListFilter::default()),
            mounted: AtomicBool::new(true),
            fetch_epoch: AtomicU64::new(0),
        });

        let target: Arc<dyn Refreshable> = inner.clone();
        let registration = coordinator.register(topic, Arc::downgrade(&target));

        Self {
            inner,
            _registration: registration,
        }
    }

    /// Returns the refresh topic of this table.
    #[must_use]
    pub fn topic(&self) -> &RefreshTopic {
        &self.inner.topic
    }

    /// Loads the collection, replacing local rows wholesale on success.
    ///
    /// On failure prior rows are kept and a notification is raised.
    pub async fn fetch(&self, filter: ListFilter) -> AppResult<()> {
        self.inner.fetch(filter).await
    }

    /// Reloads this table and every sibling on the same topic.
    pub async fn reload(&self) {
        self.inner.coordinator.trigger(&self.inner.topic).await;
    }

    /// Saves a row: drafts are created, saved rows are updated.
    ///
    /// Local validation failures are rejected before any request. Otherwise
    /// the table reloads whether the request succeeded or not.
    pub async fn save(&self, row: R) -> AppResult<()> {
        if let Err(error) = row.validate() {
            self.inner.notifier.notify(Notification::from_error(&error));
            return Err(error);
        }

        let id = row.record_id().clone();
        let result = if id.is_draft() {
            self.inner.gateway.create(&row).await
        } else {
            self.inner.gateway.update(&row).await
        };

        match &result {
            Ok(()) => {
                tracing::info!(topic = %self.inner.topic, record_id = %id, "row saved");
                self.inner.notifier.notify(Notification::success("Success"));
            }
            Err(error) => {
                tracing::warn!(
                    topic = %self.inner.topic,
                    record_id = %id,
                    error = %error,
                    "row save failed"
                );
                self.inner.notifier.notify(Notification::from_error(error));
            }
        }

        self.inner.state.write().await.editing.remove(&id);
        self.reload().await;
        result
    }

    /// Deletes a row; reloads only when the backend accepted the delete.
    ///
    /// A draft only exists locally and is simply dropped.
    pub async fn delete(&self, id: &RecordId) -> AppResult<()> {
        let Some(saved_id) = id.as_saved() else {
            self.inner.state.write().await.remove_draft();
            return Ok(());
        };

        match self.inner.gateway.delete(saved_id).await {
            Ok(()) => {
                tracing::info!(topic = %self.inner.topic, record_id = %id, "row deleted");
                self.inner.notifier.notify(Notification::success("Success"));
                self.inner.state.write().await.editing.remove(id);
                self.reload().await;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(
                    topic = %self.inner.topic,
                    record_id = %id,
                    error = %error,
                    "row delete failed"
                );
                self.inner.notifier.notify(Notification::from_error(&error));
                Err(error)
            }
        }
    }

    /// Inserts a blank draft row at the top and puts it in edit mode.
    ///
    /// At most one draft exists; a second call reuses it.
    pub async fn add_draft(&self) -> R {
        let mut state = self.inner.state.write().await;
        if let Some(existing) = state.find(&RecordId::Draft).cloned() {
            state.editing.insert(RecordId::Draft);
            return existing;
        }

        let draft = R::draft();
        state.rows.insert(0, draft.clone());
        state.editing.insert(RecordId::Draft);
        draft
    }

    /// Puts an existing row in edit mode.
    pub async fn start_editing(&self, id: &RecordId) -> AppResult<()> {
        let mut state = self.inner.state.write().await;
        if state.find(id).is_none() {
            return Err(AppError::NotFound(format!("row '{id}' is not in the table")));
        }

        state.editing.insert(id.clone());
        Ok(())
    }

    /// Replaces the local copy of a row under edit without saving it.
    pub async fn stage(&self, row: R) -> AppResult<()> {
        let mut state = self.inner.state.write().await;
        let id = row.record_id().clone();
        if !state.editing.contains(&id) {
            return Err(AppError::Validation(format!("row '{id}' is not being edited")));
        }

        let Some(slot) = state.rows.iter_mut().find(|current| current.record_id() == &id) else {
            return Err(AppError::NotFound(format!("row '{id}' is not in the table")));
        };
        *slot = row;
        Ok(())
    }

    /// Leaves edit mode; drafts are removed, existing rows are reloaded to
    /// discard local changes.
    pub async fn cancel_edit(&self, id: &RecordId) {
        if id.is_draft() {
            self.inner.state.write().await.remove_draft();
            return;
        }

        self.inner.state.write().await.editing.remove(id);
        self.reload().await;
    }

    /// Returns a copy of the current rows.
    pub async fn rows(&self) -> Vec<R> {
        self.inner.state.read().await.rows.clone()
    }

    /// Returns a copy of the full table state.
    pub async fn snapshot(&self) -> TableState<R> {
        self.inner.state.read().await.clone()
    }

    /// Returns the filter used by the latest fetch.
    pub async fn filter(&self) -> ListFilter {
        self.inner.filter.read().await.clone()
    }

    /// Returns whether the table still accepts fetch results.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    /// Stops applying fetch results; in-flight requests are left to settle.
    pub fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::SeqCst);
    }
}

impl<R: TableRecord> Drop for TableController<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests;
