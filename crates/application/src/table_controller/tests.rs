use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use gatehouse_core::{AppError, AppResult, BackendFailure, Severity};
use gatehouse_domain::{Employee, RecordId};
use tokio::sync::{Mutex, Notify};

use crate::console_ports::{ListFilter, NotificationLevel, ResourceGateway};
use crate::refresh_coordinator::{RefreshCoordinator, RefreshTopic};
use crate::test_support::RecordingNotifier;

use super::TableController;

struct FakeEmployeeGateway {
    rows: Mutex<Vec<Employee>>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    list_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeEmployeeGateway {
    fn with_rows(rows: Vec<Employee>) -> Self {
        Self {
            rows: Mutex::new(rows),
            next_id: AtomicUsize::new(42),
            list_calls: AtomicUsize::new(0),
            fail_list: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            list_gate: Mutex::new(None),
        }
    }
}

fn backend_error(status: u16, message: &str) -> AppError {
    AppError::Backend(BackendFailure {
        status,
        message: message.to_owned(),
        severity: Severity::Error,
    })
}

#[async_trait]
impl ResourceGateway<Employee> for FakeEmployeeGateway {
    async fn list(&self, _filter: &ListFilter) -> AppResult<Vec<Employee>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.list_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::Transport("connection refused".to_owned()));
        }
        Ok(self.rows.lock().await.clone())
    }

    async fn create(&self, record: &Employee) -> AppResult<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(backend_error(500, "insert failed"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().await.push(Employee::new(
            RecordId::saved(id.to_string()),
            record.full_name.clone(),
        ));
        Ok(())
    }

    async fn update(&self, record: &Employee) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let Some(row) = rows.iter_mut().find(|row| row.id == record.id) else {
            return Err(backend_error(404, "employee not found"));
        };
        *row = record.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| row.id.as_saved() != Some(id));
        if rows.len() == before {
            return Err(backend_error(404, "employee not found"));
        }
        Ok(())
    }
}

struct Fixture {
    gateway: Arc<FakeEmployeeGateway>,
    notifier: Arc<RecordingNotifier>,
    coordinator: Arc<RefreshCoordinator>,
    table: TableController<Employee>,
}

fn fixture(rows: Vec<Employee>) -> Fixture {
    let gateway = Arc::new(FakeEmployeeGateway::with_rows(rows));
    let notifier = Arc::new(RecordingNotifier::default());
    let coordinator = RefreshCoordinator::new();
    let table = TableController::new(
        gateway.clone(),
        notifier.clone(),
        coordinator.clone(),
        RefreshTopic::employees(),
    );
    Fixture {
        gateway,
        notifier,
        coordinator,
        table,
    }
}

fn ada() -> Employee {
    Employee::new(RecordId::saved("1"), "Ada")
}

#[tokio::test]
async fn fetch_twice_yields_identical_state() {
    let fixture = fixture(vec![ada()]);

    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());
    let first = fixture.table.snapshot().await;
    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());
    let second = fixture.table.snapshot().await;

    assert_eq!(first, second);
    assert_eq!(first.rows(), &[ada()]);
}

#[tokio::test]
async fn created_row_comes_back_with_server_assigned_id() {
    let fixture = fixture(Vec::new());
    let mut draft = fixture.table.add_draft().await;
    draft.full_name = "A. Tester".to_owned();

    assert!(fixture.table.save(draft).await.is_ok());

    let rows = fixture.table.rows().await;
    assert_eq!(
        rows,
        vec![Employee::new(RecordId::saved("42"), "A. Tester")]
    );
    assert_eq!(fixture.notifier.messages(), vec!["Success".to_owned()]);
}

#[tokio::test]
async fn failed_create_drops_the_draft_on_reload() {
    let fixture = fixture(vec![ada()]);
    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());
    fixture.gateway.fail_create.store(true, Ordering::SeqCst);

    let mut draft = fixture.table.add_draft().await;
    draft.full_name = "A. Tester".to_owned();
    let result = fixture.table.save(draft).await;

    assert!(matches!(result, Err(AppError::Backend(_))));
    assert_eq!(fixture.table.rows().await, vec![ada()]);
    let notifications = fixture.notifier.all();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Error);
    assert_eq!(notifications[0].message, "Error 500");
}

#[tokio::test]
async fn blank_required_field_never_reaches_the_backend() {
    let fixture = fixture(Vec::new());
    let draft = fixture.table.add_draft().await;

    let result = fixture.table.save(draft).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(fixture.gateway.list_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.table.rows().await.len(), 1);
}

#[tokio::test]
async fn failed_update_reloads_and_discards_local_change() {
    let fixture = fixture(vec![ada()]);
    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());
    fixture.gateway.rows.lock().await.clear();

    let renamed = Employee::new(RecordId::saved("1"), "Ada L.");
    assert!(fixture.table.start_editing(&renamed.id).await.is_ok());
    assert!(fixture.table.stage(renamed.clone()).await.is_ok());
    let result = fixture.table.save(renamed).await;

    assert!(result.is_err());
    assert!(fixture.table.rows().await.is_empty());
}

#[tokio::test]
async fn delete_of_missing_row_leaves_state_untouched() {
    let fixture = fixture(vec![ada()]);
    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());
    let before = fixture.table.snapshot().await;
    let list_calls = fixture.gateway.list_calls.load(Ordering::SeqCst);

    let result = fixture.table.delete(&RecordId::saved("999")).await;

    assert!(result.is_err());
    assert_eq!(fixture.table.snapshot().await, before);
    assert_eq!(fixture.gateway.list_calls.load(Ordering::SeqCst), list_calls);
}

#[tokio::test]
async fn successful_delete_reloads() {
    let fixture = fixture(vec![ada()]);
    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());

    assert!(fixture.table.delete(&RecordId::saved("1")).await.is_ok());

    assert!(fixture.table.rows().await.is_empty());
}

#[tokio::test]
async fn cancelling_a_draft_removes_it_locally() {
    let fixture = fixture(vec![ada()]);
    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());
    let list_calls = fixture.gateway.list_calls.load(Ordering::SeqCst);

    let _ = fixture.table.add_draft().await;
    assert_eq!(fixture.table.rows().await.len(), 2);
    fixture.table.cancel_edit(&RecordId::Draft).await;

    assert_eq!(fixture.table.rows().await, vec![ada()]);
    assert_eq!(fixture.gateway.list_calls.load(Ordering::SeqCst), list_calls);
}

#[tokio::test]
async fn cancelling_an_existing_row_reloads_server_copy() {
    let fixture = fixture(vec![ada()]);
    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());

    assert!(fixture.table.start_editing(&RecordId::saved("1")).await.is_ok());
    let staged = Employee::new(RecordId::saved("1"), "Changed locally");
    assert!(fixture.table.stage(staged).await.is_ok());
    fixture.table.cancel_edit(&RecordId::saved("1")).await;

    let state = fixture.table.snapshot().await;
    assert_eq!(state.rows(), &[ada()]);
    assert!(!state.is_editing(&RecordId::saved("1")));
}

#[tokio::test]
async fn fetch_failure_keeps_previous_rows() {
    let fixture = fixture(vec![ada()]);
    assert!(fixture.table.fetch(ListFilter::default()).await.is_ok());
    fixture.gateway.fail_list.store(true, Ordering::SeqCst);

    let result = fixture.table.fetch(ListFilter::default()).await;

    assert!(matches!(result, Err(AppError::Transport(_))));
    assert_eq!(fixture.table.rows().await, vec![ada()]);
    assert_eq!(
        fixture.notifier.messages(),
        vec!["Connection error".to_owned()]
    );
}

#[tokio::test]
async fn sibling_tables_on_one_topic_refresh_together() {
    let fixture = fixture(vec![ada()]);
    let sibling = TableController::new(
        fixture.gateway.clone(),
        fixture.notifier.clone(),
        fixture.coordinator.clone(),
        RefreshTopic::employees(),
    );

    let mut draft = fixture.table.add_draft().await;
    draft.full_name = "Grace".to_owned();
    assert!(fixture.table.save(draft).await.is_ok());

    assert_eq!(fixture.table.rows().await.len(), 2);
    assert_eq!(sibling.rows().await.len(), 2);
}

#[tokio::test]
async fn fetch_result_after_unmount_is_ignored() {
    let fixture = fixture(vec![ada()]);
    let gate = Arc::new(Notify::new());
    *fixture.gateway.list_gate.lock().await = Some(gate.clone());

    let table = Arc::new(fixture.table);
    let fetching = {
        let table = table.clone();
        tokio::spawn(async move { table.fetch(ListFilter::default()).await })
    };
    tokio::task::yield_now().await;

    table.unmount();
    gate.notify_one();

    assert!(matches!(fetching.await, Ok(Ok(()))));
    assert!(table.rows().await.is_empty());
    assert!(!table.is_mounted());
}

/// Answers the n-th list call with one row named after the call, once the
/// n-th gate opens.
struct SequencedGateway {
    calls: AtomicUsize,
    gates: [Arc<Notify>; 2],
}

#[async_trait]
impl ResourceGateway<Employee> for SequencedGateway {
    async fn list(&self, _filter: &ListFilter) -> AppResult<Vec<Employee>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(call) {
            gate.notified().await;
        }
        let number = call + 1;
        Ok(vec![Employee::new(
            RecordId::saved(number.to_string()),
            format!("call {number}"),
        )])
    }

    async fn create(&self, _record: &Employee) -> AppResult<()> {
        Ok(())
    }

    async fn update(&self, _record: &Employee) -> AppResult<()> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> AppResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn older_fetch_queued_behind_a_reader_does_not_overwrite_newer_one() {
    let gateway = Arc::new(SequencedGateway {
        calls: AtomicUsize::new(0),
        gates: [Arc::new(Notify::new()), Arc::new(Notify::new())],
    });
    let table = Arc::new(TableController::new(
        gateway.clone(),
        Arc::new(RecordingNotifier::default()),
        RefreshCoordinator::new(),
        RefreshTopic::employees(),
    ));

    let reader = table.inner.state.read().await;
    gateway.gates[0].notify_one();
    let first = {
        let table = table.clone();
        tokio::spawn(async move { table.fetch(ListFilter::default()).await })
    };
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    let second = {
        let table = table.clone();
        tokio::spawn(async move { table.fetch(ListFilter::default()).await })
    };
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    drop(reader);

    assert!(matches!(first.await, Ok(Ok(()))));
    assert!(table.rows().await.is_empty());

    gateway.gates[1].notify_one();
    assert!(matches!(second.await, Ok(Ok(()))));
    assert_eq!(
        table.rows().await,
        vec![Employee::new(RecordId::saved("2"), "call 2")]
    );
}
