use std::fmt::{Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_application::{
    AssociationController, AssociationGateway, ListFilter, Notifier, RefreshCoordinator,
    RefreshTopic, RoleAdminController, RoleAssignmentController, SingleRowEditPolicy,
    TableController, ViewRequirement,
};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{
    AccessFlag, Customer, CustomerUserLink, Employee, EmployeeUserLink, LinkRecord,
    RBAC_DATA_OBJECT, READ_ACTION, RecordId, UserAccount,
};

use crate::console_records::ConsoleRecord;
use crate::console_services::ConsoleServices;

/// Every data view requires read access to the RBAC data namespace.
pub const DATA_READ: ViewRequirement = ViewRequirement::new(READ_ACTION, RBAC_DATA_OBJECT);

/// Navigable console views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRoute {
    Home,
    Roles,
    Permissions,
    Users,
    Employees,
    Customers,
}

impl ViewRoute {
    pub const ALL: [Self; 6] = [
        Self::Home,
        Self::Roles,
        Self::Permissions,
        Self::Users,
        Self::Employees,
        Self::Customers,
    ];

    pub fn parse(value: &str) -> AppResult<Self> {
        Self::ALL
            .into_iter()
            .find(|route| route.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "unknown view '{value}'; one of: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Roles => "roles",
            Self::Permissions => "permissions",
            Self::Users => "users",
            Self::Employees => "employees",
            Self::Customers => "customers",
        }
    }

    /// Home only needs a signed-in operator.
    pub fn requirement(self) -> Option<ViewRequirement> {
        match self {
            Self::Home => None,
            _ => Some(DATA_READ),
        }
    }
}

impl Display for ViewRoute {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Row-level commands shared by every table view.
#[async_trait]
pub trait TableView: Send + Sync {
    async fn list(&self, filter: ListFilter) -> AppResult<()>;
    async fn add(&self) -> AppResult<()>;
    async fn edit(&self, id: &RecordId) -> AppResult<()>;
    async fn set(&self, field: &str, value: &str) -> AppResult<()>;
    async fn save(&self) -> AppResult<()>;
    async fn cancel(&self) -> AppResult<()>;
    async fn delete(&self, id: &RecordId) -> AppResult<()>;
    async fn render(&self) -> Vec<String>;
}

/// Returns the row under edit; the edit policy keeps it to one.
async fn editing_row<R: ConsoleRecord>(table: &TableController<R>) -> AppResult<R> {
    let state = table.snapshot().await;
    state
        .editing()
        .next()
        .and_then(|id| state.find(id))
        .cloned()
        .ok_or_else(|| AppError::Validation("no row is being edited".to_owned()))
}

#[async_trait]
impl<R: ConsoleRecord> TableView for TableController<R> {
    async fn list(&self, filter: ListFilter) -> AppResult<()> {
        self.fetch(filter).await
    }

    async fn add(&self) -> AppResult<()> {
        SingleRowEditPolicy.check(&self.snapshot().await, &RecordId::Draft)?;
        self.add_draft().await;
        Ok(())
    }

    async fn edit(&self, id: &RecordId) -> AppResult<()> {
        SingleRowEditPolicy.check(&self.snapshot().await, id)?;
        self.start_editing(id).await
    }

    async fn set(&self, field: &str, value: &str) -> AppResult<()> {
        let mut row = editing_row(self).await?;
        row.set_field(field, value)?;
        self.stage(row).await
    }

    async fn save(&self) -> AppResult<()> {
        let row = editing_row(self).await?;
        TableController::save(self, row).await
    }

    async fn cancel(&self) -> AppResult<()> {
        let row = editing_row(self).await?;
        self.cancel_edit(row.record_id()).await;
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        TableController::delete(self, id).await
    }

    async fn render(&self) -> Vec<String> {
        let state = self.snapshot().await;
        if state.rows().is_empty() {
            return vec!["  (no rows)".to_owned()];
        }
        state
            .rows()
            .iter()
            .map(|row| {
                let marker = if state.is_editing(row.record_id()) {
                    '*'
                } else {
                    ' '
                };
                format!("{marker} {}", row.render())
            })
            .collect()
    }
}

/// Directory table with an optional expanded link table for one row.
pub struct DirectoryView<R: ConsoleRecord, L: LinkRecord + ConsoleRecord> {
    table: TableController<R>,
    link_gateway: Arc<dyn AssociationGateway<L>>,
    notifier: Arc<dyn Notifier>,
    coordinator: Arc<RefreshCoordinator>,
    collection: &'static str,
    expanded: Option<AssociationController<L>>,
}

impl<R: ConsoleRecord, L: LinkRecord + ConsoleRecord> DirectoryView<R, L> {
    fn new(
        table: TableController<R>,
        link_gateway: Arc<dyn AssociationGateway<L>>,
        services: &ConsoleServices,
        collection: &'static str,
    ) -> Self {
        Self {
            table,
            link_gateway,
            notifier: services.notifier.clone(),
            coordinator: services.coordinator.clone(),
            collection,
            expanded: None,
        }
    }

    pub fn table(&self) -> &TableController<R> {
        &self.table
    }

    /// Opens the link table of one saved row, replacing any open one.
    pub async fn expand(&mut self, parent: &RecordId) -> AppResult<()> {
        let Some(parent_id) = parent.as_saved() else {
            return Err(AppError::Validation(
                "save the row before managing its links".to_owned(),
            ));
        };
        if self.table.snapshot().await.find(parent).is_none() {
            return Err(AppError::NotFound(format!(
                "row '{parent}' is not in the table"
            )));
        }

        self.expanded = None;
        let links = AssociationController::new(
            self.link_gateway.clone(),
            self.notifier.clone(),
            self.coordinator.clone(),
            self.collection,
            parent_id,
        );
        let mounted = links.mount().await;
        self.expanded = Some(links);
        mounted
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    pub fn links(&self) -> AppResult<&AssociationController<L>> {
        self.expanded
            .as_ref()
            .ok_or_else(|| AppError::Validation("expand a row first".to_owned()))
    }

    pub async fn render(&self) -> Vec<String> {
        let mut lines = self.table.render().await;
        if let Some(links) = &self.expanded {
            lines.push(format!("  links of {} {}:", self.collection, links.parent_id()));
            lines.extend(
                links
                    .table()
                    .render()
                    .await
                    .into_iter()
                    .map(|line| format!("    {line}")),
            );
            let eligible = links.eligible_children().await;
            if !eligible.is_empty() {
                lines.push(format!("    eligible: {}", eligible.join(", ")));
            }
        }
        lines
    }
}

/// The mounted view and the controllers it owns.
///
/// Dropping a view unmounts its controllers.
pub enum ActiveView {
    Home,
    Roles(RoleAssignmentController),
    Permissions(RoleAdminController),
    Users(TableController<UserAccount>),
    Employees(DirectoryView<Employee, EmployeeUserLink>),
    Customers(DirectoryView<Customer, CustomerUserLink>),
}

impl ActiveView {
    /// Builds the controllers of a route and loads their data.
    pub async fn mount(route: ViewRoute, services: &ConsoleServices) -> (Self, AppResult<()>) {
        let gateways = &services.gateways;
        match route {
            ViewRoute::Home => (Self::Home, Ok(())),
            ViewRoute::Roles => {
                let controller = RoleAssignmentController::new(
                    gateways.assignments.clone(),
                    gateways.roles.clone(),
                    services.notifier.clone(),
                    services.coordinator.clone(),
                );
                let loaded = controller.mount(ListFilter::default()).await;
                (Self::Roles(controller), loaded)
            }
            ViewRoute::Permissions => {
                let controller =
                    RoleAdminController::new(gateways.roles.clone(), services.notifier.clone());
                let loaded = controller.load_roles().await;
                (Self::Permissions(controller), loaded)
            }
            ViewRoute::Users => {
                let table = TableController::new(
                    gateways.accounts.clone(),
                    services.notifier.clone(),
                    services.coordinator.clone(),
                    RefreshTopic::accounts(),
                );
                let loaded = table.fetch(ListFilter::default()).await;
                (Self::Users(table), loaded)
            }
            ViewRoute::Employees => {
                let table = TableController::new(
                    gateways.employees.clone(),
                    services.notifier.clone(),
                    services.coordinator.clone(),
                    RefreshTopic::employees(),
                );
                let loaded = table.fetch(ListFilter::default()).await;
                let view = DirectoryView::new(
                    table,
                    gateways.employee_links.clone(),
                    services,
                    "employees",
                );
                (Self::Employees(view), loaded)
            }
            ViewRoute::Customers => {
                let table = TableController::new(
                    gateways.customers.clone(),
                    services.notifier.clone(),
                    services.coordinator.clone(),
                    RefreshTopic::customers(),
                );
                let loaded = table.fetch(ListFilter::default()).await;
                let view = DirectoryView::new(
                    table,
                    gateways.customer_links.clone(),
                    services,
                    "customers",
                );
                (Self::Customers(view), loaded)
            }
        }
    }

    pub fn route(&self) -> ViewRoute {
        match self {
            Self::Home => ViewRoute::Home,
            Self::Roles(_) => ViewRoute::Roles,
            Self::Permissions(_) => ViewRoute::Permissions,
            Self::Users(_) => ViewRoute::Users,
            Self::Employees(_) => ViewRoute::Employees,
            Self::Customers(_) => ViewRoute::Customers,
        }
    }

    /// Returns the row table of the view, if it has one.
    pub fn table(&self) -> Option<&dyn TableView> {
        match self {
            Self::Home | Self::Permissions(_) => None,
            Self::Roles(controller) => Some(controller.table()),
            Self::Users(table) => Some(table),
            Self::Employees(view) => Some(view.table()),
            Self::Customers(view) => Some(view.table()),
        }
    }

    pub async fn render(&self) -> Vec<String> {
        match self {
            Self::Home => vec!["home".to_owned()],
            Self::Roles(controller) => {
                let mut lines = controller.table().render().await;
                lines.push(format!(
                    "  roles: {}",
                    controller.role_options().await.join(", ")
                ));
                lines
            }
            Self::Permissions(controller) => render_permissions(controller).await,
            Self::Users(table) => table.render().await,
            Self::Employees(view) => view.render().await,
            Self::Customers(view) => view.render().await,
        }
    }
}

async fn render_permissions(controller: &RoleAdminController) -> Vec<String> {
    let selected = controller.selected_role().await;
    let mut lines: Vec<String> = controller
        .roles()
        .await
        .iter()
        .map(|role| {
            let marker = if selected.as_deref() == Some(role.role.as_str()) {
                '>'
            } else {
                ' '
            };
            format!("{marker} {}\t{}", role.role, role.description)
        })
        .collect();

    let matrix = controller.permissions().await;
    for (category, descriptors) in matrix.categories() {
        lines.push(format!("  [{category}]"));
        lines.extend(descriptors.iter().map(|descriptor| {
            let checked = if descriptor.has_permission { 'x' } else { ' ' };
            format!(
                "    [{checked}] {} {}\t{}",
                descriptor.resource, descriptor.action, descriptor.description
            )
        }));
    }
    lines
}

/// Parses `on`/`off` style switch values.
pub fn parse_switch(value: &str) -> AppResult<bool> {
    match value {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "expected on or off, got '{value}'"
        ))),
    }
}

/// Parses a link flag name.
pub fn parse_flag(value: &str) -> AppResult<AccessFlag> {
    value.parse()
}
