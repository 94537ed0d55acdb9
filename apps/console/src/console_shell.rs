use gatehouse_application::{CurrentIdentity, GateOutcome, ListFilter, RouteGate, SessionState};
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{RBAC_DATA_OBJECT, WRITE_ACTION};

use crate::console_commands::{Command, HELP};
use crate::console_services::ConsoleServices;
use crate::console_views::{ActiveView, TableView, ViewRoute};

/// Interactive session over one set of services.
pub struct ConsoleShell {
    services: ConsoleServices,
    gate: RouteGate,
    view: ActiveView,
}

impl ConsoleShell {
    pub fn new(services: ConsoleServices) -> Self {
        Self {
            gate: RouteGate::new(services.session.clone()),
            services,
            view: ActiveView::Home,
        }
    }

    pub fn route(&self) -> ViewRoute {
        self.view.route()
    }

    /// Runs one command and returns the lines to print.
    pub async fn execute(&mut self, command: Command) -> AppResult<Vec<String>> {
        match command {
            Command::Help => return Ok(HELP.lines().map(str::to_owned).collect()),
            Command::Quit => return Ok(Vec::new()),
            Command::Login => return self.login().await,
            Command::Logout => return self.logout().await,
            Command::WhoAmI => return Ok(self.whoami()),
            Command::View(route) => return self.navigate(route).await,
            _ => {}
        }

        self.ensure_view_allowed()?;
        if command.is_mutation()
            && !self
                .services
                .session
                .permissions()
                .can(WRITE_ACTION, RBAC_DATA_OBJECT)
        {
            return Err(AppError::Forbidden(format!(
                "changing data requires {WRITE_ACTION} on {RBAC_DATA_OBJECT}"
            )));
        }

        self.run_view_command(command).await?;
        Ok(self.view.render().await)
    }

    async fn login(&mut self) -> AppResult<Vec<String>> {
        let identity = self.services.session.sign_in().await?;
        let mut states = self.services.session.subscribe();
        // The provider publishes first; the session catches up on its own task.
        let _ = states
            .wait_for(|state| {
                matches!(state, SessionState::Authenticated(current)
                    if current.subject() == identity.subject())
            })
            .await;
        self.services.session.wait_until_resolved().await;

        Ok(vec![format!(
            "signed in as {} ({} grants)",
            identity.display_name(),
            self.services.session.permissions().snapshot().len()
        )])
    }

    async fn logout(&mut self) -> AppResult<Vec<String>> {
        self.services.session.sign_out().await?;
        let mut states = self.services.session.subscribe();
        let _ = states
            .wait_for(|state| matches!(state, SessionState::Anonymous))
            .await;
        self.view = ActiveView::Home;
        Ok(vec!["signed out".to_owned()])
    }

    fn whoami(&self) -> Vec<String> {
        match self.services.session.current_identity() {
            CurrentIdentity::Unresolved => vec!["resolving session".to_owned()],
            CurrentIdentity::SignedOut => vec!["not signed in".to_owned()],
            CurrentIdentity::SignedIn(identity) => {
                let mut lines = vec![format!(
                    "{} <{}> {}",
                    identity.display_name(),
                    identity.subject(),
                    identity.email().unwrap_or_default()
                )];
                let grants = self.services.session.permissions().snapshot();
                lines.extend(grants.grants().iter().map(|grant| {
                    format!("  {} {} via {}", grant.action, grant.object, grant.role)
                }));
                lines
            }
        }
    }

    async fn navigate(&mut self, route: ViewRoute) -> AppResult<Vec<String>> {
        gate_result(self.gate.enter(route.requirement()).await, route)?;

        // The previous view unmounts before the next one loads.
        self.view = ActiveView::Home;
        let (view, loaded) = ActiveView::mount(route, &self.services).await;
        self.view = view;
        tracing::debug!(view = %route, "view mounted");

        let mut lines = vec![format!("== {route} ==")];
        if let Err(error) = loaded {
            lines.push(format!("! {error}"));
        }
        lines.extend(self.view.render().await);
        Ok(lines)
    }

    /// Re-checks the mounted view; permissions may have changed since it
    /// was entered.
    fn ensure_view_allowed(&mut self) -> AppResult<()> {
        let route = self.view.route();
        if let Err(error) = gate_result(self.gate.evaluate(route.requirement()), route) {
            self.view = ActiveView::Home;
            return Err(error);
        }
        Ok(())
    }

    async fn run_view_command(&mut self, command: Command) -> AppResult<()> {
        match command {
            Command::Show => Ok(()),
            Command::List(keyword) => {
                let filter = keyword.map(ListFilter::keyword).unwrap_or_default();
                match &self.view {
                    ActiveView::Roles(controller) => controller.mount(filter).await,
                    ActiveView::Permissions(controller) => controller.load_roles().await,
                    view => table_of(view)?.list(filter).await,
                }
            }
            Command::Add => table_of(&self.view)?.add().await,
            Command::Edit(id) => table_of(&self.view)?.edit(&id).await,
            Command::Set { field, value } => table_of(&self.view)?.set(&field, &value).await,
            Command::Save => table_of(&self.view)?.save().await,
            Command::Cancel => table_of(&self.view)?.cancel().await,
            Command::Delete(id) => table_of(&self.view)?.delete(&id).await,
            Command::Expand(id) => match &mut self.view {
                ActiveView::Employees(view) => view.expand(&id).await,
                ActiveView::Customers(view) => view.expand(&id).await,
                _ => Err(wrong_view("expand", "employees or customers")),
            },
            Command::Collapse => match &mut self.view {
                ActiveView::Employees(view) => {
                    view.collapse();
                    Ok(())
                }
                ActiveView::Customers(view) => {
                    view.collapse();
                    Ok(())
                }
                _ => Err(wrong_view("collapse", "employees or customers")),
            },
            Command::Link(email) => match &self.view {
                ActiveView::Employees(view) => view.links()?.create_link(&email).await,
                ActiveView::Customers(view) => view.links()?.create_link(&email).await,
                _ => Err(wrong_view("link", "employees or customers")),
            },
            Command::Unlink(child) => match &self.view {
                ActiveView::Employees(view) => view.links()?.delete_link(&child).await,
                ActiveView::Customers(view) => view.links()?.delete_link(&child).await,
                _ => Err(wrong_view("unlink", "employees or customers")),
            },
            Command::Toggle {
                child,
                flag,
                enabled,
            } => match &self.view {
                ActiveView::Employees(view) => view.links()?.toggle(&child, flag, enabled).await,
                ActiveView::Customers(view) => view.links()?.toggle(&child, flag, enabled).await,
                _ => Err(wrong_view("toggle", "customers")),
            },
            Command::Assign { user, role } => match &self.view {
                ActiveView::Roles(controller) => controller.assign_role(&user, &role).await,
                _ => Err(wrong_view("assign", "roles")),
            },
            Command::Select(role) => match &self.view {
                ActiveView::Permissions(controller) => controller.select_role(&role).await,
                _ => Err(wrong_view("select", "permissions")),
            },
            Command::CreateRole { name, description } => match &self.view {
                ActiveView::Permissions(controller) => {
                    controller.create_role(&name, &description).await
                }
                _ => Err(wrong_view("role-add", "permissions")),
            },
            Command::DeleteRole => match &self.view {
                ActiveView::Permissions(controller) => controller.delete_role().await,
                _ => Err(wrong_view("role-delete", "permissions")),
            },
            Command::Grant { resource, action } => {
                self.set_permission(&resource, &action, true).await
            }
            Command::Revoke { resource, action } => {
                self.set_permission(&resource, &action, false).await
            }
            Command::Provision { email, password } => match &self.view {
                ActiveView::Users(_) => {
                    self.services
                        .identity_admin
                        .provision_account(&email, &password)
                        .await
                }
                _ => Err(wrong_view("provision", "users")),
            },
            Command::Sync => match &self.view {
                ActiveView::Users(_) => self.services.identity_admin.sync_identities().await,
                _ => Err(wrong_view("sync", "users")),
            },
            Command::Help
            | Command::Quit
            | Command::Login
            | Command::Logout
            | Command::WhoAmI
            | Command::View(_) => Ok(()),
        }
    }

    async fn set_permission(&self, resource: &str, action: &str, checked: bool) -> AppResult<()> {
        let ActiveView::Permissions(controller) = &self.view else {
            let command = if checked { "grant" } else { "revoke" };
            return Err(wrong_view(command, "permissions"));
        };
        let matrix = controller.permissions().await;
        let Some(descriptor) = matrix.find(resource, action) else {
            return Err(AppError::NotFound(format!(
                "no permission '{action}' on '{resource}'"
            )));
        };
        controller.set_permission(descriptor, checked).await
    }
}

fn gate_result(outcome: GateOutcome, route: ViewRoute) -> AppResult<()> {
    match outcome {
        GateOutcome::Render => Ok(()),
        GateOutcome::RedirectToSignIn => Err(AppError::Unauthorized(format!(
            "sign in to open {route}"
        ))),
        GateOutcome::Fallback => Err(AppError::Forbidden(format!(
            "you do not have access to {route}"
        ))),
        GateOutcome::Loading => Err(AppError::Conflict(
            "session is still resolving".to_owned(),
        )),
    }
}

fn table_of(view: &ActiveView) -> AppResult<&dyn TableView> {
    view.table()
        .ok_or_else(|| wrong_view("row commands", "a table view"))
}

fn wrong_view(command: &str, expected: &str) -> AppError {
    AppError::Validation(format!("{command} needs the {expected} view"))
}
