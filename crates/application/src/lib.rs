//! Application services and ports.

#![forbid(unsafe_code)]

mod association_controller;
mod console_ports;
mod identity_admin_service;
mod permission_cache;
mod refresh_coordinator;
mod role_admin_controller;
mod session_manager;
mod table_controller;
#[cfg(test)]
mod test_support;
mod view_gate;

pub use association_controller::AssociationController;
pub use console_ports::{
    AssociationGateway, AuthState, BearerTokenSource, GrantSource, IdentityAdminGateway,
    IdentityProvider, LinkFlagToggle, ListFilter, NewUserAccount, Notification,
    NotificationLevel, Notifier, PermissionChange, ResourceGateway, RoleAdminGateway,
};
pub use identity_admin_service::IdentityAdminService;
pub use permission_cache::PermissionCache;
pub use refresh_coordinator::{
    RefreshCoordinator, RefreshRegistration, RefreshTopic, Refreshable,
};
pub use role_admin_controller::{RoleAdminController, RoleAssignmentController};
pub use session_manager::{
    CurrentIdentity, GrantFetch, SessionListener, SessionManager, SessionState,
};
pub use table_controller::{SingleRowEditPolicy, TableController, TableState};
pub use view_gate::{
    Availability, AuthorizationGate, AvailabilityGate, GateOutcome, RouteGate, ViewRequirement,
};
