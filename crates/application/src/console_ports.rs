mod associations;
mod grants;
mod identity;
mod identity_admin;
mod notifications;
mod resources;
mod roles;

pub use associations::{AssociationGateway, LinkFlagToggle};
pub use grants::GrantSource;
pub use identity::{AuthState, BearerTokenSource, IdentityProvider};
pub use identity_admin::{IdentityAdminGateway, NewUserAccount};
pub use notifications::{Notification, NotificationLevel, Notifier};
pub use resources::{ListFilter, ResourceGateway};
pub use roles::{PermissionChange, RoleAdminGateway};
