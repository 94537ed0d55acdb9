use crate::permission_cache::PermissionCache;
use crate::session_manager::{CurrentIdentity, SessionManager};

/// Permission a view requires on top of a signed-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewRequirement {
    /// Required action.
    pub action: &'static str,
    /// Required object.
    pub object: &'static str,
}

impl ViewRequirement {
    /// Creates a requirement.
    #[must_use]
    pub const fn new(action: &'static str, object: &'static str) -> Self {
        Self { action, object }
    }
}

/// Result of the outer availability layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Session or permissions still resolving.
    Loading,
    /// Resolved without an identity.
    RedirectToSignIn,
    /// Resolved with an identity.
    Available,
}

/// Result of the composed gate for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Show a loading indicator.
    Loading,
    /// Send the operator to the sign-in view.
    RedirectToSignIn,
    /// Show the access-denied fallback instead of the view.
    Fallback,
    /// Show the view.
    Render,
}

/// Outer gate: blocks protected views until the session resolves.
#[derive(Clone)]
pub struct AvailabilityGate {
    session: SessionManager,
}

impl AvailabilityGate {
    /// Creates an availability gate over a session.
    #[must_use]
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// Evaluates availability now.
    #[must_use]
    pub fn check(&self) -> Availability {
        if !self.session.is_resolved() {
            return Availability::Loading;
        }

        match self.session.current_identity() {
            CurrentIdentity::Unresolved => Availability::Loading,
            CurrentIdentity::SignedOut => Availability::RedirectToSignIn,
            CurrentIdentity::SignedIn(_) => Availability::Available,
        }
    }
}

/// Inner gate: consults the permission cache on every call.
#[derive(Clone)]
pub struct AuthorizationGate {
    permissions: PermissionCache,
}

impl AuthorizationGate {
    /// Creates an authorization gate over a permission cache.
    #[must_use]
    pub fn new(permissions: PermissionCache) -> Self {
        Self { permissions }
    }

    /// Returns whether the requirement is currently granted.
    #[must_use]
    pub fn allows(&self, requirement: ViewRequirement) -> bool {
        self.permissions.can(requirement.action, requirement.object)
    }
}

/// Both gate layers composed for route entry.
#[derive(Clone)]
pub struct RouteGate {
    session: SessionManager,
    availability: AvailabilityGate,
    authorization: AuthorizationGate,
}

impl RouteGate {
    /// Creates a route gate over a session and its permission cache.
    #[must_use]
    pub fn new(session: SessionManager) -> Self {
        Self {
            availability: AvailabilityGate::new(session.clone()),
            authorization: AuthorizationGate::new(session.permissions().clone()),
            session,
        }
    }

    /// Evaluates both layers now; views without a requirement only pass the
    /// availability layer.
    #[must_use]
    pub fn evaluate(&self, requirement: Option<ViewRequirement>) -> GateOutcome {
        match self.availability.check() {
            Availability::Loading => GateOutcome::Loading,
            Availability::RedirectToSignIn => GateOutcome::RedirectToSignIn,
            Availability::Available => match requirement {
                Some(requirement) if !self.authorization.allows(requirement) => {
                    tracing::debug!(
                        action = requirement.action,
                        object = requirement.object,
                        "view requirement denied"
                    );
                    GateOutcome::Fallback
                }
                _ => GateOutcome::Render,
            },
        }
    }

    /// Waits for the session to resolve, then evaluates both layers.
    pub async fn enter(&self, requirement: Option<ViewRequirement>) -> GateOutcome {
        self.session.wait_until_resolved().await;
        self.evaluate(requirement)
    }

    /// Returns the authorization layer for per-control checks.
    #[must_use]
    pub fn authorization(&self) -> &AuthorizationGate {
        &self.authorization
    }
}
