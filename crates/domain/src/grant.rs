use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// One permission rule reachable by the current identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    /// Role the rule was granted through.
    pub role: String,
    /// Resource namespace, e.g. `rbac::data`.
    pub object: String,
    /// Operation name, e.g. `read`.
    pub action: String,
}

impl Grant {
    /// Creates a grant triple.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        object: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            object: object.into(),
            action: action.into(),
        }
    }

    /// Builds a grant from a policy row shaped `[role, object, action, ...]`.
    ///
    /// Rows with fewer than three columns are not grants and yield `None`.
    #[must_use]
    pub fn from_policy_row(row: &[String]) -> Option<Self> {
        match row {
            [role, object, action, ..] => Some(Self::new(
                role.as_str(),
                object.as_str(),
                action.as_str(),
            )),
            _ => None,
        }
    }
}

/// Grant lookup structure built once per permission fetch.
///
/// Decisions match on `(object, action)` only; the role column is kept for
/// display but never consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantSet {
    grants: Vec<Grant>,
    actions_by_object: HashMap<String, HashSet<String>>,
}

impl GrantSet {
    /// Creates an empty grant set that allows nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes the given grants.
    #[must_use]
    pub fn new(grants: impl IntoIterator<Item = Grant>) -> Self {
        let mut set = Self::default();
        let mut seen = HashSet::new();
        for grant in grants {
            if !seen.insert(grant.clone()) {
                continue;
            }

            set.actions_by_object
                .entry(grant.object.clone())
                .or_default()
                .insert(grant.action.clone());
            set.grants.push(grant);
        }

        set
    }

    /// Returns true when some grant matches `object` and `action` exactly.
    #[must_use]
    pub fn allows(&self, action: &str, object: &str) -> bool {
        self.actions_by_object
            .get(object)
            .is_some_and(|actions| actions.contains(action))
    }

    /// Returns the indexed grants in fetch order.
    #[must_use]
    pub fn grants(&self) -> &[Grant] {
        self.grants.as_slice()
    }

    /// Returns the number of distinct grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Returns true when the set allows nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}
