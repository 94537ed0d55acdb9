use serde::{Deserialize, Serialize};

use gatehouse_core::AppResult;

use crate::record::{RecordId, TableRecord, require_field};

/// Employee directory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Backend identifier, or the draft sentinel.
    pub id: RecordId,
    /// Display name of the employee.
    #[serde(default)]
    pub full_name: String,
}

impl Employee {
    /// Creates an employee row.
    #[must_use]
    pub fn new(id: RecordId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
        }
    }
}

impl TableRecord for Employee {
    fn record_id(&self) -> &RecordId {
        &self.id
    }

    fn draft() -> Self {
        Self::new(RecordId::Draft, "")
    }

    fn validate(&self) -> AppResult<()> {
        require_field("full_name", &self.full_name)
    }
}

/// Customer directory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Backend identifier, or the draft sentinel.
    pub id: RecordId,
    /// Display name of the customer.
    #[serde(default)]
    pub full_name: String,
}

impl Customer {
    /// Creates a customer row.
    #[must_use]
    pub fn new(id: RecordId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
        }
    }
}

impl TableRecord for Customer {
    fn record_id(&self) -> &RecordId {
        &self.id
    }

    fn draft() -> Self {
        Self::new(RecordId::Draft, "")
    }

    fn validate(&self) -> AppResult<()> {
        require_field("full_name", &self.full_name)
    }
}

/// Account held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Identity provider subject id.
    pub id: RecordId,
    /// Sign-in email.
    #[serde(default)]
    pub email: String,
}

impl TableRecord for UserAccount {
    fn record_id(&self) -> &RecordId {
        &self.id
    }

    fn draft() -> Self {
        Self {
            id: RecordId::Draft,
            email: String::new(),
        }
    }

    fn validate(&self) -> AppResult<()> {
        require_field("email", &self.email)
    }
}
