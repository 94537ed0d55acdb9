use std::str::FromStr;

use gatehouse_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::record::{RecordId, TableRecord, require_field};

/// Capability flag carried by a customer-user link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessFlag {
    /// Access to the customer's performance data.
    #[serde(rename = "performance")]
    Performance,
    /// Access to the customer's financial data.
    #[serde(rename = "finance")]
    Financial,
}

impl AccessFlag {
    /// Returns the wire value used by the toggle endpoint.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Financial => "finance",
        }
    }

    /// Returns every flag in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AccessFlag] = &[AccessFlag::Performance, AccessFlag::Financial];
        ALL
    }
}

impl FromStr for AccessFlag {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "performance" => Ok(Self::Performance),
            "finance" | "financial" => Ok(Self::Financial),
            _ => Err(AppError::Validation(format!(
                "unknown access flag '{value}'"
            ))),
        }
    }
}

/// A many-to-many link row scoped to one parent entity.
pub trait LinkRecord: TableRecord {
    /// Returns the reference used to look up the linked child server-side.
    fn child_reference(&self) -> &str;

    /// Returns the value of a capability flag, if this link type carries it.
    fn flag(&self, _flag: AccessFlag) -> Option<bool> {
        None
    }
}

/// Link between an employee and one identity-provider user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeUserLink {
    /// Linked user id, or the draft sentinel.
    pub id: RecordId,
    /// Linked user email.
    #[serde(default)]
    pub email: String,
}

impl TableRecord for EmployeeUserLink {
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

impl LinkRecord for EmployeeUserLink {
    fn child_reference(&self) -> &str {
        self.email.as_str()
    }
}

/// Link between a customer and one identity-provider user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUserLink {
    /// Linked user id, or the draft sentinel.
    pub id: RecordId,
    /// Linked user email.
    #[serde(default)]
    pub email: String,
    /// Whether the user may read performance data.
    #[serde(default)]
    pub has_performance_access: bool,
    /// Whether the user may read financial data.
    #[serde(default)]
    pub has_financial_access: bool,
}

impl TableRecord for CustomerUserLink {
    fn record_id(&self) -> &RecordId {
        &self.id
    }

    fn draft() -> Self {
        Self {
            id: RecordId::Draft,
            email: String::new(),
            has_performance_access: false,
            has_financial_access: false,
        }
    }

    fn validate(&self) -> AppResult<()> {
        require_field("email", &self.email)
    }
}

impl LinkRecord for CustomerUserLink {
    fn child_reference(&self) -> &str {
        self.email.as_str()
    }

    fn flag(&self, flag: AccessFlag) -> Option<bool> {
        Some(match flag {
            AccessFlag::Performance => self.has_performance_access,
            AccessFlag::Financial => self.has_financial_access,
        })
    }
}
