use std::fmt::{Display, Formatter};

use gatehouse_core::{AppError, AppResult};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire value that marks an unsaved, client-only row.
pub const DRAFT_RECORD_ID: &str = "-";

/// Identifier of a table row.
///
/// A `Draft` row exists only on the client and may only ever be created,
/// never updated or deleted on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    /// Unsaved draft row.
    Draft,
    /// Identifier assigned by the backend.
    Saved(String),
}

impl RecordId {
    /// Parses a wire identifier, mapping the sentinel to `Draft`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == DRAFT_RECORD_ID {
            Self::Draft
        } else {
            Self::Saved(value.to_owned())
        }
    }

    /// Creates a saved identifier.
    #[must_use]
    pub fn saved(value: impl Into<String>) -> Self {
        Self::Saved(value.into())
    }

    /// Returns true for the draft sentinel.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns the backend identifier of a saved row.
    #[must_use]
    pub fn as_saved(&self) -> Option<&str> {
        match self {
            Self::Draft => None,
            Self::Saved(value) => Some(value.as_str()),
        }
    }

    /// Returns the wire representation; numeric ids become JSON numbers.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Draft => serde_json::Value::String(DRAFT_RECORD_ID.to_owned()),
            Self::Saved(value) => wire_id_value(value),
        }
    }
}

/// Encodes an identifier for request bodies: numeric ids as numbers,
/// everything else as strings.
#[must_use]
pub fn wire_id_value(value: &str) -> serde_json::Value {
    value
        .parse::<i64>()
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_owned()))
}

impl Display for RecordId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => formatter.write_str(DRAFT_RECORD_ID),
            Self::Saved(value) => formatter.write_str(value),
        }
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}

struct RecordIdVisitor;

impl Visitor<'_> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a string or integer record identifier")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(RecordId::parse(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(RecordId::Saved(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(RecordId::Saved(value.to_string()))
    }
}

/// A flat row mirrored from one backend collection.
pub trait TableRecord: Clone + Send + Sync + 'static {
    /// Returns the row identifier.
    fn record_id(&self) -> &RecordId;

    /// Returns a blank draft row for the "add row" action.
    fn draft() -> Self;

    /// Checks required fields before the row is sent anywhere.
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Rejects blank values of a required text field.
pub fn require_field(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }

    Ok(())
}
