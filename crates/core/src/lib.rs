//! Shared primitives for all Rust crates in Gatehouse.

#![forbid(unsafe_code)]

/// Authentication primitives shared across the console.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;

/// Result type used across Gatehouse crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Severity marker attached to backend-reported failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Soft failure the operator can usually correct.
    Warning,
    /// Hard failure.
    Error,
}

impl Severity {
    /// Parses the optional `type` marker of a backend error body.
    #[must_use]
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some(value) if value.eq_ignore_ascii_case("warning") => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// Failure reported by the backend with an error status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    /// HTTP status code of the response.
    pub status: u16,
    /// Human-readable message from the response body.
    pub message: String,
    /// Warning or hard error.
    pub severity: Severity,
}

impl Display for BackendFailure {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "status {}: {}", self.status, self.message)
    }
}

/// Common application error categories.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Invalid input or violated invariant, rejected before any request.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated or the credential is missing or expired.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No response was received from the backend.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with an error status.
    #[error("backend error {0}")]
    Backend(BackendFailure),

    /// The operator dismissed an interactive flow.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the severity the operator should see for this error.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Backend(failure) => failure.severity,
            Self::Validation(_) | Self::Cancelled(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, BackendFailure, NonEmptyString, Severity};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn severity_marker_is_case_insensitive() {
        assert_eq!(Severity::from_marker(Some("Warning")), Severity::Warning);
        assert_eq!(Severity::from_marker(Some("fatal")), Severity::Error);
        assert_eq!(Severity::from_marker(None), Severity::Error);
    }

    #[test]
    fn backend_error_keeps_reported_severity() {
        let error = AppError::Backend(BackendFailure {
            status: 500,
            message: "Please choose an email first!".to_owned(),
            severity: Severity::Warning,
        });

        assert_eq!(error.severity(), Severity::Warning);
        assert_eq!(
            error.to_string(),
            "backend error status 500: Please choose an email first!"
        );
    }
}
