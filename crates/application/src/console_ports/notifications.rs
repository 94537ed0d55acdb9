use gatehouse_core::{AppError, Severity};

/// Level of an operator-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// Mutation succeeded.
    Success,
    /// Informational progress message.
    Info,
    /// Soft failure.
    Warning,
    /// Hard failure.
    Error,
}

/// Operator-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification level.
    pub level: NotificationLevel,
    /// Short headline.
    pub message: String,
    /// Optional detail text.
    pub description: Option<String>,
}

impl Notification {
    /// Creates a success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            description: None,
        }
    }

    /// Creates an informational notification.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
            description: None,
        }
    }

    /// Converts a failed operation into a notification.
    #[must_use]
    pub fn from_error(error: &AppError) -> Self {
        let level = match error.severity() {
            Severity::Warning => NotificationLevel::Warning,
            Severity::Error => NotificationLevel::Error,
        };

        let (message, description) = match error {
            AppError::Transport(detail) => ("Connection error".to_owned(), Some(detail.clone())),
            AppError::Backend(failure) => match failure.severity {
                Severity::Warning => ("Warning!".to_owned(), Some(failure.message.clone())),
                Severity::Error => (
                    format!("Error {}", failure.status),
                    Some(failure.message.clone()),
                ),
            },
            AppError::Validation(detail) => ("Invalid input".to_owned(), Some(detail.clone())),
            AppError::Cancelled(detail) => ("Cancelled".to_owned(), Some(detail.clone())),
            AppError::Unauthorized(detail) => ("Not signed in".to_owned(), Some(detail.clone())),
            AppError::Forbidden(detail) => ("Forbidden".to_owned(), Some(detail.clone())),
            AppError::NotFound(detail) => ("Not found".to_owned(), Some(detail.clone())),
            AppError::Conflict(detail) => ("Conflict".to_owned(), Some(detail.clone())),
            AppError::Internal(detail) => ("Error".to_owned(), Some(detail.clone())),
        };

        Self {
            level,
            message,
            description,
        }
    }
}

/// Port for surfacing notifications to the operator.
pub trait Notifier: Send + Sync {
    /// Publishes one notification.
    fn notify(&self, notification: Notification);
}
