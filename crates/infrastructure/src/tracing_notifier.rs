use gatehouse_application::{Notification, NotificationLevel, Notifier};

/// Notifier that writes operator notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let description = notification.description.as_deref().unwrap_or_default();
        match notification.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(description, "{}", notification.message);
            }
            NotificationLevel::Warning => {
                tracing::warn!(description, "{}", notification.message);
            }
            NotificationLevel::Error => {
                tracing::error!(description, "{}", notification.message);
            }
        }
    }
}
