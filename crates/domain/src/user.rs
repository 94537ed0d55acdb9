//! Account validation rules applied before provisioning requests.

use gatehouse_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Minimum password length accepted by the identity provider.
pub const ACCOUNT_PASSWORD_MIN_LENGTH: usize = 6;

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, exactly one `@`,
    /// non-empty local part, and a domain containing at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Validates a password for a newly provisioned account.
pub fn validate_account_password(password: &str) -> AppResult<()> {
    if password.chars().count() < ACCOUNT_PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {ACCOUNT_PASSWORD_MIN_LENGTH} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{EmailAddress, validate_account_password};

    #[test]
    fn email_is_normalized_to_lowercase() {
        let email = EmailAddress::new("  Ops@Example.COM ");
        assert_eq!(
            email.map(String::from).unwrap_or_default(),
            "ops@example.com"
        );
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("ops@localhost").is_err());
        assert!(EmailAddress::new("a@b@c.com").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(validate_account_password("12345").is_err());
        assert!(validate_account_password("123456").is_ok());
    }
}
