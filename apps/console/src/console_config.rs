use std::env;

use gatehouse_core::{AppError, UserIdentity};
use gatehouse_infrastructure::{DEMO_ADMIN_EMAIL, DEMO_ADMIN_SUBJECT, StaticCredentials};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Where backend calls go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Seeded in-process backend.
    Memory,
    /// Remote REST backend.
    Http { api_base_url: Url },
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub backend: BackendConfig,
    pub credentials: Option<StaticCredentials>,
}

impl ConsoleConfig {
    pub fn load() -> Result<Self, AppError> {
        let backend = match env::var("CONSOLE_BACKEND")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => BackendConfig::Memory,
            "http" => {
                let raw = required_non_empty_env("CONSOLE_API_BASE_URL")?;
                let api_base_url = Url::parse(&raw).map_err(|error| {
                    AppError::Validation(format!("invalid CONSOLE_API_BASE_URL '{raw}': {error}"))
                })?;
                BackendConfig::Http { api_base_url }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "CONSOLE_BACKEND must be either 'memory' or 'http', got '{other}'"
                )));
            }
        };

        let credentials = match &backend {
            BackendConfig::Memory => Some(credentials_from_env(
                optional_env("CONSOLE_ID_TOKEN").unwrap_or_else(|| "memory-token".to_owned()),
                DEMO_ADMIN_SUBJECT,
                Some(DEMO_ADMIN_EMAIL),
            )),
            BackendConfig::Http { .. } => optional_env("CONSOLE_ID_TOKEN")
                .map(|token| {
                    let subject = required_non_empty_env("CONSOLE_SUBJECT")?;
                    Ok::<_, AppError>(credentials_from_env(token, &subject, None))
                })
                .transpose()?,
        };

        Ok(Self {
            backend,
            credentials,
        })
    }
}

fn credentials_from_env(
    id_token: String,
    default_subject: &str,
    default_email: Option<&str>,
) -> StaticCredentials {
    let subject = optional_env("CONSOLE_SUBJECT").unwrap_or_else(|| default_subject.to_owned());
    let display_name = optional_env("CONSOLE_DISPLAY_NAME").unwrap_or_else(|| subject.clone());
    let email = optional_env("CONSOLE_EMAIL").or_else(|| default_email.map(str::to_owned));

    let mut identity = UserIdentity::new(subject, display_name, email);
    if let Some(avatar_url) = optional_env("CONSOLE_AVATAR_URL") {
        identity = identity.with_avatar_url(avatar_url);
    }

    StaticCredentials { identity, id_token }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    optional_env(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}
