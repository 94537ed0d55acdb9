use async_trait::async_trait;
use gatehouse_application::GrantSource;
use gatehouse_core::{AppResult, UserIdentity};
use gatehouse_domain::Grant;
use reqwest::Method;

use crate::http_backend_client::HttpBackendClient;

const PERMISSIONS_PATH: &str = "/api/casbin/permissions";

/// Grant source backed by the permission-evaluation endpoint.
#[derive(Clone)]
pub struct HttpGrantSource {
    client: HttpBackendClient,
}

impl HttpGrantSource {
    /// Creates a grant source over a backend client.
    #[must_use]
    pub fn new(client: HttpBackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GrantSource for HttpGrantSource {
    async fn fetch_grants(&self, identity: &UserIdentity) -> AppResult<Vec<Grant>> {
        let url = self.client.endpoint(PERMISSIONS_PATH)?;
        let rows: Option<Vec<Vec<String>>> =
            self.client.fetch_json(Method::POST, url, None).await?;
        let rows = rows.unwrap_or_default();

        let grants: Vec<Grant> = rows
            .iter()
            .filter_map(|row| Grant::from_policy_row(row))
            .collect();
        if grants.len() != rows.len() {
            tracing::debug!(
                subject = %identity.subject(),
                skipped = rows.len() - grants.len(),
                "skipped policy rows without object and action"
            );
        }

        Ok(grants)
    }
}
