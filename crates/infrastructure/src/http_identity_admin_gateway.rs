use async_trait::async_trait;
use gatehouse_application::{IdentityAdminGateway, NewUserAccount};
use gatehouse_core::AppResult;
use reqwest::Method;
use serde_json::json;

use crate::http_backend_client::HttpBackendClient;

const ACCOUNTS_PATH: &str = "/api/firebase/";
const SYNC_PATH: &str = "/api/users/sync";

/// Identity-provider account administration over HTTP.
#[derive(Clone)]
pub struct HttpIdentityAdminGateway {
    client: HttpBackendClient,
}

impl HttpIdentityAdminGateway {
    /// Creates an identity admin gateway.
    #[must_use]
    pub fn new(client: HttpBackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityAdminGateway for HttpIdentityAdminGateway {
    async fn provision_account(&self, account: &NewUserAccount) -> AppResult<()> {
        let url = self.client.endpoint(ACCOUNTS_PATH)?;
        let body = json!({
            "email": account.email.as_str(),
            "password": account.password,
        });
        self.client.send(Method::POST, url, Some(&body)).await
    }

    async fn sync_identities(&self) -> AppResult<()> {
        let url = self.client.endpoint(SYNC_PATH)?;
        self.client.send(Method::GET, url, None).await
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_application::{IdentityAdminGateway, NewUserAccount};
    use gatehouse_core::AppError;
    use gatehouse_domain::EmailAddress;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::test_support::signed_in_client;

    use super::HttpIdentityAdminGateway;

    #[tokio::test]
    async fn provision_posts_email_and_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/firebase/"))
            .and(body_json(json!({"email": "ada@example.com", "password": "s3cret-pass"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = HttpIdentityAdminGateway::new(signed_in_client(&server));
        let Ok(email) = EmailAddress::new("Ada@Example.com") else {
            panic!("email should be valid");
        };
        let account = NewUserAccount {
            email,
            password: "s3cret-pass".to_owned(),
        };

        assert!(gateway.provision_account(&account).await.is_ok());
    }

    #[tokio::test]
    async fn sync_failure_surfaces_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/sync"))
            .respond_with(
                ResponseTemplate::new(502).set_body_json(json!({"message": "provider down"})),
            )
            .mount(&server)
            .await;

        let gateway = HttpIdentityAdminGateway::new(signed_in_client(&server));

        assert!(matches!(
            gateway.sync_identities().await,
            Err(AppError::Backend(ref failure)) if failure.status == 502
        ));
    }
}
