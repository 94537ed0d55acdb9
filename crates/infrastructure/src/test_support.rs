use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_application::BearerTokenSource;
use gatehouse_core::AppResult;
use url::Url;
use wiremock::MockServer;

use crate::http_backend_client::HttpBackendClient;

pub(crate) struct FixedToken(pub(crate) Option<&'static str>);

#[async_trait]
impl BearerTokenSource for FixedToken {
    async fn bearer_token(&self) -> AppResult<Option<String>> {
        Ok(self.0.map(str::to_owned))
    }
}

pub(crate) fn client(server: &MockServer, token: Option<&'static str>) -> HttpBackendClient {
    let Ok(base_url) = Url::parse(&server.uri()) else {
        panic!("mock server uri should parse");
    };
    HttpBackendClient::new(reqwest::Client::new(), base_url, Arc::new(FixedToken(token)))
}

pub(crate) fn signed_in_client(server: &MockServer) -> HttpBackendClient {
    client(server, Some("token-1"))
}
