use std::sync::Arc;

use gatehouse_application::BearerTokenSource;
use gatehouse_core::{AppError, AppResult, BackendFailure, Severity};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Error body returned by the backend on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Authenticated JSON client for the administration backend.
///
/// A bearer token is pulled from the identity provider for every request.
#[derive(Clone)]
pub struct HttpBackendClient {
    http_client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn BearerTokenSource>,
}

impl HttpBackendClient {
    /// Creates a backend client rooted at `base_url`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        tokens: Arc<dyn BearerTokenSource>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            tokens,
        }
    }

    /// Resolves an API path such as `/api/employees/` against the base URL.
    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|error| {
            AppError::Internal(format!("invalid backend url '{joined}': {error}"))
        })
    }

    /// Resolves an API path with one trailing identifier segment.
    pub fn endpoint_with_id(&self, path: &str, id: &str) -> AppResult<Url> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!("backend url '{path}' cannot have segments"))
            })?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Resolves an API path with an optional `keyword` query parameter.
    pub fn endpoint_with_keyword(&self, path: &str, keyword: Option<&str>) -> AppResult<Url> {
        let mut url = self.endpoint(path)?;
        if let Some(keyword) = keyword {
            url.query_pairs_mut().append_pair("keyword", keyword);
        }
        Ok(url)
    }

    /// Fetches a JSON list; a `null` body reads as an empty list.
    pub async fn get_list<T: DeserializeOwned>(&self, url: Url) -> AppResult<Vec<T>> {
        let items: Option<Vec<T>> = self.fetch_json(Method::GET, url, None).await?;
        Ok(items.unwrap_or_default())
    }

    /// Sends a request and decodes the JSON response body.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> AppResult<T> {
        let path = url.path().to_owned();
        let response = self.execute(method, url, body).await?;
        response.json::<T>().await.map_err(|error| {
            AppError::Internal(format!("invalid response body from '{path}': {error}"))
        })
    }

    /// Sends a request and ignores the response body.
    pub async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> AppResult<()> {
        self.execute(method, url, body).await.map(|_| ())
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> AppResult<reqwest::Response> {
        let Some(token) = self.tokens.bearer_token().await? else {
            return Err(AppError::Unauthorized(
                "no bearer token available; sign in first".to_owned(),
            ));
        };

        tracing::debug!(method = %method, path = url.path(), "backend request");
        let mut request = self.http_client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|error| AppError::Transport(error.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }
}

fn error_from_response(status: StatusCode, body: &str) -> AppError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    let marker = parsed.as_ref().and_then(|parsed| parsed.kind.as_deref());
    let message = parsed
        .as_ref()
        .and_then(|parsed| parsed.message.clone())
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected backend response")
                .to_owned()
        });

    tracing::warn!(status = status.as_u16(), message = %message, "backend request failed");

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        _ => AppError::Backend(BackendFailure {
            status: status.as_u16(),
            message,
            severity: Severity::from_marker(marker),
        }),
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::{AppError, Severity};
    use reqwest::StatusCode;

    use super::error_from_response;

    #[test]
    fn warning_marker_maps_to_warning_severity() {
        let error = error_from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"user already linked","type":"warning"}"#,
        );
        assert!(matches!(
            error,
            AppError::Backend(ref failure)
                if failure.severity == Severity::Warning && failure.message == "user already linked"
        ));
    }

    #[test]
    fn malformed_body_falls_back_to_status_text() {
        let error = error_from_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(
            error,
            AppError::Backend(ref failure)
                if failure.status == 500
                    && failure.severity == Severity::Error
                    && failure.message == "Internal Server Error"
        ));
    }

    #[test]
    fn unauthorized_status_is_an_authorization_failure() {
        let error =
            error_from_response(StatusCode::UNAUTHORIZED, r#"{"message":"token expired"}"#);
        assert!(matches!(
            error,
            AppError::Unauthorized(ref message) if message == "token expired"
        ));
    }
}
