//! REST client for the Cloud Connector configuration API.
//!
//! Every call is a single request/response round trip authenticated with HTTP
//! basic auth. Cloud Connector instances usually run with a self-signed
//! certificate, so certificate verification is disabled. Responses are
//! classified uniformly: any 2xx is a success, anything else is decoded from
//! the `{type, message}` error body into [`ProviderError::Api`].

use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ProviderError;

/// Timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A raw successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Response body, possibly empty.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the response carried no body (e.g. 204 No Content).
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ProviderError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Error body returned by the Cloud Connector on failure.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Basic-auth client bound to one Cloud Connector instance.
#[derive(Clone)]
pub struct RestClient {
    base_url: Url,
    username: String,
    password: String,
    http: reqwest::Client,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RestClient {
    /// Create a client for the instance at `instance_url`
    /// (e.g. `https://scc.example.com:8443`).
    pub fn new(
        instance_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut base_url = Url::parse(instance_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ProviderError::Configuration(format!(
                "unsupported scheme '{}' in instance URL, expected http or https",
                base_url.scheme()
            )));
        }
        // Endpoints are joined relative to the instance URL, which needs a
        // trailing slash to keep any path prefix.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url,
            username: username.into(),
            password: password.into(),
            http,
        })
    }

    /// The normalized instance URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `endpoint`.
    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, ProviderError> {
        self.execute(Method::GET, endpoint, None).await
    }

    /// POST `body` to `endpoint`.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<ApiResponse, ProviderError> {
        self.execute(Method::POST, endpoint, Some(body)).await
    }

    /// PUT `body` to `endpoint`.
    pub async fn put(&self, endpoint: &str, body: &Value) -> Result<ApiResponse, ProviderError> {
        self.execute(Method::PUT, endpoint, Some(body)).await
    }

    /// DELETE `endpoint`.
    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, ProviderError> {
        self.execute(Method::DELETE, endpoint, None).await
    }

    fn url(&self, endpoint: &str) -> Result<Url, ProviderError> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ProviderError> {
        let url = self.url(endpoint)?;
        debug!(%method, %url, "Sending Cloud Connector request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!(%method, endpoint, status = status.as_u16(), "Cloud Connector responded");

        classify(status, body)
    }
}

/// Map a status code and body onto success or [`ProviderError::Api`].
fn classify(status: StatusCode, body: Vec<u8>) -> Result<ApiResponse, ProviderError> {
    if status.is_success() {
        return Ok(ApiResponse {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: Option<ErrorBody> = serde_json::from_slice(&body).ok();
    let (kind, message) = match parsed {
        Some(err) if !err.kind.is_empty() || !err.message.is_empty() => (err.kind, err.message),
        _ => {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text
            };
            (String::new(), message)
        },
    };

    warn!(status = status.as_u16(), kind = %kind, message = %message, "Cloud Connector request failed");
    Err(ProviderError::Api {
        status: status.as_u16(),
        kind,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> RestClient {
        RestClient::new(&server.base_url(), "admin", "secret").unwrap()
    }

    #[test]
    fn test_classify_success_codes() {
        for code in [200u16, 201, 204] {
            let status = StatusCode::from_u16(code).unwrap();
            let response = classify(status, Vec::new()).unwrap();
            assert_eq!(response.status, code);
            assert!(response.is_empty());
        }
    }

    #[test]
    fn test_classify_error_body() {
        let body = br#"{"type":"ILLEGAL_ARGUMENT","message":"Virtual port is invalid"}"#.to_vec();
        let err = classify(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            ProviderError::Api {
                status,
                kind,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(kind, "ILLEGAL_ARGUMENT");
                assert_eq!(message, "Virtual port is invalid");
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_classify_non_json_error_body() {
        let err = classify(StatusCode::INTERNAL_SERVER_ERROR, b"boom".to_vec()).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Api { status: 500, ref kind, ref message } if kind.is_empty() && message == "boom"
        ));

        let err = classify(StatusCode::NOT_FOUND, Vec::new()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "Not Found");
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(
            RestClient::new("not a url", "u", "p"),
            Err(ProviderError::Url(_))
        ));
        assert!(matches!(
            RestClient::new("ftp://scc.example.com", "u", "p"),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = RestClient::new("https://proxy.example.com/scc", "u", "p").unwrap();
        assert_eq!(client.base_url().as_str(), "https://proxy.example.com/scc/");
        let url = client.url("/api/v1/configuration/subaccounts").unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.example.com/scc/api/v1/configuration/subaccounts"
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let client = RestClient::new("https://scc.example.com:8443", "admin", "hunter2").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_get_sends_basic_auth() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/configuration/subaccounts")
                    // admin:secret
                    .header("authorization", "Basic YWRtaW46c2VjcmV0")
                    .header("accept", "application/json");
                then.status(200).json_body(json!([]));
            })
            .await;

        let response = client(&server)
            .get("/api/v1/configuration/subaccounts")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(response.status, 200);
        let list: Vec<Value> = response.json().unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/configuration/subaccounts")
                    .header("content-type", "application/json")
                    .json_body(json!({"regionHost": "cf.eu10.hana.ondemand.com"}));
                then.status(201);
            })
            .await;

        let response = client(&server)
            .post(
                "/api/v1/configuration/subaccounts",
                &json!({"regionHost": "cf.eu10.hana.ondemand.com"}),
            )
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_delete_no_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/configuration/subaccounts/r/s");
                then.status(204);
            })
            .await;

        let response = client(&server)
            .delete("/api/v1/configuration/subaccounts/r/s")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_status_to_outcome_mapping() {
        let server = MockServer::start_async().await;
        for (code, kind) in [
            (400u16, "INVALID_REQUEST"),
            (401, "UNAUTHORIZED"),
            (404, "NOT_FOUND"),
            (409, "CONFLICT"),
            (500, "INTERNAL_ERROR"),
        ] {
            let path = format!("/status/{}", code);
            server
                .mock_async(|when, then| {
                    when.method(PUT).path(path.as_str());
                    then.status(code)
                        .json_body(json!({"type": kind, "message": format!("failed with {}", code)}));
                })
                .await;

            let err = client(&server).put(&path, &json!({})).await.unwrap_err();
            match err {
                ProviderError::Api {
                    status,
                    kind: got_kind,
                    message,
                } => {
                    assert_eq!(status, code);
                    assert_eq!(got_kind, kind);
                    assert_eq!(message, format!("failed with {}", code));
                },
                other => panic!("unexpected error for {}: {:?}", code, other),
            }
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        // Nothing listens on port 9 (discard) in the test environment.
        let client = RestClient::new("http://127.0.0.1:9", "u", "p").unwrap();
        let err = client.get("/api/v1/configuration/subaccounts").await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
    }
}
