use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReqParam {
    pub key: String,
    pub value: String,
}

impl ReqParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        ReqParam {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReqBody {
    pub value: Option<Value>,
}

impl ReqBody {
    pub fn empty() -> Self {
        ReqBody { value: None }
    }

    pub fn new(value: Value) -> Self {
        Self { value: Some(value) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    POST,
    GET,
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::POST => write!(f, "POST"),
            HttpMethod::GET => write!(f, "GET"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<ReqParam>,
}

impl Endpoint {
    pub fn new(method: HttpMethod, url: String, headers: Vec<ReqParam>) -> Endpoint {
        Endpoint {
            method,
            url,
            headers,
        }
    }
}

/// One outbound call. The bearer token is kept apart from the declared
/// headers so request snapshots can be captured without it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub endpoint: Endpoint,
    pub req_body: ReqBody,
    pub content_type: String,
    pub bearer_token: Option<String>,
}

impl HttpRequest {
    pub fn new(
        endpoint: Endpoint,
        req_body: ReqBody,
        content_type: String,
        bearer_token: Option<String>,
    ) -> HttpRequest {
        HttpRequest {
            endpoint,
            req_body,
            content_type,
            bearer_token,
        }
    }
}

/// Status and raw body of a completed exchange, whatever the status class.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResult {
    pub status_code: u16,
    pub body: String,
}

impl HttpResult {
    pub fn new(status_code: u16, body: String) -> Self {
        Self { status_code, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HttpError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("http request failed: {0}")]
    Io(String),
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| HttpError::Io(err.to_string()))?;
        Ok(Self { client })
    }

    /// Sends the request once. Any response, successful or not, comes back as
    /// an `HttpResult`; only failures to get a response at all are errors.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResult, HttpError> {
        info!("will execute http request!");
        let req = self.build_reqwest(request)?;
        let response = req.send().await.map_err(|error| {
            info!("http request failed: {}", error);
            HttpError::Io(error.to_string())
        })?;
        let status_code = response.status();
        info!("http request executed, status_code: {}", status_code);
        let body = response
            .text()
            .await
            .map_err(|error| HttpError::Io(error.to_string()))?;
        Ok(HttpResult::new(status_code.as_u16(), body))
    }

    fn build_reqwest(&self, request: HttpRequest) -> Result<RequestBuilder, HttpError> {
        let endpoint = request.endpoint;
        let content_type = request.content_type;
        info!("url: {}", endpoint.url);
        info!("content type: {}", content_type);
        info!("method: {}", endpoint.method);
        let url = Url::parse(&endpoint.url).map_err(|err| HttpError::InvalidUrl {
            url: endpoint.url.clone(),
            reason: err.to_string(),
        })?;
        let library_method = match endpoint.method {
            HttpMethod::POST => Method::POST,
            HttpMethod::GET => Method::GET,
        };

        let mut headers = HeaderMap::new();
        for header in &endpoint.headers {
            let name = HeaderName::from_bytes(header.key.as_bytes())
                .map_err(|_| HttpError::InvalidHeader(header.key.clone()))?;
            let value = HeaderValue::from_str(&header.value)
                .map_err(|_| HttpError::InvalidHeader(header.key.clone()))?;
            headers.insert(name, value);
        }
        if let Some(token) = &request.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| HttpError::InvalidHeader(AUTHORIZATION.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        // The body is always the JSON document; the declared content type is
        // passed through as the header.
        let body = match &request.req_body.value {
            Some(body) => {
                let value = HeaderValue::from_str(&content_type)
                    .map_err(|_| HttpError::InvalidHeader(CONTENT_TYPE.to_string()))?;
                headers.insert(CONTENT_TYPE, value);
                Some(body.to_string())
            }
            None => None,
        };

        let mut req = self.client.request(library_method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }
        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ApiClient {
        ApiClient::new(Duration::from_secs(5)).expect("client should build")
    }

    #[tokio::test]
    async fn test_execute_sends_bearer_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("authorization", "Bearer sk-1"))
            .and(body_json(json!({"a": 1})))
            .respond_with(ResponseTemplate::new(201).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::new(
            Endpoint::new(HttpMethod::POST, format!("{}/echo", server.uri()), vec![]),
            ReqBody::new(json!({"a": 1})),
            "application/json".to_string(),
            Some("sk-1".to_string()),
        );
        let result = client().execute(request).await.expect("should get a response");

        assert_eq!(result.status_code, 201);
        assert!(result.is_success());
        assert_eq!(result.body, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_execute_returns_error_statuses_as_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let request = HttpRequest::new(
            Endpoint::new(HttpMethod::GET, server.uri(), vec![]),
            ReqBody::empty(),
            "application/json".to_string(),
            None,
        );
        let result = client().execute(request).await.expect("should get a response");

        assert_eq!(result, HttpResult::new(503, "down".to_string()));
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_execute_rejects_unparsable_url() {
        let request = HttpRequest::new(
            Endpoint::new(HttpMethod::GET, "not a url".to_string(), vec![]),
            ReqBody::empty(),
            "application/json".to_string(),
            None,
        );
        let result = client().execute(request).await;

        assert!(matches!(result, Err(HttpError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_header_name() {
        let request = HttpRequest::new(
            Endpoint::new(
                HttpMethod::GET,
                "http://localhost:1".to_string(),
                vec![ReqParam::new("bad header", "x")],
            ),
            ReqBody::empty(),
            "application/json".to_string(),
            None,
        );
        let result = client().execute(request).await;

        assert_eq!(result, Err(HttpError::InvalidHeader("bad header".to_string())));
    }

    async fn post_with_content_type(content_type: &str) {
        let server = MockServer::start().await;
        let document = json!({"model": "gpt-4", "messages": [{"role": "user", "content": "hi"}]});
        Mock::given(method("POST"))
            .and(header("content-type", content_type))
            .and(body_json(document.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::new(
            Endpoint::new(
                HttpMethod::POST,
                server.uri(),
                vec![ReqParam::new("Content-Type", content_type)],
            ),
            ReqBody::new(document),
            content_type.to_string(),
            Some("sk-1".to_string()),
        );
        let result = client().execute(request).await.expect("should get a response");

        assert_eq!(result.status_code, 200, "{} was not delivered", content_type);
    }

    #[tokio::test]
    async fn test_execute_sends_json_document_under_form_content_type() {
        post_with_content_type("application/x-www-form-urlencoded").await;
    }

    #[tokio::test]
    async fn test_execute_sends_json_document_under_text_content_type() {
        post_with_content_type("text/plain").await;
    }

    #[tokio::test]
    async fn test_execute_defaults_to_json_content_type() {
        post_with_content_type("application/json").await;
    }
}
