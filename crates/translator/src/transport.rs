use std::fmt;
use std::time::Duration;

use log::error;
use serde_json::Value;

use crate::error::TranslationError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// A single JSON request, fully described before it is sent
#[derive(Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub query: Vec<(&'static str, String)>,
    pub body: Value,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(url: String, body: Value, timeout: Duration) -> Self {
        Self {
            url,
            headers: Vec::new(),
            query: Vec::new(),
            body,
            timeout,
        }
    }

    /// Request without a body, for GET endpoints
    pub fn get(url: String, timeout: Duration) -> Self {
        Self::new(url, Value::Null, timeout)
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    /// Value of the first header with the given name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of the first query parameter with the given name
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

// Header and query values carry credentials, only their names are printed.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<&str> = self.headers.iter().map(|(name, _)| *name).collect();
        let query: Vec<&str> = self.query.iter().map(|(name, _)| *name).collect();
        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("query", &query)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP capability shared by every provider client.
///
/// Implementations must be safe to call from many threads at once.
pub trait HttpTransport: Send + Sync {
    /// Send `request` as a JSON POST and return the raw status and body.
    ///
    /// Only failures to complete the exchange are errors here; a non-2xx
    /// status is a normal response.
    fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TranslationError>;

    /// Send `request` as a GET, ignoring its body. Same error contract as
    /// [`HttpTransport::post_json`].
    fn get_json(&self, request: &HttpRequest) -> Result<HttpResponse, TranslationError>;
}

/// `reqwest` blocking client, built once and reused for connection pooling.
///
/// Must not be created or dropped from inside an async runtime.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TranslationError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!("Failed to create HTTP client: {}", e);
                TranslationError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl ReqwestTransport {
    fn execute(
        &self,
        builder: reqwest::blocking::RequestBuilder,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TranslationError> {
        let mut builder = builder.timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .send()
            .map_err(|e| map_request_error(e, request.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| map_request_error(e, request.timeout))?;

        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TranslationError> {
        let builder = self.client.post(&request.url).json(&request.body);
        self.execute(builder, request)
    }

    fn get_json(&self, request: &HttpRequest) -> Result<HttpResponse, TranslationError> {
        let builder = self
            .client
            .get(&request.url)
            .header(reqwest::header::ACCEPT, "application/json");
        self.execute(builder, request)
    }
}

fn map_request_error(err: reqwest::Error, timeout: Duration) -> TranslationError {
    if err.is_timeout() {
        error!("Request timed out after {:?}", timeout);
        return TranslationError::Timeout {
            seconds: timeout.as_secs(),
        };
    }

    // reqwest includes the full URL in its message, which may hold a key
    let err = err.without_url();
    error!("API request error: {}", err);
    TranslationError::Transport(err.to_string())
}
