//! HTTP client for the backend REST API.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{Error, Result};
use super::options::{FetchOptions, QueryParams};
use crate::config::ApiConfig;

/// Message used when a failed response's body cannot be read at all.
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// HTTP client for the backend API.
///
/// Requests go to `base_url + endpoint`. The underlying client keeps a cookie
/// store, so session cookies set by the backend are sent on later calls.
///
/// # Example
///
/// ```rust,no_run
/// use frontend_kit::api::{ApiClient, QueryParams};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("http://localhost:3001/api")?;
///
/// let users: serde_json::Value = client
///     .get("/users", QueryParams::new().with("page", 2))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Prefix for every endpoint (e.g., "http://localhost:3001/api")
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(base_url, http))
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(config.base_url.clone())
    }

    /// Create a new client with a custom reqwest client.
    ///
    /// Cookie handling is whatever `http` was built with.
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `endpoint` with `params` appended as a query string.
    #[must_use]
    pub fn url(&self, endpoint: &str, params: &QueryParams) -> String {
        let mut url = format!("{}{endpoint}", self.base_url);
        let query = params.to_query_string();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// Perform one request and parse the JSON response as `T`.
    ///
    /// An empty success body is read as `{}`, falling back to `null` when
    /// `T` cannot hold an object, so `()` and `Option<_>` accept 204 responses.
    pub async fn api<T: DeserializeOwned>(&self, endpoint: &str, options: FetchOptions) -> Result<T> {
        let url = self.url(endpoint, &options.params);
        let FetchOptions {
            method,
            headers: caller_headers,
            body,
            timeout,
            ..
        } = options;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(caller_headers);

        debug!(name: "api.request", method = %method, url = %url, "Sending API request");

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.text().await {
                Ok(text) => error_message(&text).unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
                Err(_) => FALLBACK_ERROR_MESSAGE.to_string(),
            };
            warn!(
                name: "api.request.failed",
                method = %method,
                url = %url,
                status = status.as_u16(),
                message = %message,
                "API request failed"
            );
            return Err(Error::Request {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        debug!(name: "api.response", status = status.as_u16(), bytes = text.len(), "API response received");

        if text.is_empty() {
            return empty_body();
        }
        Ok(serde_json::from_str(&text)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Method helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// `GET endpoint` with `params` appended as a query string.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: QueryParams) -> Result<T> {
        self.api(endpoint, FetchOptions::new().method(Method::GET).params(params))
            .await
    }

    /// `POST endpoint`, serializing `data` as the JSON body when present.
    pub async fn post<T, B>(&self, endpoint: &str, data: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_body(Method::POST, endpoint, data).await
    }

    /// `PUT endpoint`, serializing `data` as the JSON body when present.
    pub async fn put<T, B>(&self, endpoint: &str, data: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_body(Method::PUT, endpoint, data).await
    }

    /// `PATCH endpoint`, serializing `data` as the JSON body when present.
    pub async fn patch<T, B>(&self, endpoint: &str, data: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_body(Method::PATCH, endpoint, data).await
    }

    /// `DELETE endpoint` without a body.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.api(endpoint, FetchOptions::new().method(Method::DELETE))
            .await
    }

    async fn send_with_body<T, B>(&self, method: Method, endpoint: &str, data: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut options = FetchOptions::new().method(method);
        if let Some(data) = data {
            options = options.json(data)?;
        }
        self.api(endpoint, options).await
    }
}

/// Value of an empty success body: `{}`, or `null` for types that reject
/// an object (`()`, `Option<_>`).
fn empty_body<T: DeserializeOwned>() -> Result<T> {
    let err = match serde_json::from_str("{}") {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    serde_json::from_value(serde_json::Value::Null).or(Err(Error::Json(err)))
}

/// Non-empty string `message` field of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")?
        .as_str()
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
