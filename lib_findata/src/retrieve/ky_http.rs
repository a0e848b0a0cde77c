//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous API client wrapper around `reqwest`.
//! Requests carry a browser-like header set, since quote pages and some
//! market APIs reject the default client signature. Each call is a single
//! attempt; non-2xx responses are captured rather than raised by `request`
//! and turned into `FetchError::HttpStatus` by the typed helpers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

/// Desktop Chrome user agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36";

/// Failures of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The base URL or a joined path could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connection, TLS, timeout or body read failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP request failed for {url}: Status {status}")]
    HttpStatus {
        /// Requested URL, without its query string.
        url: String,
        /// Numeric HTTP status code.
        status: u16,
        /// Raw error body, when one could be read.
        body: Option<String>,
    },

    /// A 2xx body that does not match the expected shape.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode {
        /// Requested URL, without its query string.
        url: String,
        /// Decoder message.
        reason: String,
    },
}

/// A standardized container for API responses.
///
/// Wraps the raw body along with metadata about the HTTP transaction.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The response body when the status was 2xx.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
    /// Requested URL without its query string (query strings may hold keys).
    pub url: String,
}

/// Construction options for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Value of the `user-agent` header.
    pub user_agent: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

/// A GET-oriented asynchronous HTTP client bound to a base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying client, carrying the browser header set as defaults.
    inner: reqwest::Client,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    /// * `base_url` - Absolute base URL (e.g. "https://api.stlouisfed.org/").
    ///   A trailing slash is added when missing so relative paths append.
    /// * `options` - User agent and timeout.
    ///
    /// # Errors
    /// `FetchError::InvalidUrl` for a malformed base URL and
    /// `FetchError::Transport` if the TLS backend cannot be initialized.
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, FetchError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let url = Url::parse(&base)?;

        let mut builder = reqwest::Client::builder().default_headers(browser_headers(&options.user_agent));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
            base_url: url,
        })
    }

    /// The base URL relative paths are joined to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a request and captures the body as text.
    ///
    /// `path` may be relative to the base URL or absolute; absolute URLs
    /// replace the base entirely. Non-2xx statuses are returned as
    /// `success: false` with the error body, not as an `Err`.
    ///
    /// # Errors
    /// `FetchError::InvalidUrl` if joining fails and `FetchError::Transport`
    /// if the exchange itself fails.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse<String>, FetchError> {
        let full_url = self.base_url.join(path)?;
        let display_url = strip_query(&full_url);

        let mut req = self.inner.request(method, full_url);
        if !query.is_empty() {
            req = req.query(query);
        }

        let response: reqwest::Response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        debug!(url = %display_url, status = status.as_u16(), bytes = body.len(), "HTTP exchange completed");

        if status.is_success() {
            Ok(ApiResponse {
                data: Some(body),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers,
                url: display_url,
            })
        } else {
            Ok(ApiResponse {
                data: None,
                error_body: Some(body).filter(|b| !b.is_empty()),
                status: status.as_u16(),
                success: false,
                headers,
                url: display_url,
            })
        }
    }

    /// GETs `path` and returns the body, failing on any non-2xx status.
    pub async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let response = self.request(Method::GET, path, query).await?;
        if response.success {
            return Ok(response.data.unwrap_or_default());
        }

        error!(url = %response.url, status = response.status, "HTTP request failed");
        Err(FetchError::HttpStatus {
            url: response.url,
            status: response.status,
            body: response.error_body,
        })
    }

    /// GETs `path` and deserializes the JSON body into `T`.
    pub async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let full_url = strip_query(&self.base_url.join(path)?);
        let body = self.get_text(path, query).await?;
        decode_json(&full_url, &body)
    }
}

/// Deserializes `body` as JSON, attributing failures to `url`.
pub fn decode_json<T>(url: &str, body: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned,
{
    serde_json::from_str::<T>(body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Builds the browser-mimic header set.
pub fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let header_list = [
        ("accept", "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8"),
        ("accept-language", "en-US,en;q=0.9"),
        ("cache-control", "no-cache"),
        ("pragma", "no-cache"),
        ("dnt", "1"),
        ("user-agent", user_agent),
    ];

    for (name, value) in header_list {
        if let (Ok(h_name), Ok(h_value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            headers.insert(h_name, h_value);
        }
    }

    headers
}

fn strip_query(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::mock_server::{MockResponse, MockServer};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Echo {
        ok: bool,
    }

    #[test]
    fn test_browser_headers_carry_user_agent() {
        let headers = browser_headers("findata-test/1.0");
        assert_eq!(headers.get("user-agent").unwrap(), "findata-test/1.0");
        assert!(headers.contains_key("accept"));
    }

    #[test]
    fn test_new_appends_trailing_slash() {
        let client = ApiClient::new("http://127.0.0.1:9/api", ClientOptions::default()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:9/api/");
    }

    #[test]
    fn test_new_rejects_relative_base() {
        let err = ApiClient::new("not a url", ClientOptions::default()).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_get_json_success_and_headers_sent() {
        let server = MockServer::start(|req| {
            if req.path == "/api/echo" && req.header("user-agent") == Some("findata-test/1.0") {
                MockResponse::json(200, r#"{"ok": true}"#)
            } else {
                MockResponse::json(400, r#"{"ok": false}"#)
            }
        });
        let options = ClientOptions {
            user_agent: "findata-test/1.0".to_string(),
            timeout: None,
        };
        let client = ApiClient::new(&server.url("api/"), options).unwrap();

        let echo: Echo = client.get_json("echo", &[]).await.unwrap();
        assert!(echo.ok);
    }

    #[tokio::test]
    async fn test_request_is_non_throwing_on_404() {
        let server = MockServer::start(|_| MockResponse::text(404, "missing"));
        let client = ApiClient::new(&server.url(""), ClientOptions::default()).unwrap();

        let res = client.request(Method::GET, "status/404", &[]).await.unwrap();
        assert!(!res.success);
        assert_eq!(res.status, 404);
        assert_eq!(res.error_body.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn test_get_text_maps_status_and_hides_query() {
        let server = MockServer::start(|_| MockResponse::text(500, "boom"));
        let client = ApiClient::new(&server.url(""), ClientOptions::default()).unwrap();

        let err = client.get_text("series", &[("api_key", "secret")]).await.unwrap_err();
        match err {
            FetchError::HttpStatus { url, status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.as_deref(), Some("boom"));
                assert!(!url.contains("secret"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_json_decode_error() {
        let server = MockServer::start(|_| MockResponse::text(200, "<html>not json</html>"));
        let client = ApiClient::new(&server.url(""), ClientOptions::default()).unwrap();

        let err = client.get_json::<Echo>("echo", &[]).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_query_parameters_are_sent() {
        let server = MockServer::start(|req| {
            if req.query_param("series_id").as_deref() == Some("SOFR") {
                MockResponse::text(200, "found")
            } else {
                MockResponse::text(404, "")
            }
        });
        let client = ApiClient::new(&server.url(""), ClientOptions::default()).unwrap();

        let body = client.get_text("obs", &[("series_id", "SOFR")]).await.unwrap();
        assert_eq!(body, "found");
    }

    #[tokio::test]
    async fn test_transport_error_when_nothing_listens() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ApiClient::new(&format!("http://127.0.0.1:{}/", port), ClientOptions::default()).unwrap();

        let err = client.get_text("anything", &[]).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
