use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tokio::time::sleep;

use crate::{
    cancel::CancelHandle, BridgeError, ClientOptions, Method, Reason, Request, Response, Result,
};

/// Resolves a possibly-relative URL against a configured host.
///
/// Absolute URLs pass through untouched; relative paths are joined onto the
/// host with exactly one separating slash. Without a host, the URL is
/// returned as-is.
pub fn resolve_url(host: Option<&str>, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_owned();
    }
    match host {
        Some(host) => format!(
            "{}/{}",
            host.trim_end_matches('/'),
            url.trim_start_matches('/')
        ),
        None => url.to_owned(),
    }
}

#[derive(Clone)]
/// Async HTTP client producing [`Response`]s or [`BridgeError`] failure
/// records.
pub struct BridgeClient {
    http: reqwest::Client,
    options: ClientOptions,
}

impl fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Authorization values in default headers must not leak into logs.
        let headers: Vec<(&str, &str)> = self
            .options
            .default_headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("BridgeClient")
            .field("host", &self.options.host)
            .field("default_headers", &headers)
            .field("timeout_ms", &self.options.timeout_ms)
            .field("max_retries", &self.options.max_retries)
            .finish()
    }
}

impl Default for BridgeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeClient {
    /// Creates a client with default options.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            options: ClientOptions::default(),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Sets a host prefix applied to relative request URLs.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bridge_http::BridgeClient;
    ///
    /// let client = BridgeClient::new().with_host("https://api.example.com");
    /// ```
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.options.host = Some(host.into());
        self
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.options
            .default_headers
            .push((name.into(), value.into()));
        self
    }

    /// Sends a GET request to `url`.
    pub async fn get(&self, url: impl Into<String>) -> Result<Response> {
        self.send(Request::get(url)).await
    }

    /// Sends a POST request with a JSON body to `url`.
    pub async fn post_json<T: Serialize>(
        &self,
        url: impl Into<String>,
        body: &T,
    ) -> Result<Response> {
        let request = Request::post(url).json_body(body)?;
        self.send(request).await
    }

    /// Executes a request, retrying retryable failures per the options.
    ///
    /// Terminal failures come back as failure records: transport errors as
    /// [`Reason::RequestFailed`], body-read errors as [`Reason::ResponseIo`],
    /// and non-2xx statuses as [`Reason::ResponseUnsuccessful`] with the
    /// full response attached.
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.send_cancellable(request, &CancelHandle::new()).await
    }

    /// Executes a request that can be cancelled from another task.
    ///
    /// Cancellation aborts the in-flight call and yields a
    /// [`Reason::RequestCancelled`] record carrying the request.
    pub async fn send_cancellable(
        &self,
        request: Request,
        cancel: &CancelHandle,
    ) -> Result<Response> {
        if cancel.is_cancelled() {
            return Err(BridgeError::cancelled(request));
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(BridgeError::cancelled(request.clone())),
            result = self.send_with_retry(&request) => result,
        }
    }

    async fn send_with_retry(&self, request: &Request) -> Result<Response> {
        let mut attempt = 0usize;
        loop {
            match self.dispatch(request).await {
                Ok(raw) => {
                    let status = raw.status();
                    let url = raw.url().to_string();
                    let headers = collect_headers(&raw);
                    let body = match raw.text().await {
                        Ok(body) => body,
                        Err(err) => {
                            return Err(BridgeError::response_invalid(
                                None,
                                format!("failed to read body of {url}: {err}"),
                                Reason::ResponseIo,
                            ))
                        }
                    };

                    if !status.is_success() {
                        if self.should_retry_status(status) && attempt < self.options.max_retries {
                            self.wait_before_retry(attempt).await;
                            attempt += 1;
                            continue;
                        }

                        let response = Response::new(url, status.as_u16(), headers, body);
                        let message = response.to_string();
                        return Err(BridgeError::response_invalid(
                            Some(response),
                            message,
                            Reason::ResponseUnsuccessful,
                        ));
                    }

                    return Ok(Response::new(url, status.as_u16(), headers, body));
                }
                Err(err) => {
                    if self.should_retry_transport(&err) && attempt < self.options.max_retries {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(BridgeError::request_failed(request.clone(), err));
                }
            }
        }
    }

    async fn dispatch(&self, request: &Request) -> reqwest::Result<reqwest::Response> {
        let url = resolve_url(self.options.host.as_deref(), request.url());
        let mut builder = self
            .http
            .request(into_reqwest_method(request.method()), url)
            .timeout(Duration::from_millis(self.options.timeout_ms));

        for (name, value) in self.options.default_headers.iter().chain(request.headers()) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body_bytes() {
            builder = builder.body(body.to_vec());
        }
        builder.send().await
    }

    fn should_retry_status(&self, status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }

    fn should_retry_transport(&self, err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_request() || err.is_body() || err.is_connect()
    }

    /// Waits before the next retry attempt (exponential backoff).
    async fn wait_before_retry(&self, attempt: usize) {
        let exp = attempt.min(16) as u32;
        let multiplier = 1u64 << exp;
        let delay_ms = self.options.retry_backoff_ms.saturating_mul(multiplier);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying request after {} ms", delay_ms);

        sleep(Duration::from_millis(delay_ms)).await;
    }
}

fn into_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
    }
}

fn collect_headers(raw: &reqwest::Response) -> Vec<(String, String)> {
    raw.headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{resolve_url, BridgeClient};

    #[test]
    fn resolve_url_passes_absolute_urls_through() {
        assert_eq!(
            resolve_url(Some("https://api.example.com"), "https://other.host/a"),
            "https://other.host/a".to_owned()
        );
    }

    #[test]
    fn resolve_url_joins_relative_paths_onto_host() {
        assert_eq!(
            resolve_url(Some("https://api.example.com/"), "/users/1"),
            "https://api.example.com/users/1".to_owned()
        );
        assert_eq!(
            resolve_url(Some("https://api.example.com"), "users/1"),
            "https://api.example.com/users/1".to_owned()
        );
    }

    #[test]
    fn resolve_url_without_host_returns_input() {
        assert_eq!(resolve_url(None, "/users/1"), "/users/1".to_owned());
    }

    #[test]
    fn debug_redacts_authorization_header() {
        let client = BridgeClient::new()
            .with_default_header("Authorization", "Bearer secret-token")
            .with_default_header("X-Trace", "abc");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("abc"));
        assert!(!debug.contains("secret-token"));
    }
}
