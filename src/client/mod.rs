//! HTTP client with transparent access-token refresh.
//!
//! Wraps outbound requests so that access-token expiry is invisible to
//! callers: a 401 triggers one rotate call shared by every concurrent
//! request, queued requests replay after it succeeds, and a failed refresh
//! tears the session down server-side before surfacing the error.

mod error;
mod gate;

pub use error::ClientError;
pub use gate::RefreshError;

use gate::{JoinOutcome, RefreshGate, SettleGuard};
use reqwest::{Client, ClientBuilder, StatusCode, cookie::Jar};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const REFRESH_PATH: &str = "/api/refresh";
const LOGOUT_PATH: &str = "/api/logout";

const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// API client with cookie-based auth and single-flight token refresh.
///
/// Clones share the cookie jar and the refresh gate, so concurrent use
/// across clones still performs at most one rotate call per expiry.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    jar: Arc<Jar>,
    gate: Arc<RefreshGate>,
    refresh_timeout: Duration,
}

impl HttpClient {
    /// Create a new client with default configuration.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The cookie jar shared by this client and its clones.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// Perform a GET request with auto-refresh on 401.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        let req = self.http.get(self.url(path));
        self.send_with_refresh(req, path).await
    }

    /// Perform a bodyless POST request with auto-refresh on 401.
    pub async fn post(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        let req = self.http.post(self.url(path));
        self.send_with_refresh(req, path).await
    }

    /// Perform a POST request with a JSON body and auto-refresh on 401.
    pub async fn post_body<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let req = self.http.post(self.url(path)).json(body);
        self.send_with_refresh(req, path).await
    }

    /// GET and parse the JSON response body. Any non-success final status
    /// becomes a [`ClientError::Server`] carrying the server's message.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        into_json(self.get(path).await?).await
    }

    /// POST a JSON body and parse the JSON response body.
    pub async fn post_json<T: serde::de::DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        into_json(self.post_body(path, body).await?).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Core interceptor protocol. Sends the request; on a 401 (except for
    /// the rotate endpoint itself) joins the refresh gate, refreshes once
    /// per burst, and replays the original request on success.
    async fn send_with_refresh(
        &self,
        req: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let retry = req.try_clone();
        let response = req.send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Never intercept the rotate endpoint; a 401 there must not start
        // another refresh.
        if path == REFRESH_PATH {
            return Ok(response);
        }

        // Requests with streaming bodies cannot be replayed.
        let Some(retry) = retry else {
            return Ok(response);
        };

        match self.gate.join() {
            JoinOutcome::Follower(rx) => match rx.await {
                Ok(Ok(())) => Ok(retry.send().await?),
                Ok(Err(e)) => Err(e.into()),
                Err(_) => Err(RefreshError::Abandoned.into()),
            },
            JoinOutcome::Leader => {
                let guard = SettleGuard::new(&self.gate);
                match self.run_refresh().await {
                    Ok(()) => {
                        guard.settle(Ok(()));
                        Ok(retry.send().await?)
                    }
                    Err(e) => {
                        guard.settle(Err(e.clone()));
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Run the rotate call under the refresh deadline. On any failure the
    /// logout endpoint is called so the server clears the session cookies.
    async fn run_refresh(&self) -> Result<(), RefreshError> {
        let rotate = self.http.post(self.url(REFRESH_PATH)).send();

        let failure = match tokio::time::timeout(self.refresh_timeout, rotate).await {
            Ok(Ok(response)) if response.status().is_success() => {
                debug!("Access token refreshed");
                return Ok(());
            }
            Ok(Ok(response)) => {
                let status = response.status();
                let message = extract_error_message(response, status).await;
                RefreshError::Rejected(message)
            }
            Ok(Err(e)) => RefreshError::Transport(e.to_string()),
            Err(_) => RefreshError::TimedOut,
        };

        debug!(error = %failure, "Token refresh failed, tearing down session");
        let logout = self.http.post(self.url(LOGOUT_PATH)).send();
        let _ = tokio::time::timeout(self.refresh_timeout, logout).await;

        Err(failure)
    }
}

/// Parse a response into the expected type, mapping non-success statuses to
/// [`ClientError::Server`] with the server's `{error}` message.
async fn into_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let message = extract_error_message(response, status).await;
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

async fn extract_error_message(response: reqwest::Response, status: StatusCode) -> String {
    response
        .json::<Value>()
        .await
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Builder for [`HttpClient`].
#[derive(Default)]
pub struct HttpClientBuilder {
    base_url: Option<String>,
    refresh_timeout: Option<Duration>,
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the deadline for the rotate call. A refresh that exceeds it
    /// fails its burst instead of blocking queued requests forever.
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = Some(timeout);
        self
    }

    /// Set the overall per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let jar = Arc::new(Jar::default());

        let mut builder = ClientBuilder::new().cookie_provider(jar.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(HttpClient {
            http,
            base_url,
            jar,
            gate: Arc::new(RefreshGate::new()),
            refresh_timeout: self.refresh_timeout.unwrap_or(DEFAULT_REFRESH_TIMEOUT),
        })
    }
}
