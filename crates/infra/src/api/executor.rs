//! Retrying request executor
//!
//! Sends descriptors against the API base URL and owns every retry
//! decision. Transport failures retry within the policy budget; structured
//! error bodies are classified by the policy; a rejected token triggers
//! exactly one forced resign per logical call. Collection endpoints are
//! drained through a bounded link-following loop.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use provisor_common::{RetryDirective, RetryPolicy};
use provisor_domain::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS, MAX_PAGE_SIZE,
};
use provisor_domain::{
    ApiConfig, CollectionDocument, ErrorDocument, ProvisorError, ResourceObject, Result,
};

use super::auth::AccessTokenProvider;
use super::request::RequestDescriptor;

/// Transport tuning for the executor
///
/// Retry budget and backoff live on the [`RetryPolicy`]; this carries only
/// what the HTTP client and the pagination loop need.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Base URL including the version segment (`https://.../v1`)
    pub base_url: String,

    /// Whole-request timeout
    pub timeout: Duration,

    /// Upper bound on followed pages per collection fetch
    pub max_pages: u32,

    /// `limit` query value sent with the first page request
    pub page_size: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_pages: DEFAULT_MAX_PAGES,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl From<&ApiConfig> for ExecutorConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            max_pages: config.max_pages,
            page_size: config.page_size,
        }
    }
}

/// Sends API requests with bearer auth, retries, and pagination
///
/// One executor is shared across all repository calls. Each logical call
/// moves Idle → Sending → Success / Retrying / Failed; Retrying always
/// sleeps the policy backoff before sending again.
pub struct RequestExecutor {
    http: reqwest::Client,
    auth: Arc<dyn AccessTokenProvider>,
    config: ExecutorConfig,
    policy: RetryPolicy,
}

impl RequestExecutor {
    /// Create an executor with the standard retry policy
    ///
    /// # Errors
    /// Returns `ProvisorError::Config` if the HTTP client cannot be built.
    pub fn new(config: ExecutorConfig, auth: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        Self::with_policy(config, auth, RetryPolicy::standard())
    }

    /// Create an executor with an explicit default policy
    ///
    /// # Errors
    /// Returns `ProvisorError::Config` if the HTTP client cannot be built.
    pub fn with_policy(
        config: ExecutorConfig,
        auth: Arc<dyn AccessTokenProvider>,
        policy: RetryPolicy,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("provisor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProvisorError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, auth, config, policy })
    }

    /// Create an executor from the API configuration section
    ///
    /// The configured retry budget and base backoff are folded into the
    /// executor's default policy.
    ///
    /// # Errors
    /// Returns `ProvisorError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig, auth: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        let policy = RetryPolicy::standard()
            .with_max_retries(config.retry_budget)
            .with_base_backoff(Duration::from_millis(config.base_backoff_ms));
        Self::with_policy(ExecutorConfig::from(config), auth, policy)
    }

    /// Create a builder for fluent configuration
    #[must_use]
    pub fn builder() -> RequestExecutorBuilder {
        RequestExecutorBuilder::default()
    }

    /// Execute a request under the executor's default policy
    ///
    /// # Errors
    /// See [`RequestExecutor::execute_with_policy`].
    pub async fn execute<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<T> {
        self.execute_with_policy(request, &self.policy).await
    }

    /// Execute a request under an explicit retry policy
    ///
    /// An empty success body (DELETE responses) decodes as JSON `null`.
    ///
    /// # Errors
    /// - `ProvisorError::Transport` for network failures, timeouts, and
    ///   non-success responses without a structured error body
    /// - `ProvisorError::Api` for structured rejections the policy does not
    ///   retry, or once the retry budget is exhausted
    /// - `ProvisorError::Auth` when the server rejects a freshly signed token
    #[instrument(skip(self, request, policy), fields(method = %request.method, path = %request.path))]
    pub async fn execute_with_policy<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
        policy: &RetryPolicy,
    ) -> Result<T> {
        let url = self.request_url(request)?;
        let body = self.dispatch(&request.method, url, request.body.as_ref(), policy).await?;
        decode_body(&body, &request.path)
    }

    /// Fetch a collection endpoint to exhaustion
    ///
    /// Follows `links.next` iteratively, accumulating every page's objects
    /// in order. The first page carries `limit=<page_size>`; later pages use
    /// the server's absolute `next` URL unchanged.
    ///
    /// # Errors
    /// Same failure modes as [`RequestExecutor::execute_with_policy`], plus
    /// `ProvisorError::Transport` when the page bound is exceeded or a
    /// `next` link is not a valid URL.
    #[instrument(skip(self, request), fields(path = %request.path))]
    pub async fn fetch_all(&self, request: &RequestDescriptor) -> Result<Vec<ResourceObject>> {
        let mut url = self.request_url(request)?;
        url.query_pairs_mut().append_pair("limit", &self.config.page_size.to_string());

        let mut objects = Vec::new();
        let mut pages: u32 = 0;

        loop {
            pages += 1;
            if pages > self.config.max_pages {
                return Err(ProvisorError::Transport(format!(
                    "pagination exceeded {} pages for {}",
                    self.config.max_pages, request.path
                )));
            }

            let body = self.dispatch(&Method::GET, url, None, &self.policy).await?;
            let document: CollectionDocument = serde_json::from_slice(&body).map_err(|e| {
                ProvisorError::Transport(format!("decoding page for {}: {e}", request.path))
            })?;
            objects.extend(document.data);

            match document.links.next {
                Some(next) => {
                    url = Url::parse(&next).map_err(|e| {
                        ProvisorError::Transport(format!("invalid next link '{next}': {e}"))
                    })?;
                }
                None => break,
            }
        }

        debug!(count = objects.len(), pages, "collection fetched");
        Ok(objects)
    }

    /// Retry loop shared by single requests and page fetches
    ///
    /// Returns the raw body of the first successful response. A structured
    /// rejection with a `RefreshAuth` directive invalidates the token cache
    /// and resends at most once; transport failures and `Retry` directives
    /// consume the budget with exponential backoff.
    async fn dispatch(
        &self,
        method: &Method,
        url: Url,
        body: Option<&serde_json::Value>,
        policy: &RetryPolicy,
    ) -> Result<Vec<u8>> {
        let mut retries: u32 = 0;
        let mut refreshed = false;

        loop {
            match self.send_once(method, &url, body).await {
                Ok((status, body)) if status.is_success() => {
                    debug!(status = status.as_u16(), "request succeeded");
                    return Ok(body);
                }
                Ok((status, body)) => {
                    let status = status.as_u16();
                    let document: ErrorDocument = serde_json::from_slice(&body).map_err(|_| {
                        ProvisorError::Transport(format!(
                            "status {status} with no structured error body"
                        ))
                    })?;

                    match policy.decide(status, &document.errors) {
                        RetryDirective::RefreshAuth if !refreshed => {
                            refreshed = true;
                            warn!(status, "token rejected, resigning once");
                            self.auth.invalidate().await;
                        }
                        RetryDirective::RefreshAuth => {
                            return Err(ProvisorError::Auth(
                                "token rejected again after a forced resign".to_string(),
                            ));
                        }
                        RetryDirective::Retry if retries < policy.max_retries() => {
                            retries += 1;
                            let backoff = policy.backoff_for(retries);
                            debug!(status, retry = retries, ?backoff, "retrying rejected request");
                            tokio::time::sleep(backoff).await;
                        }
                        RetryDirective::Retry | RetryDirective::Fail => {
                            return Err(ProvisorError::Api { status, errors: document.errors });
                        }
                    }
                }
                Err(ProvisorError::Transport(message)) if retries < policy.max_retries() => {
                    retries += 1;
                    let backoff = policy.backoff_for(retries);
                    warn!(error = %message, retry = retries, ?backoff, "transport failure, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// One attempt: token read, send, body read
    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<(StatusCode, Vec<u8>)> {
        // The token is read per attempt so a resign mid-call is picked up.
        let token = self.auth.access_token().await?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header("Authorization", format!("Bearer {token}"));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProvisorError::Transport(format!("reading response body: {e}")))?;

        Ok((status, body.to_vec()))
    }

    fn request_url(&self, request: &RequestDescriptor) -> Result<Url> {
        let mut url =
            Url::parse(&format!("{}{}", self.config.base_url, request.path)).map_err(|e| {
                ProvisorError::Config(format!(
                    "invalid request URL '{}{}': {e}",
                    self.config.base_url, request.path
                ))
            })?;
        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(key, value)| (key, value)));
        }
        Ok(url)
    }
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8], path: &str) -> Result<T> {
    if body.is_empty() {
        // DELETE responses carry no body; represent them as JSON null.
        return serde_json::from_value(serde_json::Value::Null)
            .map_err(|_| ProvisorError::Transport(format!("empty response body for {path}")));
    }
    serde_json::from_slice(body)
        .map_err(|e| ProvisorError::Transport(format!("decoding response for {path}: {e}")))
}

fn map_transport_error(error: reqwest::Error) -> ProvisorError {
    if error.is_timeout() {
        ProvisorError::Transport(format!("request timed out: {error}"))
    } else {
        ProvisorError::Transport(format!("request failed: {error}"))
    }
}

/// Fluent construction for [`RequestExecutor`]
#[derive(Default)]
pub struct RequestExecutorBuilder {
    config: Option<ExecutorConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
    policy: Option<RetryPolicy>,
}

impl RequestExecutorBuilder {
    /// Set the transport configuration
    #[must_use]
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the token provider (required)
    #[must_use]
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the default retry policy
    #[must_use]
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Build the executor
    ///
    /// # Errors
    /// Returns `ProvisorError::Config` when no auth provider was set or the
    /// HTTP client cannot be built.
    pub fn build(self) -> Result<RequestExecutor> {
        let auth = self
            .auth
            .ok_or_else(|| ProvisorError::Config("auth provider not set".to_string()))?;

        RequestExecutor::with_policy(
            self.config.unwrap_or_default(),
            auth,
            self.policy.unwrap_or_default(),
        )
    }
}
