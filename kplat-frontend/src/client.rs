//! HTTP client for the backend service
//!
//! Every call is driven through [`kplat_core::retry::execute`]: each attempt
//! gets `min(attempt_timeout, remaining deadline)`, transient failures are
//! retried with jittered exponential backoff, and non-idempotent calls get a
//! single attempt.

use std::sync::Arc;
use std::time::Duration;

use kplat_core::http::REQUEST_ID_HEADER;
use kplat_core::{
    execute, AttemptContext, ConfigError, HttpMetrics, Idempotency, RetryError, RetryPolicy,
    Timer, TokioTimer, Transient,
};
use prometheus::{IntCounterVec, Opts};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::FrontendConfig;
use crate::upstream::UpstreamError;

/// Result of a retried backend call
pub type CallResult<T> = Result<T, RetryError<UpstreamError>>;

/// Pooled, retrying client for the backend service
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
    timer: Arc<dyn Timer>,
    attempts: IntCounterVec,
}

impl BackendClient {
    /// Build a client and register its attempt counter in `metrics`.
    pub fn new(config: &FrontendConfig, metrics: &HttpMetrics) -> Result<Self, ClientError> {
        config.validate()?;

        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .connect_timeout(config.retry.attempt_timeout)
            .build()
            .map_err(ClientError::Build)?;

        let attempts = metrics.register(IntCounterVec::new(
            Opts::new(
                "backend_call_attempts_total",
                "Attempts made against the backend, by path and outcome",
            ),
            &["path", "outcome"],
        )?)?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            policy: config.retry.clone(),
            timer: Arc::new(TokioTimer),
            attempts,
        })
    }

    /// Replace the clock driving backoff and attempt timeouts.
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    /// GET `path` and decode the JSON body. Retried.
    pub async fn get_json<T>(&self, path: &str, request_id: &str) -> CallResult<T>
    where
        T: DeserializeOwned,
    {
        self.call(Method::GET, path, None::<&()>, Idempotency::Idempotent, request_id)
            .await
    }

    /// POST a JSON body to `path`. Never retried.
    pub async fn post_json<B, T>(&self, path: &str, body: &B, request_id: &str) -> CallResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(
            Method::POST,
            path,
            Some(body),
            Idempotency::NonIdempotent,
            request_id,
        )
        .await
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        idempotency: Idempotency,
        request_id: &str,
    ) -> CallResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        execute(&self.policy, idempotency, self.timer.as_ref(), |ctx: AttemptContext| {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .timeout(ctx.timeout)
                .header(REQUEST_ID_HEADER, request_id);
            if let Some(body) = body {
                request = request.json(body);
            }
            let attempts = self.attempts.clone();
            let path = path.to_owned();

            async move {
                tracing::debug!(attempt = ctx.attempt, %path, "calling backend");
                let result = send_json(request, ctx.timeout).await;
                let outcome = match &result {
                    Ok(_) => "ok",
                    Err(e) if e.is_transient() => "transient",
                    Err(_) => "fatal",
                };
                attempts.with_label_values(&[path.as_str(), outcome]).inc();
                result
            }
        })
        .await
    }

    /// Single unretried GET of the backend's `/health`.
    pub async fn probe(&self, timeout: Duration) -> Result<(), UpstreamError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(UpstreamError::status(status, &body))
        }
    }
}

async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::status(status, &body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| UpstreamError::from_reqwest(e, timeout))
}

/// Client construction error
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
}
