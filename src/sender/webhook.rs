use super::outcome::DispatchOutcome;
use crate::buffer::Batch;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid webhook target: {0}")]
    InvalidTarget(String),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Seam between the pipeline and whatever delivers batches.
pub trait BatchSink: Send + Sync + 'static {
    fn dispatch(&self, batch: &Batch) -> impl Future<Output = DispatchOutcome> + Send;
}

/// Where and as whom batches are posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookTarget {
    pub url: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl WebhookTarget {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            username: Some(username.into()),
            avatar_url: Some(avatar_url.into()),
        }
    }

    pub fn validate(&self, require_https: bool) -> Result<Url, DispatchError> {
        let raw = self
            .url
            .as_deref()
            .ok_or_else(|| DispatchError::InvalidTarget("webhook URL is not set".to_string()))?;

        if require_https && !raw.starts_with("https://") {
            return Err(DispatchError::InvalidTarget(format!(
                "webhook URL must start with https:// (got '{raw}')"
            )));
        }

        let url = Url::parse(raw).map_err(|e| {
            DispatchError::InvalidTarget(format!("webhook URL '{raw}' is malformed: {e}"))
        })?;

        if self.username.is_none() {
            return Err(DispatchError::InvalidTarget(
                "console username is not set".to_string(),
            ));
        }
        if self.avatar_url.is_none() {
            return Err(DispatchError::InvalidTarget(
                "console avatar URL is not set".to_string(),
            ));
        }

        Ok(url)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
    /// Refuse plain-http webhook URLs. Only local test sinks turn this off.
    pub require_https: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connection_timeout: Duration::from_secs(5),
            user_agent: format!("webhook-log-forwarder/{}", env!("CARGO_PKG_VERSION")),
            require_https: true,
        }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
    avatar_url: &'a str,
}

#[derive(Deserialize)]
struct RateLimitBody {
    retry_after: Option<f64>,
}

/// Posts batches to a chat webhook, one request per batch.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: Client,
    target: WebhookTarget,
    endpoint: Result<Url, DispatchError>,
}

impl WebhookDispatcher {
    /// Builds the dispatcher. An invalid target is reported here, once; the
    /// dispatcher is still returned and refuses every batch.
    pub fn new(target: WebhookTarget, config: ClientConfig) -> Result<Self, DispatchError> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| DispatchError::ClientBuild(e.to_string()))?;

        let endpoint = target.validate(config.require_https);
        if let Err(e) = &endpoint {
            error!("Webhook dispatch disabled: {e}");
        }

        Ok(Self {
            client,
            target,
            endpoint,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_ok()
    }

    pub fn target(&self) -> &WebhookTarget {
        &self.target
    }

    pub async fn send(&self, batch: &Batch) -> DispatchOutcome {
        let endpoint = match &self.endpoint {
            Ok(endpoint) => endpoint.clone(),
            Err(e) => return DispatchOutcome::Rejected(e.to_string()),
        };

        if batch.is_empty() {
            return DispatchOutcome::Rejected("batch is empty".to_string());
        }

        let payload = WebhookPayload {
            content: batch.content(),
            username: self.target.username.as_deref().unwrap_or_default(),
            avatar_url: self.target.avatar_url.as_deref().unwrap_or_default(),
        };

        let start = Instant::now();
        let response = match self.client.post(endpoint).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to send webhook for batch {}: {e}", batch.id());
                return DispatchOutcome::TransportError(e.to_string());
            }
        };

        let status = response.status();
        match status {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                debug!(
                    "Delivered batch {} ({} lines, {} chars) in {:?}",
                    batch.id(),
                    batch.line_count(),
                    batch.char_len(),
                    start.elapsed()
                );
                DispatchOutcome::Delivered
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let header_hint = retry_after_from_headers(response.headers());
                let body = response.text().await.unwrap_or_default();
                let retry_after = header_hint.or_else(|| retry_after_from_body(&body));
                warn!(
                    "Webhook rate limited batch {} (retry after {:?})",
                    batch.id(),
                    retry_after
                );
                DispatchOutcome::RateLimited { retry_after }
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                warn!("Failed to send webhook: HTTP {} - {}", status.as_u16(), body);
                DispatchOutcome::TransportError(format!("HTTP {}: {}", status.as_u16(), body))
            }
        }
    }
}

impl BatchSink for WebhookDispatcher {
    async fn dispatch(&self, batch: &Batch) -> DispatchOutcome {
        self.send(batch).await
    }
}

fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}

fn retry_after_from_headers(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(seconds_to_duration)
}

fn retry_after_from_body(body: &str) -> Option<Duration> {
    serde_json::from_str::<RateLimitBody>(body)
        .ok()?
        .retry_after
        .and_then(seconds_to_duration)
}
