use std::collections::BTreeMap;
use std::time::Duration;

use assessment_domain::ports::BoxFuture;
use assessment_domain::ports::store::{KeyValueStore, StoreError};
use assessment_domain::store::split_path;
use metrics::counter;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::sleep;
use url::Url;

use crate::config::AppConfig;

const STORE_REQUESTS_TOTAL: &str = "assessment_store_requests_total";

// Multi-path PATCH on the root is atomic server-side.
#[derive(Debug, Clone)]
pub struct FirebaseStore {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
    retry_max_attempts: u32,
    retry_backoff_base: Duration,
    retry_backoff_max: Duration,
}

impl FirebaseStore {
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let timeout = Duration::from_millis(config.store_timeout_ms.max(1));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let base_url = parse_base_url(&config.firebase_url)?;
        let auth_token = config
            .firebase_auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        Ok(Self {
            http,
            base_url,
            auth_token,
            retry_max_attempts: config.store_retry_max_attempts.max(1),
            retry_backoff_base: Duration::from_millis(config.store_retry_backoff_base_ms),
            retry_backoff_max: Duration::from_millis(config.store_retry_backoff_max_ms),
        })
    }

    fn endpoint(&self, path: Option<&str>) -> Result<Url, StoreError> {
        let mut url = resource_url(&self.base_url, path)?;
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    async fn get_with_retry(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let url = self.endpoint(Some(path))?;
        let attempts = self.retry_max_attempts;

        for attempt in 0..attempts {
            let last_attempt = attempt + 1 >= attempts;
            let response = match self
                .http
                .get(url.clone())
                .header("accept", "application/json")
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    if !last_attempt {
                        self.back_off(attempt).await;
                        continue;
                    }
                    record_request("read", "transport");
                    return Err(map_transport_error(err));
                }
            };

            let status = response.status();
            if status.is_success() {
                let body = response
                    .json::<Value>()
                    .await
                    .map_err(|err| StoreError::Serialization(err.to_string()))?;
                record_request("read", "ok");
                return Ok(if body.is_null() { None } else { Some(body) });
            }

            let message = response.text().await.unwrap_or_default();
            if is_retryable(status) && !last_attempt {
                tracing::debug!(
                    path,
                    status = status.as_u16(),
                    attempt,
                    "retrying store read"
                );
                self.back_off(attempt).await;
                continue;
            }
            record_request("read", "error");
            return Err(map_status(status, message));
        }

        Err(StoreError::Operation(
            "retry loop exited unexpectedly".to_string(),
        ))
    }

    async fn patch_root(&self, updates: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        for path in updates.keys() {
            split_path(path)?;
        }
        let url = self.endpoint(None)?;
        let response = self
            .http
            .patch(url)
            .header("accept", "application/json")
            .json(updates)
            .send()
            .await
            .map_err(|err| {
                record_request("write", "transport");
                map_transport_error(err)
            })?;

        let status = response.status();
        if status.is_success() {
            record_request("write", "ok");
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        record_request("write", "error");
        Err(map_status(status, message))
    }

    async fn back_off(&self, attempt: u32) {
        sleep(backoff_for_attempt(
            self.retry_backoff_base,
            self.retry_backoff_max,
            attempt,
        ))
        .await;
    }
}

impl KeyValueStore for FirebaseStore {
    fn read(&self, path: &str) -> BoxFuture<'_, Result<Option<Value>, StoreError>> {
        let path = path.to_string();
        Box::pin(async move { self.get_with_retry(&path).await })
    }

    fn atomic_write(
        &self,
        updates: &BTreeMap<String, Value>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let updates = updates.clone();
        Box::pin(async move { self.patch_root(&updates).await })
    }
}

fn record_request(op: &'static str, result: &'static str) {
    counter!(STORE_REQUESTS_TOTAL, "op" => op, "result" => result).increment(1);
}

fn parse_base_url(raw: &str) -> Result<Url, StoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let normalized = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    Url::parse(&format!("{normalized}/"))
        .map_err(|err| StoreError::Unavailable(format!("invalid firebase url '{raw}': {err}")))
}

/// `{base}/{path}.json`, or `{base}/.json` for the root.
fn resource_url(base: &Url, path: Option<&str>) -> Result<Url, StoreError> {
    let relative = match path {
        Some(path) => format!("{}.json", split_path(path)?.join("/")),
        None => ".json".to_string(),
    };
    base.join(&relative)
        .map_err(|err| StoreError::InvalidPath(format!("{relative}: {err}")))
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn map_status(status: StatusCode, message: String) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied(message),
        StatusCode::BAD_REQUEST => StoreError::InvalidPath(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StoreError::Timeout(message),
        _ if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
            StoreError::Unavailable(format!("status {}: {}", status.as_u16(), message))
        }
        _ => StoreError::Operation(format!("status {}: {}", status.as_u16(), message)),
    }
}

fn map_transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout(err.to_string())
    } else {
        StoreError::Unavailable(err.to_string())
    }
}

fn backoff_for_attempt(base: Duration, max: Duration, attempt: u32) -> Duration {
    if base.is_zero() {
        return Duration::from_millis(1);
    }
    let multiplier = 1u64 << attempt.min(8);
    let base_ms = base.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    let delay_ms = base_ms.saturating_mul(multiplier).max(1);
    if max_ms == 0 {
        Duration::from_millis(delay_ms)
    } else {
        Duration::from_millis(delay_ms.min(max_ms))
    }
}
