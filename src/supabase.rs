//! Thin client for the upstream PostgREST interface.
//!
//! Every database operation in this service goes through this client: plain
//! REST verbs against `/{table}` and stored-procedure calls against
//! `/rpc/{function}`. One fixed timeout applies uniformly to every call; no
//! retries happen at this layer.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// Filter expression for a PostgREST query string, e.g. `("username", "eq.alice")`.
pub type Filter = (String, String);

pub fn eq(column: &str, value: impl std::fmt::Display) -> Filter {
    (column.to_string(), format!("eq.{}", value))
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ServiceError::ConfigError(format!("invalid upstream URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ServiceError::ConfigError(
                "upstream URL must use http or https".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(api_key)
            .map_err(|_| ServiceError::ConfigError("API key is not a valid header value".into()))?;
        headers.insert("apikey", key_value);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| ServiceError::ConfigError("API key is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ServiceError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, ServiceError> {
        let key = cfg.api_key().ok_or_else(|| {
            ServiceError::ConfigError("no upstream API key configured".into())
        })?;
        Self::new(&cfg.supabase_url, key, cfg.upstream_timeout())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    /// GET rows matching the filters.
    pub async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, ServiceError> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(filters)
            .send()
            .await?;
        Self::rows(response).await
    }

    /// POST rows; returns the created representation.
    pub async fn insert(&self, table: &str, rows: &Value) -> Result<Vec<Value>, ServiceError> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;
        Self::rows(response).await
    }

    /// PATCH rows matching the filters; returns the updated representation.
    /// An empty result means no row matched, which callers use as an
    /// optimistic-concurrency signal.
    pub async fn patch(
        &self,
        table: &str,
        filters: &[Filter],
        body: &Value,
    ) -> Result<Vec<Value>, ServiceError> {
        let response = self
            .http
            .patch(self.table_url(table))
            .query(filters)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Self::rows(response).await
    }

    /// DELETE rows matching the filters; returns the deleted representation.
    pub async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, ServiceError> {
        let response = self
            .http
            .delete(self.table_url(table))
            .query(filters)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::rows(response).await
    }

    /// Invoke a stored procedure through the REST-RPC bridge.
    pub async fn rpc(&self, function: &str, args: &Value) -> Result<Value, ServiceError> {
        let url = format!("{}/rpc/{}", self.base_url, function);
        let response = self.http.post(url).json(args).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(function, status = status.as_u16(), body = %body, "rpc call failed");
            return Err(ServiceError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Connectivity check used by the readiness probe. Any HTTP answer from
    /// the upstream counts as reachable; only transport errors fail.
    pub async fn ping(&self) -> Result<(), ServiceError> {
        self.http.get(&self.base_url).send().await?;
        Ok(())
    }

    async fn rows(response: reqwest::Response) -> Result<Vec<Value>, ServiceError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "upstream request failed");
            return Err(ServiceError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        debug!(bytes = body.len(), "upstream response");
        match serde_json::from_str::<Value>(&body)? {
            Value::Array(rows) => Ok(rows),
            // PostgREST can answer with a single object under
            // `Accept: application/vnd.pgrst.object`.
            other => Ok(vec![other]),
        }
    }
}
