//! Typed client for the mock server's admin API.
//!
//! All endpoints live under `/__admin/` and speak JSON. GET and DELETE
//! are idempotent; POST and PUT are best-effort, so a retried submission
//! can be applied twice. The retry schedule lives in [`retry`], the push
//! channel topics in [`events`].

pub mod events;
pub mod retry;

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::models::{
    LoggedRequest, ProxyConfig, RecordingStatus, Scenario, ServeEvent, StubMapping,
};
use crate::{Error, Result};

pub use events::{RECONNECT_DELAY, REFRESH_DEBOUNCE, RefreshDebouncer, Topic};
pub use retry::RetryPolicy;

/// Default admin endpoint of a locally running mock server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Deserialize)]
struct MappingsEnvelope {
    #[serde(default)]
    mappings: Vec<StubMapping>,
}

#[derive(Debug, Deserialize)]
struct RequestsEnvelope {
    #[serde(default)]
    requests: Vec<ServeEvent>,
}

#[derive(Debug, Deserialize)]
struct UnmatchedEnvelope {
    #[serde(default)]
    requests: Vec<LoggedRequest>,
}

#[derive(Debug, Deserialize)]
struct ScenariosEnvelope {
    #[serde(default)]
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
struct ProxiesEnvelope {
    #[serde(default)]
    proxies: Vec<ProxyConfig>,
}

/// Admin API client.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base: String,
    policy: RetryPolicy,
}

impl AdminClient {
    /// Build a client for the server at `base_url` (scheme + host + port).
    pub fn new(base_url: &str) -> Result<Self> {
        let base = normalize_base_url(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Server base URL without the admin path.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// WebSocket URL of the push-notification channel.
    pub fn events_url(&self) -> String {
        websocket_url(&self.base)
    }

    // --- Mappings ---

    pub async fn mappings(&self) -> Result<Vec<StubMapping>> {
        let envelope: MappingsEnvelope = self.get("mappings").await?;
        Ok(envelope.mappings)
    }

    pub async fn mapping(&self, id: &str) -> Result<StubMapping> {
        self.get(&format!("mappings/{}", id)).await
    }

    pub async fn create_mapping(&self, mapping: &StubMapping) -> Result<StubMapping> {
        let body = serde_json::to_value(mapping)?;
        self.send_json(Method::POST, "mappings", Some(body)).await
    }

    pub async fn update_mapping(&self, id: &str, mapping: &StubMapping) -> Result<StubMapping> {
        let body = serde_json::to_value(mapping)?;
        self.send_json(Method::PUT, &format!("mappings/{}", id), Some(body))
            .await
    }

    pub async fn delete_mapping(&self, id: &str) -> Result<()> {
        self.send(Method::DELETE, &format!("mappings/{}", id), None)
            .await
            .map(|_| ())
    }

    /// Persist in-memory mappings to the server's backing store.
    pub async fn save_mappings(&self) -> Result<()> {
        self.send(Method::POST, "mappings/save", None)
            .await
            .map(|_| ())
    }

    /// Restore mappings to what the backing store holds.
    pub async fn reset_mappings(&self) -> Result<()> {
        self.send(Method::POST, "mappings/reset", None)
            .await
            .map(|_| ())
    }

    // --- Request journal ---

    pub async fn requests(&self) -> Result<Vec<ServeEvent>> {
        let envelope: RequestsEnvelope = self.get("requests").await?;
        Ok(envelope.requests)
    }

    pub async fn unmatched(&self) -> Result<Vec<LoggedRequest>> {
        let envelope: UnmatchedEnvelope = self.get("requests/unmatched").await?;
        Ok(envelope.requests)
    }

    pub async fn delete_requests(&self) -> Result<()> {
        self.send(Method::DELETE, "requests", None).await.map(|_| ())
    }

    // --- Scenarios ---

    pub async fn scenarios(&self) -> Result<Vec<Scenario>> {
        let envelope: ScenariosEnvelope = self.get("scenarios").await?;
        Ok(envelope.scenarios)
    }

    /// Scenarios with their mappings joined in by scenario name. The
    /// admin API returns the two separately.
    pub async fn scenarios_with_mappings(&self) -> Result<Vec<Scenario>> {
        let scenarios = self.scenarios().await?;
        let mappings = self.mappings().await?;
        Ok(join_scenario_mappings(scenarios, mappings))
    }

    /// Reset every scenario to its start state.
    pub async fn reset_scenarios(&self) -> Result<()> {
        self.send(Method::POST, "scenarios/reset", None)
            .await
            .map(|_| ())
    }

    // --- Recording ---

    pub async fn start_recording(&self, target_base_url: &str) -> Result<()> {
        let body = json!({ "targetBaseUrl": target_base_url });
        self.send(Method::POST, "recordings/start", Some(body))
            .await
            .map(|_| ())
    }

    /// Stop recording; returns the stub mappings captured.
    pub async fn stop_recording(&self) -> Result<Vec<StubMapping>> {
        let envelope: MappingsEnvelope = self
            .send_json(Method::POST, "recordings/stop", None)
            .await?;
        Ok(envelope.mappings)
    }

    /// Snapshot the request journal into stub mappings without a
    /// recording session.
    pub async fn snapshot_recording(&self) -> Result<Vec<StubMapping>> {
        let envelope: MappingsEnvelope = self
            .send_json(Method::POST, "recordings/snapshot", None)
            .await?;
        Ok(envelope.mappings)
    }

    pub async fn recording_status(&self) -> Result<RecordingStatus> {
        self.get("recordings/status").await
    }

    // --- Proxy ---

    pub async fn proxies(&self) -> Result<Vec<ProxyConfig>> {
        let envelope: ProxiesEnvelope = self.get("proxy").await?;
        Ok(envelope.proxies)
    }

    pub async fn update_proxy(&self, proxy: &ProxyConfig) -> Result<()> {
        let body = serde_json::to_value(proxy)?;
        self.send(Method::PUT, "proxy", Some(body)).await.map(|_| ())
    }

    pub async fn delete_proxy(&self, id: &str) -> Result<()> {
        self.send(Method::DELETE, &format!("proxy/{}", id), None)
            .await
            .map(|_| ())
    }

    // --- Server lifecycle ---

    /// Reset mappings and the request journal to the default state.
    pub async fn reset(&self) -> Result<()> {
        self.send(Method::POST, "reset", None).await.map(|_| ())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(Method::POST, "shutdown", None).await.map(|_| ())
    }

    /// Fetch a server-side file (stub body, for one) as text.
    pub async fn file(&self, name: &str) -> Result<String> {
        let response = self.send(Method::GET, &format!("files/{}", name), None).await?;
        Ok(response.text().await?)
    }

    // --- Transport ---

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(Method::GET, path, None).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let response = self.send(method, path, body).await?;
        Ok(response.json().await?)
    }

    /// Issue one admin request, retrying per the policy. The request is
    /// rebuilt on every attempt so bodies survive resubmission.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/__admin/{}", self.base, path);
        let mut attempt: u32 = 0;
        loop {
            let mut request = self.http.request(method.clone(), &url);
            if let Some(body) = &body {
                request = request.json(body);
            }
            let error = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(%method, %url, status = status.as_u16(), "admin request ok");
                        return Ok(response);
                    }
                    Error::Server {
                        status: status.as_u16(),
                        status_text: status.canonical_reason().unwrap_or_default().to_string(),
                    }
                }
                Err(err) => Error::from(err),
            };

            attempt += 1;
            match self.policy.next_delay(&error, attempt) {
                Some(delay) => {
                    warn!(%method, %url, attempt, error = %error.summary(), "retrying admin request");
                    tokio::time::sleep(delay).await;
                }
                None => return Err(error),
            }
        }
    }
}

/// Normalize a user-supplied base URL: require an http(s) scheme, strip
/// trailing slashes and any accidental `/__admin` suffix.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/__admin").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(Error::InvalidUrl(raw.to_string())),
    }
}

/// Derive the events WebSocket URL from an http(s) base URL.
pub fn websocket_url(base: &str) -> String {
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/__admin/events", ws_base)
}

/// Attach mappings to their scenarios by scenario name. Mapping order
/// within a scenario follows the server's mapping order.
pub fn join_scenario_mappings(
    mut scenarios: Vec<Scenario>,
    mappings: Vec<StubMapping>,
) -> Vec<Scenario> {
    for scenario in &mut scenarios {
        scenario.mappings = mappings
            .iter()
            .filter(|m| m.scenario_name.as_deref() == Some(scenario.name.as_str()))
            .cloned()
            .collect();
    }
    scenarios
}
