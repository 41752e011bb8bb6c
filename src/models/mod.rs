//! View models for admin API records.
//!
//! Everything the console displays implements [`Item`]: stub mappings,
//! serve events, logged requests, scenarios, and the synthetic folder
//! nodes the mappings tree inserts between them. Records deserialize
//! with unknown fields preserved so `code()` shows what the server
//! actually sent.

pub mod scenario;
pub mod tree;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use scenario::{ScenarioGraph, StateLink, StateNode};
pub use tree::{NodeId, Tree, TreeNode};

/// Capability set shared by every displayable record.
pub trait Item {
    /// Stable unique identifier within the current data set.
    fn id(&self) -> &str;

    /// Primary display line.
    fn title(&self) -> String;

    /// Secondary display line.
    fn subtitle(&self) -> String;

    /// Serialized representation shown in the code/detail pane.
    fn code(&self) -> String;

    /// Whether this record proxies traffic to another host.
    fn is_proxy(&self) -> bool {
        false
    }

    /// Slash- or dot-delimited folder path, when the record declares one.
    fn folder_definition(&self) -> Option<&str> {
        None
    }
}

/// Pairs a payload with a generated identifier.
///
/// Some admin endpoints return records without any id (unmatched
/// requests, for one). The console needs a stable key for selection and
/// tree placement, so those records are wrapped rather than mutated.
#[derive(Debug, Clone)]
pub struct Identified<T> {
    id: String,
    pub record: T,
}

impl<T> Identified<T> {
    pub fn new(record: T) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            record,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Request matching half of a stub mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path_pattern: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RequestPattern {
    /// Whichever url-ish field is set, in the order the server checks them.
    pub fn display_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.url_pattern.as_deref())
            .or(self.url_path.as_deref())
            .or(self.url_path_pattern.as_deref())
    }
}

/// Response half of a stub mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_base_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A stub mapping as returned by `GET /__admin/mappings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub request: RequestPattern,
    #[serde(default)]
    pub response: ResponseDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_scenario_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_scenario_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl StubMapping {
    /// Identifier the admin API accepts in `mappings/:id` paths.
    pub fn key(&self) -> &str {
        self.id
            .as_deref()
            .or(self.uuid.as_deref())
            .unwrap_or_default()
    }
}

impl Item for StubMapping {
    fn id(&self) -> &str {
        self.key()
    }

    fn title(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.request
            .display_url()
            .unwrap_or("<no url>")
            .to_string()
    }

    fn subtitle(&self) -> String {
        let method = self.request.method.as_deref().unwrap_or("ANY");
        let url = self.request.display_url().unwrap_or("");
        format!("{} {}", method, url)
    }

    fn code(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    fn is_proxy(&self) -> bool {
        self.response.proxy_base_url.is_some()
    }

    fn folder_definition(&self) -> Option<&str> {
        self.metadata
            .as_ref()?
            .get("folder")
            .and_then(Value::as_str)
    }
}

/// A request the server received, as logged in the request journal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_date_string: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl LoggedRequest {
    /// Journal timestamp, preferring the epoch-millis field.
    pub fn logged_at(&self) -> Option<DateTime<Utc>> {
        if let Some(millis) = self.logged_date {
            return DateTime::from_timestamp_millis(millis);
        }
        self.logged_date_string
            .as_deref()
            .and_then(|s| s.parse().ok())
    }
}

impl Item for Identified<LoggedRequest> {
    fn id(&self) -> &str {
        Identified::id(self)
    }

    fn title(&self) -> String {
        let method = self.record.method.as_deref().unwrap_or("ANY");
        let url = self.record.url.as_deref().unwrap_or("<no url>");
        format!("{} {}", method, url)
    }

    fn subtitle(&self) -> String {
        self.record
            .logged_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }

    fn code(&self) -> String {
        serde_json::to_string_pretty(&self.record).unwrap_or_default()
    }
}

/// One entry from the request journal: the request plus what the server
/// did with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServeEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub request: LoggedRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_definition: Option<ResponseDefinition>,
    #[serde(default)]
    pub was_matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stub_mapping: Option<StubMapping>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Item for ServeEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> String {
        let method = self.request.method.as_deref().unwrap_or("ANY");
        let url = self.request.url.as_deref().unwrap_or("<no url>");
        format!("{} {}", method, url)
    }

    fn subtitle(&self) -> String {
        let status = self
            .response_definition
            .as_ref()
            .and_then(|r| r.status)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        match self.request.logged_at() {
            Some(t) => format!("{} at {}", status, t.format("%H:%M:%S")),
            None => status,
        }
    }

    fn code(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    fn is_proxy(&self) -> bool {
        self.response_definition
            .as_ref()
            .map(|r| r.proxy_base_url.is_some())
            .unwrap_or(false)
    }
}

/// A scenario as returned by `GET /__admin/scenarios`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub possible_states: Vec<String>,
    /// Mappings participating in this scenario. The admin API does not
    /// embed them; the client joins by `scenario_name` after fetching.
    #[serde(default, skip_serializing)]
    pub mappings: Vec<StubMapping>,
}

impl Item for Scenario {
    fn id(&self) -> &str {
        if self.id.is_empty() { &self.name } else { &self.id }
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn subtitle(&self) -> String {
        format!("state: {}", self.state)
    }

    fn code(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Synthetic folder node in the mappings tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Last path segment, shown as the node title.
    pub name: String,
    /// Cumulative normalized path, used as the node id.
    pub path: String,
}

impl Item for Folder {
    fn id(&self) -> &str {
        &self.path
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn subtitle(&self) -> String {
        self.path.clone()
    }

    fn code(&self) -> String {
        String::new()
    }
}

/// Recorder state from `GET /__admin/recordings/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStatus {
    #[serde(default)]
    pub status: String,
}

impl RecordingStatus {
    pub fn is_recording(&self) -> bool {
        self.status.eq_ignore_ascii_case("recording")
    }
}

/// Proxy configuration record from `GET /__admin/proxy`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_base_url: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
