//! Command implementations for the stubdeck CLI.
//!
//! Each handler calls the admin client and returns a result type that
//! knows how to print itself as JSON (the default, for scripting) or as
//! human-readable text.

use std::io::Read;

use serde::Serialize;

use crate::client::AdminClient;
use crate::config::{self, SdConfig};
use crate::models::scenario::{LinkRoute, ScenarioGraph, StateKind};
use crate::models::tree::{NodeKind, build_folder_tree};
use crate::models::{
    Item, LoggedRequest, ProxyConfig, RecordingStatus, Scenario, ServeEvent, StubMapping,
};
use crate::search;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Print a command result in the requested format.
pub fn print(result: &impl Output, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

fn json_of<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Read JSON from a file path, or from stdin when the path is `-`.
fn read_json_input(file: &str) -> Result<serde_json::Value> {
    let raw = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    Ok(serde_json::from_str(&raw)?)
}

// === Mappings ===

#[derive(Debug, Serialize)]
pub struct MappingList {
    pub count: usize,
    pub mappings: Vec<StubMapping>,
    #[serde(skip)]
    tree: bool,
}

impl Output for MappingList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.count == 0 {
            return "No mappings found.".to_string();
        }
        if self.tree {
            return render_mapping_tree(self.mappings.clone());
        }
        let mut lines = Vec::with_capacity(self.count);
        for mapping in &self.mappings {
            let proxy = if mapping.is_proxy() { "  [proxy]" } else { "" };
            lines.push(format!(
                "{}  {}{}",
                mapping.key(),
                mapping.subtitle(),
                proxy
            ));
        }
        lines.join("\n")
    }
}

fn render_mapping_tree(mappings: Vec<StubMapping>) -> String {
    let tree = build_folder_tree(mappings);
    let mut lines = Vec::new();
    // Skip the synthetic root.
    for id in tree.pre_order().skip(1) {
        let Some(node) = tree.get(id) else { continue };
        let indent = "  ".repeat(node.depth.max(0) as usize);
        match &node.kind {
            NodeKind::Folder(folder) => lines.push(format!("{}{}/", indent, folder.name)),
            NodeKind::Item(mapping) => {
                let proxy = if mapping.is_proxy() { "  [proxy]" } else { "" };
                lines.push(format!("{}{}{}", indent, mapping.subtitle(), proxy));
            }
            NodeKind::Root => {}
        }
    }
    lines.join("\n")
}

pub async fn mapping_list(
    client: &AdminClient,
    search_query: Option<&str>,
    case_sensitive: bool,
    tree: bool,
) -> Result<MappingList> {
    let mappings = client.mappings().await?;
    let mappings = search::filter(mappings, search_query.unwrap_or(""), case_sensitive);
    Ok(MappingList {
        count: mappings.len(),
        mappings,
        tree,
    })
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct MappingDetail(pub StubMapping);

impl Output for MappingDetail {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        self.0.code()
    }
}

pub async fn mapping_get(client: &AdminClient, id: &str) -> Result<MappingDetail> {
    Ok(MappingDetail(client.mapping(id).await?))
}

pub async fn mapping_create(client: &AdminClient, file: &str) -> Result<MappingDetail> {
    let mapping: StubMapping = serde_json::from_value(read_json_input(file)?)?;
    Ok(MappingDetail(client.create_mapping(&mapping).await?))
}

pub async fn mapping_update(client: &AdminClient, id: &str, file: &str) -> Result<MappingDetail> {
    let mapping: StubMapping = serde_json::from_value(read_json_input(file)?)?;
    Ok(MappingDetail(client.update_mapping(id, &mapping).await?))
}

// === Generic acknowledgement ===

#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
    pub message: String,
}

impl Ack {
    fn done(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}

impl Output for Ack {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn mapping_delete(client: &AdminClient, id: &str) -> Result<Ack> {
    client.delete_mapping(id).await?;
    Ok(Ack::done(format!("Deleted mapping {}", id)))
}

pub async fn mapping_save(client: &AdminClient) -> Result<Ack> {
    client.save_mappings().await?;
    Ok(Ack::done("Mappings saved to the backing store"))
}

pub async fn mapping_reset(client: &AdminClient) -> Result<Ack> {
    client.reset_mappings().await?;
    Ok(Ack::done("Mappings restored from the backing store"))
}

// === Request journal ===

#[derive(Debug, Serialize)]
pub struct RequestList {
    pub count: usize,
    pub requests: Vec<ServeEvent>,
}

impl Output for RequestList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.count == 0 {
            return "Request journal is empty.".to_string();
        }
        let mut lines = Vec::with_capacity(self.count);
        for event in &self.requests {
            let marker = if event.was_matched { "✓" } else { "✗" };
            lines.push(format!("{} {}  {}", marker, event.title(), event.subtitle()));
        }
        lines.join("\n")
    }
}

pub async fn request_list(
    client: &AdminClient,
    search_query: Option<&str>,
    case_sensitive: bool,
) -> Result<RequestList> {
    let requests = client.requests().await?;
    let requests = search::filter(requests, search_query.unwrap_or(""), case_sensitive);
    Ok(RequestList {
        count: requests.len(),
        requests,
    })
}

#[derive(Debug, Serialize)]
pub struct UnmatchedList {
    pub count: usize,
    pub requests: Vec<LoggedRequest>,
}

impl Output for UnmatchedList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.count == 0 {
            return "No unmatched requests.".to_string();
        }
        let mut lines = Vec::with_capacity(self.count);
        for request in &self.requests {
            let method = request.method.as_deref().unwrap_or("ANY");
            let url = request.url.as_deref().unwrap_or("<no url>");
            lines.push(format!("{} {}", method, url));
        }
        lines.join("\n")
    }
}

pub async fn request_unmatched(
    client: &AdminClient,
    search_query: Option<&str>,
    case_sensitive: bool,
) -> Result<UnmatchedList> {
    let requests = client.unmatched().await?;
    let requests = search::filter(requests, search_query.unwrap_or(""), case_sensitive);
    Ok(UnmatchedList {
        count: requests.len(),
        requests,
    })
}

pub async fn request_clear(client: &AdminClient) -> Result<Ack> {
    client.delete_requests().await?;
    Ok(Ack::done("Request journal cleared"))
}

// === Scenarios ===

#[derive(Debug, Serialize)]
pub struct ScenarioList {
    pub count: usize,
    pub scenarios: Vec<Scenario>,
}

impl Output for ScenarioList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.count == 0 {
            return "No scenarios defined.".to_string();
        }
        let mut lines = Vec::with_capacity(self.count);
        for scenario in &self.scenarios {
            lines.push(format!("{}  [{}]", scenario.name, scenario.state));
        }
        lines.join("\n")
    }
}

pub async fn scenario_list(client: &AdminClient) -> Result<ScenarioList> {
    let scenarios = client.scenarios().await?;
    Ok(ScenarioList {
        count: scenarios.len(),
        scenarios,
    })
}

#[derive(Debug, Serialize)]
pub struct ScenarioShow {
    pub name: String,
    pub state: String,
    pub graph: ScenarioGraph,
}

impl Output for ScenarioShow {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{}  [{}]", self.name, self.state)];
        lines.push(render_graph(&self.graph));
        lines.join("\n")
    }
}

/// Textual rendering of a scenario graph, one transition per line.
pub fn render_graph(graph: &ScenarioGraph) -> String {
    let mut lines = Vec::new();
    for (idx, node) in graph.nodes.iter().enumerate() {
        let current = if graph.current == Some(idx) { " *" } else { "" };
        let kind = match node.kind {
            StateKind::Start => " (start)",
            StateKind::Any => " (any)",
            StateKind::Named => "",
        };
        lines.push(format!("state {}{}{}", node.name, kind, current));
        for link in graph.outgoing(idx) {
            let arrow = match link.route {
                LinkRoute::SelfLoop(_) => "↻".to_string(),
                LinkRoute::Offset(lane) => format!("→ {} (lane {})", graph.nodes[link.to].name, lane),
                LinkRoute::Straight => format!("→ {}", graph.nodes[link.to].name),
            };
            lines.push(format!("  {}  [{}]", arrow, link.label));
        }
    }
    lines.join("\n")
}

pub async fn scenario_show(client: &AdminClient, name: &str) -> Result<ScenarioShow> {
    let scenarios = client.scenarios_with_mappings().await?;
    let scenario = scenarios
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::Other(format!("scenario not found: {}", name)))?;
    Ok(ScenarioShow {
        name: scenario.name.clone(),
        state: scenario.state.clone(),
        graph: ScenarioGraph::derive(&scenario),
    })
}

pub async fn scenario_reset(client: &AdminClient) -> Result<Ack> {
    client.reset_scenarios().await?;
    Ok(Ack::done("All scenarios reset to their start states"))
}

// === Recording ===

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RecordStatus(pub RecordingStatus);

impl Output for RecordStatus {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!("Recorder: {}", self.0.status)
    }
}

#[derive(Debug, Serialize)]
pub struct RecordCaptured {
    pub count: usize,
    pub mappings: Vec<StubMapping>,
}

impl Output for RecordCaptured {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.count == 0 {
            return "No mappings captured.".to_string();
        }
        let mut lines = vec![format!("Captured {} mapping(s):", self.count)];
        for mapping in &self.mappings {
            lines.push(format!("  {}", mapping.subtitle()));
        }
        lines.join("\n")
    }
}

pub async fn record_start(client: &AdminClient, target: &str) -> Result<Ack> {
    client.start_recording(target).await?;
    Ok(Ack::done(format!("Recording traffic to {}", target)))
}

pub async fn record_stop(client: &AdminClient) -> Result<RecordCaptured> {
    let mappings = client.stop_recording().await?;
    Ok(RecordCaptured {
        count: mappings.len(),
        mappings,
    })
}

pub async fn record_snapshot(client: &AdminClient) -> Result<RecordCaptured> {
    let mappings = client.snapshot_recording().await?;
    Ok(RecordCaptured {
        count: mappings.len(),
        mappings,
    })
}

pub async fn record_status(client: &AdminClient) -> Result<RecordStatus> {
    Ok(RecordStatus(client.recording_status().await?))
}

// === Proxy ===

#[derive(Debug, Serialize)]
pub struct ProxyList {
    pub count: usize,
    pub proxies: Vec<ProxyConfig>,
}

impl Output for ProxyList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.count == 0 {
            return "No proxy configurations.".to_string();
        }
        let mut lines = Vec::with_capacity(self.count);
        for proxy in &self.proxies {
            let state = if proxy.enabled { "enabled" } else { "disabled" };
            lines.push(format!(
                "{}  {}  [{}]",
                proxy.id,
                proxy.target_base_url.as_deref().unwrap_or("-"),
                state
            ));
        }
        lines.join("\n")
    }
}

pub async fn proxy_list(client: &AdminClient) -> Result<ProxyList> {
    let proxies = client.proxies().await?;
    Ok(ProxyList {
        count: proxies.len(),
        proxies,
    })
}

pub async fn proxy_set(client: &AdminClient, file: &str) -> Result<Ack> {
    let proxy: ProxyConfig = serde_json::from_value(read_json_input(file)?)?;
    client.update_proxy(&proxy).await?;
    Ok(Ack::done(format!("Proxy {} updated", proxy.id)))
}

pub async fn proxy_delete(client: &AdminClient, id: &str) -> Result<Ack> {
    client.delete_proxy(id).await?;
    Ok(Ack::done(format!("Deleted proxy {}", id)))
}

// === Files and server lifecycle ===

#[derive(Debug, Serialize)]
pub struct FileContent {
    pub name: String,
    pub content: String,
}

impl Output for FileContent {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        self.content.clone()
    }
}

pub async fn file_get(client: &AdminClient, name: &str) -> Result<FileContent> {
    let content = client.file(name).await?;
    Ok(FileContent {
        name: name.to_string(),
        content,
    })
}

pub async fn server_reset(client: &AdminClient) -> Result<Ack> {
    client.reset().await?;
    Ok(Ack::done("Server reset to default state"))
}

pub async fn server_shutdown(client: &AdminClient) -> Result<Ack> {
    client.shutdown().await?;
    Ok(Ack::done("Shutdown requested"))
}

// === Config ===

#[derive(Debug, Serialize)]
pub struct ConfigShow {
    pub url: String,
    pub url_source: String,
    pub human: bool,
    pub config_path: Option<String>,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!(
            "url: {} ({})\noutput: {}\nconfig file: {}",
            self.url,
            self.url_source,
            if self.human { "human" } else { "json" },
            self.config_path.as_deref().unwrap_or("<none>")
        )
    }
}

pub fn config_show(flag_url: Option<&str>, flag_human: bool, config: &SdConfig) -> ConfigShow {
    let resolved = config::resolve_url(flag_url, config);
    ConfigShow {
        url: resolved.url,
        url_source: resolved.source.as_str().to_string(),
        human: config::resolve_human(flag_human, config),
        config_path: config::config_file_path().map(|p| p.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(id: &str, folder: Option<&str>) -> StubMapping {
        let mut value = json!({
            "id": id,
            "request": { "method": "GET", "url": format!("/{}", id) },
            "response": { "status": 200 }
        });
        if let Some(folder) = folder {
            value["metadata"] = json!({ "folder": folder });
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mapping_list_human_empty() {
        let list = MappingList {
            count: 0,
            mappings: vec![],
            tree: false,
        };
        assert_eq!(list.to_human(), "No mappings found.");
    }

    #[test]
    fn test_mapping_list_json_has_count() {
        let list = MappingList {
            count: 1,
            mappings: vec![mapping("m1", None)],
            tree: false,
        };
        let value: serde_json::Value = serde_json::from_str(&list.to_json()).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["mappings"][0]["id"], "m1");
    }

    #[test]
    fn test_render_mapping_tree_indents_by_depth() {
        let rendered = render_mapping_tree(vec![
            mapping("m1", Some("api/users")),
            mapping("m2", None),
        ]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "api/");
        assert_eq!(lines[1], "  users/");
        assert_eq!(lines[2], "    GET /m1");
        assert_eq!(lines[3], "GET /m2");
    }

    #[test]
    fn test_render_graph_marks_current_and_start() {
        let scenario = Scenario {
            name: "checkout".to_string(),
            state: "Started".to_string(),
            possible_states: vec!["Started".to_string()],
            ..Default::default()
        };
        let rendered = render_graph(&ScenarioGraph::derive(&scenario));
        assert!(rendered.contains("state Started (start) *"));
    }

    #[test]
    fn test_ack_output_shapes() {
        let ack = Ack::done("done and dusted");
        assert_eq!(ack.to_human(), "done and dusted");
        let value: serde_json::Value = serde_json::from_str(&ack.to_json()).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_request_list_human_markers() {
        let event: ServeEvent = serde_json::from_value(json!({
            "id": "e1",
            "request": { "method": "GET", "url": "/x" },
            "wasMatched": true
        }))
        .unwrap();
        let list = RequestList {
            count: 1,
            requests: vec![event],
        };
        assert!(list.to_human().starts_with("✓"));
    }
}
