//! Scenario state-machine derivation.
//!
//! Turns a [`Scenario`](super::Scenario) and its mappings into a directed
//! multigraph for the scenarios view: states become nodes, every mapping
//! contributes exactly one transition edge. Routing data (self-loop and
//! parallel-edge lanes) is presentation-only.

use std::collections::HashMap;

use serde::Serialize;

use super::{Scenario, StubMapping};

/// The state every scenario begins in.
pub const START_STATE: &str = "Started";

/// Label for the pseudo-state matching any current state.
pub const ANY_STATE: &str = "(any)";

/// What kind of node a state renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// The scenario's initial state.
    Start,
    /// Pseudo-state for mappings with no required state.
    Any,
    /// An ordinary named state.
    Named,
}

/// A visual node in the scenario graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateNode {
    pub name: String,
    pub kind: StateKind,
}

/// How an edge is routed when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRoute {
    /// Only edge between its endpoints.
    Straight,
    /// One of several parallel same-direction edges; the lane index
    /// offsets the rendered vertex so duplicates stay distinguishable.
    Offset(usize),
    /// Self-loop, numbered per node.
    SelfLoop(usize),
}

/// A transition edge: which mapping fires it and how to draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateLink {
    pub from: usize,
    pub to: usize,
    /// Id of the stub mapping causing this transition.
    pub mapping_id: String,
    /// Short label, usually the mapping's request line.
    pub label: String,
    pub route: LinkRoute,
}

/// Directed multigraph derived from one scenario.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioGraph {
    pub nodes: Vec<StateNode>,
    pub links: Vec<StateLink>,
    /// Index of the scenario's current state, when it maps to a node.
    pub current: Option<usize>,
}

impl ScenarioGraph {
    /// Derive the graph for a scenario.
    ///
    /// Each mapping yields exactly one edge:
    /// - `required -> new` when both states are declared,
    /// - `any -> new` when only the new state is declared,
    /// - a self-loop on `required` (or on `any`) when no new state is
    ///   declared.
    pub fn derive(scenario: &Scenario) -> Self {
        let mut graph = ScenarioGraph::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        let start = scenario_start(scenario);
        let start_node = graph.intern(&mut index, start, StateKind::Start);
        for state in &scenario.possible_states {
            graph.intern(&mut index, state, StateKind::Named);
        }

        for mapping in &scenario.mappings {
            let link = graph.link_for(&mut index, mapping);
            graph.links.push(link);
        }

        graph.route_links();
        // A server that has never served the scenario may report no
        // state; treat that as sitting in the start state.
        graph.current = if scenario.state.is_empty() {
            Some(start_node)
        } else {
            index.get(scenario.state.as_str()).copied()
        };
        graph
    }

    /// Edges leaving `node`, in insertion order.
    pub fn outgoing(&self, node: usize) -> impl Iterator<Item = &StateLink> {
        self.links.iter().filter(move |l| l.from == node)
    }

    fn intern(&mut self, index: &mut HashMap<String, usize>, name: &str, kind: StateKind) -> usize {
        if let Some(&existing) = index.get(name) {
            return existing;
        }
        self.nodes.push(StateNode {
            name: name.to_string(),
            kind,
        });
        let id = self.nodes.len() - 1;
        index.insert(name.to_string(), id);
        id
    }

    fn any_node(&mut self, index: &mut HashMap<String, usize>) -> usize {
        self.intern(index, ANY_STATE, StateKind::Any)
    }

    fn link_for(&mut self, index: &mut HashMap<String, usize>, mapping: &StubMapping) -> StateLink {
        let required = mapping.required_scenario_state.as_deref();
        let new = mapping.new_scenario_state.as_deref();

        let (from, to) = match (required, new) {
            (Some(required), Some(new)) => (
                self.intern(index, required, StateKind::Named),
                self.intern(index, new, StateKind::Named),
            ),
            (None, Some(new)) => {
                let any = self.any_node(index);
                (any, self.intern(index, new, StateKind::Named))
            }
            (Some(required), None) => {
                let node = self.intern(index, required, StateKind::Named);
                (node, node)
            }
            (None, None) => {
                let any = self.any_node(index);
                (any, any)
            }
        };

        StateLink {
            from,
            to,
            mapping_id: mapping.key().to_string(),
            label: mapping_label(mapping),
            route: LinkRoute::Straight,
        }
    }

    /// Assign lanes so self-loops and parallel same-direction edges
    /// render separated.
    fn route_links(&mut self) {
        let mut group_sizes: HashMap<(usize, usize), usize> = HashMap::new();
        for link in &self.links {
            *group_sizes.entry((link.from, link.to)).or_insert(0) += 1;
        }

        let mut seen: HashMap<(usize, usize), usize> = HashMap::new();
        for link in &mut self.links {
            let key = (link.from, link.to);
            let lane = *seen
                .entry(key)
                .and_modify(|n| *n += 1)
                .or_insert(0);
            link.route = if link.from == link.to {
                LinkRoute::SelfLoop(lane)
            } else if group_sizes[&key] > 1 {
                LinkRoute::Offset(lane)
            } else {
                LinkRoute::Straight
            };
        }
    }
}

fn scenario_start(scenario: &Scenario) -> &str {
    if scenario.possible_states.iter().any(|s| s == START_STATE)
        || scenario.possible_states.is_empty()
    {
        START_STATE
    } else {
        // Unusual but possible after a snapshot import: no "Started"
        // among the possible states. Treat the first one as the start.
        &scenario.possible_states[0]
    }
}

fn mapping_label(mapping: &StubMapping) -> String {
    use super::Item;
    match &mapping.name {
        Some(name) => name.clone(),
        None => mapping.subtitle(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(required: Option<&str>, new: Option<&str>) -> StubMapping {
        let mut value = json!({
            "id": format!("{}->{}", required.unwrap_or("*"), new.unwrap_or("*")),
            "scenarioName": "checkout",
            "request": { "method": "GET", "url": "/x" },
            "response": { "status": 200 }
        });
        if let Some(required) = required {
            value["requiredScenarioState"] = json!(required);
        }
        if let Some(new) = new {
            value["newScenarioState"] = json!(new);
        }
        serde_json::from_value(value).unwrap()
    }

    fn scenario(states: &[&str], current: &str, mappings: Vec<StubMapping>) -> Scenario {
        Scenario {
            id: "s1".to_string(),
            name: "checkout".to_string(),
            state: current.to_string(),
            possible_states: states.iter().map(|s| s.to_string()).collect(),
            mappings,
        }
    }

    fn node(graph: &ScenarioGraph, name: &str) -> usize {
        graph.nodes.iter().position(|n| n.name == name).unwrap()
    }

    #[test]
    fn test_each_mapping_yields_exactly_one_edge() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started", "Paid"],
            "Started",
            vec![
                mapping(Some("Started"), Some("Paid")),
                mapping(Some("Paid"), None),
                mapping(None, Some("Started")),
            ],
        ));
        assert_eq!(graph.links.len(), 3);
    }

    #[test]
    fn test_missing_required_state_edges_from_any() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started", "B"],
            "Started",
            vec![mapping(None, Some("B"))],
        ));
        assert_eq!(graph.links.len(), 1);
        let link = &graph.links[0];
        assert_eq!(graph.nodes[link.from].kind, StateKind::Any);
        assert_eq!(graph.nodes[link.to].name, "B");
    }

    #[test]
    fn test_any_node_absent_when_all_mappings_declare_required() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started", "Paid"],
            "Started",
            vec![mapping(Some("Started"), Some("Paid"))],
        ));
        assert!(graph.nodes.iter().all(|n| n.kind != StateKind::Any));
    }

    #[test]
    fn test_missing_new_state_becomes_self_loop() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started"],
            "Started",
            vec![mapping(Some("Started"), None)],
        ));
        let link = &graph.links[0];
        assert_eq!(link.from, link.to);
        assert_eq!(link.route, LinkRoute::SelfLoop(0));
    }

    #[test]
    fn test_parallel_edges_get_distinct_lanes() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started", "Paid"],
            "Started",
            vec![
                mapping(Some("Started"), Some("Paid")),
                mapping(Some("Started"), Some("Paid")),
            ],
        ));
        assert_eq!(graph.links[0].route, LinkRoute::Offset(0));
        assert_eq!(graph.links[1].route, LinkRoute::Offset(1));
    }

    #[test]
    fn test_self_loops_numbered_per_node() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started"],
            "Started",
            vec![
                mapping(Some("Started"), None),
                mapping(Some("Started"), None),
            ],
        ));
        assert_eq!(graph.links[0].route, LinkRoute::SelfLoop(0));
        assert_eq!(graph.links[1].route, LinkRoute::SelfLoop(1));
    }

    #[test]
    fn test_states_referenced_only_by_mappings_are_created() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started"],
            "Started",
            vec![mapping(Some("Started"), Some("Shipped"))],
        ));
        assert!(graph.nodes.iter().any(|n| n.name == "Shipped"));
    }

    #[test]
    fn test_current_state_is_marked() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started", "Paid"],
            "Paid",
            vec![mapping(Some("Started"), Some("Paid"))],
        ));
        assert_eq!(graph.current, Some(node(&graph, "Paid")));
    }

    #[test]
    fn test_empty_reported_state_falls_back_to_start() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started", "Paid"],
            "",
            vec![mapping(Some("Started"), Some("Paid"))],
        ));
        assert_eq!(graph.current, Some(node(&graph, "Started")));

        // Without "Started" among the possible states, the first one
        // stands in as the start.
        let graph = ScenarioGraph::derive(&scenario(&["Ready"], "", vec![]));
        assert_eq!(graph.current, Some(node(&graph, "Ready")));
    }

    #[test]
    fn test_mapping_with_no_states_loops_on_any() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started"],
            "Started",
            vec![mapping(None, None)],
        ));
        let link = &graph.links[0];
        assert_eq!(link.from, link.to);
        assert_eq!(graph.nodes[link.from].kind, StateKind::Any);
    }

    #[test]
    fn test_outgoing_filters_by_source() {
        let graph = ScenarioGraph::derive(&scenario(
            &["Started", "Paid"],
            "Started",
            vec![
                mapping(Some("Started"), Some("Paid")),
                mapping(Some("Paid"), Some("Started")),
            ],
        ));
        let started = node(&graph, "Started");
        assert_eq!(graph.outgoing(started).count(), 1);
    }
}
