//! Scenarios view - scenario list plus the transition graph pane.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::models::Scenario;
use crate::models::scenario::{LinkRoute, ScenarioGraph, StateKind};

/// State for the scenarios view.
pub struct ScenariosView {
    scenarios: Vec<Scenario>,
    graph: Option<ScenarioGraph>,
    selected: usize,
    list_state: ListState,
}

impl Default for ScenariosView {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenariosView {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            scenarios: Vec::new(),
            graph: None,
            selected: 0,
            list_state,
        }
    }

    /// Replace the scenario list (mappings already joined in).
    pub fn update(&mut self, scenarios: Vec<Scenario>) {
        self.scenarios = scenarios;
        if self.selected >= self.scenarios.len() {
            self.selected = self.scenarios.len().saturating_sub(1);
        }
        self.list_state.select(Some(self.selected));
        self.rederive();
    }

    fn rederive(&mut self) {
        self.graph = self
            .scenarios
            .get(self.selected)
            .map(ScenarioGraph::derive);
    }

    pub fn selected_scenario(&self) -> Option<&Scenario> {
        self.scenarios.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.scenarios.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.scenarios.len() - 1);
        self.list_state.select(Some(self.selected));
        self.rederive();
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.list_state.select(Some(self.selected));
        self.rederive();
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.list_state.select(Some(0));
        self.rederive();
    }

    pub fn select_last(&mut self) {
        if self.scenarios.is_empty() {
            return;
        }
        self.selected = self.scenarios.len() - 1;
        self.list_state.select(Some(self.selected));
        self.rederive();
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let items: Vec<ListItem> = self
            .scenarios
            .iter()
            .map(|s| ListItem::new(format!("{}  [{}]", s.name, s.state)))
            .collect();

        let title = format!(" Scenarios ({}) ", self.scenarios.len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let graph_lines = match &self.graph {
            Some(graph) => graph_lines(graph),
            None => vec![Line::from("No scenario selected")],
        };
        let pane = Paragraph::new(graph_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" State machine "),
        );
        frame.render_widget(pane, chunks[1]);
    }
}

/// Render the transition graph one state block at a time. The current
/// state is highlighted; self-loops and parallel lanes are annotated.
fn graph_lines(graph: &ScenarioGraph) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, node) in graph.nodes.iter().enumerate() {
        let mut style = Style::default();
        if graph.current == Some(idx) {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        let suffix = match node.kind {
            StateKind::Start => " (start)",
            StateKind::Any => " (any)",
            StateKind::Named => "",
        };
        let marker = if graph.current == Some(idx) { " ●" } else { "" };
        lines.push(Line::styled(
            format!("{}{}{}", node.name, suffix, marker),
            style,
        ));
        for link in graph.outgoing(idx) {
            let text = match link.route {
                LinkRoute::SelfLoop(_) => format!("  ↻  [{}]", link.label),
                LinkRoute::Offset(lane) => format!(
                    "  → {} (lane {})  [{}]",
                    graph.nodes[link.to].name, lane, link.label
                ),
                LinkRoute::Straight => {
                    format!("  → {}  [{}]", graph.nodes[link.to].name, link.label)
                }
            };
            lines.push(Line::styled(text, Style::default().fg(Color::DarkGray)));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario(name: &str, state: &str) -> Scenario {
        let mapping = serde_json::from_value(json!({
            "id": format!("{}-m", name),
            "scenarioName": name,
            "requiredScenarioState": "Started",
            "newScenarioState": "Done",
            "request": { "method": "GET", "url": "/x" },
            "response": { "status": 200 }
        }))
        .unwrap();
        Scenario {
            id: name.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            possible_states: vec!["Started".to_string(), "Done".to_string()],
            mappings: vec![mapping],
        }
    }

    #[test]
    fn test_update_derives_graph_for_selection() {
        let mut view = ScenariosView::new();
        view.update(vec![scenario("a", "Started"), scenario("b", "Done")]);
        assert!(view.graph.is_some());
        assert_eq!(view.selected_scenario().unwrap().name, "a");
    }

    #[test]
    fn test_navigation_rederives_graph() {
        let mut view = ScenariosView::new();
        view.update(vec![scenario("a", "Started"), scenario("b", "Done")]);
        view.select_next();
        assert_eq!(view.selected_scenario().unwrap().name, "b");
        // b's current state is Done; the derived graph marks it.
        let graph = view.graph.as_ref().unwrap();
        let current = graph.current.unwrap();
        assert_eq!(graph.nodes[current].name, "Done");
    }

    #[test]
    fn test_empty_update_clears_graph() {
        let mut view = ScenariosView::new();
        view.update(vec![scenario("a", "Started")]);
        view.update(Vec::new());
        assert!(view.graph.is_none());
        assert!(view.selected_scenario().is_none());
    }
}
