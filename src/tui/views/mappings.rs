//! Mappings view - the foldered stub mapping tree with a detail pane.

use std::collections::HashSet;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::models::tree::{NodeId, NodeKind, Tree, build_folder_tree};
use crate::models::{Item, StubMapping};
use crate::search;

/// State for the mappings tree view.
pub struct MappingsView {
    /// Unfiltered mappings from the last refresh.
    all: Vec<StubMapping>,
    tree: Tree<StubMapping>,
    /// Visible rows (root excluded), recomputed on every change.
    rows: Vec<NodeId>,
    selected: usize,
    list_state: ListState,
    /// Folder paths the user collapsed; survives rebuilds.
    collapsed: HashSet<String>,
}

impl Default for MappingsView {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingsView {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            all: Vec::new(),
            tree: Tree::new(),
            rows: Vec::new(),
            selected: 0,
            list_state,
            collapsed: HashSet::new(),
        }
    }

    pub fn mapping_count(&self) -> usize {
        self.all.len()
    }

    /// Replace the data set and rebuild the tree under the given query.
    pub fn update(&mut self, mappings: Vec<StubMapping>, query: &str) {
        self.all = mappings;
        self.rebuild(query);
    }

    /// Rebuild the tree after a query change, keeping the data set.
    pub fn rebuild(&mut self, query: &str) {
        let filtered = search::filter(self.all.clone(), query, false);
        self.tree = build_folder_tree(filtered);

        // Reapply remembered collapse state to surviving folders.
        let folder_ids: Vec<NodeId> = self
            .tree
            .pre_order()
            .filter(|&id| {
                self.tree
                    .get(id)
                    .map(|n| n.kind.is_folder())
                    .unwrap_or(false)
            })
            .collect();
        for id in folder_ids {
            if let Some(node) = self.tree.get_mut(id) {
                if self.collapsed.contains(node.kind.id()) {
                    node.collapsed = true;
                }
            }
        }

        self.refresh_rows();
    }

    fn refresh_rows(&mut self) {
        self.rows = self.tree.visible().skip(1).collect();
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
        self.list_state.select(Some(self.selected));
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.rows.len() - 1);
        self.list_state.select(Some(self.selected));
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.list_state.select(Some(self.selected));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.list_state.select(Some(0));
    }

    pub fn select_last(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = self.rows.len() - 1;
        self.list_state.select(Some(self.selected));
    }

    /// Collapse or expand the selected folder.
    pub fn toggle_collapse(&mut self) {
        let Some(&row) = self.rows.get(self.selected) else {
            return;
        };
        let Some(node) = self.tree.get_mut(row) else {
            return;
        };
        if !node.kind.is_folder() {
            return;
        }
        node.collapsed = !node.collapsed;
        let path = node.kind.id().to_string();
        if node.collapsed {
            self.collapsed.insert(path);
        } else {
            self.collapsed.remove(&path);
        }
        self.refresh_rows();
    }

    /// Id of the selected mapping, when a mapping row is selected.
    pub fn selected_mapping_id(&self) -> Option<&str> {
        let row = *self.rows.get(self.selected)?;
        match &self.tree.get(row)?.kind {
            NodeKind::Item(mapping) => Some(mapping.key()),
            _ => None,
        }
    }

    fn selected_code(&self) -> Option<String> {
        let row = *self.rows.get(self.selected)?;
        match &self.tree.get(row)?.kind {
            NodeKind::Item(mapping) => Some(mapping.code()),
            NodeKind::Folder(folder) => Some(format!("folder: {}", folder.path)),
            NodeKind::Root => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .filter_map(|&id| self.tree.get(id))
            .map(|node| {
                let indent = "  ".repeat(node.depth.max(0) as usize);
                match &node.kind {
                    NodeKind::Folder(folder) => {
                        let icon = if node.collapsed { "▸" } else { "▾" };
                        ListItem::new(format!("{}{} {}/", indent, icon, folder.name))
                            .style(Style::default().fg(Color::Cyan))
                    }
                    NodeKind::Item(mapping) => {
                        let proxy = if mapping.is_proxy() { "  [proxy]" } else { "" };
                        let line = format!("{}{}{}", indent, mapping.subtitle(), proxy);
                        if mapping.is_proxy() {
                            ListItem::new(line).style(Style::default().fg(Color::Yellow))
                        } else {
                            ListItem::new(line)
                        }
                    }
                    NodeKind::Root => ListItem::new(""),
                }
            })
            .collect();

        let title = format!(" Mappings ({}) ", self.mapping_count());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let code = self.selected_code().unwrap_or_default();
        let detail = Paragraph::new(code)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Detail "));
        frame.render_widget(detail, chunks[1]);
    }
}
