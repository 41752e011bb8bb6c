//! Matched and unmatched request views.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::models::{Identified, Item, LoggedRequest, ServeEvent};
use crate::search;

/// Journaled requests a mapping answered.
pub struct MatchedView {
    all: Vec<ServeEvent>,
    events: Vec<ServeEvent>,
    selected: usize,
    list_state: ListState,
}

impl Default for MatchedView {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchedView {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            all: Vec::new(),
            events: Vec::new(),
            selected: 0,
            list_state,
        }
    }

    pub fn update(&mut self, events: Vec<ServeEvent>, query: &str) {
        self.all = events;
        self.rebuild(query);
    }

    pub fn rebuild(&mut self, query: &str) {
        self.events = search::filter(self.all.clone(), query, false);
        if self.selected >= self.events.len() {
            self.selected = self.events.len().saturating_sub(1);
        }
        self.list_state.select(Some(self.selected));
    }

    pub fn select_next(&mut self) {
        if self.events.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.events.len() - 1);
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
        if self.events.is_empty() {
            return;
        }
        self.selected = self.events.len() - 1;
        self.list_state.select(Some(self.selected));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let items: Vec<ListItem> = self
            .events
            .iter()
            .map(|event| {
                let marker = if event.was_matched { "✓" } else { "✗" };
                let line = format!("{} {}  {}", marker, event.title(), event.subtitle());
                if event.was_matched {
                    ListItem::new(line)
                } else {
                    ListItem::new(line).style(Style::default().fg(Color::Red))
                }
            })
            .collect();

        let title = format!(" Matched ({}) ", self.events.len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let code = self
            .events
            .get(self.selected)
            .map(|e| e.code())
            .unwrap_or_default();
        let detail = Paragraph::new(code)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Detail "));
        frame.render_widget(detail, chunks[1]);
    }
}

/// Requests no mapping matched. The server returns these without ids,
/// so each gets a generated one on arrival.
pub struct UnmatchedView {
    all: Vec<LoggedRequest>,
    requests: Vec<Identified<LoggedRequest>>,
    selected: usize,
    list_state: ListState,
}

impl Default for UnmatchedView {
    fn default() -> Self {
        Self::new()
    }
}

impl UnmatchedView {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            all: Vec::new(),
            requests: Vec::new(),
            selected: 0,
            list_state,
        }
    }

    pub fn update(&mut self, requests: Vec<LoggedRequest>, query: &str) {
        self.all = requests;
        self.rebuild(query);
    }

    /// Re-filter after a query change. Ids are regenerated, which is
    /// fine: selection is positional and the records carry none.
    pub fn rebuild(&mut self, query: &str) {
        let filtered = search::filter(self.all.clone(), query, false);
        self.requests = filtered.into_iter().map(Identified::new).collect();
        if self.selected >= self.requests.len() {
            self.selected = self.requests.len().saturating_sub(1);
        }
        self.list_state.select(Some(self.selected));
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn select_next(&mut self) {
        if self.requests.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.requests.len() - 1);
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
        if self.requests.is_empty() {
            return;
        }
        self.selected = self.requests.len() - 1;
        self.list_state.select(Some(self.selected));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let items: Vec<ListItem> = self
            .requests
            .iter()
            .map(|request| ListItem::new(request.title()))
            .collect();

        let title = format!(" Unmatched ({}) ", self.requests.len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let code = self
            .requests
            .get(self.selected)
            .map(|r| r.code())
            .unwrap_or_default();
        let detail = Paragraph::new(code)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Detail "));
        frame.render_widget(detail, chunks[1]);
    }
}
