//! Recording view - recorder status and start/stop/snapshot control.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::models::{Item, RecordingStatus, StubMapping};

/// State for the recording view.
#[derive(Default)]
pub struct RecordingView {
    status: RecordingStatus,
    /// Target URL being typed for the next recording session.
    pub target_input: String,
    /// Whether keystrokes currently edit the target field.
    pub editing_target: bool,
    /// Mappings captured by the last stop/snapshot.
    captured: Vec<StubMapping>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: RecordingStatus) {
        self.status = status;
    }

    pub fn is_recording(&self) -> bool {
        self.status.is_recording()
    }

    pub fn set_captured(&mut self, mappings: Vec<StubMapping>) {
        self.captured = mappings;
    }

    /// Target for a new session, if one has been typed.
    pub fn target(&self) -> Option<&str> {
        let trimmed = self.target_input.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    pub fn push_input(&mut self, c: char) {
        self.target_input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.target_input.pop();
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // status
                Constraint::Length(3), // target input
                Constraint::Min(3),    // captured mappings
            ])
            .split(area);

        let (status_text, status_color) = if self.is_recording() {
            ("● Recording", Color::Red)
        } else {
            ("○ Stopped", Color::DarkGray)
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().fg(status_color))
            .block(Block::default().borders(Borders::ALL).title(" Recorder "));
        frame.render_widget(status, chunks[0]);

        let input_style = if self.editing_target {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let input_title = if self.editing_target {
            " Target (editing, Enter to confirm) "
        } else {
            " Target (t to edit) "
        };
        let input = Paragraph::new(self.target_input.as_str())
            .style(input_style)
            .block(Block::default().borders(Borders::ALL).title(input_title));
        frame.render_widget(input, chunks[1]);

        let items: Vec<ListItem> = self
            .captured
            .iter()
            .map(|m| ListItem::new(m.subtitle()))
            .collect();
        let title = format!(" Captured ({}) ", self.captured.len());
        let captured =
            List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(captured, chunks[2]);
    }
}
