//! TUI application - main event loop and terminal management.
//!
//! The loop multiplexes four inputs on the tokio runtime: keyboard
//! events, push notifications from the event socket, debounce deadlines,
//! and a render tick. All state lives on this single task; the socket
//! task only forwards events over a channel.

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{info, warn};

use crate::Result;
use crate::client::{AdminClient, RefreshDebouncer, Topic};

use super::connection::{ConnectionState, reconnect_delay};
use super::notifications::Toasts;
use super::views::{MappingsView, MatchedView, RecordingView, ScenariosView, UnmatchedView};

/// Render/input tick.
const TICK: Duration = Duration::from_millis(100);

/// Active view in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveView {
    Mappings,
    Matched,
    Unmatched,
    Scenarios,
    Recording,
}

impl ActiveView {
    fn next(self) -> Self {
        match self {
            ActiveView::Mappings => ActiveView::Matched,
            ActiveView::Matched => ActiveView::Unmatched,
            ActiveView::Unmatched => ActiveView::Scenarios,
            ActiveView::Scenarios => ActiveView::Recording,
            ActiveView::Recording => ActiveView::Mappings,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ActiveView::Mappings => "[1] Mappings",
            ActiveView::Matched => "[2] Matched",
            ActiveView::Unmatched => "[3] Unmatched",
            ActiveView::Scenarios => "[4] Scenarios",
            ActiveView::Recording => "[5] Recording",
        }
    }
}

const ALL_VIEWS: [ActiveView; 5] = [
    ActiveView::Mappings,
    ActiveView::Matched,
    ActiveView::Unmatched,
    ActiveView::Scenarios,
    ActiveView::Recording,
];

/// Events forwarded from the socket task.
#[derive(Debug)]
enum SocketEvent {
    Connected,
    Topic(Topic),
    Closed { attempt: u32 },
}

/// TUI application state.
struct App {
    client: AdminClient,
    connection: ConnectionState,
    active_view: ActiveView,
    mappings: MappingsView,
    matched: MatchedView,
    unmatched: UnmatchedView,
    scenarios: ScenariosView,
    recording: RecordingView,
    toasts: Toasts,
    debouncer: RefreshDebouncer,
    search_query: String,
    search_mode: bool,
    should_quit: bool,
    last_key: Option<KeyCode>,
}

impl App {
    fn new(client: AdminClient) -> Self {
        Self {
            client,
            connection: ConnectionState::Reconnecting { attempt: 1 },
            active_view: ActiveView::Mappings,
            mappings: MappingsView::new(),
            matched: MatchedView::new(),
            unmatched: UnmatchedView::new(),
            scenarios: ScenariosView::new(),
            recording: RecordingView::new(),
            toasts: Toasts::new(),
            debouncer: RefreshDebouncer::new(),
            search_query: String::new(),
            search_mode: false,
            should_quit: false,
            last_key: None,
        }
    }

    /// Schedule every topic for refresh, debounced.
    fn schedule_all(&mut self) {
        let now = Instant::now();
        for topic in [
            Topic::Mappings,
            Topic::Matched,
            Topic::Unmatched,
            Topic::Scenario,
            Topic::Recording,
        ] {
            self.debouncer.schedule(topic, now);
        }
    }

    async fn refresh_topic(&mut self, topic: Topic) {
        let result = match topic {
            Topic::Mappings => match self.client.mappings().await {
                Ok(mappings) => {
                    self.mappings.update(mappings, &self.search_query);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Topic::Matched => match self.client.requests().await {
                Ok(events) => {
                    self.matched.update(events, &self.search_query);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Topic::Unmatched => match self.client.unmatched().await {
                Ok(requests) => {
                    self.unmatched.update(requests, &self.search_query);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Topic::Scenario => match self.client.scenarios_with_mappings().await {
                Ok(scenarios) => {
                    self.scenarios.update(scenarios);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Topic::Recording => match self.client.recording_status().await {
                Ok(status) => {
                    self.recording.set_status(status);
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };
        if let Err(e) = result {
            warn!(topic = topic.as_str(), error = %e, "refresh failed");
            self.toasts
                .admin_error(&format!("refresh {}", topic.as_str()), &e);
        }
    }

    fn handle_socket_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Connected => {
                self.connection = ConnectionState::Connected;
                // Everything may have changed while disconnected.
                self.schedule_all();
            }
            SocketEvent::Topic(topic) => {
                self.debouncer.schedule(topic, Instant::now());
            }
            SocketEvent::Closed { attempt } => {
                self.connection = ConnectionState::Reconnecting { attempt };
            }
        }
    }

    async fn handle_key(&mut self, key: KeyCode) {
        if self.search_mode {
            self.handle_search_key(key);
            return;
        }
        if self.active_view == ActiveView::Recording && self.recording.editing_target {
            match key {
                KeyCode::Enter | KeyCode::Esc => self.recording.editing_target = false,
                KeyCode::Backspace => self.recording.pop_input(),
                KeyCode::Char(c) => self.recording.push_input(c),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.active_view = self.active_view.next(),
            KeyCode::Char('1') => self.active_view = ActiveView::Mappings,
            KeyCode::Char('2') => self.active_view = ActiveView::Matched,
            KeyCode::Char('3') => self.active_view = ActiveView::Unmatched,
            KeyCode::Char('4') => self.active_view = ActiveView::Scenarios,
            KeyCode::Char('5') => self.active_view = ActiveView::Recording,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('g') => {
                // gg jumps to the top.
                if self.last_key == Some(KeyCode::Char('g')) {
                    self.select_first();
                    self.last_key = None;
                    return;
                }
            }
            KeyCode::Char('G') | KeyCode::End => self.select_last(),
            KeyCode::Home => self.select_first(),
            KeyCode::Char('/') => self.search_mode = true,
            KeyCode::Char('c') => {
                if self.active_view == ActiveView::Mappings {
                    self.mappings.toggle_collapse();
                }
            }
            KeyCode::Char('r') => self.schedule_all(),
            KeyCode::Char('t') if self.active_view == ActiveView::Recording => {
                self.recording.editing_target = true;
            }
            KeyCode::Char('s') if self.active_view == ActiveView::Recording => {
                self.start_recording().await;
            }
            KeyCode::Char('x') if self.active_view == ActiveView::Recording => {
                self.stop_recording().await;
            }
            KeyCode::Char('n') if self.active_view == ActiveView::Recording => {
                self.snapshot_recording().await;
            }
            KeyCode::Char('R') if self.active_view == ActiveView::Scenarios => {
                self.reset_scenarios().await;
            }
            _ => {}
        }
        self.last_key = Some(key);
    }

    fn handle_search_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.search_mode = false,
            KeyCode::Esc => {
                self.search_mode = false;
                self.search_query.clear();
                self.reapply_search();
            }
            KeyCode::Backspace => {
                self.search_query.pop();
                self.reapply_search();
            }
            KeyCode::Char(c) => {
                self.search_query.push(c);
                self.reapply_search();
            }
            _ => {}
        }
    }

    fn reapply_search(&mut self) {
        self.mappings.rebuild(&self.search_query);
        self.matched.rebuild(&self.search_query);
        self.unmatched.rebuild(&self.search_query);
    }

    async fn start_recording(&mut self) {
        let Some(target) = self.recording.target().map(str::to_string) else {
            self.toasts.error("No recording target set (press t)");
            return;
        };
        match self.client.start_recording(&target).await {
            Ok(()) => {
                info!(target, "recording started");
                self.toasts.success(format!("Recording to {}", target));
                self.debouncer.schedule(Topic::Recording, Instant::now());
            }
            Err(e) => self.toasts.admin_error("start recording", &e),
        }
    }

    async fn stop_recording(&mut self) {
        match self.client.stop_recording().await {
            Ok(mappings) => {
                self.toasts
                    .success(format!("Captured {} mapping(s)", mappings.len()));
                self.recording.set_captured(mappings);
                self.schedule_all();
            }
            Err(e) => self.toasts.admin_error("stop recording", &e),
        }
    }

    async fn snapshot_recording(&mut self) {
        match self.client.snapshot_recording().await {
            Ok(mappings) => {
                self.toasts
                    .success(format!("Snapshot captured {} mapping(s)", mappings.len()));
                self.recording.set_captured(mappings);
                self.debouncer.schedule(Topic::Mappings, Instant::now());
            }
            Err(e) => self.toasts.admin_error("snapshot", &e),
        }
    }

    async fn reset_scenarios(&mut self) {
        match self.client.reset_scenarios().await {
            Ok(()) => {
                self.toasts.success("Scenarios reset");
                self.debouncer.schedule(Topic::Scenario, Instant::now());
            }
            Err(e) => self.toasts.admin_error("reset scenarios", &e),
        }
    }

    fn select_next(&mut self) {
        match self.active_view {
            ActiveView::Mappings => self.mappings.select_next(),
            ActiveView::Matched => self.matched.select_next(),
            ActiveView::Unmatched => self.unmatched.select_next(),
            ActiveView::Scenarios => self.scenarios.select_next(),
            ActiveView::Recording => {}
        }
    }

    fn select_previous(&mut self) {
        match self.active_view {
            ActiveView::Mappings => self.mappings.select_previous(),
            ActiveView::Matched => self.matched.select_previous(),
            ActiveView::Unmatched => self.unmatched.select_previous(),
            ActiveView::Scenarios => self.scenarios.select_previous(),
            ActiveView::Recording => {}
        }
    }

    fn select_first(&mut self) {
        match self.active_view {
            ActiveView::Mappings => self.mappings.select_first(),
            ActiveView::Matched => self.matched.select_first(),
            ActiveView::Unmatched => self.unmatched.select_first(),
            ActiveView::Scenarios => self.scenarios.select_first(),
            ActiveView::Recording => {}
        }
    }

    fn select_last(&mut self) {
        match self.active_view {
            ActiveView::Mappings => self.mappings.select_last(),
            ActiveView::Matched => self.matched.select_last(),
            ActiveView::Unmatched => self.unmatched.select_last(),
            ActiveView::Scenarios => self.scenarios.select_last(),
            ActiveView::Recording => {}
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // title bar
                Constraint::Min(5),    // main content
                Constraint::Length(3), // status bar
            ])
            .split(area);

        self.render_title_bar(frame, chunks[0]);

        match self.active_view {
            ActiveView::Mappings => self.mappings.render(frame, chunks[1]),
            ActiveView::Matched => self.matched.render(frame, chunks[1]),
            ActiveView::Unmatched => self.unmatched.render(frame, chunks[1]),
            ActiveView::Scenarios => self.scenarios.render(frame, chunks[1]),
            ActiveView::Recording => self.recording.render(frame, chunks[1]),
        }

        self.render_status_bar(frame, chunks[2]);
        self.render_toasts(frame, area);
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let (indicator, color, text) = match &self.connection {
            ConnectionState::Connected => ("●", Color::Green, "Connected".to_string()),
            ConnectionState::Reconnecting { attempt } => (
                "○",
                Color::Yellow,
                format!("Reconnecting (attempt {})...", attempt),
            ),
        };

        let mut spans: Vec<Span> = Vec::new();
        for (i, view) in ALL_VIEWS.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" | "));
            }
            let style = if *view == self.active_view {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(view.label(), style));
        }

        let tabs_width: usize = spans.iter().map(|s| s.content.len()).sum();
        let status_display = format!("[{}] {}", indicator, text);
        let padding = area
            .width
            .saturating_sub(tabs_width as u16 + status_display.len() as u16 + 4);
        spans.push(Span::raw(" ".repeat(padding as usize)));
        spans.push(Span::styled(status_display, Style::default().fg(color)));

        let title =
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let text = if self.search_mode {
            format!(" /{}▏ (Enter to keep, Esc to clear)", self.search_query)
        } else if !self.search_query.is_empty() {
            format!(
                " /{}  Tab/1-5:View  j/k:Move  /:Search  c:Fold  r:Refresh  q:Quit",
                self.search_query
            )
        } else {
            " Tab/1-5:View  j/k:Move  /:Search  c:Fold  r:Refresh  s/x/n:Record  q:Quit"
                .to_string()
        };
        let style = if self.search_mode {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let status = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }

    fn render_toasts(&self, frame: &mut Frame, area: Rect) {
        if self.toasts.is_empty() {
            return;
        }
        let width = (area.width / 2).clamp(20, 60);
        let mut y = area.y + 1;
        for toast in self.toasts.visible() {
            let rect = Rect {
                x: area.x + area.width.saturating_sub(width + 1),
                y,
                width,
                height: 3,
            };
            let text = format!("{} {}", toast.level.icon(), toast.message);
            let widget = Paragraph::new(text).style(Style::default().fg(toast.level.color())).block(
                Block::default().borders(Borders::ALL),
            );
            frame.render_widget(Clear, rect);
            frame.render_widget(widget, rect);
            y += 3;
        }
        let overflow = self.toasts.overflow();
        if overflow > 0 {
            let rect = Rect {
                x: area.x + area.width.saturating_sub(width + 1),
                y,
                width,
                height: 1,
            };
            let widget = Paragraph::new(format!("(+{} more)", overflow))
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(Clear, rect);
            frame.render_widget(widget, rect);
        }
    }
}

/// Forward socket events to the app, reconnecting forever on a fixed
/// delay.
async fn socket_task(events_url: String, tx: mpsc::UnboundedSender<SocketEvent>) {
    let mut attempt: u32 = 1;
    loop {
        match tokio_tungstenite::connect_async(&events_url).await {
            Ok((ws_stream, _response)) => {
                attempt = 1;
                if tx.send(SocketEvent::Connected).is_err() {
                    return;
                }
                let (_write, mut read) = ws_stream.split();
                while let Some(message) = read.next().await {
                    match message {
                        Ok(WsMessage::Text(text)) => {
                            if let Some(topic) = Topic::parse(&text) {
                                if tx.send(SocketEvent::Topic(topic)).is_err() {
                                    return;
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, attempt, "event socket connect failed");
            }
        }
        if tx.send(SocketEvent::Closed { attempt }).is_err() {
            return;
        }
        tokio::time::sleep(reconnect_delay(attempt)).await;
        attempt = attempt.saturating_add(1);
    }
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Route tracing to a log file; the terminal belongs to the UI.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = dirs::data_local_dir()?.join("stubdeck").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::daily(dir, "tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Some(guard)
}

/// Run the console against the server at `base_url`.
pub async fn run(base_url: &str) -> Result<()> {
    let _log_guard = init_logging();
    let client = AdminClient::new(base_url)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let socket = tokio::spawn(socket_task(client.events_url(), tx));

    let mut app = App::new(client);
    app.schedule_all();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut app, &mut terminal, &mut rx).await;

    socket.abort();
    restore_terminal()?;
    result
}

async fn event_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    rx: &mut mpsc::UnboundedReceiver<SocketEvent>,
) -> Result<()> {
    loop {
        app.toasts.cleanup();

        for topic in app.debouncer.due(Instant::now()) {
            app.refresh_topic(topic).await;
        }

        terminal.draw(|f| app.render(f))?;

        tokio::select! {
            _ = tokio::time::sleep(TICK) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            app.handle_key(key.code).await;
                        }
                    }
                }
            }
            socket_event = rx.recv() => {
                if let Some(socket_event) = socket_event {
                    app.handle_socket_event(socket_event);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
