//! Headless mode for the polchat TUI.
//!
//! This module runs the TUI without a real terminal, enabling E2E testing
//! and automation. Events are sent via channels, submissions go through a
//! caller-supplied [`Transport`], and screen state is captured after each
//! render.

use crate::app::App;
use crate::event::Event;
use crate::screens::render_app;
use crate::{poll_submission, spawn_submission};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use polchat_engine::{Phase, SessionEvent, Transport};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone)]
pub struct HeadlessState {
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Request phase.
    pub phase: Phase,
    /// Messages in the conversation, greeting included.
    pub message_count: usize,
    /// Pending attachments.
    pub attachment_count: usize,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            screen_contents: String::new(),
            phase: Phase::Idle,
            message_count: 0,
            attachment_count: 0,
            should_quit: false,
            show_help: false,
        }
    }
}

impl HeadlessState {
    fn capture(app: &App, buffer: &Buffer) -> Self {
        Self {
            screen_contents: buffer_to_string(buffer),
            phase: app.session.phase(),
            message_count: app.session.messages().len(),
            attachment_count: app.session.attachments().len(),
            should_quit: app.should_quit,
            show_help: app.show_help,
        }
    }
}

/// Handle to control a headless TUI instance.
///
/// Use this to send input and observe state changes.
pub struct HeadlessHandle {
    event_tx: mpsc::UnboundedSender<Event>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send an event to the TUI.
    ///
    /// Returns `true` if the event was sent successfully.
    pub fn send_event(&self, event: Event) -> bool {
        self.event_tx.send(event).is_ok()
    }

    /// Send a key press with modifiers.
    pub fn send_key_with(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.send_event(Event::Key(KeyEvent::new(code, modifiers)))
    }

    /// Send a plain key press.
    pub fn send_key(&self, code: KeyCode) -> bool {
        self.send_key_with(code, KeyModifiers::NONE)
    }

    /// Type `text` one character at a time.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.send_key(KeyCode::Char(c)))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait for the state to change, with a timeout.
    ///
    /// Returns `true` if state changed, `false` if timed out.
    pub async fn wait_for_change(&mut self, timeout: std::time::Duration) -> bool {
        tokio::time::timeout(timeout, self.state_rx.changed())
            .await
            .is_ok()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(
        &mut self,
        condition: F,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the TUI task ended
                Ok(Err(_)) | Err(_) => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(
        &mut self,
        text: &str,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState> {
        let text = text.to_string();
        self.wait_for(|s| s.screen_contents.contains(&text), timeout)
            .await
    }

    /// Wait for the request phase.
    pub async fn wait_for_phase(
        &mut self,
        phase: Phase,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState> {
        self.wait_for(|s| s.phase == phase, timeout).await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 50, // Faster tick rate for testing
        }
    }
}

/// Run the TUI in headless mode.
///
/// Returns a handle to control the TUI and a join handle for the background task.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(app, transport, HeadlessConfig::default());
///
/// handle.type_text("What is the leave policy?");
/// handle.send_key(KeyCode::Enter);
/// let state = handle.wait_for_phase(Phase::Idle, Duration::from_secs(5)).await;
///
/// handle.send_key_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    app: App,
    transport: Arc<dyn Transport>,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(app, transport, config, event_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    let handle = HeadlessHandle { event_tx, state_rx };

    (handle, task)
}

async fn run_headless_loop(
    mut app: App,
    transport: Arc<dyn Transport>,
    config: HeadlessConfig,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;
    app.terminal_size = (config.width, config.height);

    let mut pending: Option<JoinHandle<SessionEvent>> = None;
    let tick_duration = std::time::Duration::from_millis(config.tick_rate_ms);

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            render_app(&app, area, frame.buffer_mut());
        })?;

        let _ = state_tx.send(HeadlessState::capture(&app, terminal.backend().buffer()));

        if app.should_quit {
            break;
        }

        // Wait for input or tick
        let event = tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => event,
                // Every handle is gone
                None => break,
            },
            () = tokio::time::sleep(tick_duration) => Event::Tick,
        };

        if let Some(request) = app.handle_event(event) {
            pending = Some(spawn_submission(Arc::clone(&transport), request));
        }

        poll_submission(&mut app, &mut pending).await;
    }

    if let Some(handle) = pending {
        handle.abort();
    }

    Ok(())
}

/// Convert a terminal buffer to a string representation.
pub(crate) fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        // Trim trailing whitespace from each line
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    // Remove trailing newline
    if result.ends_with('\n') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use polchat_engine::{SessionState, SubmitRequest, TransportError, APOLOGY_REPLY};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    const WAIT: Duration = Duration::from_secs(5);

    /// Holds every submission until the test opens the gate.
    struct GatedTransport {
        gate: Arc<Notify>,
        reply: Result<String, u16>,
        seen: Mutex<Vec<SubmitRequest>>,
    }

    impl GatedTransport {
        fn new(reply: Result<&str, u16>) -> (Arc<Self>, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            let transport = Arc::new(Self {
                gate: Arc::clone(&gate),
                reply: reply.map(String::from),
                seen: Mutex::new(Vec::new()),
            });
            (transport, gate)
        }
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn submit(&self, request: &SubmitRequest) -> Result<String, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.gate.notified().await;
            self.reply.clone().map_err(TransportError::Status)
        }
    }

    fn start(transport: Arc<GatedTransport>) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
        let app = App::new(SessionState::default(), "http://test/qna");
        run_tui_headless(app, transport, HeadlessConfig::default())
    }

    #[test]
    fn test_headless_state_default() {
        let state = HeadlessState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.should_quit);
        assert!(!state.show_help);
        assert!(state.screen_contents.is_empty());
    }

    #[test]
    fn test_headless_config_default() {
        let config = HeadlessConfig::default();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.tick_rate_ms, 50);
    }

    #[tokio::test]
    async fn test_submit_and_receive_answer() {
        let (transport, gate) = GatedTransport::new(Ok(r#"{"answer": "Twenty days per year."}"#));
        let (mut handle, task) = start(Arc::clone(&transport));

        handle.send_key(KeyCode::Tab);
        handle.type_text("How much leave do I get?");
        handle.send_key(KeyCode::Enter);

        let state = handle.wait_for_phase(Phase::Sending, WAIT).await.unwrap();
        assert_eq!(state.message_count, 2);
        handle.wait_for_text("Sending…", WAIT).await.unwrap();

        gate.notify_one();
        let state = handle.wait_for_text("Twenty days per year.", WAIT).await.unwrap();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.message_count, 3);

        let seen = transport.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "How much leave do I get?");
        assert_eq!(seen[0].category, "Policies & Compliance");

        handle.send_key_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failure_shows_banner_and_apology() {
        let (transport, gate) = GatedTransport::new(Err(500));
        let (mut handle, task) = start(transport);

        handle.type_text("hello");
        handle.send_key(KeyCode::Enter);
        handle.wait_for_phase(Phase::Sending, WAIT).await.unwrap();

        gate.notify_one();
        let state = handle.wait_for_phase(Phase::Error, WAIT).await.unwrap();
        assert!(state.screen_contents.contains("Request failed: HTTP 500"));
        assert!(state.screen_contents.contains(APOLOGY_REPLY));

        handle.send_key_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_quit_ends_task() {
        let (transport, _gate) = GatedTransport::new(Ok("{}"));
        let (mut handle, task) = start(transport);

        handle.send_key(KeyCode::F(1));
        handle.wait_for(|s| s.show_help, WAIT).await.unwrap();

        handle.send_key_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
        task.await.unwrap().unwrap();
        assert!(handle.has_quit());
    }

    #[test]
    fn test_buffer_to_string() {
        use ratatui::layout::Rect;
        use ratatui::style::Style;

        let area = Rect::new(0, 0, 10, 2);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", Style::default());
        buffer.set_string(0, 1, "World", Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld");
    }
}
