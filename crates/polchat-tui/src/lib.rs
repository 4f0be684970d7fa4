//! polchat-tui: Terminal UI for the polchat policy chat client
//!
//! This crate provides the TUI layer for polchat, including:
//! - The chat screen (category tabs, conversation, attachments, composer)
//! - Shared widgets (tabs, message list, badges, text input, status bar)
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod ui;

pub use app::{App, AttachPrompt, Focus};
pub use event::{key_to_action, Action, Event, EventHandler};
pub use polchat_engine;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use polchat_engine::{complete, Config, HttpTransport, SessionEvent, SubmitRequest, Transport};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
    let mut app = App::from_config(config);
    info!(backend = %app.backend, "starting tui");

    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.terminal_size = (size.width, size.height);

    // Create event handler (4 Hz tick rate = 250ms)
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events, transport).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    transport: Arc<dyn Transport>,
) -> Result<(), Box<dyn std::error::Error>> {
    // At most one submission is in flight
    let mut pending: Option<JoinHandle<SessionEvent>> = None;

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::render_app(app, area, frame.buffer_mut());
        })?;

        if let Some(event) = events.next().await {
            if let Some(request) = app.handle_event(event) {
                pending = Some(spawn_submission(Arc::clone(&transport), request));
            }
        }

        poll_submission(app, &mut pending).await;

        if app.should_quit {
            if let Some(handle) = pending {
                handle.abort();
            }
            break;
        }
    }

    Ok(())
}

/// Deliver `request` on a background task.
///
/// The task resolves to the completion event for the session.
pub fn spawn_submission(
    transport: Arc<dyn Transport>,
    request: SubmitRequest,
) -> JoinHandle<SessionEvent> {
    tokio::spawn(async move { complete(transport.as_ref(), &request).await })
}

/// Apply the pending submission's outcome if it has finished.
pub(crate) async fn poll_submission(app: &mut App, pending: &mut Option<JoinHandle<SessionEvent>>) {
    if !pending.as_ref().is_some_and(JoinHandle::is_finished) {
        return;
    }
    let Some(handle) = pending.take() else {
        return;
    };

    let event = match handle.await {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "submission task failed");
            SessionEvent::RequestFailed {
                reason: e.to_string(),
            }
        }
    };
    app.apply_completion(event);
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, key, type_text};
    use async_trait::async_trait;
    use crossterm::event::KeyCode;
    use polchat_engine::{Phase, TransportError};

    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn submit(&self, request: &SubmitRequest) -> Result<String, TransportError> {
            Ok(answer_body(&request.text))
        }
    }

    fn answer_body(text: &str) -> String {
        format!(r#"{{"answer": "echo: {text}"}}"#)
    }

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[tokio::test]
    async fn test_spawned_submission_completes_session() {
        let mut app = create_test_app();
        type_text(&mut app, "ping");
        let request = app.handle_event(key(KeyCode::Enter)).unwrap();

        let mut pending = Some(spawn_submission(Arc::new(EchoTransport), request));
        while pending.is_some() {
            poll_submission(&mut app, &mut pending).await;
            tokio::task::yield_now().await;
        }

        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(app.session.messages().last().unwrap().text, "echo: ping");
    }

    #[tokio::test]
    async fn test_poll_without_pending_is_noop() {
        let mut app = create_test_app();
        let mut pending = None;
        poll_submission(&mut app, &mut pending).await;
        assert_eq!(app.session.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_aborted_task_becomes_failure() {
        let mut app = create_test_app();
        type_text(&mut app, "ping");
        app.handle_event(key(KeyCode::Enter)).unwrap();

        let handle: JoinHandle<SessionEvent> = tokio::spawn(std::future::pending());
        handle.abort();
        let mut pending = Some(handle);
        while pending.is_some() {
            poll_submission(&mut app, &mut pending).await;
            tokio::task::yield_now().await;
        }

        assert_eq!(app.session.phase(), Phase::Error);
    }
}
