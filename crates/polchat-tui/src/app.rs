//! Application state for the polchat TUI.
//!
//! [`App`] owns the session and everything that only matters on screen
//! (input buffer, focus, overlays, scroll). Keys become [`Action`]s, and
//! actions become session events. A submission leaves the app as a
//! [`SubmitRequest`] and comes back through [`App::apply_completion`].

use crate::event::{key_to_action, Action, Event};
use crate::screens::chat::ChatLayout;
use crate::ui::layout::hit;
use crate::ui::theme::spinner_frame;
use crate::ui::widgets::attachments::badge_rects;
use crate::ui::widgets::message_list::{build_lines, max_scroll};
use crate::ui::widgets::tabs::tab_rects;
use crate::ui::widgets::TextInputState;
use crossterm::event::{KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use polchat_engine::{Attachment, Config, Effect, SessionEvent, SessionState, SubmitRequest};
use ratatui::layout::Rect;
use std::path::Path;
use tracing::debug;

/// Rows moved by PageUp/PageDown.
const PAGE_ROWS: usize = 10;

/// Rows moved by one mouse wheel step.
const WHEEL_ROWS: usize = 3;

/// Which part of the screen receives editing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The message composer.
    #[default]
    Composer,
    /// The attachment badges.
    Attachments,
}

/// The "attach a file" prompt overlay.
#[derive(Debug, Clone, Default)]
pub struct AttachPrompt {
    /// Path being typed.
    pub input: TextInputState,
    /// Why the last attempt failed.
    pub error: Option<String>,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Conversation and request state.
    pub session: SessionState,
    /// Composer contents.
    pub input: TextInputState,
    /// Current focus.
    pub focus: Focus,
    /// Badge under the selection cursor while attachments are focused.
    pub selected_attachment: usize,
    /// Open attach prompt, if any.
    pub attach_prompt: Option<AttachPrompt>,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Rows scrolled up from the newest message.
    pub scroll_from_bottom: usize,
    /// Tick counter for animations.
    pub tick: u64,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Backend shown in the status bar.
    pub backend: String,
    /// Last known terminal size, for mouse hit-testing.
    pub terminal_size: (u16, u16),
}

impl App {
    /// Create an app around an existing session.
    pub fn new(session: SessionState, backend: impl Into<String>) -> Self {
        Self {
            session,
            input: TextInputState::new(),
            focus: Focus::Composer,
            selected_attachment: 0,
            attach_prompt: None,
            show_help: false,
            scroll_from_bottom: 0,
            tick: 0,
            should_quit: false,
            backend: backend.into(),
            terminal_size: (80, 24),
        }
    }

    /// Create an app with a fresh session from `config`.
    pub fn from_config(config: &Config) -> Self {
        let session = SessionState::new(config.categories.clone(), config.greeting.clone());
        Self::new(session, config.submit_url())
    }

    /// Spinner frame for the waiting indicator, while a request is in flight.
    pub fn pending_spinner(&self) -> Option<&'static str> {
        self.session.is_sending().then(|| spinner_frame(self.tick))
    }

    /// Handle one terminal event.
    ///
    /// Returns the request to deliver when the event started a submission.
    pub fn handle_event(&mut self, event: Event) -> Option<SubmitRequest> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                None
            }
            Event::Paste(text) => {
                self.paste(&text);
                None
            }
            Event::Tick => {
                self.tick = self.tick.wrapping_add(1);
                None
            }
            Event::Resize(width, height) => {
                self.terminal_size = (width, height);
                self.clamp_scroll();
                None
            }
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<SubmitRequest> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        self.handle_action(key_to_action(key))
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) -> Option<SubmitRequest> {
        if action == Action::Quit {
            self.should_quit = true;
            return None;
        }

        // Any key closes help
        if self.show_help {
            self.show_help = false;
            return None;
        }

        if self.attach_prompt.is_some() {
            self.handle_prompt_action(action);
            return None;
        }

        match action {
            Action::Help => self.show_help = true,
            Action::NextTab => self.select_category(self.session.tabs().next_index()),
            Action::PrevTab => self.select_category(self.session.tabs().prev_index()),
            Action::ScrollUp => self.scroll_up(PAGE_ROWS),
            Action::ScrollDown => self.scroll_down(PAGE_ROWS),
            Action::Attach => self.open_attach_prompt(),
            Action::FocusAttachments => self.toggle_attachment_focus(),
            _ if self.focus == Focus::Attachments => {
                if !self.handle_attachment_action(action) {
                    self.focus = Focus::Composer;
                    return self.handle_composer_action(action);
                }
            }
            _ => return self.handle_composer_action(action),
        }
        None
    }

    fn handle_composer_action(&mut self, action: Action) -> Option<SubmitRequest> {
        // The composer is locked while a submission is in flight
        if self.session.is_sending() {
            return None;
        }

        match action {
            Action::Submit => return self.submit(),
            Action::Char(c) => self.edit(|input| input.insert(c)),
            Action::Newline => self.edit(|input| input.insert('\n')),
            Action::Backspace => self.edit(TextInputState::backspace),
            Action::Delete => self.edit(TextInputState::delete),
            Action::Left => self.input.move_left(),
            Action::Right => self.input.move_right(),
            Action::Home => self.input.move_home(),
            Action::End => self.input.move_end(),
            Action::Up => {
                if self.input.is_empty() || self.input.is_browsing_history() {
                    self.edit(TextInputState::history_prev);
                } else {
                    self.scroll_up(1);
                }
            }
            Action::Down => {
                if self.input.is_browsing_history() {
                    self.edit(TextInputState::history_next);
                } else {
                    self.scroll_down(1);
                }
            }
            _ => {}
        }
        None
    }

    /// Returns `false` when the action does not apply to the badges.
    fn handle_attachment_action(&mut self, action: Action) -> bool {
        let count = self.session.attachments().len();
        match action {
            Action::Left => {
                self.selected_attachment = self.selected_attachment.saturating_sub(1);
            }
            Action::Right => {
                if self.selected_attachment + 1 < count {
                    self.selected_attachment += 1;
                }
            }
            Action::Delete | Action::Backspace => self.remove_attachment(self.selected_attachment),
            Action::Back => self.focus = Focus::Composer,
            _ => return false,
        }
        true
    }

    fn handle_prompt_action(&mut self, action: Action) {
        let Some(prompt) = self.attach_prompt.as_mut() else {
            return;
        };
        match action {
            Action::Back => self.attach_prompt = None,
            Action::Submit => self.attach_from_prompt(),
            Action::Char(c) => prompt.input.insert(c),
            Action::Backspace => prompt.input.backspace(),
            Action::Delete => prompt.input.delete(),
            Action::Left => prompt.input.move_left(),
            Action::Right => prompt.input.move_right(),
            Action::Home => prompt.input.move_home(),
            Action::End => prompt.input.move_end(),
            _ => {}
        }
    }

    /// Insert pasted text into the prompt or the composer.
    pub fn paste(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if let Some(prompt) = self.attach_prompt.as_mut() {
            // Paths are single-line
            prompt.input.insert_str(text.trim());
            return;
        }
        if self.show_help || self.session.is_sending() {
            return;
        }
        self.focus = Focus::Composer;
        self.edit(|input| input.insert_str(&text));
    }

    /// Handle a mouse event: wheel scrolls, clicks hit tabs and badges.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.show_help || self.attach_prompt.is_some() {
            return;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(WHEEL_ROWS),
            MouseEventKind::ScrollDown => self.scroll_down(WHEEL_ROWS),
            MouseEventKind::Down(MouseButton::Left) => self.click(mouse.column, mouse.row),
            _ => {}
        }
    }

    fn click(&mut self, column: u16, row: u16) {
        let layout = ChatLayout::compute(self, self.screen_area());

        let titles: Vec<&str> = self.session.tabs().categories().iter().collect();
        if let Some(index) = tab_rects(&titles, layout.tabs)
            .iter()
            .position(|r| hit(*r, column, row))
        {
            self.select_category(index);
            return;
        }

        let names = self.session.attachment_badges();
        if let Some((index, rect)) = badge_rects(&names, layout.attachments)
            .into_iter()
            .enumerate()
            .find(|(_, r)| hit(*r, column, row))
        {
            // The remove mark sits two columns from the right edge
            if column + 2 >= rect.right() {
                self.remove_attachment(index);
            } else if !self.session.is_sending() {
                self.focus = Focus::Attachments;
                self.selected_attachment = index;
            }
        }
    }

    fn screen_area(&self) -> Rect {
        Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1)
    }

    fn edit(&mut self, f: impl FnOnce(&mut TextInputState)) {
        f(&mut self.input);
        self.sync_draft();
    }

    fn sync_draft(&mut self) {
        let draft = self.input.content().to_string();
        self.session.apply(SessionEvent::EditDraft(draft));
    }

    fn submit(&mut self) -> Option<SubmitRequest> {
        match self.session.apply(SessionEvent::Submit) {
            Effect::Send(request) => {
                self.input.submit();
                self.focus = Focus::Composer;
                self.selected_attachment = 0;
                self.scroll_from_bottom = 0;
                Some(request)
            }
            _ => None,
        }
    }

    /// Feed the outcome of a submission back into the session.
    pub fn apply_completion(&mut self, event: SessionEvent) -> Effect {
        let effect = self.session.apply(event);
        debug!(phase = %self.session.phase(), "completion applied");
        self.scroll_from_bottom = 0;
        effect
    }

    fn select_category(&mut self, index: usize) {
        self.session.apply(SessionEvent::SelectCategory(index));
    }

    fn open_attach_prompt(&mut self) {
        if self.session.is_sending() {
            return;
        }
        self.attach_prompt = Some(AttachPrompt::default());
    }

    fn attach_from_prompt(&mut self) {
        let Some(prompt) = self.attach_prompt.as_mut() else {
            return;
        };
        let path = prompt.input.content().trim().to_string();
        if path.is_empty() {
            return;
        }

        let result = Attachment::from_path(Path::new(&path))
            .map_err(|e| e.to_string())
            .and_then(|file| match self.session.apply(SessionEvent::AttachFiles(vec![file])) {
                Effect::Rejected(e) => Err(e.to_string()),
                _ => Ok(()),
            });

        match result {
            Ok(()) => self.attach_prompt = None,
            Err(e) => {
                if let Some(prompt) = self.attach_prompt.as_mut() {
                    prompt.error = Some(e);
                }
            }
        }
    }

    fn toggle_attachment_focus(&mut self) {
        if self.focus == Focus::Attachments {
            self.focus = Focus::Composer;
        } else if !self.session.attachments().is_empty() && !self.session.is_sending() {
            self.focus = Focus::Attachments;
            self.selected_attachment = 0;
        }
    }

    fn remove_attachment(&mut self, index: usize) {
        if let Effect::Rejected(_) = self.session.apply(SessionEvent::RemoveAttachment(index)) {
            return;
        }
        let remaining = self.session.attachments().len();
        if remaining == 0 {
            self.focus = Focus::Composer;
            self.selected_attachment = 0;
        } else {
            self.selected_attachment = self.selected_attachment.min(remaining - 1);
        }
    }

    fn max_scroll(&self) -> usize {
        let area = ChatLayout::compute(self, self.screen_area()).messages;
        let lines = build_lines(
            self.session.messages(),
            self.pending_spinner(),
            area.width.saturating_sub(1),
        );
        max_scroll(lines.len(), area.height as usize)
    }

    fn scroll_up(&mut self, rows: usize) {
        self.scroll_from_bottom = (self.scroll_from_bottom + rows).min(self.max_scroll());
    }

    fn scroll_down(&mut self, rows: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    fn clamp_scroll(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.min(self.max_scroll());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, ctrl, key, type_text};
    use crossterm::event::{KeyCode, KeyModifiers};
    use polchat_engine::{Phase, APOLOGY_REPLY};
    use std::io::Write;

    fn click_at(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_typing_syncs_draft() {
        let mut app = create_test_app();
        type_text(&mut app, "hello");
        assert_eq!(app.session.draft(), "hello");

        app.handle_event(key(KeyCode::Backspace));
        assert_eq!(app.session.draft(), "hell");
    }

    #[test]
    fn test_submit_produces_request_and_clears_input() {
        let mut app = create_test_app();
        type_text(&mut app, "  what is PTO?  ");

        let request = app.handle_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(request.text, "what is PTO?");
        assert_eq!(request.category, app.session.tabs().active_label());
        assert!(app.input.is_empty());
        assert_eq!(app.session.phase(), Phase::Sending);
    }

    #[test]
    fn test_empty_submit_is_ignored() {
        let mut app = create_test_app();
        type_text(&mut app, "   ");
        assert!(app.handle_event(key(KeyCode::Enter)).is_none());
        assert_eq!(app.session.messages().len(), 1);
    }

    #[test]
    fn test_composer_locked_while_sending() {
        let mut app = create_test_app();
        type_text(&mut app, "first");
        app.handle_event(key(KeyCode::Enter)).unwrap();

        type_text(&mut app, "more");
        assert!(app.input.is_empty());
        assert!(app.handle_event(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn test_tab_changes_category_even_while_sending() {
        let mut app = create_test_app();
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.session.tabs().active(), 1);

        type_text(&mut app, "q");
        app.handle_event(key(KeyCode::Enter)).unwrap();
        app.handle_event(key(KeyCode::BackTab));
        assert_eq!(app.session.tabs().active(), 0);
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut app = create_test_app();
        type_text(&mut app, "a");
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)));
        type_text(&mut app, "b");
        assert_eq!(app.session.draft(), "a\nb");
    }

    #[test]
    fn test_completion_failure_shows_apology() {
        let mut app = create_test_app();
        type_text(&mut app, "q");
        app.handle_event(key(KeyCode::Enter)).unwrap();

        app.apply_completion(SessionEvent::RequestFailed {
            reason: "HTTP 500".into(),
        });
        assert_eq!(app.session.phase(), Phase::Error);
        assert_eq!(app.session.messages().last().unwrap().text, APOLOGY_REPLY);
    }

    #[test]
    fn test_up_recalls_failed_question_for_retry() {
        let mut app = create_test_app();
        type_text(&mut app, "what is PTO?");
        app.handle_event(key(KeyCode::Enter)).unwrap();
        app.apply_completion(SessionEvent::RequestFailed {
            reason: "HTTP 500".into(),
        });

        assert!(app.handle_event(key(KeyCode::Enter)).is_none());
        app.handle_event(key(KeyCode::Up));
        assert_eq!(app.input.content(), "what is PTO?");
        assert_eq!(app.session.draft(), "what is PTO?");

        let request = app.handle_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(request.text, "what is PTO?");
    }

    #[test]
    fn test_attach_prompt_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handbook.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"rules")
            .unwrap();

        let mut app = create_test_app();
        app.handle_event(ctrl('o'));
        assert!(app.attach_prompt.is_some());

        type_text(&mut app, path.to_str().unwrap());
        app.handle_event(key(KeyCode::Enter));

        assert!(app.attach_prompt.is_none());
        assert_eq!(app.session.attachment_badges(), vec!["handbook.txt"]);
    }

    #[test]
    fn test_attach_prompt_reports_missing_file() {
        let mut app = create_test_app();
        app.handle_event(ctrl('o'));
        type_text(&mut app, "/no/such/file.pdf");
        app.handle_event(key(KeyCode::Enter));

        let prompt = app.attach_prompt.as_ref().unwrap();
        assert!(prompt.error.is_some());
        assert!(app.session.attachments().is_empty());

        app.handle_event(key(KeyCode::Esc));
        assert!(app.attach_prompt.is_none());
    }

    #[test]
    fn test_attachment_focus_and_removal() {
        let mut app = create_test_app();
        app.session.apply(SessionEvent::AttachFiles(vec![
            Attachment::new("a.pdf", b"a".to_vec()),
            Attachment::new("b.pdf", b"b".to_vec()),
        ]));

        app.handle_event(ctrl('f'));
        assert_eq!(app.focus, Focus::Attachments);

        app.handle_event(key(KeyCode::Right));
        app.handle_event(key(KeyCode::Delete));
        assert_eq!(app.session.attachment_badges(), vec!["a.pdf"]);
        assert_eq!(app.selected_attachment, 0);

        app.handle_event(key(KeyCode::Backspace));
        assert!(app.session.attachments().is_empty());
        assert_eq!(app.focus, Focus::Composer);
    }

    #[test]
    fn test_typing_leaves_attachment_focus() {
        let mut app = create_test_app();
        app.session.apply(SessionEvent::AttachFiles(vec![Attachment::new(
            "a.pdf",
            b"a".to_vec(),
        )]));
        app.handle_event(ctrl('f'));

        type_text(&mut app, "x");
        assert_eq!(app.focus, Focus::Composer);
        assert_eq!(app.session.draft(), "x");
    }

    #[test]
    fn test_click_selects_tab() {
        let mut app = create_test_app();
        let layout = ChatLayout::compute(&app, app.screen_area());
        let titles: Vec<&str> = app.session.tabs().categories().iter().collect();
        let target = tab_rects(&titles, layout.tabs)[2];

        app.handle_event(click_at(target.x + 1, target.y));
        assert_eq!(app.session.tabs().active(), 2);
    }

    #[test]
    fn test_click_remove_mark_drops_badge() {
        let mut app = create_test_app();
        app.session.apply(SessionEvent::AttachFiles(vec![Attachment::new(
            "a.pdf",
            b"a".to_vec(),
        )]));
        let layout = ChatLayout::compute(&app, app.screen_area());
        let badge = badge_rects(&["a.pdf"], layout.attachments)[0];

        app.handle_event(click_at(badge.right() - 2, badge.y));
        assert!(app.session.attachments().is_empty());
    }

    #[test]
    fn test_paste_into_composer_and_prompt() {
        let mut app = create_test_app();
        app.handle_event(Event::Paste("line one\r\nline two".into()));
        assert_eq!(app.session.draft(), "line one\nline two");

        app.handle_event(ctrl('o'));
        app.handle_event(Event::Paste(" /tmp/report.pdf\n".into()));
        assert_eq!(
            app.attach_prompt.as_ref().unwrap().input.content(),
            "/tmp/report.pdf"
        );
    }

    #[test]
    fn test_help_toggle() {
        let mut app = create_test_app();
        app.handle_event(key(KeyCode::F(1)));
        assert!(app.show_help);

        // The next key only closes help
        app.handle_event(key(KeyCode::Char('x')));
        assert!(!app.show_help);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = create_test_app();
        app.handle_event(key(KeyCode::PageUp));
        assert_eq!(app.scroll_from_bottom, 0);

        for i in 0..20 {
            app.session.apply(SessionEvent::EditDraft(format!("question {i}")));
            app.session.apply(SessionEvent::Submit);
            app.apply_completion(SessionEvent::ResponseReceived {
                body: r#"{"answer": "ok"}"#.into(),
            });
        }
        app.handle_event(key(KeyCode::PageUp));
        assert_eq!(app.scroll_from_bottom, PAGE_ROWS);
        app.handle_event(key(KeyCode::PageDown));
        assert_eq!(app.scroll_from_bottom, 0);
    }

    #[test]
    fn test_quit_always_wins() {
        let mut app = create_test_app();
        app.handle_event(ctrl('o'));
        app.handle_event(ctrl('c'));
        assert!(app.should_quit);
    }
}
