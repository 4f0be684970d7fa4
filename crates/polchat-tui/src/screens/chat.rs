//! The chat screen: tabs, conversation, attachments and composer.

use crate::app::{App, Focus};
use crate::screens::Screen;
use crate::ui::theme::Styles;
use crate::ui::widgets::attachments::badge_rows;
use crate::ui::widgets::tabs::tab_rows;
use crate::ui::widgets::{
    AttachmentBadges, CategoryTabs, KeyHint, MessageList, StatusBar, TextInput,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Most composer lines shown before the input scrolls.
const MAX_COMPOSER_LINES: usize = 5;

const PLACEHOLDER: &str = "Type your question and press Enter";
const SENDING: &str = "Sending…";

/// Screen regions, shared by rendering and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub title: Rect,
    pub tabs: Rect,
    pub messages: Rect,
    pub attachments: Rect,
    pub banner: Rect,
    pub composer: Rect,
    pub status: Rect,
}

impl ChatLayout {
    /// Split `area` for the current app state.
    #[allow(clippy::cast_possible_truncation)]
    pub fn compute(app: &App, area: Rect) -> Self {
        let titles: Vec<&str> = app.session.tabs().categories().iter().collect();
        let tabs = tab_rows(&titles, area.width).max(1);
        let attachments = badge_rows(&app.session.attachment_badges(), area.width);
        let banner = u16::from(app.session.last_error().is_some());
        let composer_lines = if app.session.is_sending() {
            1
        } else {
            app.input.line_count().clamp(1, MAX_COMPOSER_LINES) as u16
        };
        // Borders take two rows
        let composer = composer_lines + 2;

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(tabs),
            Constraint::Min(3),
            Constraint::Length(attachments),
            Constraint::Length(banner),
            Constraint::Length(composer),
            Constraint::Length(1),
        ])
        .split(area);

        Self {
            title: chunks[0],
            tabs: chunks[1],
            messages: chunks[2],
            attachments: chunks[3],
            banner: chunks[4],
            composer: chunks[5],
            status: chunks[6],
        }
    }
}

/// The chat screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Styles::default());
        let layout = ChatLayout::compute(app, area);
        let session = &app.session;

        // Title
        let title = Line::from(vec![
            Span::styled(" polchat ", Styles::title()),
            Span::styled(" ask about company policies", Styles::dim()),
        ]);
        buf.set_line(layout.title.x, layout.title.y, &title, layout.title.width);

        // Tabs
        let titles: Vec<&str> = session.tabs().categories().iter().collect();
        CategoryTabs::new(titles)
            .select(session.tabs().active())
            .render(layout.tabs, buf);

        // Conversation
        MessageList::new(session.messages())
            .pending(app.pending_spinner())
            .scroll_from_bottom(app.scroll_from_bottom)
            .render(layout.messages, buf);

        // Attachments
        let selected = (app.focus == Focus::Attachments).then_some(app.selected_attachment);
        AttachmentBadges::new(session.attachment_badges())
            .selected(selected)
            .locked(session.is_sending())
            .render(layout.attachments, buf);

        // Error banner
        if let Some(error) = session.last_error() {
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" Request failed: {error}"), Styles::error()),
                Span::styled("  (press Up to recall your question)", Styles::dim()),
            ]))
            .render(layout.banner, buf);
        }

        // Composer
        let border = if app.focus == Focus::Composer {
            Styles::border_active()
        } else {
            Styles::border()
        };
        let block = Block::default()
            .title(format!(" Message · {} ", session.tabs().active_label()))
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(border)
            .style(Styles::default());
        TextInput::new(&app.input)
            .block(block)
            .focused(app.focus == Focus::Composer)
            .placeholder(PLACEHOLDER)
            .disabled(session.is_sending().then_some(SENDING))
            .render(layout.composer, buf);

        // Status bar
        let mut hints = vec![
            KeyHint::new("Enter", "Send"),
            KeyHint::new("Tab", "Category"),
            KeyHint::new("^O", "Attach"),
        ];
        if !session.attachments().is_empty() {
            hints.push(KeyHint::new("^F", "Files"));
        }
        hints.push(KeyHint::new("F1", "Help"));
        hints.push(KeyHint::new("^C", "Quit"));
        StatusBar::new(session.phase())
            .hints(hints)
            .right(&app.backend)
            .render(layout.status, buf);
    }
}
