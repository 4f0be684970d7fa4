//! Scrollable conversation view.
//!
//! Messages are wrapped to the viewport width before scrolling, so the
//! scroll offset is counted in screen rows. The view is anchored to the
//! bottom: an offset of zero always shows the newest message.

use crate::ui::theme::Styles;
use polchat_engine::{Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{
        Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

/// Indent applied to message bodies.
const BODY_INDENT: &str = "  ";

/// Conversation widget.
#[derive(Debug, Clone)]
pub struct MessageList<'a> {
    messages: &'a [Message],
    pending: Option<&'a str>,
    scroll_from_bottom: usize,
}

impl<'a> MessageList<'a> {
    /// Create a view over `messages`.
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            messages,
            pending: None,
            scroll_from_bottom: 0,
        }
    }

    /// Show a waiting indicator with the given spinner frame.
    #[must_use]
    pub fn pending(mut self, spinner: Option<&'a str>) -> Self {
        self.pending = spinner;
        self
    }

    /// Rows scrolled up from the newest message.
    #[must_use]
    pub fn scroll_from_bottom(mut self, rows: usize) -> Self {
        self.scroll_from_bottom = rows;
        self
    }
}

fn header(message: &Message) -> Line<'static> {
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M")
        .to_string();
    let mut spans = match message.role {
        Role::User => vec![Span::styled("You", Styles::user())],
        Role::Assistant => vec![Span::styled("Assistant", Styles::assistant())],
    };
    if let Some(category) = &message.category {
        spans.push(Span::styled(" ", Styles::default()));
        spans.push(Span::styled(format!(" {category} "), Styles::category_tag()));
    }
    spans.push(Span::styled(format!(" {time}"), Styles::dim()));
    Line::from(spans)
}

/// Wrap every message to `width` columns.
pub fn build_lines(messages: &[Message], pending: Option<&str>, width: u16) -> Vec<Line<'static>> {
    let body_width = (width as usize).saturating_sub(BODY_INDENT.len()).max(1);
    let mut lines = Vec::new();

    for message in messages {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(header(message));
        for row in textwrap::wrap(&message.text, body_width) {
            lines.push(Line::from(Span::styled(
                format!("{BODY_INDENT}{row}"),
                Styles::default(),
            )));
        }
    }

    if let Some(spinner) = pending {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled("Assistant", Styles::assistant())));
        lines.push(Line::from(Span::styled(
            format!("{BODY_INDENT}{spinner} waiting for a reply"),
            Styles::dim(),
        )));
    }

    lines
}

/// Largest useful `scroll_from_bottom` for this content and viewport.
pub fn max_scroll(total_rows: usize, viewport: usize) -> usize {
    total_rows.saturating_sub(viewport)
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 2 {
            return;
        }

        // Reserve the right column for the scrollbar
        let lines = build_lines(self.messages, self.pending, area.width - 1);
        let viewport = area.height as usize;
        let total = lines.len();
        let max = max_scroll(total, viewport);
        let offset = max - self.scroll_from_bottom.min(max);

        #[allow(clippy::cast_possible_truncation)]
        let paragraph = Paragraph::new(lines)
            .style(Styles::default())
            .scroll((offset.min(u16::MAX as usize) as u16, 0));
        paragraph.render(area, buf);

        if total > viewport {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
            let mut scrollbar_state = ScrollbarState::new(max).position(offset);
            let scrollbar_area = Rect {
                x: area.x + area.width - 1,
                y: area.y,
                width: 1,
                height: area.height,
            };
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);
        }
    }
}
