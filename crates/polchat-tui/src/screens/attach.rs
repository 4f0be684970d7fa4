//! Overlay for typing the path of a file to attach.

use crate::app::App;
use crate::screens::Screen;
use crate::ui::centered_fixed;
use crate::ui::theme::Styles;
use crate::ui::widgets::TextInput;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// The attach prompt, drawn over the chat screen.
pub struct AttachScreen;

impl Screen for AttachScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let Some(prompt) = &app.attach_prompt else {
            return;
        };

        let width = 64.min(area.width.saturating_sub(4));
        let overlay = centered_fixed(width, 6, area);
        Clear.render(overlay, buf);

        let block = Block::default()
            .title(" Attach file ")
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(Styles::border_active())
            .style(Styles::default());
        let inner = block.inner(overlay);
        block.render(overlay, buf);
        if inner.height < 3 {
            return;
        }

        TextInput::new(&prompt.input)
            .placeholder("path/to/file")
            .render(Rect { height: 1, ..inner }, buf);

        let message = match &prompt.error {
            Some(error) => Span::styled(error.as_str(), Styles::error()),
            None => Span::styled("", Styles::dim()),
        };
        Paragraph::new(Line::from(message)).render(
            Rect {
                y: inner.y + 1,
                height: 1,
                ..inner
            },
            buf,
        );

        Paragraph::new(Line::from(Span::styled(
            "Enter attach · Esc cancel",
            Styles::dim(),
        )))
        .render(
            Rect {
                y: inner.y + 2,
                height: 1,
                ..inner
            },
            buf,
        );
    }
}
