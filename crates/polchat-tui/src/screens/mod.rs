//! Screen definitions for the polchat TUI.

pub mod attach;
pub mod chat;

use crate::app::App;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render the chat screen and any open overlays.
pub fn render_app(app: &App, area: Rect, buf: &mut Buffer) {
    chat::ChatScreen.render(app, area, buf);

    if app.attach_prompt.is_some() {
        attach::AttachScreen.render(app, area, buf);
    }

    if app.show_help {
        render_help_overlay(area, buf);
    }
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    use crate::ui::centered_fixed;
    use crate::ui::theme::Styles;
    use ratatui::widgets::{Block, Borders, Clear, Paragraph};

    let help_text = r"
  Composer
    Enter                 Send message
    Shift+Enter           New line
    Up / Down             Recall sent messages

  Navigation
    Tab / Shift+Tab       Next/prev category
    PageUp / PageDown     Scroll conversation
    Ctrl+O                Attach a file
    Ctrl+F                Select attachments (Del removes)
    Esc                   Close overlay
    Ctrl+C                Quit

  [Press any key to close]
";

    let width = 60.min(area.width.saturating_sub(4));
    let height = 19.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .style(Styles::default());

    paragraph.render(overlay_area, buf);
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, render_app_to_string};

    #[test]
    fn test_help_overlay_renders() {
        let mut app = create_test_app();
        app.show_help = true;
        let screen = render_app_to_string(&app, 80, 24);
        assert!(screen.contains("Help"));
        assert!(screen.contains("Next/prev category"));
    }
}
