//! Multi-line text input widget and its editing state.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

/// Prompt prefix on the first line.
const PROMPT: &str = "> ";

/// A multi-line text input widget.
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    /// The text content.
    content: &'a str,
    /// Cursor position (character index).
    cursor: usize,
    /// Optional block for borders/title.
    block: Option<Block<'a>>,
    /// Whether the input is focused.
    focused: bool,
    /// Placeholder text.
    placeholder: Option<&'a str>,
    /// Replaces the content while input is locked.
    disabled_text: Option<&'a str>,
}

impl<'a> TextInput<'a> {
    /// Create a text input over `state`.
    pub fn new(state: &'a TextInputState) -> Self {
        Self {
            content: &state.content,
            cursor: state.cursor,
            block: None,
            focused: true,
            placeholder: None,
            disabled_text: None,
        }
    }

    /// Set the block for the text input.
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set focus state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Lock the input and show `text` instead of the content.
    #[must_use]
    pub fn disabled(mut self, text: Option<&'a str>) -> Self {
        self.disabled_text = text;
        self
    }

    /// Lines to draw and the index of the line holding the cursor.
    fn lines(&self) -> (Vec<Line<'a>>, usize) {
        let mut lines = Vec::new();
        let mut current = PROMPT.to_string();
        let mut cursor_line = 0;
        let mut cursor_drawn = false;

        for (i, ch) in self.content.chars().enumerate() {
            if self.focused && i == self.cursor && !cursor_drawn {
                current.push('|');
                cursor_line = lines.len();
                cursor_drawn = true;
            }
            if ch == '\n' {
                lines.push(Line::from(std::mem::take(&mut current)));
                current.push_str(&" ".repeat(PROMPT.len()));
            } else {
                current.push(ch);
            }
        }

        if self.focused && !cursor_drawn {
            current.push('_');
            cursor_line = lines.len();
        }
        lines.push(Line::from(current));
        (lines, cursor_line)
    }
}

impl Widget for TextInput<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        if let Some(text) = self.disabled_text {
            Paragraph::new(Line::from(vec![
                Span::styled(PROMPT, Styles::dim()),
                Span::styled(text, Styles::dim()),
            ]))
            .render(inner, buf);
            return;
        }

        if self.content.is_empty() {
            let mut spans = vec![Span::styled(PROMPT, Styles::active())];
            if self.focused {
                spans.push(Span::styled("_", Styles::active()));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans)).render(inner, buf);
            return;
        }

        let (lines, cursor_line) = self.lines();
        let height = inner.height as usize;
        let scroll = cursor_line.saturating_sub(height.saturating_sub(1));

        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((scroll as u16, 0))
            .render(inner, buf);
    }
}

/// State for a text input, managing content and cursor position.
///
/// The cursor is a character index, not a byte offset.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    /// The text content.
    content: String,
    /// Cursor position (character index).
    pub cursor: usize,
    /// Submitted entries for up/down recall.
    history: Vec<String>,
    /// Position in `history` while recalling, `None` when editing fresh input.
    history_index: Option<usize>,
    /// Input saved while recalling history.
    saved_input: String,
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of lines in the content.
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Take the content into history and clear.
    pub fn submit(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Whether a history entry is currently recalled.
    pub fn is_browsing_history(&self) -> bool {
        self.history_index.is_some()
    }

    /// Recall the previous history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next = match self.history_index {
            None => {
                self.saved_input = self.content.clone();
                0
            }
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(_) => return,
        };
        self.history_index = Some(next);
        self.content = self.history[self.history.len() - 1 - next].clone();
        self.move_end();
    }

    /// Recall the next history entry, or restore the saved input.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.content = std::mem::take(&mut self.saved_input);
                self.history_index = None;
                self.move_end();
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.content = self.history[self.history.len() - i].clone();
                self.move_end();
            }
        }
    }
}
