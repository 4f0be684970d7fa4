//! Pending attachment badges.

use crate::ui::layout::{flow, flow_rows};
use crate::ui::theme::Styles;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use unicode_width::UnicodeWidthStr;

const PREFIX: &str = "Files:";
const REMOVE_MARK: &str = "×";
const BADGE_GAP: u16 = 1;

/// A row of badges, one per pending attachment.
#[derive(Debug, Clone)]
pub struct AttachmentBadges<'a> {
    names: Vec<&'a str>,
    selected: Option<usize>,
    locked: bool,
}

impl<'a> AttachmentBadges<'a> {
    pub fn new(names: Vec<&'a str>) -> Self {
        Self {
            names,
            selected: None,
            locked: false,
        }
    }

    /// Highlight the badge under the selection cursor.
    #[must_use]
    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    /// Hide the remove marks while a submission is in flight.
    #[must_use]
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

fn badge_label(name: &str) -> String {
    format!(" {name} {REMOVE_MARK} ")
}

// The prefix is laid out as the first item so badges wrap after it.
#[allow(clippy::cast_possible_truncation)]
fn widths(names: &[&str]) -> Vec<u16> {
    std::iter::once(PREFIX.width())
        .chain(names.iter().map(|n| badge_label(n).width()))
        .map(|w| w.min(u16::MAX as usize) as u16)
        .collect()
}

/// Screen rectangles of each visible badge inside `area`.
pub fn badge_rects(names: &[&str], area: Rect) -> Vec<Rect> {
    if names.is_empty() {
        return Vec::new();
    }
    flow(&widths(names), BADGE_GAP, area)
        .into_iter()
        .skip(1)
        .collect()
}

/// Rows needed to show every badge, zero when there are none.
pub fn badge_rows(names: &[&str], width: u16) -> u16 {
    if names.is_empty() {
        return 0;
    }
    flow_rows(&widths(names), BADGE_GAP, width)
}

impl Widget for AttachmentBadges<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.names.is_empty() || area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, Styles::default());
        buf.set_stringn(area.x, area.y, PREFIX, area.width as usize, Styles::dim());

        for (i, rect) in badge_rects(&self.names, area).into_iter().enumerate() {
            let style = if self.selected == Some(i) && !self.locked {
                Styles::badge_selected()
            } else {
                Styles::badge()
            };
            let label = if self.locked {
                format!(" {} ", self.names[i])
            } else {
                badge_label(self.names[i])
            };
            buf.set_style(rect, style);
            buf.set_stringn(rect.x, rect.y, label, rect.width as usize, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_badges_render_names() {
        let area = Rect::new(0, 0, 50, 1);
        let mut buf = Buffer::empty(area);
        AttachmentBadges::new(vec!["a.pdf", "b.txt"]).render(area, &mut buf);

        assert_eq!(buffer_to_string(&buf), "Files:  a.pdf ×   b.txt ×");
    }

    #[test]
    fn test_locked_badges_hide_remove_mark() {
        let area = Rect::new(0, 0, 50, 1);
        let mut buf = Buffer::empty(area);
        AttachmentBadges::new(vec!["a.pdf"])
            .locked(true)
            .render(area, &mut buf);

        assert!(!buffer_to_string(&buf).contains('×'));
    }

    #[test]
    fn test_badge_rects_skip_prefix() {
        let rects = badge_rects(&["a.pdf", "b.txt"], Rect::new(0, 3, 50, 1));
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0], Rect::new(7, 3, 9, 1));
        assert_eq!(rects[1], Rect::new(17, 3, 9, 1));
    }

    #[test]
    fn test_badge_rows() {
        assert_eq!(badge_rows(&[], 80), 0);
        assert_eq!(badge_rows(&["a.pdf"], 80), 1);
        assert_eq!(badge_rows(&["a.pdf", "b.txt"], 20), 2);
    }

    #[test]
    fn test_selected_badge_is_styled() {
        let area = Rect::new(0, 0, 50, 1);
        let mut buf = Buffer::empty(area);
        AttachmentBadges::new(vec!["a.pdf", "b.txt"])
            .selected(Some(1))
            .render(area, &mut buf);

        assert_eq!(buf[(18, 0)].style().bg, Styles::badge_selected().bg);
        assert_eq!(buf[(8, 0)].style().bg, Styles::badge().bg);
    }
}
