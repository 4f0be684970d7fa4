//! Category tab bar widget.
//!
//! Tabs flow left to right and wrap onto extra rows when the terminal is
//! narrow. [`tab_rects`] is shared by rendering and mouse hit-testing so a
//! click always lands on the tab that is drawn there.

use crate::ui::layout::{flow, flow_rows};
use crate::ui::theme::Styles;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use unicode_width::UnicodeWidthStr;

/// Columns between adjacent tabs.
const TAB_GAP: u16 = 1;

/// A wrapping row of category tabs.
#[derive(Debug, Clone)]
pub struct CategoryTabs<'a> {
    titles: Vec<&'a str>,
    selected: usize,
}

impl<'a> CategoryTabs<'a> {
    /// Create a new tabs widget.
    pub fn new(titles: Vec<&'a str>) -> Self {
        Self {
            titles,
            selected: 0,
        }
    }

    /// Set the selected tab index.
    #[must_use]
    pub fn select(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }
}

#[allow(clippy::cast_possible_truncation)]
fn tab_widths(titles: &[&str]) -> Vec<u16> {
    titles
        .iter()
        .map(|t| (t.width() + 2).min(u16::MAX as usize) as u16)
        .collect()
}

/// Screen rectangles of each visible tab inside `area`.
pub fn tab_rects(titles: &[&str], area: Rect) -> Vec<Rect> {
    flow(&tab_widths(titles), TAB_GAP, area)
}

/// Rows needed to show every tab at the given width.
pub fn tab_rows(titles: &[&str], width: u16) -> u16 {
    flow_rows(&tab_widths(titles), TAB_GAP, width)
}

impl Widget for CategoryTabs<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Styles::default());

        for (i, rect) in tab_rects(&self.titles, area).into_iter().enumerate() {
            let style = if i == self.selected {
                Styles::tab_active()
            } else {
                Styles::tab_inactive()
            };
            buf.set_style(rect, style);
            buf.set_stringn(
                rect.x + 1,
                rect.y,
                self.titles[i],
                rect.width.saturating_sub(2) as usize,
                style,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_tabs_render_all_titles() {
        let area = Rect::new(0, 0, 40, 2);
        let mut buf = Buffer::empty(area);
        CategoryTabs::new(vec!["Alpha", "Beta", "Gamma"])
            .select(1)
            .render(area, &mut buf);

        let text = buffer_to_string(&buf);
        assert!(text.starts_with(" Alpha   Beta   Gamma"));
    }

    #[test]
    fn test_selected_tab_is_styled() {
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        CategoryTabs::new(vec!["Alpha", "Beta"])
            .select(1)
            .render(area, &mut buf);

        let beta = tab_rects(&["Alpha", "Beta"], area)[1];
        assert_eq!(buf[(beta.x + 1, 0)].style().bg, Styles::tab_active().bg);
        assert_eq!(buf[(1, 0)].style().bg, Styles::tab_inactive().bg);
    }

    #[test]
    fn test_tabs_wrap_to_second_row() {
        let titles = ["Definitions & Concepts", "Policies & Compliance"];
        assert_eq!(tab_rows(&titles, 80), 1);
        assert_eq!(tab_rows(&titles, 30), 2);

        let rects = tab_rects(&titles, Rect::new(0, 0, 30, 2));
        assert_eq!(rects[1].y, 1);
    }
}
