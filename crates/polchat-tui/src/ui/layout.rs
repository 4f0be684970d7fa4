//! Layout helpers for the polchat TUI.

use ratatui::layout::Rect;

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Whether the cell at (`column`, `row`) lies inside `rect`.
pub fn hit(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

/// Lay out items of the given widths left to right inside `area`, wrapping
/// to a new row when the next item would not fit.
///
/// Items are separated by `gap` columns. An item wider than the area is
/// clipped to the area width. Items that fall below the area are omitted,
/// so the result may be shorter than `widths`.
pub fn flow(widths: &[u16], gap: u16, area: Rect) -> Vec<Rect> {
    let mut rects = Vec::with_capacity(widths.len());
    if area.width == 0 || area.height == 0 {
        return rects;
    }

    let mut x = area.x;
    let mut y = area.y;
    for &width in widths {
        let width = width.min(area.width);
        if x > area.x && x.saturating_add(width) > area.right() {
            x = area.x;
            y += 1;
        }
        if y >= area.bottom() {
            break;
        }
        rects.push(Rect::new(x, y, width, 1));
        x = x.saturating_add(width).saturating_add(gap);
    }
    rects
}

/// Number of rows [`flow`] needs to place every item at `width` columns.
pub fn flow_rows(widths: &[u16], gap: u16, width: u16) -> u16 {
    if widths.is_empty() || width == 0 {
        return 0;
    }
    let mut rows = 1;
    let mut x: u16 = 0;
    for &w in widths {
        let w = w.min(width);
        if x > 0 && x.saturating_add(w) > width {
            rows += 1;
            x = 0;
        }
        x = x.saturating_add(w).saturating_add(gap);
    }
    rows
}
