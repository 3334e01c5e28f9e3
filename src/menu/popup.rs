use ratatui::layout::{Position, Rect, Size};

/// Place a popup of `size` at `anchor`, translated (never resized) to lie
/// inside the screen minus its bottom row. A popup larger than that area
/// is pinned to the top-left corner and cut to fit.
pub fn place(anchor: Position, size: Size, screen: Size) -> Rect {
    let bounds = Size::new(screen.width, screen.height.saturating_sub(1));
    let width = size.width.min(bounds.width);
    let height = size.height.min(bounds.height);
    let x = anchor.x.min(bounds.width - width);
    let y = anchor.y.min(bounds.height - height);
    Rect::new(x, y, width, height)
}
