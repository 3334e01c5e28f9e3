/// Maps an unbounded virtual content area onto a fixed visible window.
///
/// Offsets are kept clamped to `[0, max(content - visible, 0)]` on both
/// axes; every setter re-clamps, so callers never observe an offset that
/// scrolls past the end of the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub scroll_x: usize,
    pub scroll_y: usize,
    pub visible_width: usize,
    pub visible_height: usize,
    pub content_width: usize,
    pub content_height: usize,
}

impl Viewport {
    pub fn new(visible_width: usize, visible_height: usize) -> Self {
        Self {
            visible_width,
            visible_height,
            ..Self::default()
        }
    }

    /// Largest valid vertical offset.
    pub fn max_scroll_y(&self) -> usize {
        self.content_height.saturating_sub(self.visible_height)
    }

    /// Largest valid horizontal offset.
    pub fn max_scroll_x(&self) -> usize {
        self.content_width.saturating_sub(self.visible_width)
    }

    /// Clamp a requested vertical offset into range.
    pub fn clip_y(&self, value: isize) -> usize {
        clip_to_range(value, self.max_scroll_y())
    }

    /// Clamp a requested horizontal offset into range.
    pub fn clip_x(&self, value: isize) -> usize {
        clip_to_range(value, self.max_scroll_x())
    }

    /// Update the content extent (entry count, total column width).
    pub fn set_content(&mut self, width: usize, height: usize) {
        self.content_width = width;
        self.content_height = height;
        self.reclamp();
    }

    /// Update the visible extent after a resize.
    pub fn set_visible(&mut self, width: usize, height: usize) {
        self.visible_width = width;
        self.visible_height = height;
        self.reclamp();
    }

    /// Jump to a vertical offset. Returns whether the offset moved.
    pub fn scroll_to_y(&mut self, value: isize) -> bool {
        let next = self.clip_y(value);
        let changed = next != self.scroll_y;
        self.scroll_y = next;
        changed
    }

    /// Jump to a horizontal offset. Returns whether the offset moved.
    pub fn scroll_to_x(&mut self, value: isize) -> bool {
        let next = self.clip_x(value);
        let changed = next != self.scroll_x;
        self.scroll_x = next;
        changed
    }

    /// Apply a relative scroll, e.g. from the mouse wheel.
    pub fn scroll_by(&mut self, dx: isize, dy: isize) -> bool {
        let moved_x = self.scroll_to_x(self.scroll_x as isize + dx);
        let moved_y = self.scroll_to_y(self.scroll_y as isize + dy);
        moved_x || moved_y
    }

    fn reclamp(&mut self) {
        self.scroll_x = self.scroll_x.min(self.max_scroll_x());
        self.scroll_y = self.scroll_y.min(self.max_scroll_y());
    }
}

/// Clamp `value` to `[0, max]`.
pub fn clip_to_range(value: isize, max: usize) -> usize {
    if value <= 0 {
        0
    } else {
        (value as usize).min(max)
    }
}
