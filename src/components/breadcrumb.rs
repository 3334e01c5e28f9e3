use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::breadcrumb::{segment_cells, Breadcrumb};
use crate::components::input::TextInputWidget;
use crate::theme::Theme;

const SEPARATOR: &str = "/";

/// Clickable path segments, or the edit field while editing.
///
/// Segments that exist are drawn in the valid colour, the rest in the
/// invalid colour; the current segment gets a background.
pub struct BreadcrumbWidget<'a> {
    breadcrumb: &'a Breadcrumb,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> BreadcrumbWidget<'a> {
    pub fn new(breadcrumb: &'a Breadcrumb, theme: &'a Theme, focused: bool) -> Self {
        Self {
            breadcrumb,
            theme,
            focused,
        }
    }
}

impl<'a> Widget for BreadcrumbWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        if let Some(input) = self.breadcrumb.edit_input() {
            TextInputWidget::new(input, self.theme, true).render(area, buf);
            return;
        }

        let segments = self.breadcrumb.segments();
        for cell in segment_cells(segments, area.width) {
            let segment = &segments[cell.index];
            let mut style = Style::default().fg(if segment.valid {
                self.theme.path_valid_fg
            } else {
                self.theme.path_invalid_fg
            });
            if segment.current {
                style = style.bg(self.theme.path_current_bg);
                if self.focused {
                    style = style.add_modifier(Modifier::BOLD);
                }
            }
            let x = area.x + cell.x;
            buf.set_stringn(x, area.y, &segment.name, usize::from(cell.width), style);
            let sep_x = x + cell.width;
            if segment.separator_after && sep_x < area.right() {
                buf.set_string(sep_x, area.y, SEPARATOR, Style::default().fg(self.theme.dim_fg));
            }
        }
    }
}
