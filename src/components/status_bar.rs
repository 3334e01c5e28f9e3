use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

const KEY_HINTS: &str = " m:menu  f:open  s:save  d:dir  ^a:context  q:quit ";

/// Bottom row: the last result on the left, key hints on the right.
pub struct StatusBarWidget<'a> {
    message: &'a str,
    theme: &'a Theme,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(message: &'a str, theme: &'a Theme) -> Self {
        Self {
            message,
            theme,
            is_error: false,
        }
    }

    pub fn error(mut self, is_error: bool) -> Self {
        self.is_error = is_error;
        self
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = usize::from(area.width);
        let bar_style = Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), bar_style);

        let hints = if KEY_HINTS.width() + 10 <= width {
            KEY_HINTS
        } else {
            ""
        };
        let message_style = if self.is_error {
            bar_style.fg(self.theme.error_fg).add_modifier(Modifier::BOLD)
        } else {
            bar_style
        };
        let room = width - hints.width();
        let message = crate::components::fit_width(&format!(" {}", self.message), room);
        let line = Line::from(vec![
            Span::styled(message, message_style),
            Span::styled(hints, bar_style.fg(self.theme.dim_fg)),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
