use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::components::fit_width;
use crate::list::file_list::{FileList, RowStyle};
use crate::theme::Theme;

const GRIP: char = '│';

/// Header row, visible rows and a horizontal scroll indicator.
pub struct FileListWidget<'a> {
    list: &'a FileList,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> FileListWidget<'a> {
    pub fn new(list: &'a FileList, theme: &'a Theme, focused: bool) -> Self {
        Self {
            list,
            theme,
            focused,
        }
    }

    /// Full-width header text in content coordinates.
    fn header_text(&self) -> String {
        let sort = self.list.sort_state();
        let mut text = String::new();
        for (index, column) in self.list.columns().columns().iter().enumerate() {
            let width = usize::from(column.width);
            let label = if index == sort.column {
                let arrow = if sort.ascending { '▲' } else { '▼' };
                format!("{} {}", column.name, arrow)
            } else {
                column.name.clone()
            };
            text.push_str(&fit_width(&label, width.saturating_sub(2)));
            if width >= 2 {
                text.push(GRIP);
                text.push(' ');
            }
        }
        text
    }

    /// Flags stack: hover underlines, selection bolds, focus highlights
    /// the background and directories are italic.
    fn row_style(&self, style: RowStyle) -> Style {
        let mut out = Style::default().fg(if style.is_dir {
            self.theme.dir_fg
        } else {
            self.theme.fg
        });
        if style.hovered {
            out = out.add_modifier(Modifier::UNDERLINED);
        }
        if style.selected {
            out = out.add_modifier(Modifier::BOLD);
        }
        if style.focused && self.focused {
            out = out.bg(self.theme.row_focus_bg);
        }
        if style.is_dir {
            out = out.add_modifier(Modifier::ITALIC);
        }
        out
    }

    fn scroll_indicator(&self, width: usize) -> String {
        let viewport = self.list.viewport();
        let max = viewport.max_scroll_x();
        if max == 0 || width == 0 {
            return " ".repeat(width);
        }
        let thumb = (width * viewport.visible_width / viewport.content_width.max(1)).clamp(1, width);
        let start = (width - thumb) * viewport.scroll_x / max;
        (0..width)
            .map(|i| if i >= start && i < start + thumb { '━' } else { '─' })
            .collect()
    }
}

/// The slice of `text` visible at horizontal offset `scroll`, `width` cells
/// wide.
fn visible(text: &str, scroll: usize, width: usize) -> String {
    let shifted: String = text.chars().skip(scroll).collect();
    fit_width(&shifted, width)
}

impl<'a> Widget for FileListWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = usize::from(area.width);
        let scroll_x = self.list.viewport().scroll_x;

        let header_style = Style::default()
            .bg(self.theme.header_bg)
            .fg(self.theme.header_fg)
            .add_modifier(Modifier::BOLD);
        let header = visible(&self.header_text(), scroll_x, width);
        buf.set_line(area.x, area.y, &Line::from(Span::styled(header, header_style)), area.width);

        let rendered = self.list.render_columns();
        let rows = area.height.saturating_sub(2);
        for (row, style) in rendered.styles.iter().enumerate().take(usize::from(rows)) {
            let mut text = String::new();
            for column in &rendered.columns {
                let cell = column.cells.get(row).map_or("", String::as_str);
                let w = usize::from(column.width);
                text.push_str(&fit_width(cell, w.saturating_sub(1)));
                if w >= 1 {
                    text.push(' ');
                }
            }
            let line = Line::from(Span::styled(visible(&text, scroll_x, width), self.row_style(*style)));
            buf.set_line(area.x, area.y + 1 + row as u16, &line, area.width);
        }

        if area.height >= 2 {
            let indicator = Span::styled(
                self.scroll_indicator(width),
                Style::default().fg(self.theme.grip_fg),
            );
            buf.set_line(area.x, area.bottom() - 1, &Line::from(indicator), area.width);
        }
    }
}
