use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::components::breadcrumb::BreadcrumbWidget;
use crate::components::dir_tree::DirTreeWidget;
use crate::components::file_list::FileListWidget;
use crate::components::input::TextInputWidget;
use crate::selector::{Selector, SelectorFocus, SelectorMode};
use crate::theme::Theme;

/// The whole file selector, drawn over whatever is below it.
pub struct SelectorWidget<'a> {
    selector: &'a Selector,
    theme: &'a Theme,
}

impl<'a> SelectorWidget<'a> {
    pub fn new(selector: &'a Selector, theme: &'a Theme) -> Self {
        Self { selector, theme }
    }

    fn title(&self) -> &'static str {
        match self.selector.config().mode {
            SelectorMode::Existing => " Open file ",
            SelectorMode::New => " Save file ",
            SelectorMode::Directory => " Choose directory ",
        }
    }

    fn button(&self, label: &str, focus: SelectorFocus, area: Rect, buf: &mut Buffer) {
        let style = self.theme.button(self.selector.focus() == focus);
        buf.set_style(area, style);
        Paragraph::new(Line::from(label.to_string()))
            .alignment(Alignment::Center)
            .style(style)
            .render(area, buf);
    }
}

impl<'a> Widget for SelectorWidget<'a> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        let layout = self.selector.layout();
        let focus = self.selector.focus();
        if layout.frame.width < 3 || layout.frame.height < 3 {
            return;
        }

        Clear.render(layout.frame, buf);
        Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(self.theme.border(true))
            .style(Style::default().bg(self.theme.panel_bg).fg(self.theme.fg))
            .render(layout.frame, buf);

        self.button("↑", SelectorFocus::UpButton, layout.up, buf);
        if let Some(drive) = layout.drive {
            let label = self
                .selector
                .drives()
                .iter()
                .find(|d| self.selector.directory().starts_with(d.as_str()))
                .map_or("--", String::as_str);
            self.button(label, SelectorFocus::DriveButton, drive, buf);
        }
        BreadcrumbWidget::new(
            &self.selector.breadcrumb,
            self.theme,
            focus == SelectorFocus::Breadcrumb,
        )
        .render(layout.breadcrumb, buf);
        self.button("Edit", SelectorFocus::EditButton, layout.edit, buf);

        if let Some(tree) = &self.selector.tree {
            DirTreeWidget::new(tree, self.theme, focus == SelectorFocus::Tree)
                .render(layout.tree, buf);
        }
        let divider_style = if self.selector.divider_dragging() {
            Style::default().fg(self.theme.border_focused_fg)
        } else {
            Style::default().fg(self.theme.border_fg)
        };
        for y in layout.divider.top()..layout.divider.bottom() {
            buf.set_string(layout.divider.x, y, "│", divider_style);
        }
        FileListWidget::new(&self.selector.list, self.theme, focus == SelectorFocus::List)
            .render(layout.list, buf);

        if self.selector.shows_fields() {
            let label_style = Style::default().fg(self.theme.dim_fg);
            buf.set_stringn(
                layout.filename_label.x,
                layout.filename_label.y,
                "Name",
                usize::from(layout.filename_label.width),
                label_style,
            );
            buf.set_stringn(
                layout.filter_label.x,
                layout.filter_label.y,
                "Filter",
                usize::from(layout.filter_label.width),
                label_style,
            );
            TextInputWidget::new(
                &self.selector.filename,
                self.theme,
                focus == SelectorFocus::Filename,
            )
            .render(layout.filename, buf);
            TextInputWidget::new(&self.selector.filter, self.theme, focus == SelectorFocus::Filter)
                .render(layout.filter, buf);
        }
        self.button(&self.selector.config().ok_text, SelectorFocus::Ok, layout.ok, buf);
        self.button("Cancel", SelectorFocus::Cancel, layout.cancel, buf);
    }
}
