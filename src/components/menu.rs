use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::components::fit_width;
use crate::focus::Focus;
use crate::menu::bar::MenuBar;
use crate::menu::model::ItemRef;
use crate::menu::screen::MenuScreen;
use crate::theme::Theme;

/// Header row of the menu bar.
pub struct MenuBarWidget<'a> {
    bar: &'a MenuBar,
    theme: &'a Theme,
    focus: Focus,
}

impl<'a> MenuBarWidget<'a> {
    pub fn new(bar: &'a MenuBar, theme: &'a Theme, focus: Focus) -> Self {
        Self { bar, theme, focus }
    }
}

impl<'a> Widget for MenuBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let row = Rect::new(area.x, area.y, area.width, 1);
        buf.set_style(row, Style::default().bg(self.theme.menu_bar_bg).fg(self.theme.menu_fg));
        for (index, (header, region)) in self
            .bar
            .headers()
            .iter()
            .zip(self.bar.header_regions(row))
            .enumerate()
        {
            let style = if self.focus == Focus::MenuHeader(index) {
                Style::default()
                    .bg(self.theme.menu_focus_bg)
                    .fg(self.theme.panel_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().bg(self.theme.menu_bar_bg).fg(self.theme.menu_fg)
            };
            let text = fit_width(&format!(" {}", header.label), usize::from(region.width));
            buf.set_string(region.x, region.y, text, style);
        }
    }
}

/// Every open menu, root first so sub-menus draw on top.
pub struct MenuOverlay<'a> {
    menus: &'a MenuScreen,
    theme: &'a Theme,
}

impl<'a> MenuOverlay<'a> {
    pub fn new(menus: &'a MenuScreen, theme: &'a Theme) -> Self {
        Self { menus, theme }
    }

    /// Items with an open sub-menu stay highlighted along the chain.
    fn is_open_origin(&self, item: ItemRef) -> bool {
        self.menus.stack().iter().any(|e| e.origin == Some(item))
    }
}

impl<'a> Widget for MenuOverlay<'a> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        let registry = self.menus.registry();
        for entry in self.menus.stack() {
            let Some(menu) = registry.get(entry.menu) else {
                continue;
            };
            let region = entry.region.intersection(buf.area);
            if region.width < 2 || region.height < 2 {
                continue;
            }
            Clear.render(region, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.border_focused_fg))
                .style(Style::default().bg(self.theme.menu_bg).fg(self.theme.menu_fg));
            let inner = block.inner(region);
            block.render(region, buf);

            let rows = menu
                .items
                .iter()
                .enumerate()
                .skip(entry.scroll)
                .take(usize::from(inner.height));
            for (row, (index, item)) in rows.enumerate() {
                let item_ref = ItemRef {
                    menu: entry.menu,
                    index,
                };
                let mut style = Style::default().bg(self.theme.menu_bg).fg(self.theme.menu_fg);
                if item.disabled {
                    style = style.fg(self.theme.menu_disabled_fg);
                } else if self.menus.focused() == Some(item_ref) {
                    style = style
                        .bg(self.theme.menu_focus_bg)
                        .fg(self.theme.panel_bg)
                        .add_modifier(Modifier::BOLD);
                } else if self.menus.hover() == Some(item_ref) || self.is_open_origin(item_ref) {
                    style = style.bg(self.theme.menu_hover_bg);
                }
                let marker = if item.is_sub_menu() { "▸" } else { " " };
                let width = usize::from(inner.width);
                let name_width = width.saturating_sub(2);
                let text = format!(" {}{}", fit_width(&item.name, name_width), marker);
                let line = Line::from(Span::styled(fit_width(&text, width), style));
                buf.set_line(inner.x, inner.y + row as u16, &line, inner.width);
            }
        }
    }
}
