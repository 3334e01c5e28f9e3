use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use unicode_width::UnicodeWidthStr;

use crate::focus::Focus;
use crate::menu::screen::MenuScreen;

/// Widest a header may be, padding included.
const MAX_HEADER_WIDTH: u16 = 15;
const HEADER_PADDING: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuHeader {
    pub label: String,
    pub menu_id: String,
}

impl MenuHeader {
    pub fn new(label: impl Into<String>, menu_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            menu_id: menu_id.into(),
        }
    }

    fn width(&self) -> u16 {
        (self.label.width() as u16)
            .saturating_add(HEADER_PADDING * 2)
            .min(MAX_HEADER_WIDTH)
    }
}

/// Result of feeding an event to the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarEvent {
    Ignored,
    /// Header focus moved or a menu opened.
    Changed,
    /// The bar gave up the focus; restore this one.
    Released(Focus),
}

/// A row of headers, each opening a root menu.
#[derive(Debug, Default)]
pub struct MenuBar {
    headers: Vec<MenuHeader>,
    previous_focus: Focus,
}

impl MenuBar {
    pub fn new(headers: Vec<MenuHeader>) -> Self {
        Self {
            headers,
            previous_focus: Focus::None,
        }
    }

    pub fn headers(&self) -> &[MenuHeader] {
        &self.headers
    }

    /// Header cells on the bar row `area`, left to right. Headers that do
    /// not fit are left out.
    pub fn header_regions(&self, area: Rect) -> Vec<Rect> {
        let mut regions = Vec::with_capacity(self.headers.len());
        let mut x = area.x;
        for header in &self.headers {
            let width = header.width();
            if x.saturating_add(width) > area.right() {
                break;
            }
            regions.push(Rect::new(x, area.y, width, 1));
            x += width;
        }
        regions
    }

    /// Take the focus from `current`, landing on the first header.
    pub fn activate(&mut self, current: Focus) -> Focus {
        if self.headers.is_empty() {
            return current;
        }
        if !current.is_menu_header() {
            self.previous_focus = current;
        }
        Focus::MenuHeader(0)
    }

    /// The focus the bar took over in [`MenuBar::activate`].
    pub fn previous_focus(&self) -> Focus {
        self.previous_focus
    }

    /// Open the menu of header `index`, restoring the pre-bar focus when
    /// the menu closes.
    pub fn open(&self, index: usize, area: Rect, key: bool, menus: &mut MenuScreen) -> bool {
        let (Some(header), Some(region)) = (
            self.headers.get(index),
            self.header_regions(area).get(index).copied(),
        ) else {
            return false;
        };
        menus.open_menu(&header.menu_id, region, key, self.previous_focus)
    }

    /// Keys while header `index` has focus.
    pub fn handle_key(
        &mut self,
        index: usize,
        key: KeyEvent,
        area: Rect,
        menus: &mut MenuScreen,
        focus: &mut Focus,
    ) -> BarEvent {
        let count = self.headers.len();
        if count == 0 {
            return BarEvent::Ignored;
        }
        match key.code {
            KeyCode::Tab | KeyCode::Right => {
                *focus = Focus::MenuHeader((index + 1) % count);
                BarEvent::Changed
            }
            KeyCode::BackTab | KeyCode::Left => {
                *focus = Focus::MenuHeader((index + count - 1) % count);
                BarEvent::Changed
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down => {
                if self.open(index, area, true, menus) {
                    BarEvent::Changed
                } else {
                    BarEvent::Ignored
                }
            }
            KeyCode::Esc => {
                let restore = std::mem::take(&mut self.previous_focus);
                *focus = restore;
                BarEvent::Released(restore)
            }
            _ => BarEvent::Ignored,
        }
    }

    /// A press on a header opens its menu in drag mode.
    pub fn handle_mouse(
        &mut self,
        mouse: MouseEvent,
        area: Rect,
        menus: &mut MenuScreen,
        focus: Focus,
    ) -> BarEvent {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return BarEvent::Ignored;
        }
        let pos = Position::new(mouse.column, mouse.row);
        let Some(index) = self.header_regions(area).iter().position(|r| r.contains(pos)) else {
            return BarEvent::Ignored;
        };
        if !focus.is_menu_header() {
            self.previous_focus = focus;
        }
        if self.open(index, area, false, menus) {
            BarEvent::Changed
        } else {
            BarEvent::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::model::{Menu, MenuItem, MenuRegistry};
    use crate::menu::screen::MenuMode;
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Size;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 60,
        height: 1,
    };

    fn fixture() -> (MenuBar, MenuScreen) {
        let mut reg = MenuRegistry::new();
        reg.insert(Menu::new("app", vec![MenuItem::new("Quit", "quit")]));
        reg.insert(Menu::new("file", vec![MenuItem::new("Open", "open")]));
        let bar = MenuBar::new(vec![
            MenuHeader::new("App", "app"),
            MenuHeader::new("File", "file"),
            MenuHeader::new("Nowhere", "missing"),
        ]);
        (bar, MenuScreen::new(reg, Size::new(60, 20)))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn headers_are_padded_and_capped() {
        let bar = MenuBar::new(vec![
            MenuHeader::new("App", "a"),
            MenuHeader::new("A very long header label", "b"),
        ]);
        let regions = bar.header_regions(AREA);
        assert_eq!(regions[0], Rect::new(0, 0, 5, 1));
        assert_eq!(regions[1], Rect::new(5, 0, MAX_HEADER_WIDTH, 1));
    }

    #[test]
    fn narrow_bar_drops_trailing_headers() {
        let (bar, _) = fixture();
        assert_eq!(bar.header_regions(Rect::new(0, 0, 11, 1)).len(), 2);
    }

    #[test]
    fn activate_saves_focus_and_escape_restores_it() {
        let (mut bar, mut menus) = fixture();
        let mut focus = bar.activate(Focus::Widget("button"));
        assert_eq!(focus, Focus::MenuHeader(0));
        let event = bar.handle_key(0, key(KeyCode::Esc), AREA, &mut menus, &mut focus);
        assert_eq!(event, BarEvent::Released(Focus::Widget("button")));
        assert_eq!(focus, Focus::Widget("button"));
    }

    #[test]
    fn arrows_wrap_between_headers() {
        let (mut bar, mut menus) = fixture();
        let mut focus = bar.activate(Focus::None);
        bar.handle_key(0, key(KeyCode::Left), AREA, &mut menus, &mut focus);
        assert_eq!(focus, Focus::MenuHeader(2));
        bar.handle_key(2, key(KeyCode::Tab), AREA, &mut menus, &mut focus);
        assert_eq!(focus, Focus::MenuHeader(0));
    }

    #[test]
    fn enter_opens_in_key_mode_below_header() {
        let (mut bar, mut menus) = fixture();
        let mut focus = bar.activate(Focus::Widget("log"));
        let event = bar.handle_key(1, key(KeyCode::Enter), AREA, &mut menus, &mut focus);
        assert_eq!(event, BarEvent::Changed);
        assert_eq!(menus.open_ids(), vec!["file"]);
        assert_eq!(menus.mode(), MenuMode::Key);
        assert_eq!(menus.stack()[0].region.x, 5);
        assert_eq!(menus.stack()[0].region.y, 1);
        assert_eq!(menus.close(), Focus::Widget("log"));
    }

    #[test]
    fn unknown_menu_opens_nothing() {
        let (mut bar, mut menus) = fixture();
        let mut focus = bar.activate(Focus::None);
        let event = bar.handle_key(2, key(KeyCode::Down), AREA, &mut menus, &mut focus);
        assert_eq!(event, BarEvent::Ignored);
        assert!(!menus.is_open());
    }

    #[test]
    fn press_on_header_opens_in_drag_mode() {
        let (mut bar, mut menus) = fixture();
        let press = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 1,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        let event = bar.handle_mouse(press, AREA, &mut menus, Focus::Widget("button"));
        assert_eq!(event, BarEvent::Changed);
        assert_eq!(menus.mode(), MenuMode::Drag);
        assert_eq!(menus.open_ids(), vec!["app"]);
        assert_eq!(menus.close(), Focus::Widget("button"));
    }

    #[test]
    fn press_between_headers_is_ignored() {
        let (mut bar, mut menus) = fixture();
        let press = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 50,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(bar.handle_mouse(press, AREA, &mut menus, Focus::None), BarEvent::Ignored);
    }
}
