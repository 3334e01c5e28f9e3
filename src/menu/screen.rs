//! The open-menu stack: cascading menus over the rest of the screen.

use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect, Size};

use crate::focus::Focus;
use crate::menu::model::{ItemKind, ItemRef, MenuKey, MenuRegistry};
use crate::menu::popup::place;

/// How the open menus interpret the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuMode {
    /// The button is still held from the press that opened the menu.
    Drag,
    /// Opened by a completed click; items need a click of their own.
    Click,
    /// Opened from the keyboard; the focused item is highlighted.
    Key,
}

/// One open menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEntry {
    pub menu: MenuKey,
    /// The item that opened this menu; `None` for the root.
    pub origin: Option<ItemRef>,
    pub region: Rect,
    /// First item row shown when the menu is shorter than its items.
    pub scroll: usize,
}

impl StackEntry {
    /// Rows available for items inside the border.
    pub fn rows(&self) -> usize {
        usize::from(self.region.height.saturating_sub(2))
    }
}

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuHit {
    Item(ItemRef),
    /// Inside a menu but not on an item (border, padding).
    Menu(MenuKey),
    Outside,
}

/// Result of feeding an event to the menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    Ignored,
    Changed,
    /// Everything closed; give the focus back.
    Closed(Focus),
    /// An action item was chosen; the menus are already closed.
    Action {
        item: String,
        action: String,
        restore: Focus,
    },
}

pub struct MenuScreen {
    registry: MenuRegistry,
    stack: Vec<StackEntry>,
    mode: MenuMode,
    focused: Option<ItemRef>,
    hover: Option<ItemRef>,
    pressed: Option<MenuHit>,
    return_focus: Focus,
    screen: Size,
}

impl MenuScreen {
    pub fn new(registry: MenuRegistry, screen: Size) -> Self {
        Self {
            registry,
            stack: Vec::new(),
            mode: MenuMode::Drag,
            focused: None,
            hover: None,
            pressed: None,
            return_focus: Focus::None,
            screen,
        }
    }

    pub fn registry(&self) -> &MenuRegistry {
        &self.registry
    }

    pub fn stack(&self) -> &[StackEntry] {
        &self.stack
    }

    /// Ids of the open menus, root first.
    pub fn open_ids(&self) -> Vec<&str> {
        self.stack
            .iter()
            .filter_map(|e| self.registry.get(e.menu))
            .map(|m| m.id.as_str())
            .collect()
    }

    pub fn is_open(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn mode(&self) -> MenuMode {
        self.mode
    }

    /// Item highlighted for the keyboard (key mode only).
    pub fn focused(&self) -> Option<ItemRef> {
        self.focused
    }

    pub fn hover(&self) -> Option<ItemRef> {
        self.hover
    }

    pub fn resize(&mut self, screen: Size) {
        self.screen = screen;
    }

    /// Open the menu of a menu-bar header whose label sits at `header`.
    ///
    /// Keyboard opening focuses the first enabled item; a pointer press
    /// starts a drag. Returns `false`, leaving everything closed, when
    /// `menu_id` is unknown.
    pub fn open_menu(&mut self, menu_id: &str, header: Rect, key: bool, restore: Focus) -> bool {
        self.mode = if key { MenuMode::Key } else { MenuMode::Drag };
        let anchor = Position::new(header.x, header.y.saturating_add(1));
        self.open_root(menu_id, anchor, key, restore)
    }

    /// Open `menu_id` as a free-standing menu at `anchor`.
    ///
    /// Pointer-opened context menus appear after the button was released,
    /// so they start in click mode.
    pub fn context_menu(&mut self, menu_id: &str, anchor: Position, key: bool, restore: Focus) -> bool {
        self.mode = if key { MenuMode::Key } else { MenuMode::Click };
        self.open_root(menu_id, anchor, key, restore)
    }

    fn open_root(&mut self, menu_id: &str, anchor: Position, key: bool, restore: Focus) -> bool {
        self.clear();
        let Some(menu) = self.registry.key(menu_id) else {
            tracing::debug!(menu_id, "menu not found");
            return false;
        };
        self.return_focus = restore;
        let region = self.region_for(menu, anchor);
        self.stack.push(StackEntry {
            menu,
            origin: None,
            region,
            scroll: 0,
        });
        tracing::debug!(menu_id, mode = ?self.mode, "menu opened");
        self.focus_menu(menu, key);
        true
    }

    /// Open `target` beside `item`, closing any menus above the item's own.
    ///
    /// A no-op when the item's menu is not open. An unknown `target` still
    /// closes the deeper menus but opens nothing.
    pub fn open_sub_menu(&mut self, item: ItemRef, target: &str, key: bool) -> bool {
        let Some(depth) = self.stack.iter().position(|e| e.menu == item.menu) else {
            return false;
        };
        self.stack.truncate(depth + 1);
        if self.hover.is_some_and(|h| !self.is_open_menu(h.menu)) {
            self.hover = None;
        }
        let Some(menu) = self.registry.key(target) else {
            tracing::debug!(target, "sub-menu not found");
            return false;
        };
        let parent = self.stack[depth];
        let row = item.index.saturating_sub(parent.scroll) as u16;
        let anchor = Position::new(
            parent.region.right().saturating_sub(1),
            parent.region.y.saturating_add(1 + row),
        );
        let region = self.region_for(menu, anchor);
        self.stack.push(StackEntry {
            menu,
            origin: Some(item),
            region,
            scroll: 0,
        });
        tracing::debug!(target, depth = self.stack.len(), "sub-menu opened");
        self.focus_menu(menu, key);
        true
    }

    /// Close the innermost menu. With a single menu open this is
    /// [`MenuScreen::close`].
    pub fn pop_menu(&mut self, key: bool) -> MenuEvent {
        if self.stack.len() <= 1 {
            return MenuEvent::Closed(self.close());
        }
        let Some(popped) = self.stack.pop() else {
            return MenuEvent::Ignored;
        };
        if self.hover.is_some_and(|h| h.menu == popped.menu) {
            self.hover = None;
        }
        if key {
            let top = self.stack[self.stack.len() - 1].menu;
            let live_child = self.registry.children(top).contains(&popped.menu);
            match popped.origin.filter(|o| live_child && o.menu == top) {
                Some(origin) => self.focus_item(origin),
                None => self.focus_menu(top, true),
            }
        }
        MenuEvent::Changed
    }

    /// Dismiss every menu and return the focus to restore.
    pub fn close(&mut self) -> Focus {
        self.clear();
        tracing::debug!(restore = ?self.return_focus, "menus closed");
        std::mem::take(&mut self.return_focus)
    }

    fn clear(&mut self) {
        self.stack.clear();
        self.focused = None;
        self.hover = None;
        self.pressed = None;
    }

    fn region_for(&self, menu: MenuKey, anchor: Position) -> Rect {
        let size = self
            .registry
            .get(menu)
            .map_or(Size::new(0, 0), |m| m.natural_size(self.screen.height));
        place(anchor, size, self.screen)
    }

    fn is_open_menu(&self, menu: MenuKey) -> bool {
        self.stack.iter().any(|e| e.menu == menu)
    }

    /// Give the keyboard focus to the first enabled item, or to nothing
    /// for pointer-opened menus.
    fn focus_menu(&mut self, menu: MenuKey, key: bool) {
        let first = key
            .then(|| self.registry.get(menu).and_then(|m| m.first_enabled()))
            .flatten();
        match first {
            Some(index) => self.focus_item(ItemRef { menu, index }),
            None => self.focused = None,
        }
    }

    /// Items only show keyboard focus in key mode; otherwise focusing one
    /// clears the focus altogether.
    fn focus_item(&mut self, item: ItemRef) {
        if self.mode != MenuMode::Key {
            self.focused = None;
            return;
        }
        self.focused = Some(item);
        if let Some(entry) = self.stack.iter_mut().find(|e| e.menu == item.menu) {
            let rows = entry.rows().max(1);
            if item.index < entry.scroll {
                entry.scroll = item.index;
            } else if item.index >= entry.scroll + rows {
                entry.scroll = item.index + 1 - rows;
            }
        }
    }

    /// Activate `item`: open its sub-menu, or close and run it.
    pub fn trigger(&mut self, item: ItemRef, key: bool) -> MenuEvent {
        let Some(menu_item) = self.registry.item(item) else {
            return MenuEvent::Ignored;
        };
        if menu_item.disabled {
            return MenuEvent::Ignored;
        }
        let name = menu_item.name.clone();
        match menu_item.kind.clone() {
            ItemKind::SubMenu(target) => {
                self.open_sub_menu(item, &target, key);
                MenuEvent::Changed
            }
            ItemKind::Callback { action, callback } => {
                let restore = self.close();
                callback(&name, &action);
                MenuEvent::Closed(restore)
            }
            ItemKind::Action(action) => {
                let restore = self.close();
                tracing::debug!(item = %name, action = %action, "menu action");
                MenuEvent::Action {
                    item: name,
                    action,
                    restore,
                }
            }
        }
    }

    /// What is drawn at `pos`, checking the innermost menu first.
    pub fn hit(&self, pos: Position) -> MenuHit {
        for entry in self.stack.iter().rev() {
            if !entry.region.contains(pos) {
                continue;
            }
            let inside_x = pos.x > entry.region.x && pos.x + 1 < entry.region.right();
            let row = pos.y.checked_sub(entry.region.y + 1).map(usize::from);
            let len = self.registry.get(entry.menu).map_or(0, |m| m.items.len());
            if let Some(row) = row.filter(|&r| inside_x && r < entry.rows()) {
                let index = row + entry.scroll;
                if index < len {
                    return MenuHit::Item(ItemRef {
                        menu: entry.menu,
                        index,
                    });
                }
            }
            return MenuHit::Menu(entry.menu);
        }
        MenuHit::Outside
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> MenuEvent {
        if !self.is_open() {
            return MenuEvent::Ignored;
        }
        let pos = Position::new(mouse.column, mouse.row);
        let hit = self.hit(pos);
        match mouse.kind {
            MouseEventKind::Down(_) => {
                self.pressed = Some(hit);
                MenuEvent::Ignored
            }
            MouseEventKind::Up(_) => self.release(hit, pos),
            MouseEventKind::Moved => {
                let mut changed = self.set_hover(hit);
                if self.mode == MenuMode::Drag {
                    self.mode = MenuMode::Click;
                    changed = true;
                }
                changed_event(changed)
            }
            MouseEventKind::Drag(_) => {
                let entered = self.set_hover(hit);
                if entered && self.mode == MenuMode::Drag {
                    if let MenuHit::Item(item) = hit {
                        if let Some(target) = self.sub_menu_of(item) {
                            self.open_sub_menu(item, &target, false);
                        }
                    }
                }
                changed_event(entered)
            }
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let down = mouse.kind == MouseEventKind::ScrollDown;
                changed_event(self.scroll_menu_at(pos, down))
            }
            _ => MenuEvent::Ignored,
        }
    }

    fn release(&mut self, hit: MenuHit, pos: Position) -> MenuEvent {
        let pressed = self.pressed.take();
        let clicked = pressed == Some(hit);
        match hit {
            MenuHit::Item(item) => {
                if self.mode == MenuMode::Drag {
                    let disabled = self.registry.item(item).map_or(true, |m| m.disabled);
                    if disabled || self.sub_menu_of(item).is_some() {
                        return MenuEvent::Closed(self.close());
                    }
                    return self.trigger(item, false);
                }
                if clicked {
                    return self.trigger(item, false);
                }
                MenuEvent::Ignored
            }
            _ if pos.y == 0 && self.mode == MenuMode::Drag => {
                self.mode = MenuMode::Click;
                MenuEvent::Changed
            }
            _ if self.mode == MenuMode::Drag || clicked => MenuEvent::Closed(self.close()),
            _ => MenuEvent::Ignored,
        }
    }

    fn set_hover(&mut self, hit: MenuHit) -> bool {
        let hover = match hit {
            MenuHit::Item(item) => Some(item).filter(|i| {
                self.registry.item(*i).is_some_and(|m| !m.disabled)
            }),
            _ => None,
        };
        if hover == self.hover {
            return false;
        }
        self.hover = hover;
        true
    }

    fn sub_menu_of(&self, item: ItemRef) -> Option<String> {
        self.registry
            .item(item)
            .filter(|m| !m.disabled)
            .and_then(|m| m.sub_menu())
            .map(str::to_string)
    }

    fn scroll_menu_at(&mut self, pos: Position, down: bool) -> bool {
        let Some(entry) = self.stack.iter_mut().rev().find(|e| e.region.contains(pos)) else {
            return false;
        };
        let len = self.registry.get(entry.menu).map_or(0, |m| m.items.len());
        let max = len.saturating_sub(entry.rows());
        let next = if down {
            (entry.scroll + 1).min(max)
        } else {
            entry.scroll.saturating_sub(1)
        };
        let changed = next != entry.scroll;
        entry.scroll = next;
        changed
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> MenuEvent {
        if !self.is_open() {
            return MenuEvent::Ignored;
        }
        if key.code == KeyCode::Esc {
            return MenuEvent::Closed(self.close());
        }
        let Some(current) = self.focused else {
            return MenuEvent::Ignored;
        };
        let Some(menu) = self.registry.get(current.menu) else {
            return MenuEvent::Ignored;
        };
        let next = match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right => {
                return self.trigger(current, true);
            }
            KeyCode::Left => return self.pop_menu(true),
            KeyCode::Up | KeyCode::BackTab => menu.previous_enabled(current.index),
            KeyCode::Down | KeyCode::Tab => menu.next_enabled(current.index),
            _ => return MenuEvent::Ignored,
        };
        match next {
            Some(index) => {
                self.focus_item(ItemRef {
                    menu: current.menu,
                    index,
                });
                MenuEvent::Changed
            }
            None => MenuEvent::Ignored,
        }
    }
}

fn changed_event(changed: bool) -> MenuEvent {
    if changed {
        MenuEvent::Changed
    } else {
        MenuEvent::Ignored
    }
}
