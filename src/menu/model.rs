//! Menus and items, owned by a registry and addressed by stable keys.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use ratatui::layout::Size;
use unicode_width::UnicodeWidthStr;

/// Prefix of an item action that opens another menu.
pub const SUB_MENU_PREFIX: &str = "menu.";

/// Widest a menu may grow, borders included.
pub const MAX_MENU_WIDTH: u16 = 32;

/// Cells around an item name: two borders, left margin, marker and the
/// name's right padding.
const ITEM_DECORATION_WIDTH: u16 = 6;

/// Invoked with `(item name, action)` after the menu closes.
pub type ItemCallback = Rc<dyn Fn(&str, &str)>;

/// What selecting an item does.
#[derive(Clone)]
pub enum ItemKind {
    /// Close the menus and report a named action to the host.
    Action(String),
    /// Open the menu with this id to the right of the item.
    SubMenu(String),
    /// Close the menus and call back into the host.
    Callback {
        action: String,
        callback: ItemCallback,
    },
}

impl fmt::Debug for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Action(a) => f.debug_tuple("Action").field(a).finish(),
            ItemKind::SubMenu(id) => f.debug_tuple("SubMenu").field(id).finish(),
            ItemKind::Callback { action, .. } => {
                f.debug_struct("Callback").field("action", action).finish()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub name: String,
    pub kind: ItemKind,
    pub disabled: bool,
}

impl MenuItem {
    /// An item whose action names either a host action or, with the
    /// `menu.` prefix, a sub-menu id.
    pub fn new(name: impl Into<String>, action: &str) -> Self {
        let kind = match action.strip_prefix(SUB_MENU_PREFIX) {
            Some(id) => ItemKind::SubMenu(id.to_string()),
            None => ItemKind::Action(action.to_string()),
        };
        Self {
            name: name.into(),
            kind,
            disabled: false,
        }
    }

    pub fn with_callback(
        name: impl Into<String>,
        action: impl Into<String>,
        callback: impl Fn(&str, &str) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Callback {
                action: action.into(),
                callback: Rc::new(callback),
            },
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn sub_menu(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::SubMenu(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_sub_menu(&self) -> bool {
        self.sub_menu().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Menu {
    pub id: String,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(id: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            id: id.into(),
            items,
        }
    }

    /// Size the menu wants on a screen `screen_height` rows tall.
    pub fn natural_size(&self, screen_height: u16) -> Size {
        let widest = self
            .items
            .iter()
            .map(|item| item.name.width())
            .max()
            .unwrap_or(0);
        let width = (widest as u16)
            .saturating_add(ITEM_DECORATION_WIDTH)
            .min(MAX_MENU_WIDTH);
        let max_height = (u32::from(screen_height) * 90 / 100) as u16;
        let height = (self.items.len() as u16).saturating_add(2).min(max_height);
        Size::new(width, height)
    }

    pub fn first_enabled(&self) -> Option<usize> {
        self.items.iter().position(|item| !item.disabled)
    }

    /// First enabled item after `index`.
    pub fn next_enabled(&self, index: usize) -> Option<usize> {
        (index + 1..self.items.len()).find(|&i| !self.items[i].disabled)
    }

    /// Last enabled item before `index`.
    pub fn previous_enabled(&self, index: usize) -> Option<usize> {
        (0..index.min(self.items.len()))
            .rev()
            .find(|&i| !self.items[i].disabled)
    }
}

/// Stable handle to a registered menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuKey(usize);

/// One item of one menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub menu: MenuKey,
    pub index: usize,
}

/// All menus the host declared, by id. Registering an id again replaces
/// the menu but keeps its key.
#[derive(Debug, Default)]
pub struct MenuRegistry {
    menus: IndexMap<String, Menu>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, menu: Menu) -> MenuKey {
        let (index, _) = self.menus.insert_full(menu.id.clone(), menu);
        MenuKey(index)
    }

    pub fn key(&self, id: &str) -> Option<MenuKey> {
        self.menus.get_index_of(id).map(MenuKey)
    }

    pub fn get(&self, key: MenuKey) -> Option<&Menu> {
        self.menus.get_index(key.0).map(|(_, menu)| menu)
    }

    pub fn item(&self, item: ItemRef) -> Option<&MenuItem> {
        self.get(item.menu)?.items.get(item.index)
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    /// Menus reachable from `key` through one sub-menu item, in item order.
    /// Ids that are not registered are skipped.
    pub fn children(&self, key: MenuKey) -> Vec<MenuKey> {
        let Some(menu) = self.get(key) else {
            return Vec::new();
        };
        let mut children = Vec::new();
        for child in menu.items.iter().filter_map(|i| i.sub_menu()) {
            if let Some(child) = self.key(child) {
                if !children.contains(&child) {
                    children.push(child);
                }
            }
        }
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn registry() -> MenuRegistry {
        let mut reg = MenuRegistry::new();
        reg.insert(Menu::new(
            "file",
            vec![
                MenuItem::new("Open", "open"),
                MenuItem::new("Recent", "menu.recent"),
                MenuItem::new("Gone", "menu.missing"),
            ],
        ));
        reg.insert(Menu::new("recent", vec![MenuItem::new("a.txt", "open_a")]));
        reg
    }

    #[test]
    fn menu_prefix_declares_sub_menu() {
        let item = MenuItem::new("Recent", "menu.recent");
        assert_eq!(item.sub_menu(), Some("recent"));
        let item = MenuItem::new("Open", "screen.open");
        assert!(matches!(item.kind, ItemKind::Action(ref a) if a == "screen.open"));
    }

    #[test]
    fn callback_items_keep_action() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let item = MenuItem::with_callback("Dark", "toggle", move |name, action| {
            sink.borrow_mut().push(format!("{name}:{action}"));
        });
        if let ItemKind::Callback { action, callback } = &item.kind {
            callback(&item.name, action);
        }
        assert_eq!(calls.borrow().as_slice(), ["Dark:toggle"]);
    }

    #[test]
    fn natural_size_caps_width_and_height() {
        let menu = Menu::new("m", vec![MenuItem::new("Open", "open")]);
        assert_eq!(menu.natural_size(40), Size::new(10, 3));
        let long = Menu::new("m", vec![MenuItem::new("x".repeat(60), "a")]);
        assert_eq!(long.natural_size(40).width, MAX_MENU_WIDTH);
        let tall = Menu::new("m", (0..50).map(|i| MenuItem::new(i.to_string(), "a")).collect());
        assert_eq!(tall.natural_size(20).height, 18);
    }

    #[test]
    fn enabled_navigation_skips_disabled() {
        let menu = Menu::new(
            "m",
            vec![
                MenuItem::new("a", "a").disabled(),
                MenuItem::new("b", "b"),
                MenuItem::new("c", "c").disabled(),
                MenuItem::new("d", "d"),
            ],
        );
        assert_eq!(menu.first_enabled(), Some(1));
        assert_eq!(menu.next_enabled(1), Some(3));
        assert_eq!(menu.next_enabled(3), None);
        assert_eq!(menu.previous_enabled(3), Some(1));
        assert_eq!(menu.previous_enabled(1), None);
    }

    #[test]
    fn registry_keys_are_stable() {
        let mut reg = registry();
        let key = reg.key("recent").unwrap();
        reg.insert(Menu::new("recent", vec![]));
        assert_eq!(reg.key("recent"), Some(key));
        assert!(reg.get(key).unwrap().items.is_empty());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn children_follow_registered_sub_menus() {
        let reg = registry();
        let file = reg.key("file").unwrap();
        assert_eq!(reg.children(file), vec![reg.key("recent").unwrap()]);
        let item = ItemRef { menu: file, index: 1 };
        assert_eq!(reg.item(item).unwrap().name, "Recent");
        assert!(reg.item(ItemRef { menu: file, index: 9 }).is_none());
    }
}
