use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use ratatui::layout::{Position, Rect, Size};
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::dialog::{ConfirmDialog, DialogAction};
use crate::event::Event;
use crate::focus::Focus;
use crate::fs::drives::platform_drives;
use crate::fs::scanner::ScanOutcome;
use crate::list::columns::{default_columns, SortState};
use crate::menu::bar::{MenuBar, MenuHeader};
use crate::menu::model::{Menu, MenuItem, MenuRegistry};
use crate::menu::screen::{MenuEvent, MenuScreen};
use crate::selector::{
    Selector, SelectorAction, SelectorConfig, SelectorEnv, SelectorMode, SelectorOutcome,
};
use crate::theme::Theme;

/// Focus names of the host's own widgets.
pub const LOG_WIDGET: &str = "log";
pub const BUTTON_WIDGET: &str = "button";

/// Menu shown by the button, right click and Ctrl+A.
pub const CONTEXT_MENU: &str = "action_menu";

const MAX_LOG_LINES: usize = 500;
const BUTTON_LABEL: &str = " Actions ▾ ";

/// What to do with a selector's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorPurpose {
    Open,
    Save,
    ChooseDirectory,
}

/// What to do with a confirmation's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPurpose {
    Quit,
    Overwrite(PathBuf),
}

/// One screen of the modal stack.
pub enum Modal {
    Selector {
        selector: Box<Selector>,
        purpose: SelectorPurpose,
    },
    Confirm {
        dialog: ConfirmDialog,
        purpose: ConfirmPurpose,
    },
}

/// Where the host's widgets sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLayout {
    pub bar: Rect,
    pub button: Rect,
    pub log: Rect,
    pub status: Rect,
}

impl HostLayout {
    pub fn compute(screen: Rect) -> Self {
        let bar = Rect::new(screen.x, screen.y, screen.width, screen.height.min(1));
        let status = Rect::new(
            screen.x,
            screen.bottom().saturating_sub(1).max(bar.bottom()),
            screen.width,
            screen.height.saturating_sub(1).min(1),
        );
        let button_width = (BUTTON_LABEL.chars().count() as u16).min(screen.width.saturating_sub(1));
        let button = Rect::new(
            screen.x + 1.min(screen.width),
            bar.bottom(),
            button_width,
            screen.height.saturating_sub(2).min(1),
        );
        let log_y = button.bottom();
        let log = Rect::new(
            screen.x,
            log_y,
            screen.width,
            status.y.saturating_sub(log_y),
        );
        Self {
            bar,
            button,
            log,
            status,
        }
    }

    pub fn button_label() -> &'static str {
        BUTTON_LABEL
    }
}

pub struct App {
    pub config: AppConfig,
    pub theme: Theme,
    pub screen: Rect,
    pub bar: MenuBar,
    pub menus: MenuScreen,
    pub focus: Focus,
    pub modals: Vec<Modal>,
    pub log: Vec<String>,
    /// Lines scrolled back from the newest log entry.
    pub log_scroll: usize,
    pub status: String,
    pub status_is_error: bool,
    pub should_quit: bool,
    start_dir: PathBuf,
    callback_log: Rc<RefCell<Vec<String>>>,
    tx: mpsc::UnboundedSender<Event>,
}

impl App {
    pub fn new(
        config: AppConfig,
        start_dir: &Path,
        screen: Rect,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let callback_log = Rc::new(RefCell::new(Vec::new()));
        let registry = demo_menus(&callback_log);
        Self {
            config,
            theme: Theme::default(),
            screen,
            bar: MenuBar::new(vec![
                MenuHeader::new("App", "app_menu"),
                MenuHeader::new("File", "file_menu"),
                MenuHeader::new("Actions", "action_menu"),
            ]),
            menus: MenuScreen::new(registry, Size::new(screen.width, screen.height)),
            focus: Focus::Widget(LOG_WIDGET),
            modals: Vec::new(),
            log: Vec::new(),
            log_scroll: 0,
            status: String::from("Ready"),
            status_is_error: false,
            should_quit: false,
            start_dir: start_dir.to_path_buf(),
            callback_log,
            tx,
        }
    }

    pub fn layout(&self) -> HostLayout {
        HostLayout::compute(self.screen)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Append to the log panel and the trace log.
    pub fn log_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(%line, "demo");
        self.status = line.clone();
        self.status_is_error = false;
        self.log.push(line);
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
        self.log_scroll = 0;
    }

    /// Log a failure and show it highlighted in the status bar.
    pub fn report_error(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!(%line, "demo");
        self.log_line(line);
        self.status_is_error = true;
    }

    pub fn scroll_log(&mut self, delta: isize) {
        let max = self.log.len().saturating_sub(1) as isize;
        self.log_scroll = (self.log_scroll as isize + delta).clamp(0, max) as usize;
    }

    /// Move lines written by callback items into the log.
    pub fn drain_callbacks(&mut self) {
        let lines: Vec<String> = self.callback_log.borrow_mut().drain(..).collect();
        for line in lines {
            self.log_line(line);
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        self.menus.resize(Size::new(width, height));
        for modal in &mut self.modals {
            if let Modal::Selector { selector, .. } = modal {
                selector.resize(self.screen);
            }
        }
    }

    // ── Modal stack ──────────────────────────────────────────────────────

    pub fn has_modal(&self) -> bool {
        !self.modals.is_empty()
    }

    fn selector_env(&self) -> SelectorEnv {
        let config = &self.config;
        SelectorEnv {
            screen: self.screen,
            columns: default_columns(
                self.screen.width,
                config.name_width(),
                config.size_width(),
                config.modified_width(),
            ),
            sort: SortState {
                column: config.sort_column(),
                ascending: config.sort_ascending(),
            },
            show_hidden: config.show_hidden(),
            tree_width: config.tree_width(),
            watch_debounce: config
                .watcher_enabled()
                .then(|| Duration::from_millis(config.debounce_ms())),
            drives: platform_drives(),
            tx: self.tx.clone(),
        }
    }

    /// Show a file selector whose result is handled per `purpose`.
    pub fn open_selector(&mut self, purpose: SelectorPurpose) {
        let mode = match purpose {
            SelectorPurpose::Open => SelectorMode::Existing,
            SelectorPurpose::Save => SelectorMode::New,
            SelectorPurpose::ChooseDirectory => SelectorMode::Directory,
        };
        let mut config = SelectorConfig::new(&self.start_dir, mode)
            .with_filter(self.config.default_filter());
        if purpose == SelectorPurpose::ChooseDirectory {
            config = config.with_show_all(true).with_ok_text("Select");
        }
        let selector = Selector::new(config, self.selector_env());
        tracing::debug!(?purpose, "selector opened");
        self.modals.push(Modal::Selector {
            selector: Box::new(selector),
            purpose,
        });
    }

    pub fn confirm_quit(&mut self) {
        let dialog = ConfirmDialog::new(
            "Do you really want to quit?",
            &[("Quit", "quit", "error"), ("Cancel", "cancel", "primary")],
        );
        self.modals.push(Modal::Confirm {
            dialog,
            purpose: ConfirmPurpose::Quit,
        });
    }

    fn confirm_overwrite(&mut self, path: PathBuf) {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
        let dialog = ConfirmDialog::new(
            format!("Save file {name}?"),
            &[("Save", "save", "success"), ("Cancel", "cancel", "error")],
        );
        self.modals.push(Modal::Confirm {
            dialog,
            purpose: ConfirmPurpose::Overwrite(path),
        });
    }

    /// Act on the top selector's answer.
    pub fn selector_action(&mut self, action: SelectorAction) {
        let SelectorAction::Done(outcome) = action else {
            return;
        };
        let Some(Modal::Selector { purpose, .. }) = self.modals.pop() else {
            return;
        };
        match (purpose, outcome) {
            (SelectorPurpose::Save, SelectorOutcome::Chosen(path)) if path.is_file() => {
                self.confirm_overwrite(path);
            }
            (purpose, SelectorOutcome::Chosen(path)) => {
                self.start_dir = if path.is_dir() {
                    path.clone()
                } else {
                    path.parent().map_or_else(|| self.start_dir.clone(), Path::to_path_buf)
                };
                self.log_line(format!("{}: {}", purpose_label(purpose), path.display()));
            }
            (purpose, SelectorOutcome::Cancelled) => {
                self.log_line(format!("{}: cancelled", purpose_label(purpose)));
            }
        }
    }

    /// Act on the top dialog's answer.
    pub fn dialog_action(&mut self, action: DialogAction) {
        let DialogAction::Dismissed(id) = action else {
            return;
        };
        let Some(Modal::Confirm { purpose, .. }) = self.modals.pop() else {
            return;
        };
        match purpose {
            ConfirmPurpose::Quit if id.as_deref() == Some("quit") => self.quit(),
            ConfirmPurpose::Quit => {}
            ConfirmPurpose::Overwrite(path) if id.as_deref() == Some("save") => {
                self.log_line(format!("Save: {}", path.display()));
            }
            ConfirmPurpose::Overwrite(path) => {
                self.log_line(format!("Save: not overwriting {}", path.display()));
            }
        }
    }

    // ── Background events ────────────────────────────────────────────────

    /// Every open selector sees the result; stale or foreign ones are
    /// discarded by the list they do not belong to.
    pub fn handle_scan(&mut self, outcome: ScanOutcome) {
        let mut outcome = Some(outcome);
        for modal in self.modals.iter_mut().rev() {
            if let Modal::Selector { selector, .. } = modal {
                let Some(candidate) = outcome.take() else {
                    break;
                };
                if selector.list.pending_generation() == candidate.generation {
                    selector.handle_scan(candidate);
                } else {
                    outcome = Some(candidate);
                }
            }
        }
    }

    pub fn handle_dir_changed(&mut self, paths: &[PathBuf]) {
        for modal in &mut self.modals {
            if let Modal::Selector { selector, .. } = modal {
                selector.handle_dir_changed(paths);
            }
        }
    }

    // ── Menus ────────────────────────────────────────────────────────────

    /// Focus the first menu-bar header.
    pub fn activate_menu_bar(&mut self) {
        self.focus = self.bar.activate(self.focus);
    }

    /// Open the context menu at the focused widget (keyboard) or at the
    /// pointer.
    pub fn open_context_menu(&mut self, anchor: Option<Position>) {
        let key = anchor.is_none();
        let anchor = anchor.unwrap_or_else(|| self.focus_anchor());
        if !self.menus.context_menu(CONTEXT_MENU, anchor, key, self.focus) {
            self.report_error(format!("Menu {CONTEXT_MENU} is not defined"));
        }
    }

    fn focus_anchor(&self) -> Position {
        let layout = self.layout();
        match self.focus {
            Focus::Widget(BUTTON_WIDGET) => Position::new(layout.button.right(), layout.button.y),
            Focus::MenuHeader(index) => self
                .bar
                .header_regions(layout.bar)
                .get(index)
                .map_or(Position::new(0, 1), |r| Position::new(r.x, r.y + 1)),
            _ => Position::new(layout.log.x + 1, layout.log.y + 1),
        }
    }

    /// Button press: the context menu opens at the button's right edge.
    pub fn press_button(&mut self, key: bool) {
        self.focus = Focus::Widget(BUTTON_WIDGET);
        let button = self.layout().button;
        let anchor = Position::new(button.right(), button.y);
        self.menus.context_menu(CONTEXT_MENU, anchor, key, self.focus);
    }

    pub fn menu_event(&mut self, event: MenuEvent) {
        match event {
            MenuEvent::Closed(restore) => self.focus = restore,
            MenuEvent::Action {
                item,
                action,
                restore,
            } => {
                self.focus = restore;
                self.run_action(&item, &action);
            }
            MenuEvent::Changed | MenuEvent::Ignored => {}
        }
        self.drain_callbacks();
    }

    /// Run a named action from a menu item.
    pub fn run_action(&mut self, item: &str, action: &str) {
        match action {
            "quit" => self.confirm_quit(),
            "about" => self.log_line("term-widgets demo: selectors, file lists and menus"),
            "open" => self.open_selector(SelectorPurpose::Open),
            "save" => self.open_selector(SelectorPurpose::Save),
            "choose_dir" => self.open_selector(SelectorPurpose::ChooseDirectory),
            _ => self.log_line(format!("Menu item {item:?} chose {action:?}")),
        }
    }

    /// Switch between the host widgets.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Widget(LOG_WIDGET) => Focus::Widget(BUTTON_WIDGET),
            _ => Focus::Widget(LOG_WIDGET),
        };
    }
}

fn purpose_label(purpose: SelectorPurpose) -> &'static str {
    match purpose {
        SelectorPurpose::Open => "Open",
        SelectorPurpose::Save => "Save",
        SelectorPurpose::ChooseDirectory => "Directory",
    }
}

/// Menus of the demo host, including a missing sub-menu id and disabled
/// items to show how those behave.
fn demo_menus(callback_log: &Rc<RefCell<Vec<String>>>) -> MenuRegistry {
    let logger = |log: &Rc<RefCell<Vec<String>>>| {
        let log = Rc::clone(log);
        move |name: &str, action: &str| {
            log.borrow_mut()
                .push(format!("Callback from {name:?} with {action:?}"));
        }
    };

    let mut registry = MenuRegistry::new();
    registry.insert(Menu::new(
        "app_menu",
        vec![MenuItem::new("About", "about"), MenuItem::new("Quit", "quit")],
    ));
    registry.insert(Menu::new(
        "file_menu",
        vec![
            MenuItem::new("Open…", "open"),
            MenuItem::new("Save…", "save"),
            MenuItem::new("Choose directory…", "choose_dir"),
            MenuItem::new("Test Menu", "menu.test_menu"),
        ],
    ));
    registry.insert(Menu::new(
        "action_menu",
        vec![
            MenuItem::new("Test Menu", "menu.test_menu"),
            MenuItem::with_callback("Log via callback", "log_callback", logger(callback_log)),
            MenuItem::new("Open…", "open"),
        ],
    ));
    registry.insert(Menu::new(
        "test_menu",
        vec![
            MenuItem::new("Item 1", "test_1"),
            MenuItem::new("Item 2", "test_2"),
            MenuItem::new("More items", "menu.test_menu_2"),
            MenuItem::with_callback("Callback item", "test_callback", logger(callback_log)),
            MenuItem::new("Missing menu", "menu.foo"),
        ],
    ));
    let mut more: Vec<MenuItem> = (1..=9)
        .map(|i| MenuItem::new(format!("Item 2.{i}"), &format!("test_2_{i}")))
        .collect();
    more.push(MenuItem::new("Deeper", "menu.test_menu_3"));
    more.push(MenuItem::new("Deeper again", "menu.test_menu_3"));
    registry.insert(Menu::new("test_menu_2", more));
    registry.insert(Menu::new(
        "test_menu_3",
        vec![
            MenuItem::new("Enabled", "test_3_1"),
            MenuItem::new("Disabled", "test_3_2").disabled(),
            MenuItem::new("Also enabled", "test_3_3"),
            MenuItem::new("Also disabled", "test_3_4").disabled(),
        ],
    ));
    registry
}
