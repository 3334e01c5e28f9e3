//! Modal file selector: breadcrumb, directory tree and file list working on
//! one current directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc;

use crate::breadcrumb::{segment_at, Breadcrumb, PathChanged};
use crate::event::Event;
use crate::fs::dir_tree::DirTree;
use crate::fs::drives::{next_drive, DriveSource};
use crate::fs::entry::EntryKinds;
use crate::fs::scanner::ScanOutcome;
use crate::fs::watcher::{affects_listing, DirWatcher};
use crate::input::{InputOutcome, TextInput};
use crate::list::columns::{ColumnSpec, SortState, MIN_COLUMN_WIDTH};
use crate::list::file_list::{FileList, ListAction};

/// What the selector lets the user pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorMode {
    /// An existing file (open dialogs).
    #[default]
    Existing,
    /// A possibly new file name (save dialogs).
    New,
    /// A directory; the filename and filter fields are hidden.
    Directory,
}

/// Per-invocation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    pub directory: PathBuf,
    pub mode: SelectorMode,
    /// List files and directories together.
    pub show_all: bool,
    pub filename: String,
    pub ok_text: String,
    pub filter: String,
}

impl SelectorConfig {
    pub fn new(directory: impl Into<PathBuf>, mode: SelectorMode) -> Self {
        let ok_text = match mode {
            SelectorMode::Existing => "Open",
            SelectorMode::New => "Save",
            SelectorMode::Directory => "Choose",
        };
        Self {
            directory: directory.into(),
            mode,
            show_all: false,
            filename: String::new(),
            ok_text: ok_text.to_string(),
            filter: crate::config::DEFAULT_FILTER.to_string(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    pub fn with_ok_text(mut self, ok_text: impl Into<String>) -> Self {
        self.ok_text = ok_text.into();
        self
    }

    /// Entry kinds the file list shows in this mode.
    pub fn entry_kinds(&self) -> EntryKinds {
        match self.mode {
            SelectorMode::Directory => EntryKinds {
                files: self.show_all,
                dirs: true,
            },
            _ => EntryKinds {
                files: true,
                dirs: self.show_all,
            },
        }
    }
}

/// Application-wide settings the selector is built with.
pub struct SelectorEnv {
    pub screen: Rect,
    pub columns: Vec<ColumnSpec>,
    pub sort: SortState,
    pub show_hidden: bool,
    pub tree_width: Option<u16>,
    /// Debounce for the directory watcher; `None` disables watching.
    pub watch_debounce: Option<Duration>,
    pub drives: Box<dyn DriveSource>,
    pub tx: mpsc::UnboundedSender<Event>,
}

/// How the selector was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOutcome {
    Chosen(PathBuf),
    Cancelled,
}

impl SelectorOutcome {
    /// The chosen path as a string; empty when cancelled.
    pub fn into_string(self) -> String {
        match self {
            SelectorOutcome::Chosen(path) => path.to_string_lossy().to_string(),
            SelectorOutcome::Cancelled => String::new(),
        }
    }
}

/// Result of routing an event to the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorAction {
    None,
    Redraw,
    Done(SelectorOutcome),
}

impl SelectorAction {
    fn redraw_if(changed: bool) -> Self {
        if changed {
            SelectorAction::Redraw
        } else {
            SelectorAction::None
        }
    }
}

/// Where keyboard input goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorFocus {
    UpButton,
    DriveButton,
    Breadcrumb,
    EditButton,
    Tree,
    List,
    Filename,
    Filter,
    Ok,
    Cancel,
}

/// Origin of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSource {
    Breadcrumb,
    Drive,
    List,
    Tree,
}

/// Screen areas of every selector control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorLayout {
    pub frame: Rect,
    pub up: Rect,
    pub drive: Option<Rect>,
    pub breadcrumb: Rect,
    pub edit: Rect,
    pub tree: Rect,
    pub divider: Rect,
    pub list: Rect,
    pub filename_label: Rect,
    pub filename: Rect,
    pub filter_label: Rect,
    pub filter: Rect,
    pub ok: Rect,
    pub cancel: Rect,
}

const UP_WIDTH: u16 = 3;
const DRIVE_WIDTH: u16 = 5;
const EDIT_WIDTH: u16 = 6;
const LABEL_WIDTH: u16 = 6;
const BUTTON_WIDTH: u16 = 10;
const FIELD_ROWS: u16 = 2;

impl SelectorLayout {
    /// Place the controls in a frame covering 95% of `screen`.
    pub fn compute(screen: Rect, tree_width: u16, has_drive: bool) -> Self {
        let width = (u32::from(screen.width) * 95 / 100) as u16;
        let height = (u32::from(screen.height) * 95 / 100) as u16;
        let frame = Rect::new(
            screen.x + (screen.width - width) / 2,
            screen.y + (screen.height - height) / 2,
            width,
            height,
        );
        let inner = Rect::new(
            frame.x + 1,
            frame.y + 1,
            frame.width.saturating_sub(2),
            frame.height.saturating_sub(2),
        );

        let top_height = inner.height.min(1);
        let up = Rect::new(inner.x, inner.y, UP_WIDTH.min(inner.width), top_height);
        let mut x = up.right();
        let drive = has_drive.then(|| {
            let r = Rect::new(
                x,
                inner.y,
                DRIVE_WIDTH.min(inner.right().saturating_sub(x)),
                top_height,
            );
            x = r.right();
            r
        });
        let edit_width = EDIT_WIDTH.min(inner.right().saturating_sub(x));
        let breadcrumb = Rect::new(
            x,
            inner.y,
            inner.right().saturating_sub(x + edit_width),
            top_height,
        );
        let edit = Rect::new(breadcrumb.right(), inner.y, edit_width, top_height);

        let body_y = inner.y + 2.min(inner.height);
        let body_height = inner.height.saturating_sub(2 + FIELD_ROWS + 1);
        let tree_width = clamp_tree_width(tree_width, inner.width);
        let tree = Rect::new(inner.x, body_y, tree_width, body_height);
        let divider = Rect::new(tree.right(), body_y, 1.min(inner.width), body_height);
        let list = Rect::new(
            divider.right(),
            body_y,
            inner.right().saturating_sub(divider.right()),
            body_height,
        );

        let fields_y = inner.bottom().saturating_sub(FIELD_ROWS);
        let buttons_x = inner.right().saturating_sub(2 * BUTTON_WIDTH);
        let field_x = inner.x + LABEL_WIDTH.min(inner.width);
        let field_width = buttons_x.saturating_sub(field_x + 1);
        let row = |dy: u16| fields_y + dy;
        Self {
            frame,
            up,
            drive,
            breadcrumb,
            edit,
            tree,
            divider,
            list,
            filename_label: Rect::new(inner.x, row(0), LABEL_WIDTH.min(inner.width), 1),
            filename: Rect::new(field_x, row(0), field_width, 1),
            filter_label: Rect::new(inner.x, row(1), LABEL_WIDTH.min(inner.width), 1),
            filter: Rect::new(field_x, row(1), field_width, 1),
            ok: Rect::new(buttons_x, fields_y, BUTTON_WIDTH, FIELD_ROWS),
            cancel: Rect::new(buttons_x + BUTTON_WIDTH, fields_y, BUTTON_WIDTH, FIELD_ROWS),
        }
    }
}

/// Keep both panes at least [`MIN_COLUMN_WIDTH`] wide.
fn clamp_tree_width(width: u16, inner_width: u16) -> u16 {
    let max = inner_width.saturating_sub(1 + MIN_COLUMN_WIDTH);
    width.max(MIN_COLUMN_WIDTH).min(max)
}

fn contains(rect: Rect, mouse: &MouseEvent) -> bool {
    rect.contains(Position::new(mouse.column, mouse.row))
}

pub struct Selector {
    config: SelectorConfig,
    pub breadcrumb: Breadcrumb,
    pub list: FileList,
    pub tree: Option<DirTree>,
    pub filename: TextInput,
    pub filter: TextInput,
    focus: SelectorFocus,
    screen: Rect,
    tree_width: u16,
    divider_drag: Option<u16>,
    drives: Vec<String>,
    show_hidden: bool,
    watcher: Option<DirWatcher>,
}

impl Selector {
    pub fn new(config: SelectorConfig, env: SelectorEnv) -> Self {
        let mut list = FileList::new(env.columns, env.sort, env.tx.clone());
        list.set_kinds(config.entry_kinds());
        let breadcrumb = Breadcrumb::new(&config.directory);
        let tree = match DirTree::new(breadcrumb.valid_path(), env.show_hidden) {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::warn!(error = %e, "directory tree unavailable");
                None
            }
        };
        let watcher = env.watch_debounce.and_then(|debounce| {
            DirWatcher::new(debounce, env.tx.clone())
                .map_err(|e| tracing::warn!(error = %e, "directory watcher unavailable"))
                .ok()
        });
        let focus = if config.mode == SelectorMode::Directory {
            SelectorFocus::List
        } else {
            SelectorFocus::Filename
        };

        let mut selector = Self {
            filename: TextInput::new(config.filename.clone()),
            filter: TextInput::new(config.filter.clone()),
            config,
            breadcrumb,
            list,
            tree,
            focus,
            screen: env.screen,
            tree_width: env.tree_width.unwrap_or(env.screen.width / 4),
            divider_drag: None,
            drives: env.drives.drives(),
            show_hidden: env.show_hidden,
            watcher,
        };
        selector.relayout();
        selector.path_changed(false);
        if selector.focus == SelectorFocus::List {
            selector.list.on_focus();
        }
        selector
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn focus(&self) -> SelectorFocus {
        self.focus
    }

    pub fn drives(&self) -> &[String] {
        &self.drives
    }

    pub fn shows_fields(&self) -> bool {
        self.config.mode != SelectorMode::Directory
    }

    pub fn divider_dragging(&self) -> bool {
        self.divider_drag.is_some()
    }

    pub fn layout(&self) -> SelectorLayout {
        SelectorLayout::compute(self.screen, self.tree_width, !self.drives.is_empty())
    }

    /// The directory the list shows.
    pub fn directory(&self) -> &Path {
        self.breadcrumb.path()
    }

    /// Adopt a new terminal size.
    pub fn resize(&mut self, screen: Rect) {
        self.screen = screen;
        self.relayout();
    }

    fn relayout(&mut self) {
        let layout = self.layout();
        self.tree_width = layout.tree.width;
        self.list.set_size(layout.list.width, layout.list.height);
        if let Some(tree) = self.tree.as_mut() {
            tree.update_scroll(usize::from(layout.tree.height));
        }
    }

    /// Change directory. Breadcrumb and drive navigation commit a new base
    /// path; list and tree navigation only extend the displayed path.
    pub fn navigate_to(&mut self, path: &Path, source: NavSource) {
        let extend = matches!(source, NavSource::List | NavSource::Tree);
        self.breadcrumb.update_path(path, false, extend);
        if extend && self.config.mode == SelectorMode::Existing {
            self.filename.clear();
        }
        self.path_changed(source != NavSource::Tree);
    }

    /// Bring the tree, the list and the watch in line with the breadcrumb.
    fn path_changed(&mut self, reroot_tree: bool) {
        let valid = self.breadcrumb.valid_path().to_path_buf();
        tracing::debug!(dir = %valid.display(), reroot_tree, "selector directory changed");
        if reroot_tree {
            match self.tree.as_mut() {
                Some(tree) => {
                    tree.set_root(&valid);
                }
                None => self.tree = DirTree::new(&valid, self.show_hidden).ok(),
            }
            let height = usize::from(self.layout().tree.height);
            if let Some(tree) = self.tree.as_mut() {
                tree.update_scroll(height);
            }
        }
        let filter = self.filter.value.clone();
        self.list.set_directory_and_filter(&valid, &filter);
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.retarget(&valid);
        }
    }

    fn on_path_changed(&mut self, changed: Option<PathChanged>) -> bool {
        match changed {
            Some(_) => {
                self.path_changed(true);
                true
            }
            None => false,
        }
    }

    /// Re-scan with the filter field's pattern.
    pub fn confirm_filter(&mut self) {
        let dir = self.list.directory().to_path_buf();
        let filter = self.filter.value.clone();
        self.list.set_directory_and_filter(&dir, &filter);
    }

    /// Go to the parent of the displayed path.
    pub fn dir_up(&mut self) -> bool {
        let Some(parent) = self.breadcrumb.path().parent().map(Path::to_path_buf) else {
            return false;
        };
        self.navigate_to(&parent, NavSource::Breadcrumb);
        true
    }

    /// Switch to the next drive root, when the platform has drives.
    pub fn next_drive(&mut self) -> bool {
        let current = self.breadcrumb.path().to_string_lossy().to_string();
        let Some(drive) = next_drive(&self.drives, &current).map(PathBuf::from) else {
            return false;
        };
        self.navigate_to(&drive, NavSource::Drive);
        true
    }

    /// The list activated an entry: directories are entered, files fill in
    /// the filename field.
    pub fn activate_entry(&mut self, index: usize) -> bool {
        let Some(entry) = self.list.entry(index) else {
            return false;
        };
        let name = entry.name.clone();
        if entry.is_dir {
            let path = self.breadcrumb.path().join(&name);
            self.navigate_to(&path, NavSource::List);
            return true;
        }
        if !self.shows_fields() {
            return false;
        }
        self.filename.set_value(name.as_str());
        self.list.mark_selected(&name);
        true
    }

    /// Close with the chosen path.
    pub fn commit(&self) -> SelectorOutcome {
        let dir = self.breadcrumb.path();
        let path = if self.filename.value.is_empty() || !self.shows_fields() {
            dir.to_path_buf()
        } else {
            dir.join(&self.filename.value)
        };
        tracing::debug!(path = %path.display(), "selector committed");
        SelectorOutcome::Chosen(path)
    }

    pub fn cancel(&self) -> SelectorOutcome {
        SelectorOutcome::Cancelled
    }

    /// A background scan finished.
    pub fn handle_scan(&mut self, outcome: ScanOutcome) -> bool {
        if !self.list.apply_scan(outcome) {
            return false;
        }
        let name = self.filename.value.clone();
        self.list.mark_selected(&name);
        true
    }

    /// The watched directory changed on disk.
    pub fn handle_dir_changed(&mut self, paths: &[PathBuf]) -> bool {
        if !affects_listing(self.list.directory(), paths) {
            return false;
        }
        self.list.refresh();
        if let Some(tree) = self.tree.as_mut() {
            tree.reload();
        }
        true
    }

    fn focus_ring(&self) -> Vec<SelectorFocus> {
        let mut ring = vec![SelectorFocus::UpButton];
        if !self.drives.is_empty() {
            ring.push(SelectorFocus::DriveButton);
        }
        ring.extend([
            SelectorFocus::Breadcrumb,
            SelectorFocus::EditButton,
            SelectorFocus::Tree,
            SelectorFocus::List,
        ]);
        if self.shows_fields() {
            ring.extend([SelectorFocus::Filename, SelectorFocus::Filter]);
        }
        ring.extend([SelectorFocus::Ok, SelectorFocus::Cancel]);
        ring
    }

    /// Move the focus, running the blur and focus hooks of the controls.
    pub fn set_focus(&mut self, focus: SelectorFocus) -> bool {
        if focus == self.focus {
            return false;
        }
        match self.focus {
            SelectorFocus::List => {
                self.list.on_blur();
            }
            SelectorFocus::Breadcrumb => {
                let changed = self.breadcrumb.on_blur();
                self.on_path_changed(changed);
            }
            SelectorFocus::Filter => self.confirm_filter(),
            _ => {}
        }
        self.focus = focus;
        if focus == SelectorFocus::List {
            self.list.on_focus();
        }
        true
    }

    fn cycle_focus(&mut self, forward: bool) -> bool {
        let ring = self.focus_ring();
        let pos = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % ring.len()
        } else {
            (pos + ring.len() - 1) % ring.len()
        };
        self.set_focus(ring[next])
    }

    fn press(&mut self, focus: SelectorFocus) -> SelectorAction {
        match focus {
            SelectorFocus::UpButton => SelectorAction::redraw_if(self.dir_up()),
            SelectorFocus::DriveButton => SelectorAction::redraw_if(self.next_drive()),
            SelectorFocus::Breadcrumb | SelectorFocus::EditButton => {
                self.set_focus(SelectorFocus::Breadcrumb);
                SelectorAction::redraw_if(self.breadcrumb.begin_edit())
            }
            SelectorFocus::Ok => SelectorAction::Done(self.commit()),
            SelectorFocus::Cancel => SelectorAction::Done(self.cancel()),
            _ => SelectorAction::None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SelectorAction {
        match key.code {
            KeyCode::Tab => return SelectorAction::redraw_if(self.cycle_focus(true)),
            KeyCode::BackTab => return SelectorAction::redraw_if(self.cycle_focus(false)),
            KeyCode::Esc if !self.breadcrumb.is_editing() => {
                return SelectorAction::Done(self.cancel())
            }
            _ => {}
        }

        match self.focus {
            SelectorFocus::Breadcrumb if self.breadcrumb.is_editing() => {
                let (handled, changed) = self.breadcrumb.handle_key(key);
                let moved = self.on_path_changed(changed);
                SelectorAction::redraw_if(handled || moved)
            }
            SelectorFocus::Tree => self.handle_tree_key(key),
            SelectorFocus::List => match self.list.handle_key(key) {
                ListAction::Activated(index) => {
                    self.activate_entry(index);
                    SelectorAction::Redraw
                }
                ListAction::Changed => SelectorAction::Redraw,
                _ => SelectorAction::None,
            },
            SelectorFocus::Filename => match self.filename.handle_key(key) {
                InputOutcome::Submit => SelectorAction::Done(self.commit()),
                InputOutcome::Edited => {
                    let name = self.filename.value.clone();
                    self.list.mark_selected(&name);
                    SelectorAction::Redraw
                }
                _ => SelectorAction::None,
            },
            SelectorFocus::Filter => match self.filter.handle_key(key) {
                InputOutcome::Submit => {
                    self.confirm_filter();
                    SelectorAction::Redraw
                }
                InputOutcome::Edited => SelectorAction::Redraw,
                _ => SelectorAction::None,
            },
            focus => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.press(focus),
                _ => SelectorAction::None,
            },
        }
    }

    fn handle_tree_key(&mut self, key: KeyEvent) -> SelectorAction {
        let height = usize::from(self.layout().tree.height);
        let Some(tree) = self.tree.as_mut() else {
            return SelectorAction::None;
        };
        let activated = match key.code {
            KeyCode::Down | KeyCode::Char('j') if key.modifiers == KeyModifiers::NONE => {
                tree.select_next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') if key.modifiers == KeyModifiers::NONE => {
                tree.select_previous();
                None
            }
            KeyCode::Home => {
                tree.select_first();
                None
            }
            KeyCode::End => {
                tree.select_last();
                None
            }
            KeyCode::Right => {
                tree.expand_selected();
                None
            }
            KeyCode::Left => {
                tree.collapse_selected();
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => tree.activate_selected(),
            _ => return SelectorAction::None,
        };
        tree.update_scroll(height);
        if let Some(path) = activated {
            self.navigate_to(&path, NavSource::Tree);
        }
        SelectorAction::Redraw
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> SelectorAction {
        let layout = self.layout();

        if let Some(last_x) = self.divider_drag {
            match mouse.kind {
                MouseEventKind::Drag(MouseButton::Left) => {
                    let delta = i32::from(mouse.column) - i32::from(last_x);
                    self.divider_drag = Some(mouse.column);
                    if delta == 0 {
                        return SelectorAction::None;
                    }
                    let inner_width = layout.frame.width.saturating_sub(2);
                    let width = (i32::from(self.tree_width) + delta).max(0) as u16;
                    self.tree_width = clamp_tree_width(width, inner_width);
                    self.relayout();
                    return SelectorAction::Redraw;
                }
                MouseEventKind::Up(_) | MouseEventKind::Moved => {
                    self.divider_drag = None;
                    return SelectorAction::None;
                }
                _ => {}
            }
        }

        // The list follows the pointer everywhere for hover and column drags.
        if !matches!(mouse.kind, MouseEventKind::Down(_))
            && (self.list.columns().is_dragging() || !contains(layout.list, &mouse))
        {
            let action = self.list.handle_mouse(mouse, layout.list);
            if self.list.columns().is_dragging() || action == ListAction::Changed {
                return SelectorAction::redraw_if(action == ListAction::Changed);
            }
        }

        if contains(layout.list, &mouse) {
            if matches!(mouse.kind, MouseEventKind::Down(_)) {
                self.set_focus(SelectorFocus::List);
            }
            return match self.list.handle_mouse(mouse, layout.list) {
                ListAction::Activated(index) => {
                    self.activate_entry(index);
                    SelectorAction::Redraw
                }
                ListAction::Changed => SelectorAction::Redraw,
                _ => SelectorAction::None,
            };
        }

        if contains(layout.tree, &mouse) {
            return self.handle_tree_mouse(mouse, layout.tree);
        }

        let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
            return SelectorAction::None;
        };

        if contains(layout.divider, &mouse) {
            self.divider_drag = Some(mouse.column);
            return SelectorAction::None;
        }
        if contains(layout.up, &mouse) {
            self.set_focus(SelectorFocus::UpButton);
            return self.press(SelectorFocus::UpButton);
        }
        if layout.drive.is_some_and(|r| contains(r, &mouse)) {
            self.set_focus(SelectorFocus::DriveButton);
            return self.press(SelectorFocus::DriveButton);
        }
        if contains(layout.edit, &mouse) {
            return self.press(SelectorFocus::EditButton);
        }
        if contains(layout.breadcrumb, &mouse) {
            if self.breadcrumb.is_editing() {
                return SelectorAction::None;
            }
            let x = mouse.column - layout.breadcrumb.x;
            let hit = segment_at(self.breadcrumb.segments(), layout.breadcrumb.width, x);
            return match hit {
                Some(index) => {
                    let changed = self.breadcrumb.click_segment(index);
                    self.on_path_changed(changed);
                    SelectorAction::Redraw
                }
                None => self.press(SelectorFocus::Breadcrumb),
            };
        }
        if contains(layout.ok, &mouse) {
            return self.press(SelectorFocus::Ok);
        }
        if contains(layout.cancel, &mouse) {
            return self.press(SelectorFocus::Cancel);
        }
        if self.shows_fields() {
            if contains(layout.filename, &mouse) {
                return SelectorAction::redraw_if(self.set_focus(SelectorFocus::Filename));
            }
            if contains(layout.filter, &mouse) {
                return SelectorAction::redraw_if(self.set_focus(SelectorFocus::Filter));
            }
        }
        SelectorAction::None
    }

    fn handle_tree_mouse(&mut self, mouse: MouseEvent, area: Rect) -> SelectorAction {
        let height = usize::from(area.height);
        let row = usize::from(mouse.row - area.y);
        let activated = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.set_focus(SelectorFocus::Tree);
                self.tree.as_mut().and_then(|t| t.click_row(row))
            }
            MouseEventKind::ScrollDown => {
                if let Some(tree) = self.tree.as_mut() {
                    tree.select_next();
                }
                None
            }
            MouseEventKind::ScrollUp => {
                if let Some(tree) = self.tree.as_mut() {
                    tree.select_previous();
                }
                None
            }
            _ => return SelectorAction::None,
        };
        if let Some(tree) = self.tree.as_mut() {
            tree.update_scroll(height);
        }
        if let Some(path) = activated {
            self.navigate_to(&path, NavSource::Tree);
        }
        SelectorAction::Redraw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::drives::NoDrives;
    use crate::list::columns::default_columns;
    use std::fs;
    use tempfile::TempDir;

    struct TwoDrives;

    impl DriveSource for TwoDrives {
        fn drives(&self) -> Vec<String> {
            vec!["/".to_string(), "/tmp".to_string()]
        }
    }

    fn setup_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("guide.md"), "g").unwrap();
        fs::write(dir.path().join("notes.txt"), "n").unwrap();
        fs::write(dir.path().join("readme.md"), "r").unwrap();
        dir
    }

    fn env(tx: mpsc::UnboundedSender<Event>) -> SelectorEnv {
        SelectorEnv {
            screen: Rect::new(0, 0, 120, 40),
            columns: default_columns(120, None, 15, 30),
            sort: SortState::default(),
            show_hidden: false,
            tree_width: None,
            watch_debounce: None,
            drives: Box::new(NoDrives),
            tx,
        }
    }

    fn open(config: SelectorConfig) -> (Selector, mpsc::UnboundedReceiver<Event>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut selector = Selector::new(config, env(tx));
        pump(&mut selector, &mut rx);
        (selector, rx)
    }

    fn pump(selector: &mut Selector, rx: &mut mpsc::UnboundedReceiver<Event>) {
        while let Ok(event) = rx.try_recv() {
            if let Event::ScanComplete(outcome) = event {
                selector.handle_scan(outcome);
            }
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn names(selector: &Selector) -> Vec<String> {
        selector.list.entries().iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn opens_listing_files_only() {
        let dir = setup_dir();
        let (selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        assert_eq!(names(&selector), vec!["notes.txt", "readme.md"]);
        assert_eq!(selector.focus(), SelectorFocus::Filename);
    }

    #[test]
    fn directory_mode_lists_dirs_and_hides_fields() {
        let dir = setup_dir();
        let (selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Directory));
        assert_eq!(names(&selector), vec!["docs"]);
        assert!(!selector.focus_ring().contains(&SelectorFocus::Filename));
        assert_eq!(selector.focus(), SelectorFocus::List);
    }

    #[test]
    fn show_all_lists_both_kinds() {
        let dir = setup_dir();
        let config = SelectorConfig::new(dir.path(), SelectorMode::Directory).with_show_all(true);
        let (selector, _rx) = open(config);
        assert_eq!(names(&selector).len(), 3);
    }

    #[test]
    fn activating_file_fills_filename() {
        let dir = setup_dir();
        let (mut selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        assert!(selector.activate_entry(1));
        assert_eq!(selector.filename.value, "readme.md");
        assert!(selector.list.entries()[1].selected);
        assert_eq!(
            selector.commit(),
            SelectorOutcome::Chosen(dir.path().join("readme.md"))
        );
    }

    #[test]
    fn activating_directory_navigates() {
        let dir = setup_dir();
        let config = SelectorConfig::new(dir.path(), SelectorMode::Existing)
            .with_show_all(true)
            .with_filename("old.txt");
        let (mut selector, mut rx) = open(config);
        let index = names(&selector).iter().position(|n| n == "docs").unwrap();
        selector.activate_entry(index);
        pump(&mut selector, &mut rx);
        assert_eq!(selector.directory(), dir.path().join("docs"));
        assert_eq!(selector.breadcrumb.base(), dir.path());
        assert_eq!(selector.filename.value, "");
        assert_eq!(names(&selector), vec!["guide.md"]);
    }

    #[test]
    fn new_mode_keeps_filename_when_browsing() {
        let dir = setup_dir();
        let config = SelectorConfig::new(dir.path(), SelectorMode::New).with_filename("out.txt");
        let (mut selector, _rx) = open(config);
        selector.navigate_to(&dir.path().join("docs"), NavSource::Tree);
        assert_eq!(selector.filename.value, "out.txt");
    }

    #[test]
    fn tree_navigation_keeps_tree_root() {
        let dir = setup_dir();
        let (mut selector, mut rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        selector.navigate_to(&dir.path().join("docs"), NavSource::Tree);
        pump(&mut selector, &mut rx);
        assert_eq!(selector.tree.as_ref().unwrap().root.path, dir.path());
        assert_eq!(names(&selector), vec!["guide.md"]);

        selector.navigate_to(&dir.path().join("docs"), NavSource::Breadcrumb);
        assert_eq!(
            selector.tree.as_ref().unwrap().root.path,
            dir.path().join("docs")
        );
    }

    #[test]
    fn filter_confirm_rescans() {
        let dir = setup_dir();
        let (mut selector, mut rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        selector.set_focus(SelectorFocus::Filter);
        selector.filter.set_value("*.md");
        assert_eq!(selector.handle_key(key(KeyCode::Enter)), SelectorAction::Redraw);
        pump(&mut selector, &mut rx);
        assert_eq!(names(&selector), vec!["readme.md"]);
    }

    #[test]
    fn filter_blur_rescans() {
        let dir = setup_dir();
        let (mut selector, mut rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        selector.set_focus(SelectorFocus::Filter);
        selector.filter.set_value("*.txt");
        selector.handle_key(key(KeyCode::Tab));
        pump(&mut selector, &mut rx);
        assert_eq!(names(&selector), vec!["notes.txt"]);
        assert_eq!(selector.focus(), SelectorFocus::Ok);
    }

    #[test]
    fn enter_in_filename_commits() {
        let dir = setup_dir();
        let config = SelectorConfig::new(dir.path(), SelectorMode::New).with_filename("new.txt");
        let (mut selector, _rx) = open(config);
        let action = selector.handle_key(key(KeyCode::Enter));
        assert_eq!(
            action,
            SelectorAction::Done(SelectorOutcome::Chosen(dir.path().join("new.txt")))
        );
    }

    #[test]
    fn escape_cancels_with_empty_result() {
        let dir = setup_dir();
        let (mut selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        let action = selector.handle_key(key(KeyCode::Esc));
        assert_eq!(action, SelectorAction::Done(SelectorOutcome::Cancelled));
        assert_eq!(SelectorOutcome::Cancelled.into_string(), "");
    }

    #[test]
    fn directory_commit_returns_directory() {
        let dir = setup_dir();
        let (selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Directory));
        assert_eq!(
            selector.commit(),
            SelectorOutcome::Chosen(dir.path().to_path_buf())
        );
    }

    #[test]
    fn dir_up_commits_parent() {
        let dir = setup_dir();
        let (mut selector, _rx) =
            open(SelectorConfig::new(dir.path().join("docs"), SelectorMode::Existing));
        assert!(selector.dir_up());
        assert_eq!(selector.directory(), dir.path());
        assert_eq!(selector.breadcrumb.base(), dir.path());
    }

    #[test]
    fn breadcrumb_edit_commits_on_enter() {
        let dir = setup_dir();
        let (mut selector, mut rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        let layout = selector.layout();
        selector.handle_mouse(click(layout.edit.x, layout.edit.y));
        assert!(selector.breadcrumb.is_editing());
        assert_eq!(selector.focus(), SelectorFocus::Breadcrumb);
        for c in "/docs".chars() {
            selector.handle_key(key(KeyCode::Char(c)));
        }
        selector.handle_key(key(KeyCode::Enter));
        pump(&mut selector, &mut rx);
        assert!(!selector.breadcrumb.is_editing());
        assert_eq!(names(&selector), vec!["guide.md"]);
    }

    #[test]
    fn escape_while_editing_only_leaves_edit_mode() {
        let dir = setup_dir();
        let (mut selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        selector.press(SelectorFocus::EditButton);
        assert_eq!(selector.handle_key(key(KeyCode::Esc)), SelectorAction::Redraw);
        assert!(!selector.breadcrumb.is_editing());
    }

    #[test]
    fn invalid_typed_path_lists_valid_prefix() {
        let dir = setup_dir();
        let (mut selector, mut rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        selector.navigate_to(&dir.path().join("missing"), NavSource::Breadcrumb);
        pump(&mut selector, &mut rx);
        assert_eq!(selector.breadcrumb.valid_path(), dir.path());
        assert_eq!(names(&selector), vec!["notes.txt", "readme.md"]);
    }

    #[test]
    fn tab_cycles_visible_controls() {
        let dir = setup_dir();
        let (mut selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        selector.handle_key(key(KeyCode::Tab));
        selector.handle_key(key(KeyCode::Tab));
        selector.handle_key(key(KeyCode::Tab));
        assert_eq!(selector.focus(), SelectorFocus::Cancel);
        selector.handle_key(key(KeyCode::Tab));
        assert_eq!(selector.focus(), SelectorFocus::UpButton);
        selector.handle_key(key(KeyCode::BackTab));
        assert_eq!(selector.focus(), SelectorFocus::Cancel);
    }

    #[test]
    fn list_focus_shows_key_cursor() {
        let dir = setup_dir();
        let (mut selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        selector.set_focus(SelectorFocus::List);
        assert_eq!(selector.list.key_index(), Some(0));
        selector.set_focus(SelectorFocus::Filename);
        assert_eq!(selector.list.key_index(), None);
    }

    #[test]
    fn click_in_list_activates_row() {
        let dir = setup_dir();
        let (mut selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        let list = selector.layout().list;
        selector.handle_mouse(click(list.x + 1, list.y + 2));
        assert_eq!(selector.focus(), SelectorFocus::List);
        assert_eq!(selector.filename.value, "readme.md");
    }

    #[test]
    fn click_in_tree_navigates() {
        let dir = setup_dir();
        let (mut selector, mut rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        let tree = selector.layout().tree;
        selector.handle_mouse(click(tree.x + 1, tree.y + 1));
        pump(&mut selector, &mut rx);
        assert_eq!(selector.focus(), SelectorFocus::Tree);
        assert_eq!(selector.directory(), dir.path().join("docs"));
    }

    #[test]
    fn divider_drag_resizes_tree() {
        let dir = setup_dir();
        let (mut selector, _rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        let before = selector.layout();
        let divider = before.divider;
        selector.handle_mouse(click(divider.x, divider.y));
        assert!(selector.divider_dragging());
        let drag = MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: divider.x + 4,
            row: divider.y,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(selector.handle_mouse(drag), SelectorAction::Redraw);
        let after = selector.layout();
        assert_eq!(after.tree.width, before.tree.width + 4);
        assert_eq!(after.list.width, before.list.width - 4);
        assert_eq!(selector.list.viewport().visible_width, usize::from(after.list.width));
    }

    #[test]
    fn layout_reserves_drive_button() {
        let without = SelectorLayout::compute(Rect::new(0, 0, 100, 30), 25, false);
        let with = SelectorLayout::compute(Rect::new(0, 0, 100, 30), 25, true);
        assert!(without.drive.is_none());
        assert_eq!(with.drive.map(|r| r.width), Some(DRIVE_WIDTH));
        assert_eq!(with.breadcrumb.width + DRIVE_WIDTH, without.breadcrumb.width);
        assert_eq!(without.tree.width, 25);
    }

    #[test]
    fn tree_width_is_clamped() {
        let layout = SelectorLayout::compute(Rect::new(0, 0, 40, 20), 200, false);
        assert!(layout.list.width >= MIN_COLUMN_WIDTH);
        let layout = SelectorLayout::compute(Rect::new(0, 0, 40, 20), 0, false);
        assert_eq!(layout.tree.width, MIN_COLUMN_WIDTH);
    }

    #[test]
    fn drive_button_cycles_drives() {
        let dir = setup_dir();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut env = env(tx);
        env.drives = Box::new(TwoDrives);
        let mut selector = Selector::new(SelectorConfig::new(dir.path(), SelectorMode::Existing), env);
        assert!(selector.focus_ring().contains(&SelectorFocus::DriveButton));
        assert!(selector.next_drive());
        assert_eq!(selector.breadcrumb.base(), Path::new("/tmp"));
    }

    #[test]
    fn external_change_rescans() {
        let dir = setup_dir();
        let (mut selector, mut rx) = open(SelectorConfig::new(dir.path(), SelectorMode::Existing));
        fs::write(dir.path().join("later.txt"), "l").unwrap();
        assert!(!selector.handle_dir_changed(&[PathBuf::from("/elsewhere/x")]));
        assert!(selector.handle_dir_changed(&[dir.path().join("later.txt")]));
        pump(&mut selector, &mut rx);
        assert_eq!(names(&selector).len(), 3);
    }
}
