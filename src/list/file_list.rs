//! Sortable, resizable, virtualised listing of one directory.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::event::Event;
use crate::fs::entry::{format_modified, format_size, DirectoryEntry, EntryKinds};
use crate::fs::scanner::{DirScanner, ScanOutcome, ScanRequest};
use crate::list::columns::{ColumnLayout, ColumnSpec, HeaderHit, SortState};
use crate::list::viewport::Viewport;

/// Rows taken by the header and the horizontal scroll indicator.
pub const CHROME_ROWS: u16 = 2;

/// Rows moved per mouse wheel notch.
const WHEEL_STEP: isize = 3;

/// Outcome of routing an input event to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    /// Not handled.
    Ignored,
    /// Handled without a visible change.
    Handled,
    /// State changed; the owner should redraw.
    Changed,
    /// The entry at this index was activated by click, Enter or Space.
    Activated(usize),
}

impl ListAction {
    fn from_changed(changed: bool) -> Self {
        if changed {
            ListAction::Changed
        } else {
            ListAction::Handled
        }
    }
}

/// Style flags for one rendered row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowStyle {
    pub hovered: bool,
    pub selected: bool,
    pub focused: bool,
    pub is_dir: bool,
}

/// Text of one column for the visible rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBuffer {
    pub width: u16,
    pub cells: Vec<String>,
}

/// Rendered slice: one buffer per column plus per-row styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRows {
    pub columns: Vec<ColumnBuffer>,
    pub styles: Vec<RowStyle>,
}

pub struct FileList {
    entries: Vec<DirectoryEntry>,
    columns: ColumnLayout,
    sort: SortState,
    viewport: Viewport,
    key_index: Option<usize>,
    hover_index: Option<usize>,
    directory: PathBuf,
    filter: String,
    kinds: EntryKinds,
    scanner: DirScanner,
    /// Generation of the scan whose result may still be applied.
    pending: u64,
}

impl FileList {
    pub fn new(columns: Vec<ColumnSpec>, sort: SortState, tx: mpsc::UnboundedSender<Event>) -> Self {
        let columns = ColumnLayout::new(columns);
        let sort = if sort.column < columns.len() {
            sort
        } else {
            SortState::default()
        };
        let mut viewport = Viewport::default();
        viewport.set_content(columns.total_width(), 0);
        Self {
            entries: Vec::new(),
            columns,
            sort,
            viewport,
            key_index: None,
            hover_index: None,
            directory: PathBuf::new(),
            filter: String::new(),
            kinds: EntryKinds::default(),
            scanner: DirScanner::new(tx),
            pending: 0,
        }
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&DirectoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn key_index(&self) -> Option<usize> {
        self.key_index
    }

    pub fn hover_index(&self) -> Option<usize> {
        self.hover_index
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn kinds(&self) -> EntryKinds {
        self.kinds
    }

    /// Which entry kinds the next scan lists.
    pub fn set_kinds(&mut self, kinds: EntryKinds) {
        self.kinds = kinds;
    }

    /// Generation of the scan awaited by this list.
    pub fn pending_generation(&self) -> u64 {
        self.pending
    }

    /// Visible entry rows.
    pub fn rows(&self) -> usize {
        self.viewport.visible_height
    }

    /// Start listing `dir` through `filter` in the background.
    ///
    /// The current entries stay until the result arrives through
    /// [`FileList::apply_scan`]; any earlier request is superseded.
    pub fn set_directory_and_filter(&mut self, dir: &Path, filter: &str) -> u64 {
        self.directory = dir.to_path_buf();
        self.filter = filter.to_string();
        self.pending = self.scanner.request(ScanRequest {
            directory: self.directory.clone(),
            filter: self.filter.clone(),
            kinds: self.kinds,
        });
        self.pending
    }

    /// Scan the current directory and filter again.
    pub fn refresh(&mut self) -> u64 {
        let dir = self.directory.clone();
        let filter = self.filter.clone();
        self.set_directory_and_filter(&dir, &filter)
    }

    /// Install a finished scan. Results of superseded requests are
    /// discarded and leave the list untouched.
    pub fn apply_scan(&mut self, outcome: ScanOutcome) -> bool {
        if outcome.generation != self.pending {
            tracing::debug!(
                generation = outcome.generation,
                pending = self.pending,
                "discarding stale scan"
            );
            return false;
        }
        tracing::debug!(
            generation = outcome.generation,
            entries = outcome.entries.len(),
            dir = %outcome.directory.display(),
            "applying scan"
        );
        self.set_entries(outcome.entries);
        true
    }

    /// Replace the whole collection and re-sort. The view returns to the
    /// top unless a kept keyboard focus needs it elsewhere.
    pub fn set_entries(&mut self, entries: Vec<DirectoryEntry>) {
        self.entries = entries;
        for entry in &mut self.entries {
            entry.hovered = false;
            entry.focused = false;
            entry.selected = false;
        }
        self.hover_index = None;
        self.sort_entries();
        self.viewport
            .set_content(self.columns.total_width(), self.entries.len());
        self.viewport.scroll_to_y(0);
        let key = self
            .key_index
            .filter(|_| !self.entries.is_empty())
            .map(|i| i.min(self.entries.len() - 1));
        self.key_index = None;
        self.set_key_index(key);
        self.scroll_to_key();
    }

    /// Sort by `column`. The keyboard focus, if any, moves to the first row.
    ///
    /// Returns `false` for a column index out of range.
    pub fn sort(&mut self, column: usize, ascending: bool) -> bool {
        if column >= self.columns.len() {
            return false;
        }
        let had_key = self.set_key_index(None);
        self.clear_hover();
        self.sort = SortState { column, ascending };
        self.sort_entries();
        if had_key {
            self.set_key_index(Some(0));
            self.viewport.scroll_to_y(0);
        }
        true
    }

    /// Route a header click to the sort state and re-sort.
    pub fn sort_by_header(&mut self, column: usize) -> bool {
        let mut sort = self.sort;
        if !sort.header_clicked(column, self.columns.columns()) {
            return false;
        }
        self.sort(sort.column, sort.ascending)
    }

    fn sort_entries(&mut self) {
        let column = self.sort.column;
        let ascending = self.sort.ascending;
        self.entries.sort_by(|a, b| {
            let order = compare_entries(column, a, b);
            if ascending {
                order
            } else {
                order.reverse()
            }
        });
    }

    /// Resize after the widget's area changed. `height` includes the
    /// header and scroll indicator rows.
    pub fn set_size(&mut self, width: u16, height: u16) {
        let rows = height.saturating_sub(CHROME_ROWS);
        self.viewport
            .set_visible(usize::from(width), usize::from(rows));
    }

    /// Grow or shrink a column; the horizontal extent follows.
    pub fn resize_column(&mut self, index: usize, delta: i32) -> bool {
        if !self.columns.resize_column(index, delta) {
            return false;
        }
        self.sync_content_width();
        true
    }

    fn sync_content_width(&mut self) {
        self.viewport
            .set_content(self.columns.total_width(), self.entries.len());
    }

    pub fn scroll_by(&mut self, dx: isize, dy: isize) -> bool {
        self.viewport.scroll_by(dx, dy)
    }

    /// Track the pointer over visible row `row`; `None` when it left the
    /// rows. Rows past the last entry clear the hover.
    pub fn hover_row(&mut self, row: Option<usize>) -> bool {
        let index = row
            .map(|r| r + self.viewport.scroll_y)
            .filter(|&i| i < self.entries.len());
        if index == self.hover_index {
            return false;
        }
        if let Some(old) = self.hover_index.and_then(|i| self.entries.get_mut(i)) {
            old.hovered = false;
        }
        if let Some(new) = index.and_then(|i| self.entries.get_mut(i)) {
            new.hovered = true;
        }
        self.hover_index = index;
        true
    }

    pub fn clear_hover(&mut self) -> bool {
        self.hover_row(None)
    }

    fn set_key_index(&mut self, index: Option<usize>) -> bool {
        let index = index.filter(|&i| i < self.entries.len());
        if index == self.key_index {
            return false;
        }
        if let Some(old) = self.key_index.and_then(|i| self.entries.get_mut(i)) {
            old.focused = false;
        }
        if let Some(new) = index.and_then(|i| self.entries.get_mut(i)) {
            new.focused = true;
        }
        self.key_index = index;
        true
    }

    /// Move the keyboard focus to `index` (clamped) and keep it on screen.
    pub fn focus_index(&mut self, index: usize) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let index = index.min(self.entries.len() - 1);
        let changed = self.set_key_index(Some(index));
        self.scroll_to_key() || changed
    }

    /// Move the keyboard focus by `delta` rows.
    pub fn move_key(&mut self, delta: isize) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let current = self.key_index.unwrap_or(self.viewport.scroll_y) as isize;
        let last = self.entries.len() as isize - 1;
        let next = (current + delta).clamp(0, last) as usize;
        self.focus_index(next)
    }

    fn page_size(&self) -> isize {
        self.rows().max(1) as isize
    }

    /// Keep the focused row within the visible rows; an autoscroll clears
    /// the hover since the pointer now sits over a different entry.
    fn scroll_to_key(&mut self) -> bool {
        let Some(key) = self.key_index else {
            return false;
        };
        let rows = self.rows().max(1);
        let scroll = self.viewport.scroll_y;
        let target = if key < scroll {
            key
        } else if key >= scroll + rows {
            key + 1 - rows
        } else {
            return false;
        };
        let moved = self.viewport.scroll_to_y(target as isize);
        if moved {
            self.clear_hover();
        }
        moved
    }

    /// Gaining focus shows the keyboard cursor on the first visible row.
    pub fn on_focus(&mut self) -> bool {
        if self.key_index.is_some() || self.entries.is_empty() {
            return false;
        }
        let first = self.viewport.clip_y(self.viewport.scroll_y as isize);
        self.set_key_index(Some(first))
    }

    pub fn on_blur(&mut self) -> bool {
        self.set_key_index(None)
    }

    /// Activate the entry on visible row `row`.
    pub fn click_row(&mut self, row: usize) -> Option<usize> {
        let index = row + self.viewport.scroll_y;
        if index >= self.entries.len() {
            return None;
        }
        self.set_key_index(Some(index));
        Some(index)
    }

    /// Bold the entry called `name`, clearing any previous mark.
    pub fn mark_selected(&mut self, name: &str) -> bool {
        let mut changed = false;
        for entry in &mut self.entries {
            let selected = entry.name == name;
            if entry.selected != selected {
                entry.selected = selected;
                changed = true;
            }
        }
        changed
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ListAction {
        match key.code {
            KeyCode::Down => ListAction::from_changed(self.move_key(1)),
            KeyCode::Up => ListAction::from_changed(self.move_key(-1)),
            KeyCode::PageDown => ListAction::from_changed(self.move_key(self.page_size())),
            KeyCode::PageUp => ListAction::from_changed(self.move_key(-self.page_size())),
            KeyCode::Home => ListAction::from_changed(self.focus_index(0)),
            KeyCode::End => {
                ListAction::from_changed(self.focus_index(self.entries.len().saturating_sub(1)))
            }
            KeyCode::Right => ListAction::from_changed(self.scroll_by(1, 0)),
            KeyCode::Left => ListAction::from_changed(self.scroll_by(-1, 0)),
            KeyCode::Enter | KeyCode::Char(' ') => match self.key_index {
                Some(index) => ListAction::Activated(index),
                None => ListAction::Handled,
            },
            _ => ListAction::Ignored,
        }
    }

    /// Route a mouse event; `area` is where the list was last drawn.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) -> ListAction {
        if self.columns.is_dragging() {
            match mouse.kind {
                MouseEventKind::Drag(MouseButton::Left) => {
                    let changed = self.columns.drag_to(mouse.column, true);
                    if changed {
                        self.sync_content_width();
                    }
                    return ListAction::from_changed(changed);
                }
                MouseEventKind::Moved => {
                    self.columns.drag_to(mouse.column, false);
                    return ListAction::Handled;
                }
                MouseEventKind::Up(_) => {
                    self.columns.end_drag();
                    return ListAction::Handled;
                }
                _ => {}
            }
        }

        let inside = mouse.column >= area.x
            && mouse.column < area.right()
            && mouse.row >= area.y
            && mouse.row < area.bottom();
        if !inside {
            return ListAction::from_changed(self.clear_hover());
        }

        let local_row = usize::from(mouse.row - area.y);
        let rows = self.rows();
        let content_row = local_row.checked_sub(1).filter(|&r| r < rows);

        match mouse.kind {
            MouseEventKind::ScrollDown => ListAction::from_changed(self.scroll_by(0, WHEEL_STEP)),
            MouseEventKind::ScrollUp => ListAction::from_changed(self.scroll_by(0, -WHEEL_STEP)),
            MouseEventKind::ScrollRight => ListAction::from_changed(self.scroll_by(WHEEL_STEP, 0)),
            MouseEventKind::ScrollLeft => ListAction::from_changed(self.scroll_by(-WHEEL_STEP, 0)),
            MouseEventKind::Moved => ListAction::from_changed(self.hover_row(content_row)),
            MouseEventKind::Down(MouseButton::Left) if local_row == 0 => {
                let content_x = usize::from(mouse.column - area.x) + self.viewport.scroll_x;
                match self.columns.hit(content_x) {
                    Some(HeaderHit::Grip(index)) => {
                        self.columns.begin_drag(index, mouse.column);
                        ListAction::Handled
                    }
                    Some(HeaderHit::Column(index)) => {
                        ListAction::from_changed(self.sort_by_header(index))
                    }
                    None => ListAction::Handled,
                }
            }
            MouseEventKind::Down(MouseButton::Left) => match content_row {
                Some(row) => match self.click_row(row) {
                    Some(index) => ListAction::Activated(index),
                    None => ListAction::Handled,
                },
                None => ListAction::Handled,
            },
            _ => ListAction::Ignored,
        }
    }

    /// Text and styles of the visible rows, one buffer per column.
    ///
    /// Reads settled state only.
    pub fn render_columns(&self) -> RenderedRows {
        let start = self.viewport.scroll_y.min(self.entries.len());
        let end = (start + self.rows()).min(self.entries.len());
        let visible = &self.entries[start..end];

        let mut names = Vec::with_capacity(visible.len());
        let mut sizes = Vec::with_capacity(visible.len());
        let mut times = Vec::with_capacity(visible.len());
        let mut styles = Vec::with_capacity(visible.len());
        for entry in visible {
            names.push(entry.name.clone());
            sizes.push(if entry.is_dir {
                String::new()
            } else {
                format_size(entry.size)
            });
            times.push(format_modified(entry.modified));
            styles.push(RowStyle {
                hovered: entry.hovered,
                selected: entry.selected,
                focused: entry.focused,
                is_dir: entry.is_dir,
            });
        }

        let columns = [names, sizes, times]
            .into_iter()
            .enumerate()
            .map(|(i, cells)| ColumnBuffer {
                width: self.columns.width(i),
                cells,
            })
            .collect();
        RenderedRows { columns, styles }
    }
}

/// Total order for one sort column; ties fall back to the name.
fn compare_entries(column: usize, a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    match column {
        1 => a
            .sort_size()
            .cmp(&b.sort_size())
            .then_with(|| a.name.cmp(&b.name)),
        2 => a
            .modified
            .total_cmp(&b.modified)
            .then_with(|| a.name.cmp(&b.name)),
        _ => a.name.cmp(&b.name),
    }
}
