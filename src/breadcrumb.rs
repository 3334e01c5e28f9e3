//! Clickable path segments with a free-text edit mode.

use std::path::{Component, Path, PathBuf};

use crossterm::event::KeyEvent;
use unicode_width::UnicodeWidthStr;

use crate::input::{InputOutcome, TextInput};

/// One clickable part of the displayed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    /// Path from the root up to and including this segment.
    pub path: PathBuf,
    /// The prefix exists as a directory.
    pub valid: bool,
    /// Highlighted as the committed location.
    pub current: bool,
    /// Draw a separator after this segment.
    pub separator_after: bool,
}

/// Emitted when the path changes with notification requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChanged {
    pub path: PathBuf,
}

/// Path display that tracks how much of the path exists on disk.
#[derive(Debug, Default)]
pub struct Breadcrumb {
    path: PathBuf,
    base: PathBuf,
    valid_path: PathBuf,
    segments: Vec<Segment>,
    editing: Option<TextInput>,
}

impl Breadcrumb {
    pub fn new(path: &Path) -> Self {
        let mut crumb = Self::default();
        crumb.update_path(path, false, false);
        crumb
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last path explicitly committed to.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Longest prefix of the path that is an existing directory.
    pub fn valid_path(&self) -> &Path {
        &self.valid_path
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn edit_input(&self) -> Option<&TextInput> {
        self.editing.as_ref()
    }

    /// Show `path`. Unless `extend_current_base` is set, the path also
    /// becomes the new base.
    pub fn update_path(
        &mut self,
        path: &Path,
        notify: bool,
        extend_current_base: bool,
    ) -> Option<PathChanged> {
        self.path = normalize_path(path);
        if !extend_current_base {
            self.base = self.path.clone();
        }
        self.rebuild_segments();
        tracing::debug!(
            path = %self.path.display(),
            valid = %self.valid_path.display(),
            "breadcrumb updated"
        );
        notify.then(|| PathChanged {
            path: self.path.clone(),
        })
    }

    fn rebuild_segments(&mut self) {
        let mut segments = Vec::new();
        let mut built = PathBuf::new();
        let mut valid_path = PathBuf::new();
        let mut prefix_valid = true;

        for component in self.path.components() {
            let name = match component {
                Component::Prefix(p) => p.as_os_str().to_string_lossy().to_string(),
                Component::RootDir => std::path::MAIN_SEPARATOR.to_string(),
                Component::Normal(n) => n.to_string_lossy().to_string(),
                Component::CurDir | Component::ParentDir => continue,
            };
            built.push(component.as_os_str());
            let valid = prefix_valid && built.is_dir();
            prefix_valid = valid;
            if valid {
                valid_path = built.clone();
            }
            let is_root = matches!(component, Component::RootDir | Component::Prefix(_));
            segments.push(Segment {
                name,
                path: built.clone(),
                valid,
                current: valid && built == self.base,
                separator_after: !is_root,
            });
        }

        // Highlight the last existing directory when the path breaks off.
        for i in 1..segments.len() {
            if !segments[i].valid && segments[i - 1].valid {
                segments[i - 1].current = true;
            }
        }
        if let Some(last) = segments.last_mut() {
            last.separator_after = false;
        }

        self.segments = segments;
        self.valid_path = valid_path;
    }

    /// Navigate to the path ending at segment `index`.
    pub fn click_segment(&mut self, index: usize) -> Option<PathChanged> {
        let path = self.segments.get(index)?.path.clone();
        self.update_path(&path, true, false)
    }

    /// Switch to free-text editing, prefilled with the current path.
    pub fn begin_edit(&mut self) -> bool {
        if self.editing.is_some() {
            return false;
        }
        self.editing = Some(TextInput::new(self.path.to_string_lossy()));
        true
    }

    /// Leave edit mode without changing the path.
    pub fn cancel_edit(&mut self) -> bool {
        self.editing.take().is_some()
    }

    /// Commit the typed text as the new path and leave edit mode.
    pub fn commit_edit(&mut self) -> Option<PathChanged> {
        let input = self.editing.take()?;
        self.update_path(Path::new(&input.value), true, false)
    }

    /// Losing focus while editing commits, like Enter.
    pub fn on_blur(&mut self) -> Option<PathChanged> {
        self.commit_edit()
    }

    /// Feed a key to the edit field. Returns `(handled, path change)`.
    pub fn handle_key(&mut self, key: KeyEvent) -> (bool, Option<PathChanged>) {
        let Some(input) = self.editing.as_mut() else {
            return (false, None);
        };
        match input.handle_key(key) {
            InputOutcome::Submit => (true, self.commit_edit()),
            InputOutcome::Cancel => (self.cancel_edit(), None),
            InputOutcome::Edited => (true, None),
            InputOutcome::Ignored => (false, None),
        }
    }
}

/// Where a segment lands when drawn on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCell {
    pub index: usize,
    /// Offset from the left edge of the breadcrumb area.
    pub x: u16,
    pub width: u16,
}

/// Lay the segments out left to right in `width` cells.
///
/// Each name is followed by a one-cell separator where `separator_after`
/// is set. When the path does not fit, leading segments are dropped so the
/// deepest part stays visible.
pub fn segment_cells(segments: &[Segment], width: u16) -> Vec<SegmentCell> {
    let cost = |s: &Segment| s.name.width() + usize::from(s.separator_after);
    let mut total: usize = segments.iter().map(cost).sum();
    let mut first = 0;
    while first + 1 < segments.len() && total > usize::from(width) {
        total -= cost(&segments[first]);
        first += 1;
    }

    let mut cells = Vec::new();
    let mut x = 0usize;
    for (index, segment) in segments.iter().enumerate().skip(first) {
        if x >= usize::from(width) {
            break;
        }
        let name_width = segment.name.width().min(usize::from(width) - x);
        cells.push(SegmentCell {
            index,
            x: x as u16,
            width: name_width as u16,
        });
        x += cost(segment);
    }
    cells
}

/// Segment drawn at column `x` of the breadcrumb area, if any.
pub fn segment_at(segments: &[Segment], width: u16, x: u16) -> Option<usize> {
    segment_cells(segments, width)
        .into_iter()
        .find(|c| x >= c.x && x < c.x + c.width)
        .map(|c| c.index)
}

/// Make `path` absolute: expand a leading `~`, resolve against the working
/// directory and fold `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from(std::path::MAIN_SEPARATOR.to_string()))
            .join(expanded)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
