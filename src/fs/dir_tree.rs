use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A directory in the selector's navigation tree.
#[derive(Debug, Clone)]
pub struct DirNode {
    pub name: String,
    pub path: PathBuf,
    /// `None` until the directory has been read.
    pub children: Option<Vec<DirNode>>,
    pub is_expanded: bool,
    pub depth: usize,
    pub is_hidden: bool,
}

impl DirNode {
    /// Create a node for an existing directory.
    pub fn new(path: &Path, depth: usize) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(crate::error::AppError::InvalidPath(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let is_hidden = depth > 0 && name.starts_with('.');
        Ok(Self {
            name,
            path: path.to_path_buf(),
            children: None,
            is_expanded: false,
            depth,
            is_hidden,
        })
    }

    /// Read the sub-directories of this node, sorted case-insensitively.
    ///
    /// Files, unreadable entries and broken links are skipped.
    pub fn load_children(&mut self) -> Result<()> {
        let mut children = Vec::new();
        for entry in fs::read_dir(&self.path)?.flatten() {
            if let Ok(node) = DirNode::new(&entry.path(), self.depth + 1) {
                children.push(node);
            }
        }
        children.sort_by_key(|c| c.name.to_lowercase());
        self.children = Some(children);
        Ok(())
    }
}

/// A visible row of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatDir {
    pub name: String,
    pub path: PathBuf,
    pub depth: usize,
    pub is_expanded: bool,
    pub is_last_sibling: bool,
    pub is_hidden: bool,
}

/// Directory-only tree rooted at the selector's current directory.
pub struct DirTree {
    pub root: DirNode,
    pub flat_items: Vec<FlatDir>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub show_hidden: bool,
}

impl DirTree {
    /// Create a tree rooted at `path` with the root expanded.
    pub fn new(path: &Path, show_hidden: bool) -> Result<Self> {
        let mut tree = Self {
            root: Self::expanded_root(path)?,
            flat_items: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            show_hidden,
        };
        tree.flatten();
        Ok(tree)
    }

    fn expanded_root(path: &Path) -> Result<DirNode> {
        let mut root = DirNode::new(path, 0)?;
        root.load_children()?;
        root.is_expanded = true;
        Ok(root)
    }

    /// Re-root the tree. Keeps the old root if `path` cannot be read.
    pub fn set_root(&mut self, path: &Path) -> bool {
        if self.root.path == path {
            self.reload();
            return true;
        }
        match Self::expanded_root(path) {
            Ok(root) => {
                self.root = root;
                self.selected_index = 0;
                self.scroll_offset = 0;
                self.flatten();
                true
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "tree root unchanged");
                false
            }
        }
    }

    /// Re-read the tree from disk, keeping expanded directories open.
    pub fn reload(&mut self) {
        let expanded = self.collect_expanded_paths();
        let selected = self.selected_path();
        let Ok(root) = Self::expanded_root(&self.root.path) else {
            return;
        };
        self.root = root;
        self.restore_expanded(&expanded);
        self.flatten();
        if let Some(index) = selected.and_then(|p| self.find_index_by_path(&p)) {
            self.selected_index = index;
        }
    }

    /// Rebuild the visible rows, respecting `show_hidden`.
    pub fn flatten(&mut self) {
        self.flat_items.clear();
        Self::flatten_node(&self.root, &mut self.flat_items, self.show_hidden, true);
        if !self.flat_items.is_empty() && self.selected_index >= self.flat_items.len() {
            self.selected_index = self.flat_items.len() - 1;
        }
    }

    fn flatten_node(node: &DirNode, items: &mut Vec<FlatDir>, show_hidden: bool, is_last: bool) {
        if !show_hidden && node.is_hidden {
            return;
        }
        items.push(FlatDir {
            name: node.name.clone(),
            path: node.path.clone(),
            depth: node.depth,
            is_expanded: node.is_expanded,
            is_last_sibling: is_last,
            is_hidden: node.is_hidden,
        });
        if !node.is_expanded {
            return;
        }
        if let Some(children) = &node.children {
            let visible: Vec<&DirNode> = children
                .iter()
                .filter(|c| show_hidden || !c.is_hidden)
                .collect();
            for (i, child) in visible.iter().enumerate() {
                Self::flatten_node(child, items, show_hidden, i == visible.len() - 1);
            }
        }
    }

    fn find_node_mut<'a>(node: &'a mut DirNode, target: &Path) -> Option<&'a mut DirNode> {
        if node.path == target {
            return Some(node);
        }
        if !target.starts_with(&node.path) {
            return None;
        }
        node.children
            .as_mut()?
            .iter_mut()
            .find_map(|child| Self::find_node_mut(child, target))
    }

    pub fn selected_path(&self) -> Option<PathBuf> {
        self.flat_items
            .get(self.selected_index)
            .map(|item| item.path.clone())
    }

    pub fn find_index_by_path(&self, path: &Path) -> Option<usize> {
        self.flat_items.iter().position(|item| item.path == path)
    }

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.flat_items.len() {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.flat_items.len().saturating_sub(1);
    }

    /// Expand the selected directory, reading it on first use.
    pub fn expand_selected(&mut self) {
        let Some(path) = self.selected_path() else {
            return;
        };
        if let Some(node) = Self::find_node_mut(&mut self.root, &path) {
            if !node.is_expanded {
                if node.children.is_none() {
                    let _ = node.load_children();
                }
                node.is_expanded = true;
                self.flatten();
            }
        }
    }

    /// Collapse the selected directory, or jump to its parent when it is
    /// already collapsed.
    pub fn collapse_selected(&mut self) {
        let Some(item) = self.flat_items.get(self.selected_index) else {
            return;
        };
        let path = item.path.clone();
        if item.is_expanded {
            if let Some(node) = Self::find_node_mut(&mut self.root, &path) {
                node.is_expanded = false;
                self.flatten();
            }
            return;
        }
        if let Some(index) = path.parent().and_then(|p| self.find_index_by_path(p)) {
            self.selected_index = index;
        }
    }

    /// Toggle the selected directory and report it as chosen.
    pub fn activate_selected(&mut self) -> Option<PathBuf> {
        let item = self.flat_items.get(self.selected_index)?;
        let path = item.path.clone();
        let expanded = item.is_expanded;
        if let Some(node) = Self::find_node_mut(&mut self.root, &path) {
            if expanded {
                node.is_expanded = false;
            } else {
                if node.children.is_none() {
                    let _ = node.load_children();
                }
                node.is_expanded = true;
            }
            self.flatten();
        }
        Some(path)
    }

    /// Select and activate the item on visible row `row`.
    pub fn click_row(&mut self, row: usize) -> Option<PathBuf> {
        let index = self.scroll_offset + row;
        if index >= self.flat_items.len() {
            return None;
        }
        self.selected_index = index;
        self.activate_selected()
    }

    /// Keep the selected row inside a window `visible_height` rows tall.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index + 1 - visible_height;
        }
    }

    pub fn collect_expanded_paths(&self) -> HashSet<PathBuf> {
        self.flat_items
            .iter()
            .filter(|item| item.is_expanded)
            .map(|item| item.path.clone())
            .collect()
    }

    /// Re-expand directories from a saved set, parents before children.
    pub fn restore_expanded(&mut self, expanded: &HashSet<PathBuf>) {
        let mut ordered: Vec<&PathBuf> = expanded.iter().collect();
        ordered.sort_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        });
        for path in ordered {
            if let Some(node) = Self::find_node_mut(&mut self.root, path) {
                if !node.is_expanded {
                    let _ = node.load_children();
                    node.is_expanded = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("Beta")).unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::create_dir(dir.path().join("alpha").join("nested")).unwrap();
        File::create(dir.path().join("file_a.txt")).unwrap();
        File::create(dir.path().join("alpha").join("inner.txt")).unwrap();
        dir
    }

    fn names(tree: &DirTree) -> Vec<&str> {
        tree.flat_items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn lists_directories_only() {
        let dir = setup_test_dir();
        let tree = DirTree::new(dir.path(), false).unwrap();
        assert_eq!(&names(&tree)[1..], &["alpha", "Beta"]);
    }

    #[test]
    fn hidden_directories_when_enabled() {
        let dir = setup_test_dir();
        let tree = DirTree::new(dir.path(), true).unwrap();
        assert_eq!(&names(&tree)[1..], &[".cache", "alpha", "Beta"]);
    }

    #[test]
    fn rejects_file_root() {
        let dir = setup_test_dir();
        assert!(DirTree::new(&dir.path().join("file_a.txt"), false).is_err());
    }

    #[test]
    fn expand_and_collapse() {
        let dir = setup_test_dir();
        let mut tree = DirTree::new(dir.path(), false).unwrap();
        tree.selected_index = 1;
        tree.expand_selected();
        assert_eq!(names(&tree), vec![tree.root.name.as_str(), "alpha", "nested", "Beta"]);
        tree.collapse_selected();
        assert_eq!(tree.flat_items.len(), 3);
        tree.collapse_selected();
        assert_eq!(tree.selected_index, 0);
    }

    #[test]
    fn activate_reports_path_and_toggles() {
        let dir = setup_test_dir();
        let mut tree = DirTree::new(dir.path(), false).unwrap();
        tree.selected_index = 1;
        let chosen = tree.activate_selected();
        assert_eq!(chosen, Some(dir.path().join("alpha")));
        assert!(tree.flat_items[1].is_expanded);
        tree.activate_selected();
        assert!(!tree.flat_items[1].is_expanded);
    }

    #[test]
    fn click_past_end_is_ignored() {
        let dir = setup_test_dir();
        let mut tree = DirTree::new(dir.path(), false).unwrap();
        assert_eq!(tree.click_row(40), None);
        assert_eq!(tree.click_row(2), Some(dir.path().join("Beta")));
    }

    #[test]
    fn set_root_moves_tree() {
        let dir = setup_test_dir();
        let mut tree = DirTree::new(dir.path(), false).unwrap();
        assert!(tree.set_root(&dir.path().join("alpha")));
        assert_eq!(names(&tree), vec!["alpha", "nested"]);
        assert!(!tree.set_root(&dir.path().join("missing")));
        assert_eq!(tree.root.path, dir.path().join("alpha"));
    }

    #[test]
    fn reload_keeps_expanded_and_picks_up_new_dirs() {
        let dir = setup_test_dir();
        let mut tree = DirTree::new(dir.path(), false).unwrap();
        tree.selected_index = 1;
        tree.expand_selected();
        fs::create_dir(dir.path().join("alpha").join("zeta")).unwrap();
        tree.reload();
        assert!(tree.flat_items.iter().any(|i| i.name == "zeta"));
        assert_eq!(tree.selected_path(), Some(dir.path().join("alpha")));
    }

    #[test]
    fn update_scroll_follows_selection() {
        let dir = setup_test_dir();
        let mut tree = DirTree::new(dir.path(), false).unwrap();
        tree.select_last();
        tree.update_scroll(2);
        assert_eq!(tree.scroll_offset, 1);
        tree.select_first();
        tree.update_scroll(2);
        assert_eq!(tree.scroll_offset, 0);
    }

    #[test]
    fn last_sibling_marked() {
        let dir = setup_test_dir();
        let tree = DirTree::new(dir.path(), false).unwrap();
        assert!(tree.flat_items.last().unwrap().is_last_sibling);
        assert!(!tree.flat_items[1].is_last_sibling);
    }
}
