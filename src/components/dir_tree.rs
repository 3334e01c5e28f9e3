use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::fs::dir_tree::{DirTree, FlatDir};
use crate::theme::Theme;

/// Directory tree with box-drawing connectors.
pub struct DirTreeWidget<'a> {
    tree: &'a DirTree,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> DirTreeWidget<'a> {
    pub fn new(tree: &'a DirTree, theme: &'a Theme, focused: bool) -> Self {
        Self {
            tree,
            theme,
            focused,
        }
    }

    /// Indentation for `items[index]`: one continuation column per ancestor,
    /// then the item's own connector.
    fn build_prefix(items: &[FlatDir], index: usize) -> String {
        let item = &items[index];
        if item.depth == 0 {
            return String::new();
        }

        let mut prefix = String::new();
        for depth in 1..item.depth {
            // Nearest row above at this depth is the ancestor
            let ancestor_is_last = items[..index]
                .iter()
                .rev()
                .take_while(|other| other.depth >= depth)
                .find(|other| other.depth == depth)
                .is_some_and(|other| other.is_last_sibling);
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }
        prefix.push_str(if item.is_last_sibling { "└──" } else { "├──" });
        prefix
    }

    fn marker(item: &FlatDir) -> &'static str {
        if item.is_expanded {
            "▾ "
        } else {
            "▸ "
        }
    }
}

impl<'a> Widget for DirTreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items = &self.tree.flat_items;
        if items.is_empty() || area.height == 0 {
            return;
        }

        let visible = items
            .iter()
            .enumerate()
            .skip(self.tree.scroll_offset)
            .take(usize::from(area.height));
        for (row, (index, item)) in visible.enumerate() {
            let style = if index == self.tree.selected_index && self.focused {
                Style::default()
                    .bg(self.theme.row_focus_bg)
                    .fg(self.theme.fg)
                    .add_modifier(Modifier::BOLD)
            } else if index == self.tree.selected_index {
                Style::default().bg(self.theme.header_bg).fg(self.theme.dir_fg)
            } else if item.is_hidden {
                Style::default().fg(self.theme.dim_fg)
            } else {
                Style::default().fg(self.theme.dir_fg)
            };
            let text = format!("{}{}{}", Self::build_prefix(items, index), Self::marker(item), item.name);
            let line = Line::from(Span::styled(text, style));
            buf.set_line(area.x, area.y + row as u16, &line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::buffer_to_string;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, DirTree) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("alpha/inner")).unwrap();
        fs::create_dir(tmp.path().join("beta")).unwrap();
        fs::write(tmp.path().join("file.txt"), "x").unwrap();
        let tree = DirTree::new(tmp.path(), false).unwrap();
        (tmp, tree)
    }

    fn render(tree: &DirTree, height: u16) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, height);
        let mut buf = Buffer::empty(area);
        DirTreeWidget::new(tree, &theme, true).render(area, &mut buf);
        buffer_to_string(&buf)
    }

    #[test]
    fn draws_connectors_for_children() {
        let (_tmp, tree) = fixture();
        let content = render(&tree, 5);
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[0].starts_with("▾ "));
        assert!(lines[1].starts_with("├──▸ alpha"));
        assert!(lines[2].starts_with("└──▸ beta"));
        assert!(!content.contains("file.txt"));
    }

    #[test]
    fn nested_rows_continue_parent_line() {
        let (_tmp, mut tree) = fixture();
        tree.select_next();
        tree.expand_selected();
        let content = render(&tree, 5);
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[2].starts_with("│  └──▸ inner"));
    }

    #[test]
    fn scroll_offset_skips_rows() {
        let (_tmp, mut tree) = fixture();
        tree.scroll_offset = 1;
        let content = render(&tree, 1);
        assert!(content.starts_with("├──▸ alpha"));
    }
}
