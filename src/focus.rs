/// Which host control holds keyboard focus.
///
/// Menus track their own focused item; this is what gets focus back when
/// they close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    None,
    /// A header of the menu bar, by position.
    MenuHeader(usize),
    /// A named host widget.
    Widget(&'static str),
}

impl Focus {
    pub fn is_menu_header(&self) -> bool {
        matches!(self, Focus::MenuHeader(_))
    }
}
