//! Column widths, sort selection and interactive header resizing.

/// Narrowest a column may be dragged to.
pub const MIN_COLUMN_WIDTH: u16 = 5;

/// Cells reserved at the right of each header cell: sort arrow, spacing and
/// the resize grip.
pub const HEADER_DECORATION_WIDTH: u16 = 5;

/// One column of the file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub width: u16,
    /// Direction chosen when the user switches to this column.
    pub descending_by_default: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, width: u16, descending_by_default: bool) -> Self {
        Self {
            name: name.into(),
            width: width.max(MIN_COLUMN_WIDTH),
            descending_by_default,
        }
    }
}

/// Name, Size and Last modified, sized for a terminal `screen_width` wide.
///
/// The name column takes what is left of 70% of the screen once the two
/// fixed columns are accounted for.
pub fn default_columns(
    screen_width: u16,
    name_width: Option<u16>,
    size_width: u16,
    modified_width: u16,
) -> Vec<ColumnSpec> {
    let derived = i32::from(screen_width) * 70 / 100 - 49;
    let name_width = name_width.unwrap_or_else(|| derived.max(MIN_COLUMN_WIDTH as i32) as u16);
    vec![
        ColumnSpec::new("Name", name_width, false),
        ColumnSpec::new("Size", size_width, true),
        ColumnSpec::new("Last modified", modified_width, true),
    ]
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: 0,
            ascending: true,
        }
    }
}

impl SortState {
    /// Route a header click: the active column flips direction, any other
    /// column becomes active in its default direction.
    ///
    /// Returns `false` for an index outside `columns`.
    pub fn header_clicked(&mut self, index: usize, columns: &[ColumnSpec]) -> bool {
        let Some(column) = columns.get(index) else {
            return false;
        };
        if self.column == index {
            self.ascending = !self.ascending;
        } else {
            self.column = index;
            self.ascending = !column.descending_by_default;
        }
        true
    }
}

/// What a header-row cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderHit {
    /// The resize grip of column `n`.
    Grip(usize),
    /// Anywhere else inside column `n` (a sort click).
    Column(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnDrag {
    index: usize,
    last_x: u16,
}

/// Ordered column set with a cached total width.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    columns: Vec<ColumnSpec>,
    total_width: usize,
    drag: Option<ColumnDrag>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        let mut layout = Self {
            columns,
            total_width: 0,
            drag: None,
        };
        layout.recompute_total();
        layout
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn width(&self, index: usize) -> u16 {
        self.columns.get(index).map_or(0, |c| c.width)
    }

    /// Sum of all column widths.
    pub fn total_width(&self) -> usize {
        self.total_width
    }

    /// Grow or shrink a column, never below [`MIN_COLUMN_WIDTH`].
    pub fn resize_column(&mut self, index: usize, delta: i32) -> bool {
        let Some(column) = self.columns.get_mut(index) else {
            return false;
        };
        let new_width = (i32::from(column.width) + delta)
            .clamp(i32::from(MIN_COLUMN_WIDTH), i32::from(u16::MAX)) as u16;
        if new_width == column.width {
            return false;
        }
        column.width = new_width;
        self.recompute_total();
        true
    }

    /// Classify a content-space x coordinate on the header row.
    pub fn hit(&self, content_x: usize) -> Option<HeaderHit> {
        let mut start = 0usize;
        for (index, column) in self.columns.iter().enumerate() {
            let end = start + usize::from(column.width);
            if content_x < end {
                let grip = end.saturating_sub(2);
                return Some(if content_x == grip {
                    HeaderHit::Grip(index)
                } else {
                    HeaderHit::Column(index)
                });
            }
            start = end;
        }
        None
    }

    /// Start resizing `index` from screen column `x`.
    pub fn begin_drag(&mut self, index: usize, x: u16) {
        if index < self.columns.len() {
            self.drag = Some(ColumnDrag { index, last_x: x });
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Follow the pointer during a resize drag.
    ///
    /// A move without a held button ends the drag. Returns whether a width
    /// changed.
    pub fn drag_to(&mut self, x: u16, button_held: bool) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        if !button_held {
            self.end_drag();
            return false;
        }
        let delta = i32::from(x) - i32::from(drag.last_x);
        if delta == 0 {
            return false;
        }
        self.drag = Some(ColumnDrag {
            index: drag.index,
            last_x: x,
        });
        self.resize_column(drag.index, delta)
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    fn recompute_total(&mut self) {
        self.total_width = self.columns.iter().map(|c| usize::from(c.width)).sum();
    }
}
