//! Retained character grid that windows, menus, and the cursor paint into.

use crate::{
    geometry::{GridPos, GridRect},
    style::Style,
    Action,
};

/// Single character cell of the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Glyph shown in the cell.
    pub glyph: char,
    /// Colours of the cell.
    pub style: Style,
    /// Whether the highlight colours apply.
    pub highlighted: bool,
    /// Behaviour triggered when the cell is activated.
    pub action: Option<Action>,
}

impl Cell {
    /// Creates a blank cell painted with the provided style.
    #[must_use]
    pub const fn blank(style: Style) -> Self {
        Self {
            glyph: ' ',
            style,
            highlighted: false,
            action: None,
        }
    }

    /// Colours the cell is currently drawn with.
    #[must_use]
    pub const fn colors(&self) -> (crate::Color, crate::Color) {
        self.style.resolve(self.highlighted)
    }
}

/// Fixed-size grid of cells, cleared and repainted every frame.
#[derive(Clone, Debug)]
pub struct GridSurface {
    columns: i32,
    rows: i32,
    background: Style,
    cells: Vec<Cell>,
}

impl GridSurface {
    /// Creates a surface filled with blank cells of the background style.
    #[must_use]
    pub fn new(columns: i32, rows: i32, background: Style) -> Self {
        let columns = columns.max(0);
        let rows = rows.max(0);
        let count = usize::try_from(columns * rows).unwrap_or(0);
        Self {
            columns,
            rows,
            background,
            cells: vec![Cell::blank(background); count],
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Rectangle covering the whole surface.
    #[must_use]
    pub const fn bounds(&self) -> GridRect {
        GridRect::new(0, 0, self.columns, self.rows)
    }

    /// Style blank cells are reset to.
    #[must_use]
    pub const fn background(&self) -> Style {
        self.background
    }

    /// Resets every cell to a blank background cell.
    pub fn clear(&mut self) {
        let blank = Cell::blank(self.background);
        self.cells.fill(blank);
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if !self.bounds().contains(pos) {
            return None;
        }
        usize::try_from(pos.row * self.columns + pos.column).ok()
    }

    /// Cell at the provided position, if it lies on the surface.
    #[must_use]
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.index(pos).and_then(|index| self.cells.get(index))
    }

    /// Mutable cell at the provided position, if it lies on the surface.
    pub fn cell_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        self.index(pos).and_then(move |index| self.cells.get_mut(index))
    }

    /// Replaces a cell; positions off the surface are ignored.
    pub fn set_cell(&mut self, pos: GridPos, cell: Cell) {
        if let Some(slot) = self.cell_mut(pos) {
            *slot = cell;
        }
    }

    /// Writes a glyph with no action attached.
    pub fn put(&mut self, pos: GridPos, glyph: char, style: Style) {
        self.set_cell(
            pos,
            Cell {
                glyph,
                style,
                highlighted: false,
                action: None,
            },
        );
    }

    /// Writes a string left to right starting at the provided position.
    pub fn write_str(&mut self, pos: GridPos, text: &str, style: Style) {
        for (offset, glyph) in (0..).zip(text.chars()) {
            self.put(pos.offset(offset, 0), glyph, style);
        }
    }

    /// Fills a rectangle with a glyph.
    pub fn fill_rect(&mut self, rect: GridRect, glyph: char, style: Style) {
        let Some(rect) = rect.intersection(&self.bounds()) else {
            return;
        };
        for row in rect.top..rect.bottom() {
            for column in rect.left..rect.right() {
                self.put(GridPos::new(column, row), glyph, style);
            }
        }
    }

    /// Action bound to the cell at the provided position.
    #[must_use]
    pub fn action_at(&self, pos: GridPos) -> Option<&Action> {
        self.cell(pos).and_then(|cell| cell.action.as_ref())
    }

    /// Text of a single row, for diagnostics and text backends.
    #[must_use]
    pub fn row_text(&self, row: i32) -> String {
        (0..self.columns)
            .filter_map(|column| self.cell(GridPos::new(column, row)))
            .map(|cell| cell.glyph)
            .collect()
    }

    /// Iterates every cell together with its position, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (GridPos, &Cell)> + '_ {
        let columns = self.columns.max(1);
        (0..).zip(self.cells.iter()).map(move |(index, cell)| {
            (GridPos::new(index % columns, index / columns), cell)
        })
    }
}
