//! Grid coordinates and rectangles.

/// Column and row of a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    /// Column index, growing to the right.
    pub column: i32,
    /// Row index, growing downwards.
    pub row: i32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Returns the position shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }
}

/// Axis-aligned rectangle of cells; the right and bottom edges are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridRect {
    /// Leftmost column.
    pub left: i32,
    /// Topmost row.
    pub top: i32,
    /// Number of columns covered.
    pub width: i32,
    /// Number of rows covered.
    pub height: i32,
}

impl GridRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// First column past the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    /// First row past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> GridPos {
        GridPos::new(self.left, self.top)
    }

    /// Reports whether the rectangle covers no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.column >= self.left
            && pos.column < self.right()
            && pos.row >= self.top
            && pos.row < self.bottom()
    }

    /// Cells covered by both rectangles, if any.
    #[must_use]
    pub fn intersection(&self, other: &GridRect) -> Option<GridRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let overlap = GridRect::new(left, top, right - left, bottom - top);
        (!overlap.is_empty()).then_some(overlap)
    }

    /// Smallest rectangle covering both rectangles.
    #[must_use]
    pub fn union(&self, other: &GridRect) -> GridRect {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        GridRect::new(left, top, right - left, bottom - top)
    }

    /// Returns the rectangle moved by the provided deltas.
    #[must_use]
    pub const fn translate(self, columns: i32, rows: i32) -> Self {
        Self::new(self.left + columns, self.top + rows, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_exclusive() {
        let rect = GridRect::new(2, 3, 4, 5);
        assert!(rect.contains(GridPos::new(2, 3)));
        assert!(rect.contains(GridPos::new(5, 7)));
        assert!(!rect.contains(GridPos::new(6, 7)));
        assert!(!rect.contains(GridPos::new(5, 8)));
    }

    #[test]
    fn intersection_handles_every_corner() {
        let clip = GridRect::new(0, 0, 10, 10);
        let corners = [
            (GridRect::new(-2, -2, 4, 4), GridRect::new(0, 0, 2, 2)),
            (GridRect::new(8, -2, 4, 4), GridRect::new(8, 0, 2, 2)),
            (GridRect::new(-2, 8, 4, 4), GridRect::new(0, 8, 2, 2)),
            (GridRect::new(8, 8, 4, 4), GridRect::new(8, 8, 2, 2)),
        ];
        for (rect, expected) in corners {
            assert_eq!(clip.intersection(&rect), Some(expected));
        }
        assert_eq!(clip.intersection(&GridRect::new(10, 0, 3, 3)), None);
    }

    #[test]
    fn union_ignores_empty_rectangles() {
        let rect = GridRect::new(1, 1, 2, 2);
        assert_eq!(rect.union(&GridRect::default()), rect);
        assert_eq!(
            rect.union(&GridRect::new(4, 0, 1, 1)),
            GridRect::new(1, 0, 4, 3)
        );
    }
}
