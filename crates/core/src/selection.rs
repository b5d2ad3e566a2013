use serde::{Deserialize, Serialize};

/// A cell address in matrix space. Row 0 is the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for CellPos {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Inclusive rectangle normalized from two corners, whatever the drag direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl CellRect {
    pub fn from_corners(a: CellPos, b: CellPos) -> Self {
        Self {
            min_row: a.row.min(b.row),
            min_col: a.col.min(b.col),
            max_row: a.row.max(b.row),
            max_col: a.col.max(b.col),
        }
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row >= self.min_row
            && pos.row <= self.max_row
            && pos.col >= self.min_col
            && pos.col <= self.max_col
    }

    pub fn is_single_cell(&self) -> bool {
        self.min_row == self.max_row && self.min_col == self.max_col
    }

    pub fn row_count(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// Row-major iteration over every cell in the rectangle.
    pub fn cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| CellPos { row, col }))
    }
}

/// Drag-fill behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Cells in the anchor's column take the value as the pointer enters them.
    #[serde(rename = "column")]
    ColumnConstrained,
    /// The anchor value fills the whole anchor/focus rectangle on release.
    #[default]
    Rectangular,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_normalizes_reverse_drag() {
        let r = CellRect::from_corners(CellPos::new(5, 4), CellPos::new(2, 1));
        assert_eq!((r.min_row, r.min_col, r.max_row, r.max_col), (2, 1, 5, 4));
        assert_eq!(r.row_count(), 4);
        assert_eq!(r.col_count(), 4);
        assert!(r.contains(CellPos::new(3, 2)));
        assert!(!r.contains(CellPos::new(6, 2)));
    }

    #[test]
    fn single_cell_rect() {
        let p = CellPos::new(3, 2);
        assert!(CellRect::from_corners(p, p).is_single_cell());
        assert!(!CellRect::from_corners(p, CellPos::new(4, 2)).is_single_cell());
    }

    #[test]
    fn rect_cells_row_major() {
        let r = CellRect::from_corners(CellPos::new(1, 1), CellPos::new(2, 2));
        let cells: Vec<_> = r.cells().map(|p| (p.row, p.col)).collect();
        assert_eq!(cells, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    }

    #[test]
    fn fill_mode_serde_names() {
        let m: FillMode = serde_json::from_str("\"column\"").unwrap();
        assert_eq!(m, FillMode::ColumnConstrained);
        let m: FillMode = serde_json::from_str("\"rectangular\"").unwrap();
        assert_eq!(m, FillMode::Rectangular);
    }
}
