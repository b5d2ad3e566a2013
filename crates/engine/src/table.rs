//! Table model: the header + rows matrix and its column layout.
//!
//! Matrix space is used throughout: row 0 is the header, data rows start
//! at 1, and a data row's matrix position at load time is its original
//! index. Rows are never inserted, removed or reordered during a session,
//! so that position stays valid until commit.

use auditgrid_core::CellValue;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Column layout parameters applied at load and on insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub default_width: f32,
    pub min_width: f32,
    pub new_column_label: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            default_width: 120.0,
            min_width: 40.0,
            new_column_label: "New Column".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub visible: bool,
    pub width: f32,
    /// Column index at load time; `None` for columns inserted since.
    #[serde(default)]
    pub origin: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    matrix: Vec<Vec<CellValue>>,
    columns: Vec<ColumnMeta>,
    layout: ColumnLayout,
}

impl Table {
    /// Build a table from a header + rows matrix.
    ///
    /// Rows shorter than the header are padded with empty text. Rows longer
    /// than the header are rejected: there is no label to attach the extra
    /// cells to.
    pub fn from_matrix(
        mut matrix: Vec<Vec<CellValue>>,
        layout: ColumnLayout,
    ) -> Result<Self, TableError> {
        let header_len = match matrix.first() {
            Some(header) if !header.is_empty() => header.len(),
            _ => return Err(TableError::EmptyMatrix),
        };

        let mut padded = 0;
        for (row, cells) in matrix.iter_mut().enumerate().skip(1) {
            if cells.len() > header_len {
                return Err(TableError::MalformedMatrix {
                    row,
                    len: cells.len(),
                    header_len,
                });
            }
            if cells.len() < header_len {
                cells.resize(header_len, CellValue::empty());
                padded += 1;
            }
        }
        if padded > 0 {
            log::debug!("padded {padded} short row(s) to header length {header_len}");
        }

        let width = layout.default_width.max(layout.min_width);
        let columns = (0..header_len)
            .map(|col| ColumnMeta {
                visible: true,
                width,
                origin: Some(col),
            })
            .collect();

        Ok(Self {
            matrix,
            columns,
            layout,
        })
    }

    pub fn header(&self) -> &[CellValue] {
        &self.matrix[0]
    }

    pub fn matrix(&self) -> &[Vec<CellValue>] {
        &self.matrix
    }

    pub fn into_matrix(self) -> Vec<Vec<CellValue>> {
        self.matrix
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.matrix.len() - 1
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_data_row(&self, row: usize) -> bool {
        row >= 1 && row < self.matrix.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.matrix.get(row).and_then(|cells| cells.get(col))
    }

    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.matrix.get(row).map(|cells| cells.as_slice())
    }

    /// Data rows with their original index, in matrix order.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[CellValue])> + '_ {
        self.matrix
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, cells)| (idx, cells.as_slice()))
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn column(&self, col: usize) -> Option<&ColumnMeta> {
        self.columns.get(col)
    }

    pub fn visibility(&self) -> Vec<bool> {
        self.columns.iter().map(|c| c.visible).collect()
    }

    /// Load-time index of each current column (`None` if inserted).
    pub fn column_origins(&self) -> Vec<Option<usize>> {
        self.columns.iter().map(|c| c.origin).collect()
    }

    pub fn visible_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.visible.then_some(i))
            .collect()
    }

    /// Apply a persisted visibility vector. Missing entries stay visible and
    /// surplus entries are ignored, so the vector always tracks the header.
    pub fn apply_visibility(&mut self, visibility: &[bool]) {
        for (meta, &visible) in self.columns.iter_mut().zip(visibility) {
            meta.visible = visible;
        }
    }

    fn check_col(&self, col: usize) -> Result<(), TableError> {
        if col >= self.columns.len() {
            return Err(TableError::ColumnOutOfBounds {
                col,
                count: self.columns.len(),
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Insert an empty column beside `at`. Returns the new column's index.
    pub fn insert_column(&mut self, at: usize, side: InsertSide) -> Result<usize, TableError> {
        self.check_col(at)?;
        let index = match side {
            InsertSide::Left => at,
            InsertSide::Right => at + 1,
        };

        for (row, cells) in self.matrix.iter_mut().enumerate() {
            let value = if row == 0 {
                CellValue::text(self.layout.new_column_label.clone())
            } else {
                CellValue::empty()
            };
            cells.insert(index, value);
        }
        self.columns.insert(
            index,
            ColumnMeta {
                visible: true,
                width: self.layout.default_width.max(self.layout.min_width),
                origin: None,
            },
        );
        Ok(index)
    }

    pub fn set_column_visible(&mut self, col: usize, visible: bool) -> Result<(), TableError> {
        self.check_col(col)?;
        self.columns[col].visible = visible;
        Ok(())
    }

    /// Resize a column, clamped to the layout minimum. Returns the applied width.
    pub fn resize_column(&mut self, col: usize, width: f32) -> Result<f32, TableError> {
        self.check_col(col)?;
        let width = if width.is_finite() {
            width.max(self.layout.min_width)
        } else {
            self.layout.min_width
        };
        self.columns[col].width = width;
        Ok(width)
    }

    /// Replace one cell in place. Returns the previous value.
    pub fn update_cell(
        &mut self,
        row: usize,
        col: usize,
        value: CellValue,
    ) -> Result<CellValue, TableError> {
        let cell = self
            .matrix
            .get_mut(row)
            .and_then(|cells| cells.get_mut(col))
            .ok_or(TableError::OutOfBounds { row, col })?;
        Ok(std::mem::replace(cell, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn sample() -> Table {
        Table::from_matrix(
            vec![
                vec![t("PO"), t("Desc")],
                vec![t("PO100"), t("A")],
                vec![t("PO100"), t("B")],
                vec![t("PO200"), t("C")],
            ],
            ColumnLayout::default(),
        )
        .unwrap()
    }

    #[test]
    fn load_pads_short_rows() {
        let table = Table::from_matrix(
            vec![vec![t("PO"), t("Desc"), t("Qty")], vec![t("PO1")]],
            ColumnLayout::default(),
        )
        .unwrap();
        assert_eq!(table.row(1).unwrap(), &[t("PO1"), t(""), t("")]);
    }

    #[test]
    fn load_rejects_long_rows() {
        let err = Table::from_matrix(
            vec![vec![t("PO")], vec![t("PO1"), t("extra")]],
            ColumnLayout::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::MalformedMatrix {
                row: 1,
                len: 2,
                header_len: 1
            }
        );
    }

    #[test]
    fn load_rejects_empty() {
        assert_eq!(
            Table::from_matrix(vec![], ColumnLayout::default()).unwrap_err(),
            TableError::EmptyMatrix
        );
        assert_eq!(
            Table::from_matrix(vec![vec![]], ColumnLayout::default()).unwrap_err(),
            TableError::EmptyMatrix
        );
    }

    #[test]
    fn data_rows_carry_original_index() {
        let table = sample();
        let idx: Vec<usize> = table.data_rows().map(|(i, _)| i).collect();
        assert_eq!(idx, vec![1, 2, 3]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn insert_column_right_shifts_layout() {
        let mut table = sample();
        table.set_column_visible(1, false).unwrap();
        let idx = table.insert_column(0, InsertSide::Right).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(table.col_count(), 3);
        assert_eq!(table.header()[1], t("New Column"));
        assert_eq!(table.row(2).unwrap(), &[t("PO100"), t(""), t("B")]);
        assert_eq!(table.visibility(), vec![true, true, false]);
        assert_eq!(table.visibility().len(), table.header().len());
    }

    #[test]
    fn insert_column_left_keeps_index() {
        let mut table = sample();
        let idx = table.insert_column(1, InsertSide::Left).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(table.header(), &[t("PO"), t("New Column"), t("Desc")]);
        assert_eq!(table.column_origins(), vec![Some(0), None, Some(1)]);
    }

    #[test]
    fn insert_column_out_of_bounds() {
        let mut table = sample();
        assert!(matches!(
            table.insert_column(5, InsertSide::Left),
            Err(TableError::ColumnOutOfBounds { col: 5, count: 2 })
        ));
    }

    #[test]
    fn resize_clamps_to_minimum() {
        let mut table = sample();
        assert_eq!(table.resize_column(0, 10.0).unwrap(), 40.0);
        assert_eq!(table.resize_column(0, 200.0).unwrap(), 200.0);
        assert_eq!(table.resize_column(0, f32::NAN).unwrap(), 40.0);
        assert_eq!(table.column(0).unwrap().width, 40.0);
    }

    #[test]
    fn visibility_never_touches_cells() {
        let mut table = sample();
        let before = table.matrix().to_vec();
        table.set_column_visible(0, false).unwrap();
        table.set_column_visible(1, false).unwrap();
        table.set_column_visible(0, true).unwrap();
        assert_eq!(table.matrix(), before.as_slice());
        assert_eq!(table.visible_columns(), vec![0]);
    }

    #[test]
    fn apply_visibility_tracks_header_length() {
        let mut table = sample();
        table.apply_visibility(&[false]);
        assert_eq!(table.visibility(), vec![false, true]);
        table.apply_visibility(&[true, false, false, false]);
        assert_eq!(table.visibility(), vec![true, false]);
    }

    #[test]
    fn update_cell_returns_previous() {
        let mut table = sample();
        let old = table.update_cell(2, 1, t("Pending")).unwrap();
        assert_eq!(old, t("B"));
        assert_eq!(table.cell(2, 1), Some(&t("Pending")));
        assert!(table.update_cell(9, 0, t("x")).is_err());
    }
}
