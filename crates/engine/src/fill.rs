//! Drag-fill state machine.
//!
//! The engine only decides *which* cells a gesture writes; the caller
//! applies each [`FillPlan`] so it can capture undo state first.

use auditgrid_core::{CellPos, CellRect, CellValue, FillMode};

use crate::error::TableError;
use crate::table::Table;

/// Cells to overwrite with one value.
#[derive(Debug, Clone, PartialEq)]
pub struct FillPlan {
    pub value: CellValue,
    pub cells: Vec<CellPos>,
}

impl FillPlan {
    /// Write the plan into the table. Returns the number of cells written.
    pub fn apply(&self, table: &mut Table) -> Result<usize, TableError> {
        for pos in &self.cells {
            table.update_cell(pos.row, pos.col, self.value.clone())?;
        }
        Ok(self.cells.len())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragFill {
    #[default]
    Idle,
    Dragging {
        mode: FillMode,
        /// Cell under the pointer at press-down (source of the fill)
        anchor: CellPos,
        /// Current hover cell
        focus: CellPos,
        /// Anchor value captured at press-down, not re-read later
        value: CellValue,
    },
}

impl DragFill {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragFill::Dragging { .. })
    }

    pub fn mode(&self) -> Option<FillMode> {
        match self {
            DragFill::Dragging { mode, .. } => Some(*mode),
            DragFill::Idle => None,
        }
    }

    /// Start a drag on a data cell, recording its current value.
    pub fn press(&mut self, table: &Table, pos: CellPos, mode: FillMode) -> Result<(), TableError> {
        if pos.row == 0 {
            return Err(TableError::HeaderRow);
        }
        let value = table
            .cell(pos.row, pos.col)
            .cloned()
            .ok_or(TableError::OutOfBounds {
                row: pos.row,
                col: pos.col,
            })?;

        *self = DragFill::Dragging {
            mode,
            anchor: pos,
            focus: pos,
            value,
        };
        log::debug!("drag-fill started at ({}, {}) in {:?} mode", pos.row, pos.col, mode);
        Ok(())
    }

    /// Pointer entered `pos`. In column mode this may yield a write;
    /// in rectangular mode it only moves the focus.
    pub fn hover(&mut self, table: &Table, pos: CellPos) -> Option<FillPlan> {
        let DragFill::Dragging {
            mode,
            anchor,
            focus,
            value,
        } = self
        else {
            return None;
        };

        match mode {
            FillMode::Rectangular => {
                // Keep the focus inside the data area
                if table.row_count() == 0 || table.col_count() == 0 {
                    return None;
                }
                *focus = CellPos {
                    row: pos.row.clamp(1, table.row_count()),
                    col: pos.col.min(table.col_count() - 1),
                };
                None
            }
            FillMode::ColumnConstrained => {
                if pos.col != anchor.col || !table.is_data_row(pos.row) || pos == *focus {
                    return None;
                }
                *focus = pos;
                if pos == *anchor {
                    return None;
                }
                Some(FillPlan {
                    value: value.clone(),
                    cells: vec![pos],
                })
            }
        }
    }

    /// End the drag. Rectangular mode yields the whole rectangle unless the
    /// pointer came back to the anchor.
    pub fn release(&mut self) -> Option<FillPlan> {
        let DragFill::Dragging {
            mode,
            anchor,
            focus,
            value,
        } = std::mem::take(self)
        else {
            return None;
        };

        match mode {
            FillMode::ColumnConstrained => None,
            FillMode::Rectangular => {
                let rect = CellRect::from_corners(anchor, focus);
                if rect.is_single_cell() {
                    return None;
                }
                Some(FillPlan {
                    value,
                    cells: rect.cells().collect(),
                })
            }
        }
    }

    pub fn cancel(&mut self) {
        *self = DragFill::Idle;
    }

    /// Rectangle to highlight while dragging.
    pub fn preview(&self) -> Option<CellRect> {
        match self {
            DragFill::Dragging { anchor, focus, .. } => Some(CellRect::from_corners(*anchor, *focus)),
            DragFill::Idle => None,
        }
    }
}
