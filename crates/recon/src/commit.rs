use rustc_hash::FxHashMap;
use serde::Serialize;

use auditgrid_core::CellValue;
use auditgrid_engine::Table;

use crate::action::RowActions;

/// Counts recomputed from the committed matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Distinct non-empty keys.
    pub distinct_key_count: usize,
    /// Keys still appearing on two or more rows.
    pub duplicate_key_count: usize,
    pub total_data_rows: usize,
}

/// Everything handed to storage at the end of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutput {
    pub matrix: Vec<Vec<CellValue>>,
    pub summary: CommitSummary,
    pub visibility: Vec<bool>,
    /// Load-time index of each committed column; `None` for inserted ones.
    pub column_origins: Vec<Option<usize>>,
    pub key_column: usize,
}

/// Header plus every data row not tagged `Delete`/`Reject`, in matrix order.
pub fn filter_matrix(table: &Table, actions: &RowActions) -> Vec<Vec<CellValue>> {
    let mut out = Vec::with_capacity(table.row_count() + 1);
    out.push(table.header().to_vec());
    out.extend(
        table
            .data_rows()
            .filter(|(idx, _)| !actions.is_removed(*idx))
            .map(|(_, cells)| cells.to_vec()),
    );
    out
}

/// Summarize a header + rows matrix on `key_col`.
pub fn summarize(matrix: &[Vec<CellValue>], key_col: usize) -> CommitSummary {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for cells in matrix.iter().skip(1) {
        let Some(key) = cells.get(key_col).map(|v| v.key_text()) else {
            continue;
        };
        if !key.is_empty() {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    CommitSummary {
        distinct_key_count: counts.len(),
        duplicate_key_count: counts.values().filter(|&&n| n >= 2).count(),
        total_data_rows: matrix.len().saturating_sub(1),
    }
}

/// Reduce the table and its actions to the committed matrix and summary.
pub fn commit(table: &Table, actions: &RowActions, key_col: usize) -> CommitOutput {
    let matrix = filter_matrix(table, actions);
    let summary = summarize(&matrix, key_col);
    CommitOutput {
        matrix,
        summary,
        visibility: table.visibility(),
        column_origins: table.column_origins(),
        key_column: key_col,
    }
}
