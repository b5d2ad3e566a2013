//! Column filters: per-column value selections over the matrix.
//!
//! Key invariants:
//! - Filtering hides rows; it never reorders or renumbers them
//! - A column with no selection passes every row
//! - Active columns combine by AND
//! - Values compare by display text

use rustc_hash::{FxHashMap, FxHashSet};

use auditgrid_core::CellValue;

use crate::table::Table;

/// Entry in a column's choice list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueValueEntry {
    /// Display text, also the value a filter admits
    pub display: String,
    /// Count of data rows with this value
    pub count: usize,
}

/// Distinct values in a column, in first-seen row order.
pub fn distinct_values(table: &Table, col: usize) -> Vec<UniqueValueEntry> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut entries: Vec<UniqueValueEntry> = Vec::new();

    for (_, cells) in table.data_rows() {
        let display = cells.get(col).map(CellValue::display).unwrap_or_default();
        match index.get(&display) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(display.clone(), entries.len());
                entries.push(UniqueValueEntry { display, count: 1 });
            }
        }
    }

    entries
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFilters {
    /// Admitted display values per column. Absent = no restriction.
    selected: FxHashMap<usize, FxHashSet<String>>,
}

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a column's admitted set. An empty set clears the filter.
    pub fn set_column_filter<I, S>(&mut self, col: usize, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: FxHashSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            self.selected.remove(&col);
        } else {
            self.selected.insert(col, set);
        }
    }

    /// Add or remove one value from a column's selection.
    pub fn toggle_value(&mut self, col: usize, value: &str) {
        let set = self.selected.entry(col).or_default();
        if !set.remove(value) {
            set.insert(value.to_string());
        }
        if set.is_empty() {
            self.selected.remove(&col);
        }
    }

    pub fn selected(&self, col: usize) -> Option<&FxHashSet<String>> {
        self.selected.get(&col)
    }

    pub fn is_active(&self, col: usize) -> bool {
        self.selected.contains_key(&col)
    }

    pub fn has_active_filter(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn clear_column(&mut self, col: usize) {
        self.selected.remove(&col);
    }

    /// Reset every column to "no restriction".
    pub fn clear_all(&mut self) {
        self.selected.clear();
    }

    /// Check a row against every active column filter.
    pub fn passes(&self, cells: &[CellValue]) -> bool {
        self.selected.iter().all(|(&col, admitted)| {
            let display = cells.get(col).map(CellValue::display).unwrap_or_default();
            admitted.contains(&display)
        })
    }

    /// Original indices of data rows passing the filters, in matrix order.
    pub fn visible_rows(&self, table: &Table) -> Vec<usize> {
        table
            .data_rows()
            .filter(|(_, cells)| self.passes(cells))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Keep filters attached to their columns after a column was inserted at `index`.
    pub fn shift_for_insert(&mut self, index: usize) {
        if self.selected.keys().all(|&col| col < index) {
            return;
        }
        self.selected = std::mem::take(&mut self.selected)
            .into_iter()
            .map(|(col, set)| if col >= index { (col + 1, set) } else { (col, set) })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnLayout, InsertSide};

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn table() -> Table {
        Table::from_matrix(
            vec![
                vec![t("PO"), t("Vendor"), t("Qty")],
                vec![t("PO1"), t("Acme"), CellValue::Number(5.0)],
                vec![t("PO2"), t("Baltic"), CellValue::Number(3.0)],
                vec![t("PO3"), t("Acme"), CellValue::Number(3.0)],
                vec![t("PO4"), t("Corvus"), CellValue::Number(5.0)],
            ],
            ColumnLayout::default(),
        )
        .unwrap()
    }

    #[test]
    fn distinct_values_first_seen_with_counts() {
        let values = distinct_values(&table(), 1);
        let pairs: Vec<_> = values.iter().map(|e| (e.display.as_str(), e.count)).collect();
        assert_eq!(pairs, vec![("Acme", 2), ("Baltic", 1), ("Corvus", 1)]);

        let qty = distinct_values(&table(), 2);
        assert_eq!(qty[0].display, "5");
        assert_eq!(qty[0].count, 2);
    }

    #[test]
    fn no_filter_passes_everything() {
        let filters = ColumnFilters::new();
        assert_eq!(filters.visible_rows(&table()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn filters_and_across_columns() {
        let mut filters = ColumnFilters::new();
        filters.set_column_filter(1, ["Acme", "Corvus"]);
        assert_eq!(filters.visible_rows(&table()), vec![1, 3, 4]);

        filters.set_column_filter(2, ["5"]);
        assert_eq!(filters.visible_rows(&table()), vec![1, 4]);

        filters.clear_all();
        assert!(!filters.has_active_filter());
        assert_eq!(filters.visible_rows(&table()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_selection_means_no_restriction() {
        let mut filters = ColumnFilters::new();
        filters.set_column_filter(1, ["Acme"]);
        filters.set_column_filter(1, Vec::<String>::new());
        assert!(!filters.is_active(1));

        filters.toggle_value(1, "Baltic");
        assert_eq!(filters.visible_rows(&table()), vec![2]);
        filters.toggle_value(1, "Baltic");
        assert!(!filters.is_active(1));
    }

    #[test]
    fn filters_follow_inserted_column() {
        let mut t = table();
        let mut filters = ColumnFilters::new();
        filters.set_column_filter(1, ["Baltic"]);
        filters.set_column_filter(0, ["PO2", "PO3"]);

        let idx = t.insert_column(0, InsertSide::Right).unwrap();
        filters.shift_for_insert(idx);

        assert!(filters.is_active(0));
        assert!(!filters.is_active(1));
        assert!(filters.is_active(2));
        assert_eq!(filters.visible_rows(&t), vec![2]);
    }
}
