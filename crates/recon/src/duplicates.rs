use rustc_hash::FxHashMap;
use serde::Serialize;

use auditgrid_engine::Table;

use crate::action::RowActions;

/// Rows sharing one trimmed key value, in matrix order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub key: String,
    pub members: Vec<usize>,
}

/// Derive duplicate groups on `key_col`.
///
/// Rows tagged `Delete`/`Reject` and rows with an empty key are skipped.
/// Only keys with two or more remaining rows are emitted, ordered by the
/// first occurrence of each key.
pub fn duplicate_groups(table: &Table, key_col: usize, actions: &RowActions) -> Vec<DuplicateGroup> {
    let mut by_key: FxHashMap<String, usize> = FxHashMap::default();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for (idx, cells) in table.data_rows() {
        if actions.is_removed(idx) {
            continue;
        }
        let Some(key) = cells.get(key_col).map(|v| v.key_text()) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        match by_key.get(&key) {
            Some(&g) => groups[g].members.push(idx),
            None => {
                by_key.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    key,
                    members: vec![idx],
                });
            }
        }
    }

    groups.retain(|g| g.members.len() >= 2);
    groups
}

/// Position in the derived group list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCursor {
    index: usize,
}

impl GroupCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self, count: usize) {
        if count > 0 && self.index + 1 < count {
            self.index += 1;
        }
    }

    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn jump_to(&mut self, index: usize) {
        self.index = index;
    }

    /// The viewed group was resolved away: step back one (not below zero).
    pub fn step_back(&mut self) {
        self.previous();
    }

    /// Keep the cursor inside `[0, count - 1]`.
    pub fn clamp(&mut self, count: usize) {
        self.index = self.index.min(count.saturating_sub(1));
    }
}
