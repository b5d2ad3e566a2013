//! One editing session over an audit matrix.
//!
//! The session exclusively owns the table and the action map for its
//! lifetime. Every discrete edit captures a snapshot before mutating, so a
//! single `undo` restores the pre-edit state. Derived views (groups, visible
//! rows, choice lists) are recomputed from current state on each call.
//!
//! Global listeners are held as subscriptions and released when the session
//! is committed, closed or dropped.

use auditgrid_config::EditorSettings;
use auditgrid_core::{CellPos, CellRect, CellValue, FillMode};
use auditgrid_engine::filter::distinct_values;
use auditgrid_engine::{
    ColumnFilters, ColumnLayout, DragFill, GlobalListener, History, InputBus, InputEvent,
    InsertSide, Subscription, Table, UniqueValueEntry,
};

use crate::action::{RowAction, RowActions};
use crate::commit::{commit, CommitOutput};
use crate::duplicates::{duplicate_groups, DuplicateGroup, GroupCursor};
use crate::error::SessionError;

/// Undo state: independent copies of the table and the action map.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub table: Table,
    pub actions: RowActions,
    pub key_column: usize,
}

/// What the duplicate review pane shows.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupView {
    Group {
        index: usize,
        count: usize,
        group: DuplicateGroup,
    },
    /// No duplicate groups remain.
    AllResolved,
}

/// Column layout for a session, taken from settings.
pub fn layout_from_settings(settings: &EditorSettings) -> ColumnLayout {
    ColumnLayout {
        default_width: settings.default_column_width,
        min_width: settings.min_column_width,
        new_column_label: settings.new_column_label.clone(),
    }
}

pub struct EditorSession {
    table: Table,
    actions: RowActions,
    key_column: usize,
    history: History<Snapshot>,
    filters: ColumnFilters,
    cursor: GroupCursor,
    drag: DragFill,
    /// Set at press-down and after any other undoable edit made while the
    /// drag is open; the next drag write snapshots first
    drag_snapshot_due: bool,
    fill_mode: FillMode,
    _listeners: Vec<Subscription>,
}

impl EditorSession {
    /// Open a session and register its global listeners on `bus`.
    pub fn open(
        table: Table,
        key_column: usize,
        settings: &EditorSettings,
        bus: &InputBus,
    ) -> Result<Self, SessionError> {
        if key_column >= table.col_count() {
            return Err(SessionError::KeyColumnOutOfBounds {
                col: key_column,
                count: table.col_count(),
            });
        }

        let listeners = vec![
            bus.subscribe(GlobalListener::UndoKey),
            bus.subscribe(GlobalListener::PointerRelease),
        ];
        log::info!(
            "editor session opened: {} rows x {} columns, key column {}",
            table.row_count(),
            table.col_count(),
            key_column
        );

        Ok(Self {
            table,
            actions: RowActions::new(),
            key_column,
            history: History::with_capacity(settings.history_capacity),
            filters: ColumnFilters::new(),
            cursor: GroupCursor::default(),
            drag: DragFill::default(),
            drag_snapshot_due: false,
            fill_mode: settings.fill_mode,
            _listeners: listeners,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn actions(&self) -> &RowActions {
        &self.actions
    }

    pub fn key_column(&self) -> usize {
        self.key_column
    }

    pub fn filters(&self) -> &ColumnFilters {
        &self.filters
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    pub fn set_fill_mode(&mut self, mode: FillMode) {
        self.fill_mode = mode;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            table: self.table.clone(),
            actions: self.actions.clone(),
            key_column: self.key_column,
        }
    }

    /// Capture the current state. Call before any undoable mutation.
    pub fn push_snapshot(&mut self) {
        if self.drag.is_dragging() {
            // Later drag writes must not share this entry
            self.drag_snapshot_due = true;
        }
        let snapshot = self.snapshot();
        self.history.push(snapshot);
    }

    /// Restore the most recent snapshot. Returns false (and does nothing)
    /// when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.drag.is_dragging() {
            self.drag.cancel();
            self.drag_snapshot_due = false;
        }
        let Some(snapshot) = self.history.undo() else {
            return false;
        };

        if snapshot.table.col_count() != self.table.col_count() {
            // Filters are keyed by column index and not part of undo state
            self.filters.clear_all();
        }
        self.table = snapshot.table;
        self.actions = snapshot.actions;
        self.key_column = snapshot.key_column;
        self.cursor.clamp(self.group_count());
        log::debug!("undo: {} snapshot(s) left", self.history.len());
        true
    }

    // -------------------------------------------------------------------------
    // Table edits
    // -------------------------------------------------------------------------

    /// Replace one cell. Edits that do not change the value are ignored.
    pub fn edit_cell(&mut self, row: usize, col: usize, value: CellValue) -> Result<(), SessionError> {
        let current = self
            .table
            .cell(row, col)
            .ok_or(auditgrid_engine::TableError::OutOfBounds { row, col })?;
        if *current == value {
            return Ok(());
        }
        self.push_snapshot();
        self.table.update_cell(row, col, value)?;
        Ok(())
    }

    /// Insert an empty column beside `at`. Undoable.
    pub fn insert_column(&mut self, at: usize, side: InsertSide) -> Result<usize, SessionError> {
        if at >= self.table.col_count() {
            return Err(auditgrid_engine::TableError::ColumnOutOfBounds {
                col: at,
                count: self.table.col_count(),
            }
            .into());
        }
        self.push_snapshot();
        let index = self.table.insert_column(at, side)?;
        self.filters.shift_for_insert(index);
        if index <= self.key_column {
            self.key_column += 1;
        }
        Ok(index)
    }

    /// Show or hide a column. Layout only; not recorded in history.
    pub fn set_column_visible(&mut self, col: usize, visible: bool) -> Result<(), SessionError> {
        Ok(self.table.set_column_visible(col, visible)?)
    }

    /// Resize a column (clamped). Layout only; not recorded in history.
    pub fn resize_column(&mut self, col: usize, width: f32) -> Result<f32, SessionError> {
        Ok(self.table.resize_column(col, width)?)
    }

    // -------------------------------------------------------------------------
    // Row actions
    // -------------------------------------------------------------------------

    fn check_data_row(&self, idx: usize) -> Result<(), SessionError> {
        if !self.table.is_data_row(idx) {
            return Err(SessionError::NotADataRow(idx));
        }
        Ok(())
    }

    pub fn apply_row_action(&mut self, idx: usize, action: RowAction) -> Result<(), SessionError> {
        self.check_data_row(idx)?;
        self.push_snapshot();
        self.actions.set(idx, action);
        self.cursor.clamp(self.group_count());
        Ok(())
    }

    /// Return a row to unresolved.
    pub fn clear_row_action(&mut self, idx: usize) -> Result<(), SessionError> {
        self.check_data_row(idx)?;
        if self.actions.get(idx).is_none() {
            return Ok(());
        }
        self.push_snapshot();
        self.actions.clear(idx);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Duplicate groups
    // -------------------------------------------------------------------------

    pub fn groups(&self) -> Vec<DuplicateGroup> {
        duplicate_groups(&self.table, self.key_column, &self.actions)
    }

    pub fn group_count(&self) -> usize {
        self.groups().len()
    }

    pub fn current_group(&self) -> GroupView {
        let mut groups = self.groups();
        if groups.is_empty() {
            return GroupView::AllResolved;
        }
        let count = groups.len();
        let index = self.cursor.index().min(count - 1);
        GroupView::Group {
            index,
            count,
            group: groups.swap_remove(index),
        }
    }

    pub fn next_group(&mut self) {
        let count = self.group_count();
        self.cursor.next(count);
    }

    pub fn previous_group(&mut self) {
        self.cursor.previous();
    }

    /// Move the cursor to the group keyed `key` (trimmed). Returns false
    /// when no such group exists.
    pub fn focus_group(&mut self, key: &str) -> bool {
        let key = key.trim();
        match self.groups().iter().position(|g| g.key == key) {
            Some(index) => {
                self.cursor.jump_to(index);
                true
            }
            None => false,
        }
    }

    /// Apply `action` to every member of the viewed group.
    ///
    /// If the group drops out of the derived list, the cursor steps back one
    /// so navigation stays on a valid group.
    pub fn apply_group_action(&mut self, action: RowAction) -> Result<(), SessionError> {
        let GroupView::Group { group, .. } = self.current_group() else {
            return Err(SessionError::NoActiveGroup);
        };

        self.push_snapshot();
        self.actions.apply_to_group(&group.members, action);

        let groups = self.groups();
        if !groups.iter().any(|g| g.key == group.key) {
            self.cursor.step_back();
        }
        self.cursor.clamp(groups.len());
        log::debug!(
            "group '{}' ({} rows) resolved with {}; {} group(s) remain",
            group.key,
            group.members.len(),
            action,
            groups.len()
        );
        Ok(())
    }

    /// Rows in active groups that carry no action yet.
    pub fn unresolved_in_groups(&self) -> usize {
        self.groups()
            .iter()
            .flat_map(|g| g.members.iter())
            .filter(|&&idx| self.actions.get(idx).is_none())
            .count()
    }

    // -------------------------------------------------------------------------
    // Drag-fill
    // -------------------------------------------------------------------------

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn drag_preview(&self) -> Option<CellRect> {
        self.drag.preview()
    }

    pub fn pointer_down(&mut self, pos: CellPos) -> Result<(), SessionError> {
        if self.drag.is_dragging() {
            // A release was missed; finish that drag first
            self.pointer_up()?;
        }
        self.drag.press(&self.table, pos, self.fill_mode)?;
        self.drag_snapshot_due = true;
        Ok(())
    }

    pub fn pointer_move(&mut self, pos: CellPos) -> Result<(), SessionError> {
        if let Some(plan) = self.drag.hover(&self.table, pos) {
            self.snapshot_before_drag_write();
            plan.apply(&mut self.table)?;
        }
        Ok(())
    }

    /// Finish the drag. Returns the number of cells written on release.
    pub fn pointer_up(&mut self) -> Result<usize, SessionError> {
        let written = match self.drag.release() {
            Some(plan) => {
                self.snapshot_before_drag_write();
                plan.apply(&mut self.table)?
            }
            None => 0,
        };
        self.drag_snapshot_due = false;
        Ok(written)
    }

    /// Nothing mutates between press-down and the first write, so this
    /// snapshot equals the press-down state unless another edit intervened.
    fn snapshot_before_drag_write(&mut self) {
        if self.drag_snapshot_due {
            self.drag_snapshot_due = false;
            let snapshot = self.snapshot();
            self.history.push(snapshot);
        }
    }

    /// Route an input event to the matching operation.
    pub fn handle(&mut self, event: InputEvent) -> Result<(), SessionError> {
        match event {
            InputEvent::Undo => {
                self.undo();
            }
            InputEvent::PointerDown(pos) => self.pointer_down(pos)?,
            InputEvent::PointerMove(pos) => self.pointer_move(pos)?,
            InputEvent::PointerUp => {
                self.pointer_up()?;
            }
            InputEvent::Edit { pos, value } => self.edit_cell(pos.row, pos.col, value)?,
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Column filters
    // -------------------------------------------------------------------------

    pub fn distinct_values(&self, col: usize) -> Vec<UniqueValueEntry> {
        distinct_values(&self.table, col)
    }

    pub fn set_column_filter<I, S>(&mut self, col: usize, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.set_column_filter(col, values);
    }

    pub fn toggle_filter_value(&mut self, col: usize, value: &str) {
        self.filters.toggle_value(col, value);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear_all();
    }

    /// Original indices of rows passing the filters, in matrix order.
    pub fn visible_rows(&self) -> Vec<usize> {
        self.filters.visible_rows(&self.table)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// End the session and reduce it to the committed result. Commit is
    /// always allowed; hosts check [`Self::unresolved_in_groups`] first if
    /// they want to warn.
    pub fn commit(self) -> CommitOutput {
        let output = commit(&self.table, &self.actions, self.key_column);
        log::info!(
            "editor session committed: {} of {} rows kept, {} distinct keys",
            output.summary.total_data_rows,
            self.table.row_count(),
            output.summary.distinct_key_count
        );
        output
    }

    /// End the session without committing.
    pub fn close(self) {
        log::info!("editor session closed without commit");
    }
}
