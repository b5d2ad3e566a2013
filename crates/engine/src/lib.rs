//! `auditgrid-engine`: the mutable grid behind the audit editor.
//!
//! Pure engine crate: owns the matrix and its column layout, plus the
//! building blocks the editor session composes (drag-fill, undo history,
//! column filters, input subscriptions). No storage or UI dependencies.

pub mod error;
pub mod fill;
pub mod filter;
pub mod history;
pub mod input;
pub mod table;

pub use error::TableError;
pub use fill::{DragFill, FillPlan};
pub use filter::{ColumnFilters, UniqueValueEntry};
pub use history::History;
pub use input::{GlobalListener, InputBus, InputEvent, Subscription};
pub use table::{ColumnLayout, ColumnMeta, InsertSide, Table};
