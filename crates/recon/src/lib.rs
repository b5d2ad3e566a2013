//! `auditgrid-recon`: duplicate reconciliation over an audit matrix.
//!
//! Groups rows by key, tracks per-row resolution actions, and reduces the
//! resolved matrix to the committed result. [`EditorSession`] ties these to
//! the grid engine for one editing session.

pub mod action;
pub mod commit;
pub mod duplicates;
pub mod error;
pub mod session;

pub use action::{RowAction, RowActions};
pub use commit::{commit, CommitOutput, CommitSummary};
pub use duplicates::{duplicate_groups, DuplicateGroup, GroupCursor};
pub use error::SessionError;
pub use session::{EditorSession, GroupView, Snapshot};
