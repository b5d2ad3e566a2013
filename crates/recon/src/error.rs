use std::fmt;

use auditgrid_engine::TableError;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Grid-level failure (bounds, malformed matrix).
    Table(TableError),
    /// Row index is the header or past the last data row.
    NotADataRow(usize),
    /// Key column outside the header.
    KeyColumnOutOfBounds { col: usize, count: usize },
    /// A group action was requested while every group is resolved.
    NoActiveGroup,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(e) => write!(f, "{e}"),
            Self::NotADataRow(row) => write!(f, "row {row} is not a data row"),
            Self::KeyColumnOutOfBounds { col, count } => {
                write!(f, "key column {col} is out of bounds ({count} columns)")
            }
            Self::NoActiveGroup => write!(f, "no duplicate group is active"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for SessionError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}
