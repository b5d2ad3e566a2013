use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// The payload has no header row (or a header with no columns).
    EmptyMatrix,
    /// A data row has more cells than the header.
    MalformedMatrix { row: usize, len: usize, header_len: usize },
    /// Cell address outside the matrix.
    OutOfBounds { row: usize, col: usize },
    /// Column index outside the header.
    ColumnOutOfBounds { col: usize, count: usize },
    /// The header row was targeted by a data-row operation.
    HeaderRow,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMatrix => write!(f, "matrix has no header row"),
            Self::MalformedMatrix { row, len, header_len } => write!(
                f,
                "malformed matrix: row {row} has {len} cells, header has {header_len}"
            ),
            Self::OutOfBounds { row, col } => write!(f, "cell ({row}, {col}) is out of bounds"),
            Self::ColumnOutOfBounds { col, count } => {
                write!(f, "column {col} is out of bounds ({count} columns)")
            }
            Self::HeaderRow => write!(f, "operation not allowed on the header row"),
        }
    }
}

impl std::error::Error for TableError {}
