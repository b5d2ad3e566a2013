use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// SQLite failure (open, schema, query).
    Sqlite(String),
    /// A stored value could not be encoded or decoded.
    Codec { key: String, message: String },
    /// Filesystem error.
    Io(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(msg) => write!(f, "storage error: {msg}"),
            Self::Codec { key, message } => write!(f, "cannot encode/decode '{key}': {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
