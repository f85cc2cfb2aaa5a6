//! Error types for sqldoc.

use thiserror::Error;

/// The main error type for sqldoc operations.
#[derive(Debug, Error)]
pub enum SqlDocError {
    /// The file holds neither a recognised CREATE/ALTER statement nor
    /// `Object Name:` / `Object Type:` tags.
    #[error("Unrecognized object: {0}")]
    Unrecognized(String),

    /// A DML script without a top-level `/* ... */` comment.
    #[error("No top-level block comment")]
    NoComment,

    /// A required comment tag is absent.
    #[error("Missing tag: '{0}'")]
    MissingTag(&'static str),

    /// The column parser could not read the DDL.
    #[error("DDL error at position {position}: {message}")]
    Ddl { position: usize, message: String },

    /// A table row has a different width than its header.
    #[error("Row {row} of '{block}' has {found} cells, header has {expected}")]
    RaggedTable {
        block: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A table block without even a header row.
    #[error("Block '{0}' has no header row")]
    EmptyTable(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SqlDocError {
    /// Create a DDL error at the given position.
    pub fn ddl(position: usize, message: impl Into<String>) -> Self {
        Self::Ddl {
            position,
            message: message.into(),
        }
    }

    /// Create a ragged table error.
    pub fn ragged(block: &'static str, row: usize, expected: usize, found: usize) -> Self {
        Self::RaggedTable {
            block,
            row,
            expected,
            found,
        }
    }
}

/// Result type alias for sqldoc operations.
pub type SqlDocResult<T> = Result<T, SqlDocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SqlDocError::ddl(5, "expected '('");
        assert_eq!(err.to_string(), "DDL error at position 5: expected '('");
    }

    #[test]
    fn test_ragged_display() {
        let err = SqlDocError::ragged("changelog", 2, 4, 3);
        assert_eq!(
            err.to_string(),
            "Row 2 of 'changelog' has 3 cells, header has 4"
        );
    }
}
