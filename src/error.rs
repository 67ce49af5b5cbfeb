//! Input error taxonomy.
//!
//! Anything wrong with the input relations is fatal for the run: rows are
//! never skipped or coerced. Errors carry the file and line so the user can
//! fix the data.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the input relations.
#[derive(Debug, Error)]
pub enum InputError {
    /// File missing, unreadable, or not valid CSV at the header level
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Header row lacks a column the relation requires
    #[error("{}: missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// Row cannot be decoded (wrong field count, non-integer duration, ...)
    #[error("{}:{line}: malformed row: {source}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// Required field present but blank
    #[error("{}:{line}: empty value in required column '{column}'", path.display())]
    EmptyField {
        path: PathBuf,
        line: u64,
        column: &'static str,
    },

    /// Timestamp does not match `YYYY-MM-DD HH:MM:SS`
    #[error("{}:{line}: unparseable timestamp '{value}': {source}", path.display())]
    Timestamp {
        path: PathBuf,
        line: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
