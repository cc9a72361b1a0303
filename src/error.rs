//! Unified error handling for the desert-atlas library.
//!
//! This module provides a consistent error type for all dataset and rendering
//! operations, replacing mixed error handling patterns (Option, panic, silent
//! failures).

use std::fmt;

/// Unified error type for desert-atlas operations.
#[derive(Debug, Clone)]
pub enum AtlasError {
    /// Dataset file does not exist
    NotFound { path: String },
    /// A geometry cell is not valid well-known text.
    /// Fatal at load time: all downstream rendering depends on valid geometry.
    MalformedGeometry { row: usize, message: String },
    /// A required column is absent from a dataset.
    /// Surfaced as an inline user-visible message; maps still render empty.
    MissingColumn { column: String, context: String },
    /// CSV read/write error
    Csv { message: String },
    /// Generic internal error
    Internal { message: String },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::NotFound { path } => {
                write!(f, "Dataset '{}' not found", path)
            }
            AtlasError::MalformedGeometry { row, message } => {
                write!(f, "Row {} has malformed geometry: {}", row, message)
            }
            AtlasError::MissingColumn { column, context } => {
                write!(f, "Column '{}' does not exist in {}", column, context)
            }
            AtlasError::Csv { message } => {
                write!(f, "CSV error: {}", message)
            }
            AtlasError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for AtlasError {}

impl From<csv::Error> for AtlasError {
    fn from(err: csv::Error) -> Self {
        AtlasError::Csv {
            message: err.to_string(),
        }
    }
}

/// Result type alias for desert-atlas operations.
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Extension trait for converting Option to AtlasError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a missing column error.
    fn ok_or_missing_column(self, column: &str, context: &str) -> Result<T>;

    /// Convert Option to Result with generic internal error.
    fn ok_or_internal(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing_column(self, column: &str, context: &str) -> Result<T> {
        self.ok_or_else(|| AtlasError::MissingColumn {
            column: column.to_string(),
            context: context.to_string(),
        })
    }

    fn ok_or_internal(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AtlasError::Internal {
            message: message.to_string(),
        })
    }
}
