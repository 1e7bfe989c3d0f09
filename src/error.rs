use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
/// Conversion error
pub enum ConvertError {
    /// The dataset is missing, unreadable, of an unknown format, or its
    /// companion index file is missing or corrupt. Nothing has been written.
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// Feature `index` (1-based) does not share the attribute names of the
    /// first feature. Rows written before it must be discarded by the caller.
    #[error("Schema mismatch at feature {index}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The output directory does not exist or cannot be written to.
    #[error("Destination unwritable: {path}: {reason}")]
    DestinationUnwritable { path: PathBuf, reason: String },

    /// Read or write failure while streaming, including undecodable records.
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<csv::Error> for ConvertError {
    fn from(error: csv::Error) -> Self {
        match error.into_kind() {
            csv::ErrorKind::Io(error) => ConvertError::Io(error),
            other => ConvertError::Io(io::Error::other(format!("{:?}", other))),
        }
    }
}

impl ConvertError {
    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConvertError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn destination_unwritable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConvertError::DestinationUnwritable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
