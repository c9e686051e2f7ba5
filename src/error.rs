//! Error kinds for the merge pipeline. Every one of them aborts the run.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed markup {} at byte {position}: {message}", .path.display())]
    Xml {
        path: PathBuf,
        position: u64,
        message: String,
    },

    #[error("unexpected document structure: {0}")]
    Structure(String),

    #[error("row for placemark {placemark_id:?} has no {field:?} column")]
    FieldMissing {
        placemark_id: String,
        field: &'static str,
    },

    #[error("template error: {0}")]
    Template(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
