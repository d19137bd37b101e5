//! Error types for trial ingestion.

use std::path::PathBuf;

use thiserror::Error;

use crate::xml::XmlError;

/// Errors that can occur while reading the index or a trial document.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Trial document could not be read.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index file could not be opened.
    #[error("failed to open index file {path}: {source}")]
    IndexOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a line from an open index file failed.
    #[error("failed to read index file {path}: {source}")]
    IndexRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// Trial document is not well-formed XML.
    #[error("failed to parse XML {path}: {source}")]
    XmlParse {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
