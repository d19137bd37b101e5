//! ClinicalTrials.gov study ingestion.
//!
//! This crate turns study XML documents into flat [`TrialRecord`] values.
//!
//! # Features
//!
//! - **XML Tree**: Parse a document into an [`Element`] tree with path lookups
//! - **Extraction**: Map a `<clinical_study>` tree onto a [`TrialRecord`]
//! - **Index Streaming**: Iterate document paths from an index file lazily
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use ctgov_ingest::{IndexPaths, parse_trial};
//!
//! for path in IndexPaths::open(Path::new("data/all_xml"))? {
//!     let record = parse_trial(&path?)?;
//!     println!("{}", record.nct_id);
//! }
//! ```

mod error;
mod extract;
mod index;
pub mod xml;

use std::path::Path;

pub use ctgov_model::TrialRecord;

// === Error Types ===
pub use error::{IngestError, Result};

// === Extraction ===
pub use extract::extract_trial;

// === Index Streaming ===
pub use index::IndexPaths;

// === XML Tree ===
pub use xml::{Element, XmlError, parse_document};

/// Read, parse, and extract the study document at `path`.
///
/// The record's `xml_path` is `path` as given.
pub fn parse_trial(path: &Path) -> Result<TrialRecord> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let xml = std::str::from_utf8(&bytes).map_err(|error| IngestError::XmlParse {
        path: path.to_path_buf(),
        source: XmlError::new(
            format!("invalid UTF-8: {error}"),
            error.valid_up_to() as u64,
        ),
    })?;
    let root = parse_document(xml).map_err(|source| IngestError::XmlParse {
        path: path.to_path_buf(),
        source,
    })?;
    let record = extract_trial(&root, &path.display().to_string());
    tracing::trace!(path = %path.display(), nct_id = %record.nct_id, "extracted trial");
    Ok(record)
}
