//! Library components for the `ctgov-ndjson` batch converter.

pub mod diagnostics;
pub mod logging;
pub mod pipeline;
pub mod summary;
