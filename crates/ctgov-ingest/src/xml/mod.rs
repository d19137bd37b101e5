//! Minimal XML element tree for study documents.
//!
//! Study records are small, so each one is read fully into an [`Element`]
//! tree and queried with slash-separated child paths such as
//! `sponsors/lead_sponsor/agency`.

mod element;
mod parser;

pub use element::Element;
pub use parser::{XmlError, parse_document};
