//! Record types for the ClinicalTrials.gov NDJSON export.
//!
//! Every XML study document becomes one [`TrialRecord`]. Field order in the
//! struct is the field order of the serialized JSON line.

pub mod record;

pub use record::{Intervention, LocationSummary, TrialRecord};
