use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One flattened trial, serialized as a single NDJSON line.
///
/// Absent source fields are empty strings or empty vectors so that every
/// line carries the same keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Source document path as listed in the index file.
    pub xml_path: String,
    pub nct_id: String,
    pub org_study_id: String,
    pub brief_title: String,
    pub official_title: String,
    pub overall_status: String,
    pub why_stopped: String,
    pub phase: String,
    pub study_type: String,
    pub lead_sponsor: String,
    pub collaborators: Vec<String>,
    pub primary_completion_date: String,
    /// `Actual` or `Anticipated` when the source declares it.
    pub primary_completion_date_type: String,
    pub completion_date: String,
    pub completion_date_type: String,
    pub start_date: String,
    pub start_date_type: String,
    pub study_first_posted: String,
    pub last_update_posted: String,
    pub enrollment: String,
    pub enrollment_type: String,
    pub gender: String,
    pub minimum_age: String,
    pub maximum_age: String,
    pub healthy_volunteers: String,
    pub conditions: Vec<String>,
    pub condition_mesh_terms: Vec<String>,
    pub keywords: Vec<String>,
    pub interventions: Vec<Intervention>,
    pub intervention_mesh_terms: Vec<String>,
    /// Measure titles only; time frames and descriptions are not kept.
    pub primary_outcomes: Vec<String>,
    pub secondary_outcomes: Vec<String>,
    pub number_of_arms: String,
    pub number_of_groups: String,
    pub locations: LocationSummary,
}

/// A single intervention arm entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
}

impl Intervention {
    /// True when all three fields are blank.
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty() && self.name.is_empty() && self.description.is_empty()
    }
}

/// Facility count plus every country the study mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub facility_count: usize,
    /// Ordered and duplicate-free by construction.
    pub countries: BTreeSet<String>,
}
