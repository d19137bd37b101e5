//! Field mapping from a `<clinical_study>` tree to a [`TrialRecord`].
//!
//! Every lookup is optional: a missing element yields an empty string or an
//! empty list, so extraction itself never fails once the document parsed.

use std::collections::BTreeSet;

use ctgov_model::{Intervention, LocationSummary, TrialRecord};

use crate::xml::Element;

/// Attribute that qualifies dates and enrollment as `Actual` or `Anticipated`.
const TYPE_ATTRIBUTE: &str = "type";

/// Build the flat record for one study document.
pub fn extract_trial(root: &Element, xml_path: &str) -> TrialRecord {
    let (primary_completion_date, primary_completion_date_type) =
        typed_text(root, "primary_completion_date");
    let (completion_date, completion_date_type) = typed_text(root, "completion_date");
    let (start_date, start_date_type) = typed_text(root, "start_date");
    let (enrollment, enrollment_type) = typed_text(root, "enrollment");

    TrialRecord {
        xml_path: xml_path.to_string(),
        nct_id: text(root, "id_info/nct_id"),
        org_study_id: text(root, "id_info/org_study_id"),
        brief_title: text(root, "brief_title"),
        official_title: text(root, "official_title"),
        overall_status: text(root, "overall_status"),
        why_stopped: text(root, "why_stopped"),
        phase: text(root, "phase"),
        study_type: text(root, "study_type"),
        lead_sponsor: text(root, "sponsors/lead_sponsor/agency"),
        collaborators: text_list(root, "sponsors/collaborator/agency"),
        primary_completion_date,
        primary_completion_date_type,
        completion_date,
        completion_date_type,
        start_date,
        start_date_type,
        study_first_posted: text(root, "study_first_posted"),
        last_update_posted: text(root, "last_update_posted"),
        enrollment,
        enrollment_type,
        gender: text(root, "eligibility/gender"),
        minimum_age: text(root, "eligibility/minimum_age"),
        maximum_age: text(root, "eligibility/maximum_age"),
        healthy_volunteers: text(root, "eligibility/healthy_volunteers"),
        conditions: text_list(root, "condition"),
        condition_mesh_terms: text_list(root, "condition_browse/mesh_term"),
        keywords: text_list(root, "keyword"),
        interventions: interventions(root),
        intervention_mesh_terms: text_list(root, "intervention_browse/mesh_term"),
        primary_outcomes: outcome_measures(root, "primary_outcome"),
        secondary_outcomes: outcome_measures(root, "secondary_outcome"),
        number_of_arms: text(root, "number_of_arms"),
        number_of_groups: text(root, "number_of_groups"),
        locations: locations(root),
    }
}

fn clean(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Trimmed text of the first match, or empty.
fn text(root: &Element, path: &str) -> String {
    clean(root.find_text(path))
}

/// Trimmed text plus the raw `type` attribute of the same element.
fn typed_text(root: &Element, path: &str) -> (String, String) {
    match root.find(path) {
        Some(element) => (
            clean(Some(element.text())),
            element
                .attribute(TYPE_ATTRIBUTE)
                .unwrap_or_default()
                .to_string(),
        ),
        None => (String::new(), String::new()),
    }
}

/// Trimmed text of every match, blanks dropped.
fn text_list(root: &Element, path: &str) -> Vec<String> {
    root.find_all(path)
        .into_iter()
        .map(|element| clean(Some(element.text())))
        .filter(|value| !value.is_empty())
        .collect()
}

fn outcome_measures(root: &Element, tag: &str) -> Vec<String> {
    root.find_all(tag)
        .into_iter()
        .map(|outcome| clean(outcome.find_text("measure")))
        .filter(|measure| !measure.is_empty())
        .collect()
}

fn interventions(root: &Element) -> Vec<Intervention> {
    root.find_all("intervention")
        .into_iter()
        .map(|node| Intervention {
            kind: clean(node.find_text("intervention_type")),
            name: clean(node.find_text("intervention_name")),
            description: clean(node.find_text("description")),
        })
        .filter(|item| !item.is_empty())
        .collect()
}

fn locations(root: &Element) -> LocationSummary {
    let mut countries: BTreeSet<String> = text_list(root, "location_countries/country")
        .into_iter()
        .collect();
    let mut facility_count = 0;
    for location in root.find_all("location") {
        let Some(facility) = location.find("facility") else {
            continue;
        };
        facility_count += 1;
        let country = clean(facility.find_text("address/country"));
        if !country.is_empty() {
            countries.insert(country);
        }
    }
    LocationSummary {
        facility_count,
        countries,
    }
}
