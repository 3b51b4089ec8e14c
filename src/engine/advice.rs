//! Personalized advice overlay.
//!
//! A small fixed rule table over the patient's known conditions and the
//! diagnosis text. Total and deterministic: every input produces a line,
//! there is no failure path.

use crate::vocabulary::canonical;

struct OverlayRule {
    /// Fires when the known-conditions text contains this keyword.
    condition: &'static str,
    /// Suppressed when the diagnosis text contains this keyword.
    unless_diagnosis: Option<&'static str>,
    note: &'static str,
}

const OVERLAY_RULES: &[OverlayRule] = &[
    OverlayRule {
        condition: "diabetes",
        unless_diagnosis: Some("sugar"),
        note: "With diabetes, monitor blood sugar.",
    },
    OverlayRule {
        condition: "hypertension",
        unless_diagnosis: None,
        note: "With hypertension, track blood pressure.",
    },
    OverlayRule {
        condition: "asthma",
        unless_diagnosis: None,
        note: "With asthma, keep inhaler handy.",
    },
];

pub const NO_NOTES_FALLBACK: &str = "No specific personalized notes. Follow general advice.";

/// Append condition-specific caveats for the diagnosed illness. Firing
/// rules concatenate in table order; with no known conditions or no
/// firing rule, the single generic fallback line comes back.
pub fn overlay(known_conditions: &str, diagnosis_id: &str) -> String {
    let conditions = known_conditions.trim().to_lowercase();
    if conditions.is_empty() || conditions == "none" {
        return NO_NOTES_FALLBACK.to_string();
    }

    let diagnosis = canonical(diagnosis_id);
    let notes: Vec<&str> = OVERLAY_RULES
        .iter()
        .filter(|rule| {
            conditions.contains(rule.condition)
                && rule
                    .unless_diagnosis
                    .map_or(true, |keyword| !diagnosis.contains(keyword))
        })
        .map(|rule| rule.note)
        .collect();

    if notes.is_empty() {
        NO_NOTES_FALLBACK.to_string()
    } else {
        format!("Personalized notes:\n- {}", notes.join("\n- "))
    }
}
