//! Detail resolution for the single top candidate.

use crate::knowledge::KnowledgeBase;
use crate::models::DetailBundle;

/// Placeholder for a test or treatment the knowledge base does not carry.
pub const NOT_SPECIFIED: &str = "not specified";

/// Advice fallback when the knowledge base has none for a diagnosis.
pub const GENERAL_ADVICE_FALLBACK: &str = "Follow general medical advice.";

/// Fetch test, treatment and advice for a diagnosis. Each field degrades
/// independently to its placeholder on a missing value or a failed
/// sub-query; partial detail beats no detail, so this never fails.
pub fn resolve<K: KnowledgeBase>(kb: &K, diagnosis_id: &str) -> DetailBundle {
    let test = match kb.recommended_test(diagnosis_id) {
        Ok(Some(test)) if !test.is_empty() => test,
        Ok(_) => NOT_SPECIFIED.to_string(),
        Err(e) => {
            tracing::warn!(diagnosis_id, error = %e, "Test lookup failed");
            NOT_SPECIFIED.to_string()
        }
    };

    let treatment = match kb.treatment(diagnosis_id) {
        Ok(steps) if !steps.is_empty() => steps,
        Ok(_) => vec![NOT_SPECIFIED.to_string()],
        Err(e) => {
            tracing::warn!(diagnosis_id, error = %e, "Treatment lookup failed");
            vec![NOT_SPECIFIED.to_string()]
        }
    };

    let advice = match kb.advice(diagnosis_id) {
        Ok(Some(advice)) if !advice.is_empty() => advice,
        Ok(_) => GENERAL_ADVICE_FALLBACK.to_string(),
        Err(e) => {
            tracing::warn!(diagnosis_id, error = %e, "Advice lookup failed");
            GENERAL_ADVICE_FALLBACK.to_string()
        }
    };

    DetailBundle {
        test,
        treatment,
        advice,
    }
}
