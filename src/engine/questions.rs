//! Follow-up question aggregation across the ranked candidates.

use std::collections::HashSet;

use crate::knowledge::KnowledgeBase;
use crate::models::Candidate;
use crate::vocabulary::canonical;

/// Collect follow-up questions for each candidate, in ranked order,
/// dropping duplicates by normalized text. The final list is sorted
/// lexicographically so the patient sees a stable question order no
/// matter which diagnoses contributed them. A failed lookup for one
/// candidate contributes nothing and is never fatal.
pub fn collect<K: KnowledgeBase>(kb: &K, candidates: &[Candidate]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut questions = Vec::new();

    for candidate in candidates {
        match kb.follow_up_questions(&candidate.diagnosis_id) {
            Ok(list) => {
                for question in list {
                    if seen.insert(canonical(&question)) {
                        questions.push(question);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    diagnosis_id = %candidate.diagnosis_id,
                    error = %e,
                    "Follow-up lookup failed; candidate contributes no questions"
                );
            }
        }
    }

    questions.sort_by_key(|q| canonical(q));
    questions
}
