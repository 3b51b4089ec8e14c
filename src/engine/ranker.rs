//! Candidate ranking: confidence descending, bounded to the top three.

use crate::models::Candidate;

/// How many candidates survive ranking. Follow-up questions fan out over
/// exactly this many diagnoses, which keeps the question set small.
pub const MAX_CANDIDATES: usize = 3;

/// Sort by confidence descending and truncate. The sort is stable, so
/// equal confidences keep their engine order and repeated identical
/// queries rank identically.
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(MAX_CANDIDATES);
    candidates
}
