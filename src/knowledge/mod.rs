//! The knowledge base boundary.
//!
//! The medical rules live in a declarative JSON file; everything above this
//! module only sees the query contract below. All strings crossing the
//! boundary are normalized to plain canonical text — no engine-internal
//! representation leaks upward.

pub mod adapter;
pub mod rules;

pub use adapter::RuleFileAdapter;
pub use rules::{DiseaseRule, FollowUp, RuleSet};

use thiserror::Error;

use crate::models::{Answer, Candidate};

#[derive(Error, Debug, Clone)]
pub enum KnowledgeError {
    #[error("Knowledge base file not found: {0}")]
    Missing(String),

    #[error("Knowledge base failed to load ({file}): {reason}")]
    Load { file: String, reason: String },

    #[error("Knowledge base query timed out after {0} ms")]
    Timeout(u64),
}

/// Query contract against the rule store.
///
/// An `Ok` empty result means "no match"; an `Err` means the evaluation
/// could not be carried out at all. Callers must keep the two apart.
pub trait KnowledgeBase {
    /// Evaluate symptoms, risk factors and follow-up answers into
    /// (diagnosis, confidence) candidates, in engine order.
    fn evaluate(
        &self,
        symptoms: &[String],
        risk_factors: &[String],
        answers: &[Answer],
    ) -> Result<Vec<Candidate>, KnowledgeError>;

    /// Follow-up questions attached to one diagnosis. Unknown ids yield
    /// an empty list.
    fn follow_up_questions(&self, diagnosis_id: &str) -> Result<Vec<String>, KnowledgeError>;

    /// Recommended confirmatory test for a diagnosis, if any.
    fn recommended_test(&self, diagnosis_id: &str) -> Result<Option<String>, KnowledgeError>;

    /// Treatment steps for a diagnosis. May be empty.
    fn treatment(&self, diagnosis_id: &str) -> Result<Vec<String>, KnowledgeError>;

    /// General advice text for a diagnosis, if any.
    fn advice(&self, diagnosis_id: &str) -> Result<Option<String>, KnowledgeError>;
}
