//! The adaptive inference engine: candidate ranking, follow-up question
//! aggregation, two-pass refinement, detail resolution and the
//! personalized advice overlay.

pub mod advice;
pub mod controller;
pub mod questions;
pub mod ranker;
pub mod resolver;
pub mod session;

pub use controller::RefinementController;
pub use session::{DiagnosisSession, SessionStore};

use thiserror::Error;

use crate::knowledge::KnowledgeError;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The rule base could not be consulted. Fatal for the current query
    /// only; the session survives and the caller may retry.
    #[error("Knowledge base unavailable: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("At least one symptom is required")]
    NoSymptoms,

    #[error("Session is not awaiting follow-up answers")]
    NotAwaitingFollowUp,

    #[error("Internal lock failed")]
    LockFailed,
}
