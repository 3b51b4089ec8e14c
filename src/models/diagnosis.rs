use serde::{Deserialize, Serialize};

use super::enums::AnswerValue;

/// A (diagnosis, confidence) pair produced by the knowledge base.
/// Confidence is an engine-assigned score, conventionally 0–100; the core
/// only orders and filters it, it never recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub diagnosis_id: String,
    pub confidence: f64,
}

/// A yes/no reply to one follow-up question that was actually offered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub value: AnswerValue,
}

impl Answer {
    pub fn is_yes(&self) -> bool {
        self.value == AnswerValue::Yes
    }
}

/// Resolved test/treatment/advice package for the top diagnosis.
/// Fields degrade individually to placeholders; the bundle always exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailBundle {
    pub test: String,
    pub treatment: Vec<String>,
    pub advice: String,
}
