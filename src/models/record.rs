use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable snapshot of one completed diagnosis. Append-only: written once
/// when the user archives a result, never mutated afterwards. Confidence is
/// the top candidate's value at archive time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub recorded_at: NaiveDateTime,
    pub symptoms: Vec<String>,
    pub diagnosis_id: String,
    pub confidence: f64,
    /// Storage reference of the PDF artifact, when report generation succeeded.
    pub report_file: Option<String>,
}
