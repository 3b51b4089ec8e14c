//! Archiving a completed diagnosis: one append-only history record plus
//! the PDF artifact. Archiving happens only on explicit user request,
//! never as a side effect of results becoming ready.

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::engine::DiagnosisSession;
use crate::models::{Account, DiagnosisRecord};
use crate::report::{self, DiagnosisReport};

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("No completed diagnosis to archive")]
    NoResults,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Persist the session's outcome. Report generation failure degrades to a
/// record without an artifact reference — the diagnosis itself is never
/// lost over a PDF. The stored confidence is the top candidate's value at
/// this moment and is never recomputed later.
pub fn archive_results(
    conn: &Connection,
    reports_dir: &Path,
    account: &Account,
    session: &DiagnosisSession,
) -> Result<DiagnosisRecord, HistoryError> {
    let report = DiagnosisReport::from_session(account, session).ok_or(HistoryError::NoResults)?;

    let report_file = match report::write_report(reports_dir, &report) {
        Ok(file_name) => Some(file_name),
        Err(e) => {
            tracing::warn!(error = %e, "Report generation failed; archiving without artifact");
            None
        }
    };

    let record = DiagnosisRecord {
        id: Uuid::new_v4(),
        account_id: account.id,
        recorded_at: chrono::Local::now().naive_local(),
        symptoms: session.symptoms.clone(),
        diagnosis_id: report.diagnosis_id.clone(),
        confidence: report.confidence,
        report_file,
    };
    db::insert_record(conn, &record)?;

    tracing::info!(
        account_id = %account.id,
        diagnosis = %record.diagnosis_id,
        confidence = record.confidence,
        "Diagnosis archived to history"
    );
    Ok(record)
}
