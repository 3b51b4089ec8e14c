//! Diagnostic session state.
//!
//! A `DiagnosisSession` is an explicit value object carried through the
//! controller's transition functions. The `SessionStore` is the
//! server-side holder, one session per account, overwritten on each new
//! diagnostic attempt and discarded once a history record is written.
//! Writes are last-write-wins; browser-driven interaction is sequential
//! per account.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::SessionPhase;
use crate::models::{Answer, Candidate, DetailBundle};

use super::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisSession {
    pub phase: SessionPhase,
    pub symptoms: Vec<String>,
    pub risk_factors: Vec<String>,
    /// Deduplicated questions still awaiting an answer, in display order.
    pub pending_questions: Vec<String>,
    /// Answers accepted for the refined pass.
    pub answers: Vec<Answer>,
    /// Final ranked candidates, confidence descending, at most three.
    pub candidates: Vec<Candidate>,
    /// Resolved detail for the top candidate, once results are ready.
    pub detail: Option<DetailBundle>,
    pub personalized_advice: Option<String>,
    /// Every question shown this session, kept for the report.
    pub questions_asked: Vec<String>,
}

impl DiagnosisSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::CollectingSymptoms,
            symptoms: Vec::new(),
            risk_factors: Vec::new(),
            pending_questions: Vec::new(),
            answers: Vec::new(),
            candidates: Vec::new(),
            detail: None,
            personalized_advice: None,
            questions_asked: Vec::new(),
        }
    }

    pub fn top_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Results exist only in the `ResultsReady` phase.
    pub fn has_results(&self) -> bool {
        self.phase == SessionPhase::ResultsReady && !self.candidates.is_empty()
    }
}

impl Default for DiagnosisSession {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session holder keyed by account id, backed by RwLock.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, DiagnosisSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Install the account's session, replacing any previous attempt.
    pub fn replace(
        &self,
        account_id: Uuid,
        session: DiagnosisSession,
    ) -> Result<(), EngineError> {
        let mut sessions = self.sessions.write().map_err(|_| EngineError::LockFailed)?;
        sessions.insert(account_id, session);
        Ok(())
    }

    pub fn get(&self, account_id: &Uuid) -> Result<Option<DiagnosisSession>, EngineError> {
        let sessions = self.sessions.read().map_err(|_| EngineError::LockFailed)?;
        Ok(sessions.get(account_id).cloned())
    }

    /// Remove and return the account's session (after archiving results).
    pub fn remove(&self, account_id: &Uuid) -> Result<Option<DiagnosisSession>, EngineError> {
        let mut sessions = self.sessions.write().map_err(|_| EngineError::LockFailed)?;
        Ok(sessions.remove(account_id))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
