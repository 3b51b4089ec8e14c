//! Two-pass refinement controller.
//!
//! Orchestrates one diagnostic attempt: initial evaluation, follow-up
//! aggregation, refined evaluation after answers, then detail resolution
//! and the personalized overlay. Every terminal phase is a renderable
//! outcome; knowledge base failures surface as explicit errors and leave
//! the session exactly as it was so the caller can retry.

use std::collections::HashSet;
use std::time::Instant;

use crate::knowledge::KnowledgeBase;
use crate::models::enums::{AnswerValue, SessionPhase};
use crate::models::Answer;
use crate::vocabulary::canonical;

use super::session::DiagnosisSession;
use super::{advice, questions, ranker, resolver, EngineError};

pub struct RefinementController<'a, K: KnowledgeBase> {
    kb: &'a K,
}

impl<'a, K: KnowledgeBase> RefinementController<'a, K> {
    pub fn new(kb: &'a K) -> Self {
        Self { kb }
    }

    /// First pass. Builds a fresh session from the submitted symptoms and
    /// risk factors and runs the initial evaluation. Rejected outright
    /// when no symptom was selected.
    pub fn submit_symptoms(
        &self,
        known_conditions: &str,
        symptoms: Vec<String>,
        risk_factors: Vec<String>,
    ) -> Result<DiagnosisSession, EngineError> {
        if symptoms.is_empty() {
            return Err(EngineError::NoSymptoms);
        }

        let start = Instant::now();
        let mut session = DiagnosisSession::new();
        session.symptoms = symptoms;
        session.risk_factors = risk_factors;
        session.phase = SessionPhase::EvaluatingInitial;

        let raw = self
            .kb
            .evaluate(&session.symptoms, &session.risk_factors, &[])?;
        let candidates = ranker::rank(raw);

        if candidates.is_empty() {
            session.phase = SessionPhase::NoMatch;
            tracing::info!(
                symptoms = session.symptoms.len(),
                processing_ms = start.elapsed().as_millis() as u64,
                "Initial evaluation found no match"
            );
            return Ok(session);
        }

        let follow_ups = questions::collect(self.kb, &candidates);
        session.candidates = candidates;

        if follow_ups.is_empty() {
            self.finish(&mut session, known_conditions);
        } else {
            session.pending_questions = follow_ups.clone();
            session.questions_asked = follow_ups;
            session.phase = SessionPhase::AwaitingFollowUp;
        }

        tracing::info!(
            candidates = session.candidates.len(),
            questions = session.pending_questions.len(),
            phase = session.phase.as_str(),
            processing_ms = start.elapsed().as_millis() as u64,
            "Initial evaluation complete"
        );
        Ok(session)
    }

    /// Second pass. Accepts answers for the offered questions and
    /// re-evaluates. Answers with a non-boolean value, or for questions
    /// that were never offered, are dropped rather than rejecting the
    /// batch. A refined pass that matches nothing reports no-match; it
    /// does not fall back to the initial result.
    pub fn submit_answers(
        &self,
        session: &mut DiagnosisSession,
        known_conditions: &str,
        raw_answers: &[(String, String)],
    ) -> Result<(), EngineError> {
        if session.phase != SessionPhase::AwaitingFollowUp {
            return Err(EngineError::NotAwaitingFollowUp);
        }

        let start = Instant::now();
        let accepted = accept_answers(&session.pending_questions, raw_answers);

        // Evaluate before touching the session; on failure it stays
        // awaiting follow-up with its questions intact.
        let raw = self
            .kb
            .evaluate(&session.symptoms, &session.risk_factors, &accepted)?;

        session.phase = SessionPhase::EvaluatingRefined;
        session.answers = accepted;
        session.pending_questions.clear();

        let candidates = ranker::rank(raw);
        if candidates.is_empty() {
            session.candidates.clear();
            session.detail = None;
            session.personalized_advice = None;
            session.phase = SessionPhase::NoMatch;
        } else {
            session.candidates = candidates;
            self.finish(session, known_conditions);
        }

        tracing::info!(
            answers = session.answers.len(),
            phase = session.phase.as_str(),
            processing_ms = start.elapsed().as_millis() as u64,
            "Refined evaluation complete"
        );
        Ok(())
    }

    /// Resolve detail and personalization for the top candidate and mark
    /// the session ready.
    fn finish(&self, session: &mut DiagnosisSession, known_conditions: &str) {
        let top_id = session.top_candidate().map(|c| c.diagnosis_id.clone());
        if let Some(diagnosis_id) = top_id {
            session.detail = Some(resolver::resolve(self.kb, &diagnosis_id));
            session.personalized_advice =
                Some(advice::overlay(known_conditions, &diagnosis_id));
        }
        session.phase = SessionPhase::ResultsReady;
    }
}

/// Keep only answers that are boolean and reference an offered question,
/// first answer per question wins.
fn accept_answers(offered: &[String], raw_answers: &[(String, String)]) -> Vec<Answer> {
    let offered: HashSet<String> = offered.iter().map(|q| canonical(q)).collect();
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();

    for (question, value) in raw_answers {
        let Ok(value) = value.trim().to_lowercase().parse::<AnswerValue>() else {
            tracing::debug!(question = %question, value = %value, "Dropping non-boolean answer");
            continue;
        };
        let token = canonical(question);
        if !offered.contains(&token) {
            tracing::debug!(question = %question, "Dropping answer to a question that was never offered");
            continue;
        }
        if seen.insert(token) {
            accepted.push(Answer {
                question: question.clone(),
                value,
            });
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::knowledge::KnowledgeError;
    use crate::models::Candidate;
    use crate::vocabulary::display_name;

    /// Scripted knowledge base for driving the state machine.
    struct Scripted {
        initial: Result<Vec<Candidate>, KnowledgeError>,
        refined: Result<Vec<Candidate>, KnowledgeError>,
        questions: Vec<(&'static str, Vec<&'static str>)>,
        captured_answers: RefCell<Vec<Vec<Answer>>>,
    }

    impl Scripted {
        fn new(
            initial: Vec<Candidate>,
            refined: Vec<Candidate>,
            questions: Vec<(&'static str, Vec<&'static str>)>,
        ) -> Self {
            Self {
                initial: Ok(initial),
                refined: Ok(refined),
                questions,
                captured_answers: RefCell::new(Vec::new()),
            }
        }
    }

    impl KnowledgeBase for Scripted {
        fn evaluate(
            &self,
            _symptoms: &[String],
            _risk_factors: &[String],
            answers: &[Answer],
        ) -> Result<Vec<Candidate>, KnowledgeError> {
            self.captured_answers.borrow_mut().push(answers.to_vec());
            if answers.is_empty() {
                self.initial.clone()
            } else {
                self.refined.clone()
            }
        }

        fn follow_up_questions(&self, diagnosis_id: &str) -> Result<Vec<String>, KnowledgeError> {
            Ok(self
                .questions
                .iter()
                .find(|(id, _)| *id == diagnosis_id)
                .map(|(_, qs)| qs.iter().map(|q| q.to_string()).collect())
                .unwrap_or_default())
        }

        fn recommended_test(&self, _: &str) -> Result<Option<String>, KnowledgeError> {
            Ok(Some("influenza rapid test".into()))
        }

        fn treatment(&self, _: &str) -> Result<Vec<String>, KnowledgeError> {
            Ok(vec!["rest".into(), "fluids".into()])
        }

        fn advice(&self, _: &str) -> Result<Option<String>, KnowledgeError> {
            Ok(Some("Rest well.".into()))
        }
    }

    fn candidate(id: &str, confidence: f64) -> Candidate {
        Candidate {
            diagnosis_id: id.into(),
            confidence,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_submission_without_symptoms() {
        let kb = Scripted::new(vec![], vec![], vec![]);
        let controller = RefinementController::new(&kb);
        let result = controller.submit_symptoms("none", vec![], vec![]);
        assert!(matches!(result, Err(EngineError::NoSymptoms)));
        // The knowledge base was never consulted.
        assert!(kb.captured_answers.borrow().is_empty());
    }

    #[test]
    fn two_pass_flow_refines_flu() {
        let kb = Scripted::new(
            vec![candidate("flu", 72.0), candidate("cold", 65.0)],
            vec![candidate("flu", 88.0)],
            vec![("flu", vec!["does_fever_exceed_102"]), ("cold", vec![])],
        );
        let controller = RefinementController::new(&kb);

        let mut session = controller
            .submit_symptoms("none", strings(&["fever", "cough"]), vec![])
            .unwrap();

        assert_eq!(session.phase, SessionPhase::AwaitingFollowUp);
        assert_eq!(session.pending_questions.len(), 1);
        assert_eq!(session.questions_asked.len(), 1);

        controller
            .submit_answers(
                &mut session,
                "none",
                &[("does_fever_exceed_102".into(), "yes".into())],
            )
            .unwrap();

        // The refined query carried exactly the accepted answer.
        let captured = kb.captured_answers.borrow();
        let refined_answers = captured.last().unwrap();
        assert_eq!(refined_answers.len(), 1);
        assert!(refined_answers[0].is_yes());

        assert_eq!(session.phase, SessionPhase::ResultsReady);
        let top = session.top_candidate().unwrap();
        assert_eq!(display_name(&top.diagnosis_id), "Flu");
        assert_eq!(format!("{:.2}%", top.confidence), "88.00%");
        assert!(session.detail.is_some());
        assert!(session.pending_questions.is_empty());
    }

    #[test]
    fn no_follow_ups_skips_straight_to_results() {
        let kb = Scripted::new(vec![candidate("constipation", 55.0)], vec![], vec![]);
        let controller = RefinementController::new(&kb);

        let session = controller
            .submit_symptoms("none", strings(&["bloating"]), vec![])
            .unwrap();

        assert_eq!(session.phase, SessionPhase::ResultsReady);
        let detail = session.detail.as_ref().unwrap();
        assert_eq!(detail.test, "influenza rapid test");
        assert!(session.personalized_advice.is_some());
        assert!(session.questions_asked.is_empty());
    }

    #[test]
    fn initial_no_match_is_terminal_and_empty() {
        let kb = Scripted::new(vec![], vec![], vec![]);
        let controller = RefinementController::new(&kb);

        let session = controller
            .submit_symptoms("none", strings(&["fever"]), vec![])
            .unwrap();

        assert_eq!(session.phase, SessionPhase::NoMatch);
        assert!(session.candidates.is_empty());
        assert!(session.detail.is_none());
        assert!(!session.has_results());
    }

    #[test]
    fn refined_no_match_discards_initial_results() {
        let kb = Scripted::new(
            vec![candidate("flu", 72.0)],
            vec![],
            vec![("flu", vec!["does_fever_exceed_102"])],
        );
        let controller = RefinementController::new(&kb);

        let mut session = controller
            .submit_symptoms("none", strings(&["fever"]), vec![])
            .unwrap();
        controller
            .submit_answers(
                &mut session,
                "none",
                &[("does_fever_exceed_102".into(), "no".into())],
            )
            .unwrap();

        // No fallback to the pass-one candidates.
        assert_eq!(session.phase, SessionPhase::NoMatch);
        assert!(session.candidates.is_empty());
        assert!(session.detail.is_none());
        assert!(session.personalized_advice.is_none());
    }

    #[test]
    fn invalid_and_unoffered_answers_are_dropped() {
        let kb = Scripted::new(
            vec![candidate("flu", 72.0)],
            vec![candidate("flu", 70.0)],
            vec![("flu", vec!["does_fever_exceed_102"])],
        );
        let controller = RefinementController::new(&kb);

        let mut session = controller
            .submit_symptoms("none", strings(&["fever"]), vec![])
            .unwrap();
        controller
            .submit_answers(
                &mut session,
                "none",
                &[
                    ("does_fever_exceed_102".into(), "maybe".into()),
                    ("was_never_asked".into(), "yes".into()),
                ],
            )
            .unwrap();

        assert!(session.answers.is_empty());
        // With every answer dropped the refined query ran with none.
        let captured = kb.captured_answers.borrow();
        assert!(captured.last().unwrap().is_empty());
    }

    #[test]
    fn duplicate_answers_first_one_wins() {
        let kb = Scripted::new(
            vec![candidate("flu", 72.0)],
            vec![candidate("flu", 88.0)],
            vec![("flu", vec!["does_fever_exceed_102"])],
        );
        let controller = RefinementController::new(&kb);

        let mut session = controller
            .submit_symptoms("none", strings(&["fever"]), vec![])
            .unwrap();
        controller
            .submit_answers(
                &mut session,
                "none",
                &[
                    ("does_fever_exceed_102".into(), "yes".into()),
                    ("does fever exceed 102".into(), "no".into()),
                ],
            )
            .unwrap();

        assert_eq!(session.answers.len(), 1);
        assert!(session.answers[0].is_yes());
    }

    #[test]
    fn answers_out_of_phase_are_rejected() {
        let kb = Scripted::new(vec![candidate("flu", 72.0)], vec![], vec![]);
        let controller = RefinementController::new(&kb);

        let mut session = controller
            .submit_symptoms("none", strings(&["fever"]), vec![])
            .unwrap();
        assert_eq!(session.phase, SessionPhase::ResultsReady);

        let result = controller.submit_answers(&mut session, "none", &[]);
        assert!(matches!(result, Err(EngineError::NotAwaitingFollowUp)));
        // The session is untouched by the rejected transition.
        assert_eq!(session.phase, SessionPhase::ResultsReady);
    }

    #[test]
    fn initial_evaluation_is_idempotent() {
        let kb = Scripted::new(
            vec![candidate("flu", 72.0), candidate("cold", 65.0)],
            vec![],
            vec![("flu", vec!["does_fever_exceed_102"])],
        );
        let controller = RefinementController::new(&kb);

        let first = controller
            .submit_symptoms("none", strings(&["fever", "cough"]), vec![])
            .unwrap();
        let second = controller
            .submit_symptoms("none", strings(&["fever", "cough"]), vec![])
            .unwrap();

        assert_eq!(first.candidates, second.candidates);
        assert_eq!(first.pending_questions, second.pending_questions);
    }

    #[test]
    fn knowledge_failure_on_initial_pass_is_an_explicit_error() {
        let mut kb = Scripted::new(vec![], vec![], vec![]);
        kb.initial = Err(KnowledgeError::Missing("rules gone".into()));
        let controller = RefinementController::new(&kb);

        let result = controller.submit_symptoms("none", strings(&["fever"]), vec![]);
        assert!(matches!(result, Err(EngineError::Knowledge(_))));
    }

    #[test]
    fn knowledge_failure_on_refined_pass_preserves_the_session() {
        let mut kb = Scripted::new(
            vec![candidate("flu", 72.0)],
            vec![],
            vec![("flu", vec!["does_fever_exceed_102"])],
        );
        kb.refined = Err(KnowledgeError::Timeout(5000));
        let controller = RefinementController::new(&kb);

        let mut session = controller
            .submit_symptoms("none", strings(&["fever"]), vec![])
            .unwrap();
        let result = controller.submit_answers(
            &mut session,
            "none",
            &[("does_fever_exceed_102".into(), "yes".into())],
        );

        assert!(matches!(result, Err(EngineError::Knowledge(_))));
        // Still awaiting: the caller can retry the same submission.
        assert_eq!(session.phase, SessionPhase::AwaitingFollowUp);
        assert_eq!(session.pending_questions.len(), 1);
        assert_eq!(session.candidates.len(), 1);
    }

    #[test]
    fn personalization_reflects_known_conditions() {
        let kb = Scripted::new(vec![candidate("flu", 72.0)], vec![], vec![]);
        let controller = RefinementController::new(&kb);

        let session = controller
            .submit_symptoms("asthma", strings(&["fever"]), vec![])
            .unwrap();

        let personalized = session.personalized_advice.as_deref().unwrap();
        assert!(personalized.contains("With asthma, keep inhaler handy."));
    }
}
