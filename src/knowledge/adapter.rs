//! File-backed knowledge base adapter.
//!
//! Every query loads and parses the rule file from scratch: no engine
//! handle survives between calls, so concurrent requests never share
//! evaluation state. Each call runs on its own worker thread under a
//! bounded deadline; a query that overruns is reported as unavailable.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::config;
use crate::models::{Answer, Candidate};
use crate::vocabulary::{canonical, clean_text};

use super::rules::{RuleSet, BUNDLED_RULES_JSON};
use super::{KnowledgeBase, KnowledgeError};

pub struct RuleFileAdapter {
    path: PathBuf,
    timeout: Duration,
}

impl RuleFileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: config::KNOWLEDGE_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    /// Load the rule file and run one query against it on a worker thread.
    /// The worker owns its own rule set; nothing is shared or reused.
    fn query<T, F>(&self, run: F) -> Result<T, KnowledgeError>
    where
        T: Send + 'static,
        F: FnOnce(&RuleSet) -> T + Send + 'static,
    {
        let path = self.path.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(load_rule_set(&path).map(|rules| run(&rules)));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Knowledge base query exceeded its deadline"
                );
                Err(KnowledgeError::Timeout(self.timeout.as_millis() as u64))
            }
        }
    }
}

impl KnowledgeBase for RuleFileAdapter {
    fn evaluate(
        &self,
        symptoms: &[String],
        risk_factors: &[String],
        answers: &[Answer],
    ) -> Result<Vec<Candidate>, KnowledgeError> {
        let symptoms = symptoms.to_vec();
        let risk_factors = risk_factors.to_vec();
        let answers: Vec<(String, bool)> = answers
            .iter()
            .map(|a| (a.question.clone(), a.is_yes()))
            .collect();

        let pairs =
            self.query(move |rules| rules.evaluate(&symptoms, &risk_factors, &answers))?;

        Ok(pairs
            .into_iter()
            .map(|(id, confidence)| Candidate {
                diagnosis_id: canonical(&id),
                confidence,
            })
            .collect())
    }

    fn follow_up_questions(&self, diagnosis_id: &str) -> Result<Vec<String>, KnowledgeError> {
        let id = diagnosis_id.to_string();
        self.query(move |rules| match rules.find(&id) {
            Some(rule) => rule
                .follow_ups
                .iter()
                .map(|f| canonical(&f.question))
                .collect(),
            None => Vec::new(),
        })
    }

    fn recommended_test(&self, diagnosis_id: &str) -> Result<Option<String>, KnowledgeError> {
        let id = diagnosis_id.to_string();
        self.query(move |rules| {
            rules
                .find(&id)
                .and_then(|rule| rule.test.as_deref().map(canonical))
        })
    }

    fn treatment(&self, diagnosis_id: &str) -> Result<Vec<String>, KnowledgeError> {
        let id = diagnosis_id.to_string();
        self.query(move |rules| match rules.find(&id) {
            Some(rule) => rule
                .treatment
                .to_steps()
                .iter()
                .map(|step| canonical(step))
                .collect(),
            None => Vec::new(),
        })
    }

    fn advice(&self, diagnosis_id: &str) -> Result<Option<String>, KnowledgeError> {
        let id = diagnosis_id.to_string();
        self.query(move |rules| {
            rules
                .find(&id)
                .and_then(|rule| rule.advice.as_deref().map(clean_text))
        })
    }
}

fn load_rule_set(path: &Path) -> Result<RuleSet, KnowledgeError> {
    if !path.exists() {
        return Err(KnowledgeError::Missing(path.display().to_string()));
    }
    let raw = fs::read_to_string(path).map_err(|e| KnowledgeError::Load {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    RuleSet::from_json(&raw).map_err(|e| KnowledgeError::Load {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Write the bundled rule data to `path` unless a file is already there.
/// Hosts call this once at startup to seed the data directory.
pub fn install_bundled(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, BUNDLED_RULES_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::AnswerValue;

    fn adapter_with_bundled_rules(dir: &tempfile::TempDir) -> RuleFileAdapter {
        let path = dir.path().join("knowledge_base.json");
        install_bundled(&path).unwrap();
        RuleFileAdapter::new(path)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_rule_file_is_unavailable_not_a_panic() {
        let adapter = RuleFileAdapter::new("/nonexistent/rules.json");
        let result = adapter.evaluate(&strings(&["fever"]), &[], &[]);
        assert!(matches!(result, Err(KnowledgeError::Missing(_))));
    }

    #[test]
    fn malformed_rule_file_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge_base.json");
        fs::write(&path, "{ not json").unwrap();

        let adapter = RuleFileAdapter::new(path);
        let result = adapter.evaluate(&strings(&["fever"]), &[], &[]);
        assert!(matches!(result, Err(KnowledgeError::Load { .. })));
    }

    #[test]
    fn empty_result_is_ok_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter_with_bundled_rules(&dir);

        let result = adapter.evaluate(&strings(&["no such symptom"]), &[], &[]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn evaluate_returns_candidates_for_known_symptoms() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter_with_bundled_rules(&dir);

        let candidates = adapter
            .evaluate(&strings(&["fever", "cough"]), &[], &[])
            .unwrap();
        assert!(!candidates.is_empty());
        assert!(candidates.iter().any(|c| c.diagnosis_id == "flu"));
        for c in &candidates {
            assert!((0.0..=100.0).contains(&c.confidence));
        }
    }

    #[test]
    fn answers_are_threaded_into_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter_with_bundled_rules(&dir);
        let symptoms = strings(&["fever", "cough"]);

        let flu_conf = |answers: &[Answer]| {
            adapter
                .evaluate(&symptoms, &[], answers)
                .unwrap()
                .into_iter()
                .find(|c| c.diagnosis_id == "flu")
                .unwrap()
                .confidence
        };

        let base = flu_conf(&[]);
        let with_yes = flu_conf(&[Answer {
            question: "does the fever exceed 102 f".into(),
            value: AnswerValue::Yes,
        }]);
        assert!(with_yes > base);
    }

    #[test]
    fn follow_up_questions_come_back_as_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter_with_bundled_rules(&dir);

        let questions = adapter.follow_up_questions("flu").unwrap();
        assert!(questions.contains(&"does the fever exceed 102 f".to_string()));
        for q in &questions {
            assert!(!q.contains('_'), "engine atom leaked upward: {q}");
        }
    }

    #[test]
    fn unknown_diagnosis_yields_empty_detail() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter_with_bundled_rules(&dir);

        assert!(adapter.follow_up_questions("unicornosis").unwrap().is_empty());
        assert!(adapter.recommended_test("unicornosis").unwrap().is_none());
        assert!(adapter.treatment("unicornosis").unwrap().is_empty());
        assert!(adapter.advice("unicornosis").unwrap().is_none());
    }

    #[test]
    fn detail_lookups_normalize_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = adapter_with_bundled_rules(&dir);

        let test = adapter.recommended_test("flu").unwrap().unwrap();
        assert_eq!(test, "influenza rapid test");

        let treatment = adapter.treatment("flu").unwrap();
        assert!(treatment.iter().all(|step| !step.contains('_')));

        // Advice is prose and keeps its casing.
        let advice = adapter.advice("flu").unwrap().unwrap();
        assert!(advice.starts_with("Rest"));
    }

    #[test]
    fn slow_query_times_out_as_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge_base.json");
        install_bundled(&path).unwrap();

        let adapter = RuleFileAdapter::with_timeout(&path, Duration::from_millis(0));
        let result = adapter.evaluate(&strings(&["fever"]), &[], &[]);
        assert!(matches!(result, Err(KnowledgeError::Timeout(_))));
    }

    #[test]
    fn install_bundled_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge_base.json");
        fs::write(&path, "{\"diseases\": []}").unwrap();

        install_bundled(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"diseases\": []}");
    }
}
