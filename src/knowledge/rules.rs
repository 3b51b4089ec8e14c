//! Declarative disease rules and the generic scorer that evaluates them.
//!
//! A rule lists the symptoms and risk factors that point at a disease plus
//! follow-up questions whose answers shift the score. Scoring is pure and
//! deterministic: symptom overlap carries most of the weight, risk-factor
//! overlap a smaller share, and each answered follow-up applies its
//! configured delta. Scores are clamped to 0–100.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::vocabulary::canonical;

pub const SYMPTOM_WEIGHT: f64 = 70.0;
pub const RISK_FACTOR_WEIGHT: f64 = 20.0;

/// The rule data shipped with the crate, used to seed a data directory.
pub const BUNDLED_RULES_JSON: &str = include_str!("../../resources/knowledge_base.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub question: String,
    #[serde(default = "default_yes_boost")]
    pub yes_boost: f64,
    #[serde(default = "default_no_penalty")]
    pub no_penalty: f64,
}

fn default_yes_boost() -> f64 {
    10.0
}

fn default_no_penalty() -> f64 {
    8.0
}

/// Treatment may be written as a single step or a list in the rule file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreatmentField {
    Single(String),
    Steps(Vec<String>),
}

impl TreatmentField {
    pub fn to_steps(&self) -> Vec<String> {
        match self {
            Self::Single(step) => vec![step.clone()],
            Self::Steps(steps) => steps.clone(),
        }
    }
}

impl Default for TreatmentField {
    fn default() -> Self {
        Self::Steps(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseRule {
    pub id: String,
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub follow_ups: Vec<FollowUp>,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub treatment: TreatmentField,
    #[serde(default)]
    pub advice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub diseases: Vec<DiseaseRule>,
}

impl RuleSet {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The rule set shipped with the crate.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_RULES_JSON)
    }

    /// Small fixed rule set for tests (no file I/O).
    pub fn load_test() -> Self {
        Self {
            diseases: vec![
                DiseaseRule {
                    id: "flu".into(),
                    symptoms: vec!["fever".into(), "cough".into(), "body ache".into(), "fatigue".into()],
                    risk_factors: vec!["crowded places".into(), "poor immunity".into()],
                    follow_ups: vec![FollowUp {
                        question: "does_the_fever_exceed_102_f".into(),
                        yes_boost: 12.0,
                        no_penalty: 6.0,
                    }],
                    test: Some("influenza_rapid_test".into()),
                    treatment: TreatmentField::Steps(vec!["rest".into(), "fluids".into()]),
                    advice: Some("Rest and stay hydrated.".into()),
                },
                DiseaseRule {
                    id: "common_cold".into(),
                    symptoms: vec!["sneezing".into(), "runny nose".into(), "cough".into(), "sore throat".into()],
                    risk_factors: vec!["cold weather".into()],
                    follow_ups: vec![],
                    test: None,
                    treatment: TreatmentField::Single("steam_inhalation".into()),
                    advice: None,
                },
            ],
        }
    }

    /// Look up a rule by canonical diagnosis id.
    pub fn find(&self, diagnosis_id: &str) -> Option<&DiseaseRule> {
        let token = canonical(diagnosis_id);
        self.diseases.iter().find(|d| canonical(&d.id) == token)
    }

    /// Score every rule against the reported inputs. A rule with no symptom
    /// overlap produces no candidate; unknown input tokens match nothing.
    /// Output order follows the rule file, so repeated identical queries
    /// give identical output.
    pub fn evaluate(
        &self,
        symptoms: &[String],
        risk_factors: &[String],
        answers: &[(String, bool)],
    ) -> Vec<(String, f64)> {
        let symptoms: HashSet<String> = symptoms.iter().map(|s| canonical(s)).collect();
        let risks: HashSet<String> = risk_factors.iter().map(|r| canonical(r)).collect();
        let answers: HashMap<String, bool> = answers
            .iter()
            .map(|(question, value)| (canonical(question), *value))
            .collect();

        let mut results = Vec::new();
        for rule in &self.diseases {
            if rule.symptoms.is_empty() {
                continue;
            }
            let matched = rule
                .symptoms
                .iter()
                .filter(|s| symptoms.contains(&canonical(s)))
                .count();
            if matched == 0 {
                continue;
            }

            let mut confidence = matched as f64 / rule.symptoms.len() as f64 * SYMPTOM_WEIGHT;

            if !rule.risk_factors.is_empty() {
                let matched_risks = rule
                    .risk_factors
                    .iter()
                    .filter(|r| risks.contains(&canonical(r)))
                    .count();
                confidence +=
                    matched_risks as f64 / rule.risk_factors.len() as f64 * RISK_FACTOR_WEIGHT;
            }

            for follow_up in &rule.follow_ups {
                match answers.get(&canonical(&follow_up.question)) {
                    Some(true) => confidence += follow_up.yes_boost,
                    Some(false) => confidence -= follow_up.no_penalty,
                    None => {}
                }
            }

            results.push((rule.id.clone(), confidence.clamp(0.0, 100.0)));
        }
        results
    }
}
