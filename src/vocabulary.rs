//! Fixed symptom and risk-factor vocabularies plus the text normalization
//! applied at the knowledge base boundary.
//!
//! Symptom names are grouped by body-system category; risk factors are a
//! flat list. Matching is always done on the canonical token form so that
//! `"Body_Ache"`, `"body ache"` and `"body  ache"` are the same symptom.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const CATEGORIES: &[&str] = &[
    "General",
    "Head & Neck",
    "Respiratory",
    "Digestive",
    "Skin",
    "Urinary",
];

pub fn symptoms_for(category: &str) -> Vec<&'static str> {
    match category {
        "General" => vec![
            "fever", "fatigue", "chills", "body ache", "weight loss",
            "night sweats", "loss of appetite", "high fever", "tiredness",
            "weakness", "pale skin", "cold hands/feet", "joint pain",
        ],
        "Head & Neck" => vec![
            "headache", "sore throat", "sneezing", "runny nose", "loss of taste",
            "dizziness", "blurred vision", "facial pain", "nasal congestion",
            "itchy eyes", "light sensitivity", "aura",
        ],
        "Respiratory" => vec![
            "cough", "shortness of breath", "wheezing", "chest tightness",
            "difficulty breathing", "persistent cough", "mucus", "bleeding",
        ],
        "Digestive" => vec![
            "nausea", "vomiting", "abdominal pain", "constipation", "jaundice",
            "dark urine", "diarrhea", "abdominal cramps", "infrequent bowel",
            "hard stool", "bloating",
        ],
        "Skin" => vec!["rash"],
        "Urinary" => vec![
            "frequent urination", "increased thirst", "burning urination",
            "pelvic pain",
        ],
        _ => vec![],
    }
}

pub const RISK_FACTORS: &[&str] = &[
    "obesity", "family history", "sedentary lifestyle", "poor diet", "stress",
    "high salt intake", "alcohol", "smoking", "crowded places", "no mask",
    "poor immunity", "mosquito bites", "stagnant water", "malnutrition",
    "hiv positive", "overcrowding", "unprotected sex", "shared needles",
    "blood transfusion", "iron deficiency", "chronic disease", "blood loss",
    "allergies", "cold weather", "contaminated food", "poor hygiene", "dust",
    "pollen", "animal dander", "low fiber diet", "dehydration", "inactivity",
];

/// Category with its symptoms, for selection screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub category: String,
    pub symptoms: Vec<String>,
}

/// Returns all symptom categories with their symptom lists.
pub fn symptom_catalog() -> Vec<CategoryInfo> {
    CATEGORIES
        .iter()
        .map(|cat| CategoryInfo {
            category: cat.to_string(),
            symptoms: symptoms_for(cat).into_iter().map(String::from).collect(),
        })
        .collect()
}

/// All symptoms across categories, sorted and deduplicated.
pub fn all_symptoms() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = CATEGORIES
        .iter()
        .flat_map(|cat| symptoms_for(cat))
        .collect();
    all.sort_unstable();
    all.dedup();
    all
}

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Canonical token form: lowercase, underscores as spaces, runs of
/// whitespace collapsed, trimmed. Used for all identity comparisons.
pub fn canonical(text: &str) -> String {
    let lower = text.to_lowercase().replace('_', " ");
    RE_WHITESPACE.replace_all(lower.trim(), " ").into_owned()
}

/// Normalize free text without folding case: trim and collapse whitespace.
/// Applied to prose (advice, question sentences) leaving the wording intact.
pub fn clean_text(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Presentation form of a token: canonical, then each word title-cased.
/// `"flu"` becomes `"Flu"`, `"blood_smear_test"` becomes `"Blood Smear Test"`.
pub fn display_name(token: &str) -> String {
    canonical(token)
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_known_symptom(name: &str) -> bool {
    let token = canonical(name);
    CATEGORIES
        .iter()
        .flat_map(|cat| symptoms_for(cat))
        .any(|s| canonical(s) == token)
}

pub fn is_known_risk_factor(name: &str) -> bool {
    let token = canonical(name);
    RISK_FACTORS.iter().any(|r| canonical(r) == token)
}
