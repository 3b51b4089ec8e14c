use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered patient account. Credential material (hash, salt) stays in
/// the database layer and never appears on this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
    pub weight: Option<i64>,
    pub medical_conditions: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Account {
    /// Age and weight are both required before a diagnosis can start.
    pub fn profile_complete(&self) -> bool {
        self.age.is_some() && self.weight.is_some()
    }

    /// Known-conditions text used by the personalization overlay.
    /// Empty or absent conditions read as "none".
    pub fn conditions_text(&self) -> &str {
        self.medical_conditions.as_deref().unwrap_or("none")
    }
}
