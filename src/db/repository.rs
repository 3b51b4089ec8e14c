use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::{Account, DiagnosisRecord};

// ═══════════════════════════════════════════
// Accounts
// ═══════════════════════════════════════════

/// Register a new account. Email must not already be taken.
pub fn insert_account(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
    salt: &str,
) -> Result<Account, DatabaseError> {
    let existing: Option<Uuid> = conn
        .query_row(
            "SELECT id FROM accounts WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(none_on_no_rows)?;
    if existing.is_some() {
        return Err(DatabaseError::DuplicateEmail(email.to_string()));
    }

    let account = Account {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        age: None,
        weight: None,
        medical_conditions: None,
        created_at: chrono::Local::now().naive_local(),
    };

    conn.execute(
        "INSERT INTO accounts (id, name, email, password_hash, salt, age, weight, medical_conditions, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL, NULL, ?6)",
        params![
            account.id,
            account.name,
            account.email,
            password_hash,
            salt,
            account.created_at,
        ],
    )?;

    Ok(account)
}

pub fn get_account(conn: &Connection, id: &Uuid) -> Result<Option<Account>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, age, weight, medical_conditions, created_at
         FROM accounts WHERE id = ?1",
    )?;
    stmt.query_row(params![id], account_from_row)
        .map(Some)
        .or_else(none_on_no_rows)
}

/// Fetch (account id, password hash, salt) for a login attempt.
pub(crate) fn account_credentials(
    conn: &Connection,
    email: &str,
) -> Result<Option<(Uuid, String, String)>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, password_hash, salt FROM accounts WHERE email = ?1")?;
    stmt.query_row(params![email], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })
    .map(Some)
    .or_else(none_on_no_rows)
}

/// Update the profile fields collected after registration.
pub fn update_account_details(
    conn: &Connection,
    id: &Uuid,
    age: i64,
    weight: i64,
    medical_conditions: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE accounts SET age = ?2, weight = ?3, medical_conditions = ?4 WHERE id = ?1",
        params![id, age, weight, medical_conditions],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Account".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════
// Diagnosis history (append-only)
// ═══════════════════════════════════════════

pub fn insert_record(conn: &Connection, record: &DiagnosisRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO diagnosis_history (id, account_id, recorded_at, symptoms, diagnosis, confidence, report_file)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id,
            record.account_id,
            record.recorded_at,
            record.symptoms.join(","),
            record.diagnosis_id,
            record.confidence,
            record.report_file,
        ],
    )?;
    Ok(())
}

/// All records for one account, most recent first.
pub fn records_for_account(
    conn: &Connection,
    account_id: &Uuid,
) -> Result<Vec<DiagnosisRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, recorded_at, symptoms, diagnosis, confidence, report_file
         FROM diagnosis_history WHERE account_id = ?1 ORDER BY recorded_at DESC",
    )?;
    let rows = stmt.query_map(params![account_id], record_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Occurrence count per diagnosis across all history, most frequent first.
pub fn diagnosis_counts(conn: &Connection) -> Result<Vec<(String, i64)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT diagnosis, COUNT(*) as count FROM diagnosis_history
         WHERE diagnosis != '' GROUP BY diagnosis ORDER BY count DESC",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

// ═══════════════════════════════════════════
// Row mapping
// ═══════════════════════════════════════════

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        age: row.get(3)?,
        weight: row.get(4)?,
        medical_conditions: row.get(5)?,
        created_at: row.get::<_, NaiveDateTime>(6)?,
    })
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DiagnosisRecord> {
    let symptoms_csv: String = row.get(3)?;
    Ok(DiagnosisRecord {
        id: row.get(0)?,
        account_id: row.get(1)?,
        recorded_at: row.get(2)?,
        symptoms: symptoms_csv
            .split(',')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        diagnosis_id: row.get(4)?,
        confidence: row.get(5)?,
        report_file: row.get(6)?,
    })
}

fn none_on_no_rows<T>(e: rusqlite::Error) -> Result<Option<T>, DatabaseError> {
    match e {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(other.into()),
    }
}
