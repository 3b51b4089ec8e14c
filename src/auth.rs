//! Account registration and login.
//!
//! Passwords are stored as PBKDF2-SHA256 hashes with a per-account random
//! salt, both base64-encoded in the accounts table.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::models::Account;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 32;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must not be empty")]
    EmptyPassword,
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Derive the stored hash for a password + salt using PBKDF2-SHA256
pub fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    BASE64.encode(hash)
}

/// Constant-time check of a password attempt against the stored hash.
pub fn verify_password(password: &str, salt: &[u8], stored_hash: &str) -> bool {
    let stored = match BASE64.decode(stored_hash) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut candidate = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut candidate);
    stored.ct_eq(&candidate).into()
}

/// Register a new account with a hashed credential.
pub fn register(
    conn: &Connection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Account, AuthError> {
    let email = email.trim().to_lowercase();
    validate_email(&email)?;
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }

    let salt = generate_salt();
    let hash = hash_password(password, &salt);
    let account = db::insert_account(conn, name.trim(), &email, &hash, &BASE64.encode(salt))?;

    tracing::info!(account_id = %account.id, "Account registered");
    Ok(account)
}

/// Authenticate by email + password. Returns the account on success,
/// `None` for an unknown email or a wrong password (indistinguishable to
/// the caller).
pub fn authenticate(
    conn: &Connection,
    email: &str,
    password: &str,
) -> Result<Option<Account>, AuthError> {
    let email = email.trim().to_lowercase();
    let Some((id, stored_hash, stored_salt)) = db::account_credentials(conn, &email)? else {
        return Ok(None);
    };
    let Ok(salt) = BASE64.decode(&stored_salt) else {
        return Ok(None);
    };
    if !verify_password(password, &salt, &stored_hash) {
        return Ok(None);
    }
    Ok(db::get_account(conn, &id)?)
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail(email.to_string()))
    }
}
