//! Teacher account rules: email format, password strength, password hashes
//! and one-time recovery codes

use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use regex::Regex;

use crate::config::AccountsConfig;
use crate::error::{RubricaError, Result};

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[\w.\-]+@([\w\-]+\.)+[\w\-]{2,4}$").expect("email regex is valid")
    })
}

/// Normalize and validate an email address
pub fn validate_email(email: &str, config: &AccountsConfig) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(RubricaError::missing_field("email"));
    }
    if !email_regex().is_match(&email) {
        return Err(RubricaError::invalid_value("email", &email));
    }
    if let Some(domain) = &config.institutional_domain {
        if !email.ends_with(&domain.to_lowercase()) {
            return Err(RubricaError::invalid_value(
                "email",
                format!("{} (must end with {})", email, domain),
            ));
        }
    }
    Ok(email)
}

/// Number of strength rules a password satisfies (out of 5)
pub fn password_strength(password: &str) -> usize {
    let rules = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_uppercase()),
        password.chars().any(|c| c.is_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
    ];
    rules.iter().filter(|ok| **ok).count()
}

pub fn validate_password(password: &str, config: &AccountsConfig) -> Result<()> {
    if password.is_empty() {
        return Err(RubricaError::missing_field("password"));
    }
    let strength = password_strength(password);
    if strength < config.min_password_rules {
        return Err(RubricaError::invalid_value(
            "password",
            format!(
                "too weak ({} of 5 rules, {} required)",
                strength, config.min_password_rules
            ),
        ));
    }
    Ok(())
}

/// Argon2id hash in PHC string format (`$argon2id$v=19$...`)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RubricaError::db_operation("hash password", e))
}

/// Check `password` against a stored PHC string; unparseable hashes never match
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Numeric one-time code with `length` digits, zero padded
pub fn generate_code(length: u32) -> String {
    let modulus = 10u128.pow(length);
    let value = ulid::Ulid::new().random() % modulus;
    format!("{:0width$}", value, width = length as usize)
}
