//! One-time recovery codes with expiry

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Store a code for `email`, replacing any previous one
pub fn put(conn: &Connection, email: &str, code: &str, expires_at: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO recovery_codes (email, code, expires_at) VALUES (?1, ?2, ?3)
         ON CONFLICT (email) DO UPDATE SET code = excluded.code, expires_at = excluded.expires_at",
        params![email, code, expires_at],
    )?;
    Ok(())
}

/// Consume the code if it matches.
///
/// Callers purge expired codes first, so any stored code is still live.
pub fn take(conn: &Connection, email: &str, code: &str) -> Result<bool> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT code FROM recovery_codes WHERE email = ?1",
            [email],
            |r| r.get(0),
        )
        .optional()?;

    match stored {
        Some(stored_code) if stored_code == code => {
            conn.execute("DELETE FROM recovery_codes WHERE email = ?1", [email])?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Drop every expired code
pub fn purge_expired(conn: &Connection, now: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM recovery_codes WHERE expires_at <= ?1", [now])?)
}
