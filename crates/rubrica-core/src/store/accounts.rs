//! Teacher registration, login and code-based recovery

use chrono::Utc;
use serde::Serialize;

use super::Store;
use crate::accounts::{
    generate_code, hash_password, validate_email, validate_password, verify_password,
};
use crate::db::{codes, roster};
use crate::error::{RubricaError, Result};
use crate::id::{self, IdKind};
use crate::mail::recovery_code_email;
use crate::roster::Teacher;

/// Outcome of a recovery code request; the code itself only travels by mail
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryRequest {
    pub email: String,
    pub expires_at: i64,
}

impl Store {
    /// Register a teacher account
    #[tracing::instrument(skip(self, password))]
    pub fn register_teacher(&self, email: &str, password: &str) -> Result<Teacher> {
        let email = validate_email(email, &self.config.accounts)?;
        validate_password(password, &self.config.accounts)?;

        let conn = self.db.conn();
        if roster::teacher_by_email(conn, &email)?.is_some() {
            return Err(RubricaError::already_exists("teacher", &email));
        }

        let teacher = Teacher {
            id: id::generate(IdKind::Teacher),
            email,
            created: Utc::now(),
        };
        let hash = hash_password(password)?;
        roster::insert_teacher(conn, &teacher, &hash)?;

        tracing::info!(teacher_id = %teacher.id, "teacher_registered");
        Ok(teacher)
    }

    /// Check credentials and return the teacher
    pub fn login(&self, email: &str, password: &str) -> Result<Teacher> {
        let email = email.trim().to_lowercase();
        match roster::teacher_by_email(self.db.conn(), &email)? {
            Some((teacher, stored)) if verify_password(password, &stored) => Ok(teacher),
            _ => Err(RubricaError::unauthorized("login", "invalid email or password")),
        }
    }

    /// Generate a one-time code for `email` and mail it
    #[tracing::instrument(skip(self))]
    pub fn request_recovery_code(&self, email: &str) -> Result<RecoveryRequest> {
        let teacher = self.teacher_by_email(email)?;
        let recovery = &self.config.recovery;

        let now = Utc::now().timestamp();
        let expires_at = now + i64::try_from(recovery.code_ttl_secs).unwrap_or(i64::MAX - now);
        let code = generate_code(recovery.code_length);

        let conn = self.db.conn();
        codes::purge_expired(conn, now)?;
        codes::put(conn, &teacher.email, &code, expires_at)?;

        self.mailer().send(&recovery_code_email(
            &self.config.mail.from,
            &teacher.email,
            &code,
            recovery.code_ttl_secs,
        ))?;

        tracing::info!(teacher_id = %teacher.id, expires_at, "recovery_code_issued");
        Ok(RecoveryRequest {
            email: teacher.email,
            expires_at,
        })
    }

    fn consume_code(&self, conn: &rusqlite::Connection, email: &str, code: &str) -> Result<()> {
        if codes::take(conn, email, code.trim())? {
            Ok(())
        } else {
            Err(RubricaError::unauthorized(
                "use recovery code",
                "code is invalid or expired",
            ))
        }
    }

    /// Set a new password using a recovery code
    #[tracing::instrument(skip(self, code, new_password))]
    pub fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        let teacher = self.teacher_by_email(email)?;
        validate_password(new_password, &self.config.accounts)?;
        let hash = hash_password(new_password)?;
        codes::purge_expired(self.db.conn(), Utc::now().timestamp())?;

        self.db.immediate("reset password", |tx| {
            self.consume_code(tx, &teacher.email, code)?;
            roster::set_password(tx, &teacher.id, &hash)
        })?;

        tracing::info!(teacher_id = %teacher.id, "password_reset");
        Ok(())
    }

    /// Move an account to a new email using a recovery code
    #[tracing::instrument(skip(self, code))]
    pub fn change_email(&self, email: &str, code: &str, new_email: &str) -> Result<Teacher> {
        let teacher = self.teacher_by_email(email)?;
        let new_email = validate_email(new_email, &self.config.accounts)?;
        codes::purge_expired(self.db.conn(), Utc::now().timestamp())?;

        self.db.immediate("change email", |tx| {
            if roster::teacher_by_email(tx, &new_email)?.is_some() {
                return Err(RubricaError::already_exists("teacher", &new_email));
            }
            self.consume_code(tx, &teacher.email, code)?;
            roster::set_email(tx, &teacher.id, &new_email)
        })?;

        tracing::info!(teacher_id = %teacher.id, "email_changed");
        Ok(Teacher {
            email: new_email,
            ..teacher
        })
    }
}
