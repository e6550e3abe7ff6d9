//! Grade report delivery by email

use serde::Serialize;

use super::Store;
use crate::db::roster;
use crate::error::{RubricaError, Result};
use crate::mail::{grade_report_email, Attachment};
use crate::roster::Teacher;

/// Summary of a sent report
#[derive(Debug, Clone, Serialize)]
pub struct ReportDelivery {
    pub to: String,
    pub subject: String,
    pub average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

impl Store {
    /// Mail a student their per-nota finals and average
    #[tracing::instrument(skip(self, actor, attachment), fields(actor = %actor.id))]
    pub fn send_grade_report(
        &self,
        actor: &Teacher,
        group_id: &str,
        email: &str,
        attachment: Option<Attachment>,
    ) -> Result<ReportDelivery> {
        let (_, group) = self.load_group_for_grading(actor, group_id)?;
        let email = email.trim().to_lowercase();

        let student = roster::get_student(self.db.conn(), group_id, &email)?
            .ok_or_else(|| RubricaError::not_found("student", &email))?;

        let message = grade_report_email(&self.config.mail.from, &group, &student, attachment);
        self.mailer().send(&message)?;

        tracing::info!(group_id, has_attachment = message.attachment.is_some(), "grade_report_sent");
        Ok(ReportDelivery {
            to: message.to,
            subject: message.subject,
            average: student.average,
            attachment: message.attachment.map(|a| a.filename),
        })
    }
}
