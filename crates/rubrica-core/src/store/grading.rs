//! Notas and grade recording
//!
//! Every mutation here runs in one immediate transaction and ends by
//! recomputing the average of each student it touched, from the full set of
//! their stored grades.

use std::time::Instant;

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::Store;
use crate::access::check_course_access;
use crate::db::{notas, roster, rubrics};
use crate::error::{RubricaError, Result};
use crate::grading::{
    compute_raw_score, compute_weighted_final, recompute_average, round2, score_snapshot,
    validate_percentage,
};
use crate::roster::{Calificacion, GradeSummary, NewNota, Nota, Teacher};
use crate::rubric::{Scope, Topic};

/// A teacher's filled rubric for one student
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeSubmission {
    #[serde(alias = "estudiante")]
    pub student_email: String,
    #[serde(default, alias = "temas")]
    pub topics: Vec<Topic>,
    #[serde(default, alias = "observaciones")]
    pub remarks: String,
}

/// A stored grade with the student's refreshed average
#[derive(Debug, Clone, Serialize)]
pub struct RecordedGrade {
    pub student_email: String,
    pub calificacion: Calificacion,
    pub average: f64,
}

/// A nota after reweighting or deletion, with the students whose grades moved
#[derive(Debug, Clone, Serialize)]
pub struct NotaChange {
    pub group_id: String,
    pub nota: Nota,
    pub affected_students: Vec<String>,
}

/// A student's grade for a nota, or an empty topic list when none is stored
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StudentGrade {
    Recorded(Calificacion),
    Empty { topics: Vec<Topic> },
}

/// Recompute and store one student's average
fn refresh_average(conn: &Connection, group_id: &str, email: &str) -> Result<f64> {
    let calificaciones = notas::calificaciones_of_student(conn, group_id, email)?;
    let average = recompute_average(&calificaciones);
    roster::set_average(conn, group_id, email, average)?;
    Ok(average)
}

fn load_nota(conn: &Connection, group_id: &str, number: u32) -> Result<Nota> {
    notas::get(conn, group_id, number)?
        .ok_or_else(|| RubricaError::not_found("nota", format!("{} in group {}", number, group_id)))
}

fn require_student(conn: &Connection, group_id: &str, email: &str) -> Result<()> {
    if roster::student_exists(conn, group_id, email)? {
        Ok(())
    } else {
        Err(RubricaError::not_found("student", email))
    }
}

impl Store {
    /// Refuse a percentage that would push the group total above 100 when
    /// `strict_weights` is on
    fn check_total_percentage(
        &self,
        conn: &Connection,
        group_id: &str,
        except: Option<u32>,
        percentage: f64,
    ) -> Result<()> {
        if !self.config.grading.strict_weights {
            return Ok(());
        }
        let total = round2(notas::total_percentage(conn, group_id, except)? + percentage);
        if total > crate::config::MAX_PERCENTAGE {
            return Err(RubricaError::invalid_value(
                "percentage",
                format!("{} (group total would be {})", percentage, total),
            ));
        }
        Ok(())
    }

    /// Schedule a nota in a group
    #[tracing::instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub fn create_nota(&self, actor: &Teacher, group_id: &str, input: &NewNota) -> Result<Nota> {
        let nota = input.validate()?;
        self.load_group_for_grading(actor, group_id)?;
        let rubric = self.load_rubric(&nota.rubric_id)?;
        self.rubric_access(actor, &rubric)?;

        self.db.immediate("create nota", |tx| {
            if notas::get(tx, group_id, nota.number)?.is_some() {
                return Err(RubricaError::already_exists("nota", nota.number));
            }
            if let Some(other) = notas::by_rubric(tx, group_id, &nota.rubric_id)? {
                return Err(RubricaError::already_exists(
                    "nota for rubric",
                    format!("{} (nota {})", nota.rubric_id, other.number),
                ));
            }
            self.check_total_percentage(tx, group_id, None, nota.percentage)?;

            notas::insert(tx, group_id, &nota)?;
            rubrics::register_guide(tx, &Scope::Group(group_id.to_string()), &nota.rubric_id)?;
            Ok(())
        })?;

        tracing::info!(group_id, number = nota.number, percentage = nota.percentage, "nota_created");
        Ok(nota)
    }

    pub fn list_notas(&self, actor: &Teacher, group_id: &str) -> Result<Vec<Nota>> {
        Ok(self.get_group(actor, group_id)?.notas)
    }

    pub fn get_nota(&self, actor: &Teacher, group_id: &str, number: u32) -> Result<Nota> {
        let group = self.get_group(actor, group_id)?;
        group
            .nota(number)
            .cloned()
            .ok_or_else(|| RubricaError::not_found("nota", format!("{} in group {}", number, group_id)))
    }

    /// Score a filled rubric and replace the student's grade for the nota
    #[tracing::instrument(skip(self, actor, submission), fields(actor = %actor.id, student = %submission.student_email))]
    pub fn submit_grade(
        &self,
        actor: &Teacher,
        group_id: &str,
        number: u32,
        submission: GradeSubmission,
    ) -> Result<RecordedGrade> {
        let email = submission.student_email.trim().to_lowercase();
        if email.is_empty() {
            return Err(RubricaError::missing_field("student"));
        }
        self.load_group_for_grading(actor, group_id)?;

        let mut topics = submission.topics;
        for topic in &mut topics {
            topic.fill_accumulated();
        }

        let (calificacion, average) = self.db.immediate("submit grade", |tx| {
            let nota = load_nota(tx, group_id, number)?;
            require_student(tx, group_id, &email)?;

            let (raw_score, final_score) = score_snapshot(&topics, nota.percentage);
            let calificacion = Calificacion {
                rubric_id: nota.rubric_id.clone(),
                nota_number: Some(nota.number),
                recorded: Utc::now(),
                raw_score,
                final_score,
                topics: topics.clone(),
                remarks: submission.remarks.trim().to_string(),
            };
            notas::upsert_calificacion(tx, group_id, &email, &calificacion)?;
            let average = refresh_average(tx, group_id, &email)?;
            Ok((calificacion, average))
        })?;

        tracing::info!(
            group_id,
            number,
            raw = calificacion.raw_score,
            final_score = calificacion.final_score,
            average,
            "grade_recorded"
        );
        Ok(RecordedGrade {
            student_email: email,
            calificacion,
            average,
        })
    }

    /// Change a nota's percentage and reweight every grade recorded under it.
    ///
    /// Raw scores are derived again from each stored topic snapshot.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub fn update_nota_percentage(
        &self,
        actor: &Teacher,
        group_id: &str,
        number: u32,
        percentage: f64,
    ) -> Result<NotaChange> {
        let percentage = validate_percentage(percentage)?;
        self.load_group_for_grading(actor, group_id)?;
        let start = Instant::now();

        let change = self.db.immediate("update nota percentage", |tx| {
            let mut nota = load_nota(tx, group_id, number)?;
            self.check_total_percentage(tx, group_id, Some(number), percentage)?;
            notas::set_percentage(tx, group_id, number, percentage)?;
            nota.percentage = percentage;

            let mut affected = Vec::new();
            for (email, calificacion) in notas::calificaciones_for_rubric(tx, group_id, &nota.rubric_id)? {
                let raw = compute_raw_score(&calificacion.topics);
                let weighted = compute_weighted_final(raw, percentage);
                notas::set_final_score(tx, group_id, &email, &nota.rubric_id, raw, weighted)?;
                refresh_average(tx, group_id, &email)?;
                affected.push(email);
            }

            Ok(NotaChange {
                group_id: group_id.to_string(),
                nota,
                affected_students: affected,
            })
        })?;

        crate::trace_time!(start, "reweight_nota", students = change.affected_students.len());
        tracing::info!(
            group_id,
            number,
            percentage,
            students = change.affected_students.len(),
            "nota_reweighted"
        );
        Ok(change)
    }

    /// Delete a nota and every grade recorded against its rubric in the group
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub fn delete_nota(&self, actor: &Teacher, group_id: &str, number: u32) -> Result<NotaChange> {
        self.load_group_for_grading(actor, group_id)?;

        let change = self.db.immediate("delete nota", |tx| {
            let nota = load_nota(tx, group_id, number)?;
            let affected = notas::delete_calificaciones_for_rubric(tx, group_id, &nota.rubric_id)?;
            notas::delete(tx, group_id, number)?;
            for email in &affected {
                refresh_average(tx, group_id, email)?;
            }
            Ok(NotaChange {
                group_id: group_id.to_string(),
                nota,
                affected_students: affected,
            })
        })?;

        tracing::info!(
            group_id,
            number,
            removed_grades = change.affected_students.len(),
            "nota_deleted"
        );
        Ok(change)
    }

    /// Drop one student's grade for a nota; returns the new average
    pub fn revert_grade(&self, actor: &Teacher, group_id: &str, number: u32, email: &str) -> Result<f64> {
        self.load_group_for_grading(actor, group_id)?;
        let email = email.trim().to_lowercase();

        let average = self.db.immediate("revert grade", |tx| {
            let nota = load_nota(tx, group_id, number)?;
            require_student(tx, group_id, &email)?;
            if !notas::delete_calificacion(tx, group_id, &email, &nota.rubric_id)? {
                return Err(RubricaError::not_found(
                    "grade",
                    format!("{} for nota {}", email, number),
                ));
            }
            refresh_average(tx, group_id, &email)
        })?;

        tracing::info!(group_id, number, average, "grade_reverted");
        Ok(average)
    }

    /// The stored grade of a student for a nota
    pub fn get_student_grade(
        &self,
        actor: &Teacher,
        group_id: &str,
        number: u32,
        email: &str,
    ) -> Result<StudentGrade> {
        self.load_group_for_grading(actor, group_id)?;
        let email = email.trim().to_lowercase();
        let conn = self.db.conn();

        let nota = load_nota(conn, group_id, number)?;
        require_student(conn, group_id, &email)?;

        Ok(match notas::get_calificacion(conn, group_id, &email, &nota.rubric_id)? {
            Some(calificacion) => StudentGrade::Recorded(calificacion),
            None => StudentGrade::Empty { topics: Vec::new() },
        })
    }

    /// Per-student finals and averages for a group
    pub fn grade_summary(&self, actor: &Teacher, group_id: &str) -> Result<GradeSummary> {
        let group = self.load_group(group_id)?;
        let course = self.load_course(&group.course_id)?;
        check_course_access(&course, &actor.id)?;
        Ok(GradeSummary::from_group(&group))
    }
}
