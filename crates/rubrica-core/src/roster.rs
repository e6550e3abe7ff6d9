//! Teachers, courses, groups and the students and notas inside groups
//!
//! These are plain records joined by identifier. The store loads them with
//! explicit lookups; nothing here holds a live reference to another record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RubricaError, Result};
use crate::rubric::Topic;

/// A registered teacher (password material never leaves the store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub email: String,
    pub created: DateTime<Utc>,
}

/// Membership of a teacher in a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMember {
    pub teacher_id: String,
    pub email: String,
    pub moderator: bool,
}

/// Request to add a teacher to a course by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRequest {
    #[serde(alias = "correo")]
    pub email: String,
    #[serde(default, alias = "moderador")]
    pub moderator: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub teachers: Vec<CourseMember>,
    pub group_ids: Vec<String>,
    pub guide_rubric_ids: Vec<String>,
}

impl Course {
    pub fn member(&self, teacher_id: &str) -> Option<&CourseMember> {
        self.teachers.iter().find(|m| m.teacher_id == teacher_id)
    }

    pub fn is_moderator(&self, teacher_id: &str) -> bool {
        self.member(teacher_id).is_some_and(|m| m.moderator)
    }
}

/// One recorded grade of a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calificacion {
    pub rubric_id: String,
    /// Nota the grade was submitted under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nota_number: Option<u32>,
    pub recorded: DateTime<Utc>,
    /// Rubric roll-up before the nota percentage
    pub raw_score: f64,
    /// Weighted contribution to the average
    pub final_score: f64,
    /// Filled topics as submitted
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub email: String,
    pub average: f64,
    #[serde(default)]
    pub calificaciones: Vec<Calificacion>,
}

impl Student {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            average: 0.0,
            calificaciones: Vec::new(),
        }
    }

    pub fn grade_for(&self, rubric_id: &str) -> Option<&Calificacion> {
        self.calificaciones.iter().find(|c| c.rubric_id == rubric_id)
    }
}

/// Student input for group creation and enrolment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "correo")]
    pub email: String,
}

/// A scheduled grading event of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nota {
    pub number: u32,
    pub rubric_id: String,
    pub date: NaiveDate,
    pub percentage: f64,
}

/// Input for nota creation; every field is required
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNota {
    #[serde(default, alias = "numero")]
    pub number: Option<u32>,
    #[serde(default, alias = "rubrica")]
    pub rubric_id: Option<String>,
    #[serde(default, alias = "fecha")]
    pub date: Option<String>,
    #[serde(default, alias = "porcentaje")]
    pub percentage: Option<f64>,
}

impl NewNota {
    /// Check presence and ranges, returning the parsed nota
    pub fn validate(&self) -> Result<Nota> {
        let number = self.number.ok_or_else(|| RubricaError::missing_field("number"))?;
        if number == 0 {
            crate::bail_invalid!("nota number", number);
        }

        let rubric_id = self
            .rubric_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| RubricaError::missing_field("rubric"))?
            .to_string();

        let date_str = self
            .date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| RubricaError::missing_field("date"))?;
        let date = parse_date(date_str)?;

        let percentage = self
            .percentage
            .ok_or_else(|| RubricaError::missing_field("percentage"))?;
        let percentage = crate::grading::validate_percentage(percentage)?;

        Ok(Nota {
            number,
            rubric_id,
            date,
            percentage,
        })
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| RubricaError::invalid_value("date", s))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub course_id: String,
    pub name: String,
    pub teacher_id: String,
    pub students: Vec<Student>,
    pub rubric_ids: Vec<String>,
    pub notas: Vec<Nota>,
}

impl Group {
    pub fn student(&self, email: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.email == email)
    }

    pub fn nota(&self, number: u32) -> Option<&Nota> {
        self.notas.iter().find(|n| n.number == number)
    }

    /// Sum of the percentages of all notas
    pub fn total_percentage(&self) -> f64 {
        crate::grading::round2(self.notas.iter().map(|n| n.percentage).sum())
    }
}

/// Per-student view of a group's grades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    pub group_id: String,
    pub total_percentage: f64,
    pub students: Vec<StudentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub email: String,
    pub name: String,
    pub average: f64,
    /// (nota number, weighted final) for every graded nota
    pub finals: Vec<(u32, f64)>,
}

impl GradeSummary {
    pub fn from_group(group: &Group) -> Self {
        let students = group
            .students
            .iter()
            .map(|student| StudentSummary {
                email: student.email.clone(),
                name: student.name.clone(),
                average: student.average,
                finals: group
                    .notas
                    .iter()
                    .filter_map(|nota| {
                        student
                            .grade_for(&nota.rubric_id)
                            .map(|c| (nota.number, c.final_score))
                    })
                    .collect(),
            })
            .collect();

        Self {
            group_id: group.id.clone(),
            total_percentage: group.total_percentage(),
            students,
        }
    }
}
