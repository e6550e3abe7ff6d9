//! Groups and their students

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Store;
use crate::access::{check_course_access, check_grading_access};
use crate::accounts::validate_email;
use crate::config::AccountsConfig;
use crate::db::roster;
use crate::error::{RubricaError, Result};
use crate::id::{self, IdKind};
use crate::roster::{Course, Group, NewStudent, Student, Teacher};

/// Input for group creation; the acting teacher owns the group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGroup {
    #[serde(alias = "curso")]
    pub course_id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "estudiantes")]
    pub students: Vec<NewStudent>,
}

/// Result of enrolling students
#[derive(Debug, Clone, Serialize)]
pub struct EnrolmentChange {
    pub group: Group,
    pub added: Vec<String>,
    pub already_present: Vec<String>,
}

/// Fields of a student to change; `None` keeps the current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentUpdate {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, alias = "correo")]
    pub email: Option<String>,
}

/// Trim and validate a student entry
fn normalize_student(student: &NewStudent) -> Result<NewStudent> {
    let name = student.name.trim();
    if name.is_empty() {
        return Err(RubricaError::missing_field("student name"));
    }
    // Students are not bound to the institutional domain
    let email = validate_email(&student.email, &AccountsConfig::default())?;
    Ok(NewStudent {
        name: name.to_string(),
        email,
    })
}

impl Store {
    pub(crate) fn load_group(&self, group_id: &str) -> Result<Group> {
        roster::get_group(self.db.conn(), group_id)?
            .ok_or_else(|| RubricaError::not_found("group", group_id))
    }

    /// Group and course after checking that `actor` may grade the group
    pub(crate) fn load_group_for_grading(&self, actor: &Teacher, group_id: &str) -> Result<(Course, Group)> {
        let group = self.load_group(group_id)?;
        let course = self.load_course(&group.course_id)?;
        check_grading_access(&course, &group, &actor.id)?;
        Ok((course, group))
    }

    #[tracing::instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub fn create_group(&self, actor: &Teacher, input: NewGroup) -> Result<Group> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(RubricaError::missing_field("name"));
        }
        let course = self.load_course(input.course_id.trim())?;
        check_course_access(&course, &actor.id)?;

        let mut students: Vec<NewStudent> = Vec::with_capacity(input.students.len());
        for student in &input.students {
            let student = normalize_student(student)?;
            if students.iter().any(|s| s.email == student.email) {
                return Err(RubricaError::already_exists("student", &student.email));
            }
            students.push(student);
        }

        let group_id = id::generate(IdKind::Group);
        self.db.immediate("create group", |tx| {
            if roster::group_name_taken(tx, &course.id, &name, None)? {
                return Err(RubricaError::already_exists("group", &name));
            }
            roster::insert_group(tx, &group_id, &course.id, &name, &actor.id, Utc::now())?;
            for student in &students {
                roster::insert_student(tx, &group_id, student)?;
            }
            Ok(())
        })?;

        tracing::info!(group_id = %group_id, students = students.len(), "group_created");
        self.load_group(&group_id)
    }

    /// Any member of the owning course may read a group
    pub fn get_group(&self, actor: &Teacher, group_id: &str) -> Result<Group> {
        let group = self.load_group(group_id)?;
        let course = self.load_course(&group.course_id)?;
        check_course_access(&course, &actor.id)?;
        Ok(group)
    }

    /// Groups of a course, optionally only the ones the actor created
    pub fn list_groups(&self, actor: &Teacher, course_id: &str, only_mine: bool) -> Result<Vec<Group>> {
        let course = self.load_course(course_id)?;
        check_course_access(&course, &actor.id)?;
        roster::groups_of_course(
            self.db.conn(),
            course_id,
            only_mine.then_some(actor.id.as_str()),
        )
    }

    /// Enrol students; refuses when every one of them is already enrolled
    pub fn add_students(
        &self,
        actor: &Teacher,
        group_id: &str,
        students: &[NewStudent],
    ) -> Result<EnrolmentChange> {
        self.load_group_for_grading(actor, group_id)?;

        let normalized = students
            .iter()
            .map(normalize_student)
            .collect::<Result<Vec<_>>>()?;

        let (added, already_present) = self.db.immediate("add students", |tx| {
            let mut added: Vec<String> = Vec::new();
            let mut already_present = Vec::new();
            for student in &normalized {
                if roster::student_exists(tx, group_id, &student.email)?
                    || added.contains(&student.email)
                {
                    already_present.push(student.email.clone());
                } else {
                    roster::insert_student(tx, group_id, student)?;
                    added.push(student.email.clone());
                }
            }
            if added.is_empty() {
                return Err(RubricaError::already_exists(
                    "students",
                    already_present.join(", "),
                ));
            }
            Ok((added, already_present))
        })?;

        Ok(EnrolmentChange {
            group: self.load_group(group_id)?,
            added,
            already_present,
        })
    }

    /// Change a student's name or email; recorded grades follow the email
    pub fn update_student(
        &self,
        actor: &Teacher,
        group_id: &str,
        email: &str,
        update: StudentUpdate,
    ) -> Result<Student> {
        self.load_group_for_grading(actor, group_id)?;
        let email = email.trim().to_lowercase();

        let new_email = self.db.immediate("update student", |tx| {
            let current = roster::get_student(tx, group_id, &email)?
                .ok_or_else(|| RubricaError::not_found("student", &email))?;

            let next = normalize_student(&NewStudent {
                name: update.name.clone().unwrap_or(current.name),
                email: update.email.clone().unwrap_or(current.email),
            })?;

            if next.email != email && roster::student_exists(tx, group_id, &next.email)? {
                return Err(RubricaError::already_exists("student", &next.email));
            }
            roster::update_student(tx, group_id, &email, &next.name, &next.email)?;
            Ok(next.email)
        })?;

        roster::get_student(self.db.conn(), group_id, &new_email)?
            .ok_or_else(|| RubricaError::not_found("student", new_email))
    }

    /// Remove a student together with their grades
    pub fn remove_student(&self, actor: &Teacher, group_id: &str, email: &str) -> Result<Group> {
        self.load_group_for_grading(actor, group_id)?;
        let email = email.trim().to_lowercase();

        if !roster::delete_student(self.db.conn(), group_id, &email)? {
            return Err(RubricaError::not_found("student", email));
        }
        self.load_group(group_id)
    }

    pub fn rename_group(&self, actor: &Teacher, group_id: &str, name: &str) -> Result<Group> {
        let (course, group) = self.load_group_for_grading(actor, group_id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(RubricaError::missing_field("name"));
        }

        self.db.immediate("rename group", |tx| {
            if roster::group_name_taken(tx, &course.id, name, Some(&group.id))? {
                return Err(RubricaError::already_exists("group", name));
            }
            roster::rename_group(tx, &group.id, name)
        })?;
        self.load_group(group_id)
    }

    /// Delete a group with its students, notas and grades
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub fn delete_group(&self, actor: &Teacher, group_id: &str) -> Result<()> {
        let (_, group) = self.load_group_for_grading(actor, group_id)?;
        roster::delete_group(self.db.conn(), group_id)?;
        tracing::info!(
            group_id,
            students = group.students.len(),
            notas = group.notas.len(),
            "group_deleted"
        );
        Ok(())
    }
}
